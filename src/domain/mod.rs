//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `workout_session` - Workout session aggregate, roster, feed and lifecycle

pub mod foundation;
pub mod workout_session;
