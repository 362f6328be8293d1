//! Workout Sessions - live, multi-participant workout sessions
//!
//! A `WorkoutSession` aggregate owns its roster, lifecycle and activity feed.
//! Each live session runs in its own actor, which serializes commands,
//! persists their results and fans updates out to connected clients.
//!
//! - [`domain`] - the aggregate and its value types
//! - [`ports`] - storage and broadcast seams
//! - [`application`] - session actors, the registry and request handlers
//! - [`adapters`] - in-memory and file stores, WebSocket rooms, HTTP router
//! - [`config`] - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
