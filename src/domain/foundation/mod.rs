//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and error
//! types that form the vocabulary of the workout session domain.

mod command;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{FeedItemId, SessionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
