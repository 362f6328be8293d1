//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers are thin use cases over the session actor registry, which owns
//! the single-writer pipeline for every live session.

pub mod handlers;
pub mod session_actor;

pub use handlers::workout_session::{
    CreateWorkoutSessionCommand, CreateWorkoutSessionHandler, ExecuteSessionCommandHandler,
    GetSessionFeedHandler, GetSessionFeedQuery, GetWorkoutSessionHandler,
};
pub use session_actor::{
    ActorConfig, ActorError, CommandReply, NewSession, SessionActorRegistry, SessionCommand,
};
