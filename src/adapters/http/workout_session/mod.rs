//! HTTP adapter for workout session endpoints.
//!
//! - `POST /` - Create a workout session
//! - `GET /:id` - Session state and feed
//! - `POST /:id/commands` - Run a command (join, leave, record_progress, ...)
//! - `GET /:id/feed` - Feed items after a cursor

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CommandResponse, CreateWorkoutSessionRequest, ErrorResponse, FeedQuery, FeedResponse,
    SessionResponse,
};
pub use handlers::WorkoutSessionHandlers;
pub use routes::workout_session_routes;
