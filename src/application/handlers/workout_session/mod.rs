//! Workout session command and query handlers.

mod create_workout_session;
mod execute_session_command;
mod get_workout_session;

pub use create_workout_session::{CreateWorkoutSessionCommand, CreateWorkoutSessionHandler};
pub use execute_session_command::ExecuteSessionCommandHandler;
pub use get_workout_session::{GetSessionFeedHandler, GetSessionFeedQuery, GetWorkoutSessionHandler};
