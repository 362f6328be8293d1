//! HTTP routes for workout session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_workout_session, execute_command, get_feed, get_workout_session,
    WorkoutSessionHandlers,
};

/// Creates the workout session router with all REST endpoints.
pub fn workout_session_routes(handlers: WorkoutSessionHandlers) -> Router {
    Router::new()
        .route("/", post(create_workout_session))
        .route("/:id", get(get_workout_session))
        .route("/:id/commands", post(execute_command))
        .route("/:id/feed", get(get_feed))
        .with_state(handlers)
}
