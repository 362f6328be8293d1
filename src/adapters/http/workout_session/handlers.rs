//! HTTP handlers for workout session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::application::handlers::workout_session::{
    CreateWorkoutSessionCommand, CreateWorkoutSessionHandler, ExecuteSessionCommandHandler,
    GetSessionFeedHandler, GetSessionFeedQuery, GetWorkoutSessionHandler,
};
use crate::application::session_actor::{ActorError, SessionActorRegistry, SessionCommand};
use crate::domain::foundation::{CommandMetadata, FeedItemId, SessionId, UserId};
use crate::domain::workout_session::{FeedCursor, SessionError};

use super::dto::{
    CommandResponse, CreateWorkoutSessionRequest, ErrorResponse, FeedQuery, FeedResponse,
    SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WorkoutSessionHandlers {
    create_handler: Arc<CreateWorkoutSessionHandler>,
    execute_handler: Arc<ExecuteSessionCommandHandler>,
    get_handler: Arc<GetWorkoutSessionHandler>,
    feed_handler: Arc<GetSessionFeedHandler>,
}

impl WorkoutSessionHandlers {
    pub fn new(
        create_handler: Arc<CreateWorkoutSessionHandler>,
        execute_handler: Arc<ExecuteSessionCommandHandler>,
        get_handler: Arc<GetWorkoutSessionHandler>,
        feed_handler: Arc<GetSessionFeedHandler>,
    ) -> Self {
        Self {
            create_handler,
            execute_handler,
            get_handler,
            feed_handler,
        }
    }

    /// Build every handler on top of one registry.
    pub fn from_registry(registry: Arc<SessionActorRegistry>) -> Self {
        Self::new(
            Arc::new(CreateWorkoutSessionHandler::new(registry.clone())),
            Arc::new(ExecuteSessionCommandHandler::new(registry.clone())),
            Arc::new(GetWorkoutSessionHandler::new(registry.clone())),
            Arc::new(GetSessionFeedHandler::new(registry)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/workout-sessions - Create a new workout session
pub async fn create_workout_session(
    State(handlers): State<WorkoutSessionHandlers>,
    Json(req): Json<CreateWorkoutSessionRequest>,
) -> Response {
    let owner_id = match UserId::new(req.owner_id) {
        Ok(id) => id,
        Err(e) => return bad_request(e.to_string()),
    };

    let cmd = CreateWorkoutSessionCommand {
        owner_id,
        owner_name: req.owner_name,
        workout_name: req.workout_name,
        configuration: req.configuration,
    };
    let metadata = CommandMetadata::new().with_source("http");

    match handlers.create_handler.handle(cmd, metadata).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(SessionResponse::with_feed(&session)),
        )
            .into_response(),
        Err(e) => handle_actor_error(e),
    }
}

/// GET /api/workout-sessions/:id - Current session state including the feed
pub async fn get_workout_session(
    State(handlers): State<WorkoutSessionHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.get_handler.handle(session_id).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::with_feed(&session))).into_response(),
        Err(e) => handle_actor_error(e),
    }
}

/// POST /api/workout-sessions/:id/commands - Run a session command
///
/// Body: `{ "command": "join", "payload": { ... } }`. Commands without
/// arguments may omit `payload`.
pub async fn execute_command(
    State(handlers): State<WorkoutSessionHandlers>,
    Path(session_id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    if let Value::Object(map) = &mut body {
        map.entry("payload")
            .or_insert_with(|| Value::Object(Default::default()));
    }
    let command: SessionCommand = match serde_json::from_value(body) {
        Ok(command) => command,
        Err(e) => return bad_request(format!("Invalid command: {}", e)),
    };

    let name = command.name();
    let metadata = CommandMetadata::new().with_source("http");

    match handlers
        .execute_handler
        .handle(session_id, command, metadata)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(CommandResponse::new(name, reply))).into_response(),
        Err(e) => handle_actor_error(e),
    }
}

/// GET /api/workout-sessions/:id/feed?after=N - Feed items after a cursor
pub async fn get_feed(
    State(handlers): State<WorkoutSessionHandlers>,
    Path(session_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cursor = match (query.after, query.after_item) {
        (Some(_), Some(_)) => return bad_request("Use either after or afterItem, not both"),
        (Some(after), None) => FeedCursor::Sequence(after),
        (None, Some(item)) => match item.parse::<FeedItemId>() {
            Ok(id) => FeedCursor::Item(id),
            Err(_) => return bad_request("Invalid feed item ID"),
        },
        (None, None) => FeedCursor::Start,
    };

    let query = GetSessionFeedQuery { session_id, cursor };
    match handlers.feed_handler.handle(query).await {
        Ok(items) => (StatusCode::OK, Json(FeedResponse::from(items))).into_response(),
        Err(e) => handle_actor_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>()
        .map_err(|_| bad_request("Invalid session ID"))
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::validation(message)),
    )
        .into_response()
}

fn handle_actor_error(error: ActorError) -> Response {
    let status = match &error {
        ActorError::Session(SessionError::Validation { .. }) => StatusCode::BAD_REQUEST,
        ActorError::Session(SessionError::CapacityExceeded { .. })
        | ActorError::Session(SessionError::AlreadyJoined(_))
        | ActorError::Session(SessionError::SessionClosed(_))
        | ActorError::Session(SessionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        ActorError::Session(SessionError::ParticipantNotFound(_)) | ActorError::NotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ActorError::Persistence(_) | ActorError::Unavailable(_) => {
            tracing::error!(error = %error, "Workout session request failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(ErrorResponse::from(&error))).into_response()
}
