//! HTTP DTOs for workout session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::session_actor::{ActorError, CommandReply};
use crate::domain::workout_session::{
    SessionConfiguration, SessionFeedItem, SessionParticipant, SessionState, StateTransition,
    WorkoutSession,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a new workout session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutSessionRequest {
    pub owner_id: String,
    pub owner_name: String,
    #[serde(default)]
    pub workout_name: Option<String>,
    pub configuration: SessionConfiguration,
}

/// Query parameters for incremental feed reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Last sequence number the client has seen.
    #[serde(default)]
    pub after: Option<u64>,
    /// Last feed item id the client has seen.
    #[serde(default)]
    pub after_item: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session view for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_name: Option<String>,
    pub state: SessionState,
    pub configuration: SessionConfiguration,
    pub participants: Vec<SessionParticipant>,
    pub participant_count: usize,
    pub is_full: bool,
    pub last_sequence: u64,
    pub created_at: String,
    pub last_activity_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandon_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Vec<SessionFeedItem>>,
}

impl SessionResponse {
    /// Full view including the feed.
    pub fn with_feed(session: &WorkoutSession) -> Self {
        let mut response = Self::from(session);
        response.feed = Some(session.feed().to_vec());
        response
    }
}

impl From<&WorkoutSession> for SessionResponse {
    fn from(session: &WorkoutSession) -> Self {
        Self {
            id: session.id().to_string(),
            owner_id: session.owner_id().to_string(),
            workout_name: session.workout_name().map(str::to_string),
            state: session.state(),
            configuration: session.configuration().clone(),
            participants: session.participants().to_vec(),
            participant_count: session.participant_count(),
            is_full: session.is_full(),
            last_sequence: session.last_sequence(),
            created_at: session.created_at().to_rfc3339(),
            last_activity_at: session.last_activity_at().to_rfc3339(),
            started_at: session.started_at().map(|t| t.to_rfc3339()),
            ended_at: session.ended_at().map(|t| t.to_rfc3339()),
            abandon_reason: session.abandon_reason().map(str::to_string),
            feed: None,
        }
    }
}

/// Response for an accepted command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub command: String,
    pub session: SessionResponse,
    pub appended: Vec<SessionFeedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<StateTransition>,
}

impl CommandResponse {
    pub fn new(command: impl Into<String>, reply: CommandReply) -> Self {
        Self {
            command: command.into(),
            session: SessionResponse::from(&reply.session),
            appended: reply.outcome.appended,
            transition: reply.outcome.transition,
        }
    }
}

/// Feed items after a cursor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<SessionFeedItem>,
    /// Cursor to pass as `after` on the next read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sequence: Option<u64>,
}

impl From<Vec<SessionFeedItem>> for FeedResponse {
    fn from(items: Vec<SessionFeedItem>) -> Self {
        let last_sequence = items.last().map(|i| i.sequence());
        Self {
            items,
            last_sequence,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_kind: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            error_kind: "ValidationError".to_string(),
            code: "VALIDATION_FAILED".to_string(),
            message: message.into(),
        }
    }
}

impl From<&ActorError> for ErrorResponse {
    fn from(err: &ActorError) -> Self {
        Self {
            error_kind: err.error_kind().to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
