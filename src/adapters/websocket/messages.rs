//! WebSocket message types for live workout sessions.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, feed items, state changes,
//!   participant updates, command results, sync batches, errors, pongs
//! - Client → Server: pings, session commands, sync requests

use serde::{Deserialize, Serialize};

use crate::application::session_actor::SessionCommand;
use crate::domain::foundation::Timestamp;
use crate::domain::workout_session::{SessionFeedItem, SessionParticipant, SessionState};
use crate::ports::SessionUpdate;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established successfully.
    Connected(ConnectedMessage),

    /// A feed item was appended.
    #[serde(rename = "feed.appended")]
    FeedAppended(FeedAppendedMessage),

    /// The session changed lifecycle state.
    #[serde(rename = "session.state_changed")]
    StateChanged(StateChangedMessage),

    /// A participant's roster entry changed.
    #[serde(rename = "participant.updated")]
    ParticipantUpdated(ParticipantUpdatedMessage),

    /// Reply to a command sent over this connection.
    #[serde(rename = "command.result")]
    CommandResult(CommandResultMessage),

    /// Feed items requested with `sync`.
    Sync(SyncMessage),

    /// The client fell behind and missed broadcasts; it should `sync`.
    #[serde(rename = "resync.required")]
    ResyncRequired(ResyncRequiredMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

/// Sent when client successfully connects and joins a session room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub session_id: String,
    pub client_id: String,
    pub state: SessionState,
    pub last_sequence: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedAppendedMessage {
    pub item: SessionFeedItem,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangedMessage {
    pub from: SessionState,
    pub to: SessionState,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantUpdatedMessage {
    pub participant: SessionParticipant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResultMessage {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub state: SessionState,
    pub last_sequence: u64,
    pub appended: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub items: Vec<SessionFeedItem>,
    pub last_sequence: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncRequiredMessage {
    pub missed: u64,
}

/// Error message sent to client. `code` is the error kind name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl ServerMessage {
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.into(),
            message: message.into(),
            request_id,
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

impl From<SessionUpdate> for ServerMessage {
    fn from(update: SessionUpdate) -> Self {
        match update {
            SessionUpdate::FeedAppended(item) => {
                ServerMessage::FeedAppended(FeedAppendedMessage { item })
            }
            SessionUpdate::StateChanged { from, to } => {
                ServerMessage::StateChanged(StateChangedMessage {
                    from,
                    to,
                    timestamp: Timestamp::now().to_rfc3339(),
                })
            }
            SessionUpdate::ParticipantUpdated(participant) => {
                ServerMessage::ParticipantUpdated(ParticipantUpdatedMessage { participant })
            }
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,

    /// Run a session command (same envelope as the HTTP endpoint).
    Command(ClientCommand),

    /// Request feed items after a sequence number (after reconnection).
    Sync(SyncRequest),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCommand {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub command: SessionCommand,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub after: Option<u64>,
}
