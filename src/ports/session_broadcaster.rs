//! Session Broadcaster Port - Interface for realtime fan-out.
//!
//! The session actor broadcasts only after a command's result has been
//! persisted, so subscribers never observe state that could be lost.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::SessionId;
use crate::domain::workout_session::{SessionFeedItem, SessionParticipant, SessionState};

/// A change pushed to everyone watching a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SessionUpdate {
    /// A feed item was appended.
    FeedAppended(SessionFeedItem),
    /// The session moved to a new lifecycle state.
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    /// A roster entry changed (status, progress, presence).
    ParticipantUpdated(SessionParticipant),
}

/// Port for pushing session updates to live subscribers
#[async_trait]
pub trait SessionBroadcaster: Send + Sync {
    /// Deliver an update to every subscriber of the session.
    ///
    /// Delivery is best effort: no subscribers is not an error.
    async fn broadcast(&self, session_id: SessionId, update: SessionUpdate);
}
