//! Session Store Port - Interface for persisting workout sessions.
//!
//! A session is stored as one snapshot record plus an append-only feed log
//! keyed by `(session_id, sequence)`. Snapshots are overwritten on every
//! command; feed items are only ever appended.
//!
//! The snapshot is the commit point. Log items at or beyond the saved
//! record's `next_sequence` are uncommitted: readers never see them, and a
//! later append may replace them. A command whose snapshot save fails
//! therefore leaves nothing visible behind, and the next command can reuse
//! its sequence numbers.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::workout_session::{SessionFeedItem, SessionRecord, WorkoutSession};

/// Errors that can occur during session store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize session data: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Feed sequence {sequence} of session {session_id} already holds a different item")]
    SequenceConflict { session_id: SessionId, sequence: u64 },
}

impl StoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

/// Port for persisting and loading workout sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session snapshot together with its full feed log.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the session was never saved
    async fn load(&self, session_id: SessionId) -> Result<WorkoutSession, StoreError>;

    /// Overwrite the snapshot record of a session.
    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Append items to the feed log.
    ///
    /// Idempotent per sequence: re-appending an item already stored under its
    /// sequence is a no-op. A different item under a committed sequence is a
    /// `SequenceConflict`; under an uncommitted one it replaces the old item.
    async fn append_feed(
        &self,
        session_id: SessionId,
        items: &[SessionFeedItem],
    ) -> Result<(), StoreError>;

    /// Committed feed items with a sequence greater than `after_sequence`,
    /// oldest first.
    async fn feed_since(
        &self,
        session_id: SessionId,
        after_sequence: u64,
    ) -> Result<Vec<SessionFeedItem>, StoreError>;

    /// Mark a finished session as archived. Archived sessions stay loadable.
    async fn archive(&self, session_id: SessionId) -> Result<(), StoreError>;

    /// Check if a session has been saved
    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError>;

    /// Persist the outcome of a command: new feed items first, then the
    /// snapshot that commits them. If the save fails the appended items stay
    /// uncommitted.
    async fn persist(
        &self,
        session: &WorkoutSession,
        appended: &[SessionFeedItem],
    ) -> Result<(), StoreError> {
        if !appended.is_empty() {
            self.append_feed(*session.id(), appended).await?;
        }
        self.save(&session.to_record()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_conflict_names_session_and_sequence() {
        let session_id = SessionId::new();
        let err = StoreError::SequenceConflict {
            session_id,
            sequence: 7,
        };
        let message = err.to_string();
        assert!(message.contains("7"));
        assert!(message.contains(&session_id.to_string()));
    }

    #[test]
    fn only_io_errors_are_transient() {
        assert!(StoreError::Io("timeout".to_string()).is_transient());
        assert!(!StoreError::Serialization("bad".to_string()).is_transient());
        assert!(!StoreError::NotFound(SessionId::new()).is_transient());
    }

    #[test]
    fn not_found_displays_session_id() {
        let session_id = SessionId::new();
        assert_eq!(
            StoreError::NotFound(session_id).to_string(),
            format!("Session not found: {}", session_id)
        );
    }
}
