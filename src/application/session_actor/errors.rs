//! Errors surfaced by the session actor layer.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::domain::workout_session::SessionError;
use crate::ports::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActorError {
    /// The aggregate rejected the command.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No session with this id was ever stored.
    #[error("Workout session not found: {0}")]
    NotFound(SessionId),

    /// Persisting the command's result failed after all retries.
    #[error("Failed to persist session: {0}")]
    Persistence(StoreError),

    /// The actor stopped before it could answer.
    #[error("Session {0} is temporarily unavailable")]
    Unavailable(SessionId),
}

impl ActorError {
    /// Client-facing error kind name.
    pub fn error_kind(&self) -> &'static str {
        match self {
            ActorError::Session(err) => err.error_kind(),
            ActorError::NotFound(_) => "SessionNotFoundError",
            ActorError::Persistence(_) => "PersistenceError",
            ActorError::Unavailable(_) => "UnavailableError",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ActorError::Session(err) => err.code(),
            ActorError::NotFound(_) => ErrorCode::SessionNotFound,
            ActorError::Persistence(_) => ErrorCode::StorageError,
            ActorError::Unavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl From<StoreError> for ActorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ActorError::NotFound(id),
            other => ActorError::Persistence(other),
        }
    }
}

impl From<ActorError> for DomainError {
    fn from(err: ActorError) -> Self {
        DomainError::new(err.code(), err.to_string()).with_detail("errorKind", err.error_kind())
    }
}
