//! Workout session error taxonomy.
//!
//! One closed enum: every business-rule violation a session command can
//! produce. Commands return these as values; nothing here is thrown.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

use super::state::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Malformed command input.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Join attempted on a full session.
    #[error("Session is full ({max} participants)")]
    CapacityExceeded { max: u32 },

    /// User is already present in the session.
    #[error("User '{0}' has already joined this session")]
    AlreadyJoined(UserId),

    /// Command references a user that is not (or no longer) in the roster.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(UserId),

    /// Mutating command against a completed or abandoned session.
    #[error("Session is {0} and no longer accepts changes")]
    SessionClosed(SessionState),

    /// Illegal lifecycle transition.
    #[error("Cannot transition session from {from} to {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

impl SessionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Validation { .. } => ErrorCode::ValidationFailed,
            SessionError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            SessionError::AlreadyJoined(_) => ErrorCode::AlreadyJoined,
            SessionError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            SessionError::SessionClosed(_) => ErrorCode::SessionClosed,
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
        }
    }

    /// Client-facing error kind name.
    pub fn error_kind(&self) -> &'static str {
        match self {
            SessionError::Validation { .. } => "ValidationError",
            SessionError::CapacityExceeded { .. } => "CapacityExceededError",
            SessionError::AlreadyJoined(_) => "AlreadyJoinedError",
            SessionError::ParticipantNotFound(_) => "ParticipantNotFoundError",
            SessionError::SessionClosed(_) => "SessionClosedError",
            SessionError::InvalidTransition { .. } => "InvalidTransitionError",
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        DomainError::new(err.code(), err.to_string()).with_detail("errorKind", err.error_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_are_stable() {
        let user = UserId::new("u").unwrap();
        assert_eq!(
            SessionError::validation("content", "empty").error_kind(),
            "ValidationError"
        );
        assert_eq!(
            SessionError::CapacityExceeded { max: 2 }.error_kind(),
            "CapacityExceededError"
        );
        assert_eq!(
            SessionError::AlreadyJoined(user.clone()).error_kind(),
            "AlreadyJoinedError"
        );
        assert_eq!(
            SessionError::ParticipantNotFound(user).error_kind(),
            "ParticipantNotFoundError"
        );
        assert_eq!(
            SessionError::SessionClosed(SessionState::Completed).error_kind(),
            "SessionClosedError"
        );
        assert_eq!(
            SessionError::InvalidTransition {
                from: SessionState::Waiting,
                to: SessionState::Completed
            }
            .error_kind(),
            "InvalidTransitionError"
        );
    }

    #[test]
    fn invalid_transition_message_names_states() {
        let err = SessionError::InvalidTransition {
            from: SessionState::Waiting,
            to: SessionState::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition session from waiting to completed"
        );
    }

    #[test]
    fn converts_to_domain_error_with_kind_detail() {
        let err: DomainError = SessionError::CapacityExceeded { max: 4 }.into();
        assert_eq!(err.code, ErrorCode::CapacityExceeded);
        assert_eq!(
            err.details.get("errorKind"),
            Some(&"CapacityExceededError".to_string())
        );
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: SessionError = ValidationError::empty_field("user_name").into();
        assert!(matches!(err, SessionError::Validation { ref field, .. } if field == "user_name"));
    }
}
