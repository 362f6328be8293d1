//! Command envelope accepted by session actors.
//!
//! Clients send `{ "command": "<name>", "payload": { ... } }`; the tag and
//! payload map onto one `SessionCommand` variant each.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::workout_session::{
    CommandOutcome, ParticipantRole, ParticipantStatus, PostFeedItem, ProgressUpdate,
    SessionError, WorkoutSession,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum SessionCommand {
    #[serde(rename_all = "camelCase")]
    Join {
        user_id: UserId,
        user_name: String,
        #[serde(default)]
        avatar: Option<String>,
        #[serde(default = "default_role")]
        role: ParticipantRole,
    },
    #[serde(rename_all = "camelCase")]
    Leave { user_id: UserId },
    #[serde(rename_all = "camelCase")]
    RecordProgress {
        user_id: UserId,
        #[serde(flatten)]
        update: ProgressUpdate,
    },
    #[serde(rename_all = "camelCase")]
    PostFeedItem {
        user_id: UserId,
        #[serde(flatten)]
        post: PostFeedItem,
    },
    Complete {},
    Abandon {
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Start { user_id: UserId },
    #[serde(rename_all = "camelCase")]
    UpdateStatus {
        user_id: UserId,
        status: ParticipantStatus,
    },
    #[serde(rename_all = "camelCase")]
    Heartbeat { user_id: UserId },
}

fn default_role() -> ParticipantRole {
    ParticipantRole::Participant
}

impl SessionCommand {
    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Join { .. } => "join",
            SessionCommand::Leave { .. } => "leave",
            SessionCommand::RecordProgress { .. } => "recordProgress",
            SessionCommand::PostFeedItem { .. } => "postFeedItem",
            SessionCommand::Complete {} => "complete",
            SessionCommand::Abandon { .. } => "abandon",
            SessionCommand::Start { .. } => "start",
            SessionCommand::UpdateStatus { .. } => "updateStatus",
            SessionCommand::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Heartbeats only refresh liveness and are never persisted.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, SessionCommand::Heartbeat { .. })
    }

    /// Run the command against a session.
    pub fn apply(self, session: &mut WorkoutSession) -> Result<CommandOutcome, SessionError> {
        match self {
            SessionCommand::Join {
                user_id,
                user_name,
                avatar,
                role,
            } => session.join(user_id, user_name, avatar, role),
            SessionCommand::Leave { user_id } => session.leave(&user_id),
            SessionCommand::RecordProgress { user_id, update } => {
                session.record_progress(&user_id, update)
            }
            SessionCommand::PostFeedItem { user_id, post } => {
                session.post_feed_item(&user_id, post)
            }
            SessionCommand::Complete {} => session.complete(),
            SessionCommand::Abandon { reason } => session.abandon(reason),
            SessionCommand::Start { user_id } => session.start(&user_id),
            SessionCommand::UpdateStatus { user_id, status } => {
                session.update_participant_status(&user_id, status)
            }
            SessionCommand::Heartbeat { user_id } => session
                .touch(&user_id, Timestamp::now())
                .map(|_| CommandOutcome::default()),
        }
    }
}

/// Result of a command the actor accepted.
#[derive(Debug, Clone)]
pub struct CommandReply {
    /// Session state after the command.
    pub session: WorkoutSession,
    /// What the command changed.
    pub outcome: CommandOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::workout_session::{FeedItemKind, ProgressKind, SessionConfiguration};
    use serde_json::json;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn join_defaults_role_to_participant() {
        let command: SessionCommand = serde_json::from_value(json!({
            "command": "join",
            "payload": { "userId": "bob", "userName": "Bob" }
        }))
        .unwrap();

        assert_eq!(
            command,
            SessionCommand::Join {
                user_id: user("bob"),
                user_name: "Bob".to_string(),
                avatar: None,
                role: ParticipantRole::Participant,
            }
        );
    }

    #[test]
    fn record_progress_payload_is_flattened() {
        let command: SessionCommand = serde_json::from_value(json!({
            "command": "recordProgress",
            "payload": {
                "userId": "bob",
                "activityLabel": "Bench press",
                "completedDelta": 1,
                "kind": { "type": "set", "set_number": 2, "weight": 70.0, "reps": 8 }
            }
        }))
        .unwrap();

        match command {
            SessionCommand::RecordProgress { user_id, update } => {
                assert_eq!(user_id, user("bob"));
                assert_eq!(update.activity_label, "Bench press");
                assert_eq!(
                    update.kind,
                    ProgressKind::Set {
                        set_number: 2,
                        weight: Some(70.0),
                        reps: Some(8)
                    }
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn post_feed_item_carries_tagged_kind() {
        let command: SessionCommand = serde_json::from_value(json!({
            "command": "postFeedItem",
            "payload": {
                "userId": "bob",
                "content": "Nice work",
                "kind": { "type": "encouragement", "target_user_id": "owner" }
            }
        }))
        .unwrap();

        match command {
            SessionCommand::PostFeedItem { post, .. } => {
                assert_eq!(
                    post.kind,
                    FeedItemKind::Encouragement {
                        target_user_id: Some(user("owner"))
                    }
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn complete_accepts_empty_payload() {
        let command: SessionCommand =
            serde_json::from_value(json!({ "command": "complete", "payload": {} })).unwrap();
        assert_eq!(command, SessionCommand::Complete {});
        assert_eq!(command.name(), "complete");
    }

    #[test]
    fn unknown_command_is_rejected() {
        let result = serde_json::from_value::<SessionCommand>(json!({
            "command": "teleport",
            "payload": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn blank_user_id_is_rejected() {
        let result = serde_json::from_value::<SessionCommand>(json!({
            "command": "leave",
            "payload": { "userId": "  " }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn heartbeat_applies_without_outcome() {
        let mut session = WorkoutSession::create(
            SessionId::new(),
            user("owner"),
            "Olive".to_string(),
            SessionConfiguration::solo(),
        )
        .unwrap();

        let command = SessionCommand::Heartbeat {
            user_id: user("owner"),
        };
        assert!(command.is_heartbeat());
        let outcome = command.apply(&mut session).unwrap();
        assert!(outcome.is_noop());
    }
}
