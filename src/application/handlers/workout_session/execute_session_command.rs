//! ExecuteSessionCommandHandler - Routes a client command to the session actor.

use std::sync::Arc;

use crate::application::session_actor::{
    ActorError, CommandReply, SessionActorRegistry, SessionCommand,
};
use crate::domain::foundation::{CommandMetadata, SessionId};

/// Handler for commands against an existing session.
pub struct ExecuteSessionCommandHandler {
    registry: Arc<SessionActorRegistry>,
}

impl ExecuteSessionCommandHandler {
    pub fn new(registry: Arc<SessionActorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        session_id: SessionId,
        command: SessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CommandReply, ActorError> {
        self.registry.execute(session_id, command, metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::workout_session::test_support::{create, registry, user};
    use crate::domain::workout_session::{
        FeedItemType, ParticipantRole, SessionError, SessionState,
    };

    #[tokio::test]
    async fn join_then_start_then_complete() {
        let (registry, _store) = registry();
        let session_id = create(&registry, 4).await;
        let handler = ExecuteSessionCommandHandler::new(registry);

        let joined = handler
            .handle(
                session_id,
                SessionCommand::Join {
                    user_id: user("bob"),
                    user_name: "Bob".to_string(),
                    avatar: None,
                    role: ParticipantRole::Participant,
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap();
        assert_eq!(joined.outcome.appended[0].item_type(), FeedItemType::UserJoined);

        let started = handler
            .handle(
                session_id,
                SessionCommand::Start {
                    user_id: user("owner"),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap();
        assert_eq!(started.session.state(), SessionState::Active);

        let completed = handler
            .handle(session_id, SessionCommand::Complete {}, CommandMetadata::new())
            .await
            .unwrap();
        assert_eq!(completed.session.state(), SessionState::Completed);
    }

    #[tokio::test]
    async fn domain_errors_pass_through() {
        let (registry, _store) = registry();
        let session_id = create(&registry, 4).await;
        let handler = ExecuteSessionCommandHandler::new(registry);

        let result = handler
            .handle(session_id, SessionCommand::Complete {}, CommandMetadata::new())
            .await;

        assert_eq!(
            result.unwrap_err(),
            ActorError::Session(SessionError::InvalidTransition {
                from: SessionState::Waiting,
                to: SessionState::Completed,
            })
        );
    }
}
