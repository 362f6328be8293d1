//! CreateWorkoutSessionHandler - Command handler for starting a workout session.

use std::sync::Arc;

use crate::application::session_actor::{ActorError, NewSession, SessionActorRegistry};
use crate::domain::foundation::{CommandMetadata, UserId};
use crate::domain::workout_session::{SessionConfiguration, WorkoutSession};

/// Command to create a new workout session.
#[derive(Debug, Clone)]
pub struct CreateWorkoutSessionCommand {
    pub owner_id: UserId,
    pub owner_name: String,
    pub workout_name: Option<String>,
    pub configuration: SessionConfiguration,
}

/// Handler for creating workout sessions.
pub struct CreateWorkoutSessionHandler {
    registry: Arc<SessionActorRegistry>,
}

impl CreateWorkoutSessionHandler {
    pub fn new(registry: Arc<SessionActorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        cmd: CreateWorkoutSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<WorkoutSession, ActorError> {
        tracing::debug!(
            owner_id = %cmd.owner_id,
            correlation_id = %metadata.correlation_id(),
            "Creating workout session"
        );

        self.registry
            .create_session(NewSession {
                owner_id: cmd.owner_id,
                owner_name: cmd.owner_name,
                workout_name: cmd.workout_name,
                configuration: cmd.configuration,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::workout_session::test_support::registry;
    use crate::domain::workout_session::{SessionError, SessionState};

    fn command(configuration: SessionConfiguration) -> CreateWorkoutSessionCommand {
        CreateWorkoutSessionCommand {
            owner_id: UserId::new("owner").unwrap(),
            owner_name: "Olive".to_string(),
            workout_name: None,
            configuration,
        }
    }

    #[tokio::test]
    async fn creates_waiting_multiplayer_session() {
        let (registry, store) = registry();
        let handler = CreateWorkoutSessionHandler::new(registry);

        let session = handler
            .handle(
                command(SessionConfiguration::multiplayer(6)),
                CommandMetadata::new(),
            )
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Waiting);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn creates_active_solo_session() {
        let (registry, _store) = registry();
        let handler = CreateWorkoutSessionHandler::new(registry);

        let session = handler
            .handle(command(SessionConfiguration::solo()), CommandMetadata::new())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn rejects_too_many_participants() {
        let (registry, store) = registry();
        let handler = CreateWorkoutSessionHandler::new(registry);

        let result = handler
            .handle(
                command(SessionConfiguration::multiplayer(101)),
                CommandMetadata::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ActorError::Session(SessionError::Validation { .. }))
        ));
        assert_eq!(store.session_count().await, 0);
    }
}
