//! Query handlers for reading workout sessions and their feeds.

use std::sync::Arc;

use crate::application::session_actor::{ActorError, SessionActorRegistry};
use crate::domain::foundation::SessionId;
use crate::domain::workout_session::{FeedCursor, SessionFeedItem, WorkoutSession};

/// Query to read a session's feed after a cursor.
#[derive(Debug, Clone)]
pub struct GetSessionFeedQuery {
    pub session_id: SessionId,
    pub cursor: FeedCursor,
}

/// Handler for retrieving session state.
pub struct GetWorkoutSessionHandler {
    registry: Arc<SessionActorRegistry>,
}

impl GetWorkoutSessionHandler {
    pub fn new(registry: Arc<SessionActorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, session_id: SessionId) -> Result<WorkoutSession, ActorError> {
        self.registry.snapshot(session_id).await
    }
}

/// Handler for incremental feed reads.
pub struct GetSessionFeedHandler {
    registry: Arc<SessionActorRegistry>,
}

impl GetSessionFeedHandler {
    pub fn new(registry: Arc<SessionActorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(
        &self,
        query: GetSessionFeedQuery,
    ) -> Result<Vec<SessionFeedItem>, ActorError> {
        self.registry
            .feed_since(query.session_id, query.cursor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::workout_session::test_support::{create, registry};

    #[tokio::test]
    async fn get_returns_created_session() {
        let (registry, _store) = registry();
        let session_id = create(&registry, 4).await;
        let handler = GetWorkoutSessionHandler::new(registry);

        let session = handler.handle(session_id).await.unwrap();

        assert_eq!(session.id(), &session_id);
        assert_eq!(session.participant_count(), 1);
    }

    #[tokio::test]
    async fn get_unknown_session_is_not_found() {
        let (registry, _store) = registry();
        let handler = GetWorkoutSessionHandler::new(registry);
        let id = SessionId::new();

        assert_eq!(handler.handle(id).await.unwrap_err(), ActorError::NotFound(id));
    }

    #[tokio::test]
    async fn feed_from_start_includes_owner_join() {
        let (registry, _store) = registry();
        let session_id = create(&registry, 4).await;
        let handler = GetSessionFeedHandler::new(registry);

        let items = handler
            .handle(GetSessionFeedQuery {
                session_id,
                cursor: FeedCursor::Start,
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sequence(), 1);
    }
}
