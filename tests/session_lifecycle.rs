//! End-to-end workout session flow over the registry, the in-memory store and
//! WebSocket rooms.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use workout_sessions::adapters::websocket::ClientId;
use workout_sessions::adapters::{FileSessionStore, InMemorySessionStore, RoomManager};
use workout_sessions::application::{
    ActorConfig, ActorError, NewSession, SessionActorRegistry, SessionCommand,
};
use workout_sessions::domain::foundation::{CommandMetadata, SessionId, UserId};
use workout_sessions::domain::workout_session::{
    FeedCursor, FeedItemKind, FeedItemType, ParticipantRole, ParticipantStatus, PostFeedItem,
    ProgressKind, ProgressUpdate, SessionConfiguration, SessionError, SessionState,
    REASON_ALL_PARTICIPANTS_LEFT,
};
use workout_sessions::ports::{SessionStore, SessionUpdate};

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn join(id: &str) -> SessionCommand {
    SessionCommand::Join {
        user_id: user(id),
        user_name: id.to_string(),
        avatar: None,
        role: ParticipantRole::Participant,
    }
}

fn setup(store: Arc<dyn SessionStore>) -> (Arc<SessionActorRegistry>, Arc<RoomManager>) {
    let rooms = Arc::new(RoomManager::new(64));
    let registry = Arc::new(SessionActorRegistry::new(
        store,
        rooms.clone(),
        ActorConfig::default(),
    ));
    (registry, rooms)
}

async fn create(registry: &SessionActorRegistry, max: u32) -> SessionId {
    let session = registry
        .create_session(NewSession {
            owner_id: user("owner"),
            owner_name: "owner".to_string(),
            workout_name: Some("Full body".to_string()),
            configuration: SessionConfiguration::multiplayer(max),
        })
        .await
        .unwrap();
    *session.id()
}

async fn exec(
    registry: &SessionActorRegistry,
    id: SessionId,
    command: SessionCommand,
) -> Result<workout_sessions::application::CommandReply, ActorError> {
    registry.execute(id, command, CommandMetadata::new()).await
}

async fn next(rx: &mut broadcast::Receiver<SessionUpdate>) -> SessionUpdate {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no update within a second")
        .expect("room closed")
}

#[tokio::test]
async fn group_workout_from_join_to_completion() {
    let store = Arc::new(InMemorySessionStore::new());
    let (registry, rooms) = setup(store.clone());
    let id = create(&registry, 4).await;
    let mut rx = rooms.join(&id, ClientId::new()).await;

    exec(&registry, id, join("bob")).await.unwrap();
    match next(&mut rx).await {
        SessionUpdate::FeedAppended(item) => {
            assert_eq!(item.item_type(), FeedItemType::UserJoined);
            assert_eq!(item.sequence(), 2);
        }
        other => panic!("unexpected update: {:?}", other),
    }
    assert!(matches!(
        next(&mut rx).await,
        SessionUpdate::ParticipantUpdated(p) if p.user_id() == &user("bob")
    ));

    exec(&registry, id, SessionCommand::Start { user_id: user("owner") })
        .await
        .unwrap();
    assert_eq!(
        next(&mut rx).await,
        SessionUpdate::StateChanged {
            from: SessionState::Waiting,
            to: SessionState::Active
        }
    );

    let reply = exec(
        &registry,
        id,
        SessionCommand::RecordProgress {
            user_id: user("bob"),
            update: ProgressUpdate {
                activity_label: "Squat".to_string(),
                completed_delta: 1,
                kind: ProgressKind::Set {
                    set_number: 1,
                    weight: Some(60.0),
                    reps: Some(10),
                },
            },
        },
    )
    .await
    .unwrap();
    assert_eq!(reply.outcome.appended[0].item_type(), FeedItemType::SetCompleted);
    let bob = reply.session.participant(&user("bob")).unwrap();
    assert_eq!(bob.completed_activities(), 1);
    assert_eq!(bob.current_activity(), Some("Squat"));

    exec(
        &registry,
        id,
        SessionCommand::PostFeedItem {
            user_id: user("owner"),
            post: PostFeedItem {
                content: "Nice set!".to_string(),
                kind: FeedItemKind::Encouragement {
                    target_user_id: Some(user("bob")),
                },
            },
        },
    )
    .await
    .unwrap();

    let done = exec(&registry, id, SessionCommand::Complete {}).await.unwrap();
    assert_eq!(done.session.state(), SessionState::Completed);
    assert!(done.session.ended_at().is_some());

    // Everything the actor accepted is in the store, in order.
    let feed = store.feed_since(id, 0).await.unwrap();
    let sequences: Vec<u64> = feed.iter().map(|i| i.sequence()).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert_eq!(store.load(id).await.unwrap().state(), SessionState::Completed);

    // Terminal sessions refuse further commands, from the store if need be.
    let err = exec(&registry, id, join("cara")).await.unwrap_err();
    assert_eq!(
        err,
        ActorError::Session(SessionError::SessionClosed(SessionState::Completed))
    );
}

#[tokio::test]
async fn capacity_counts_present_participants_only() {
    let (registry, _rooms) = setup(Arc::new(InMemorySessionStore::new()));
    let id = create(&registry, 2).await;

    exec(&registry, id, join("bob")).await.unwrap();
    let err = exec(&registry, id, join("cara")).await.unwrap_err();
    assert_eq!(
        err,
        ActorError::Session(SessionError::CapacityExceeded { max: 2 })
    );

    exec(&registry, id, SessionCommand::Leave { user_id: user("bob") })
        .await
        .unwrap();
    let reply = exec(&registry, id, join("cara")).await.unwrap();
    assert_eq!(reply.session.participant_count(), 2);
}

#[tokio::test]
async fn owner_leaving_keeps_session_until_last_member_leaves() {
    let (registry, _rooms) = setup(Arc::new(InMemorySessionStore::new()));
    let id = create(&registry, 4).await;
    exec(&registry, id, join("bob")).await.unwrap();

    let reply = exec(&registry, id, SessionCommand::Leave { user_id: user("owner") })
        .await
        .unwrap();
    assert_eq!(reply.session.state(), SessionState::Waiting);
    assert_eq!(
        reply.session.owner().map(|p| p.status()),
        Some(ParticipantStatus::Left)
    );

    let reply = exec(&registry, id, SessionCommand::Leave { user_id: user("bob") })
        .await
        .unwrap();
    assert_eq!(reply.session.state(), SessionState::Abandoned);
    assert_eq!(
        reply.session.abandon_reason(),
        Some(REASON_ALL_PARTICIPANTS_LEFT)
    );
}

#[tokio::test]
async fn reconnecting_client_catches_up_from_cursor() {
    let (registry, _rooms) = setup(Arc::new(InMemorySessionStore::new()));
    let id = create(&registry, 8).await;
    for name in ["a", "b", "c"] {
        exec(&registry, id, join(name)).await.unwrap();
    }

    let missed = registry
        .feed_since(id, FeedCursor::Sequence(2))
        .await
        .unwrap();
    let sequences: Vec<u64> = missed.iter().map(|i| i.sequence()).collect();
    assert_eq!(sequences, vec![3, 4]);

    let by_item = registry
        .feed_since(id, FeedCursor::Item(*missed[0].id()))
        .await
        .unwrap();
    assert_eq!(by_item.len(), 1);
    assert_eq!(by_item[0].sequence(), 4);
}

#[tokio::test]
async fn file_store_survives_a_registry_restart() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let (registry, _rooms) = setup(Arc::new(FileSessionStore::new(dir.path())));
        let id = create(&registry, 4).await;
        exec(&registry, id, join("bob")).await.unwrap();
        id
    };

    let (registry, _rooms) = setup(Arc::new(FileSessionStore::new(dir.path())));
    let session = registry.snapshot(id).await.unwrap();
    assert_eq!(session.participant_count(), 2);
    assert_eq!(session.last_sequence(), 2);

    // Sequences continue where the previous process stopped.
    let reply = exec(&registry, id, join("cara")).await.unwrap();
    assert_eq!(reply.outcome.appended[0].sequence(), 3);
}

#[tokio::test]
async fn concurrent_joins_never_exceed_capacity() {
    let (registry, _rooms) = setup(Arc::new(InMemorySessionStore::new()));
    let id = create(&registry, 5).await;

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move { exec(&registry, id, join(&format!("user-{}", i))).await })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 4);
    let session = registry.snapshot(id).await.unwrap();
    assert_eq!(session.participant_count(), 5);
    let sequences: Vec<u64> = session.feed().iter().map(|i| i.sequence()).collect();
    assert_eq!(sequences, (1..=5).collect::<Vec<_>>());
}
