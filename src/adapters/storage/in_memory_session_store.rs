//! In-Memory Session Store Adapter
//!
//! Stores session snapshots and feed logs in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::workout_session::{SessionFeedItem, SessionRecord, WorkoutSession};
use crate::ports::{SessionStore, StoreError};

/// In-memory storage for workout sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
    feeds: Arc<RwLock<HashMap<SessionId, BTreeMap<u64, SessionFeedItem>>>>,
    archived: Arc<RwLock<HashSet<SessionId>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Get the number of feed items logged for a session, committed or not
    pub async fn feed_len(&self, session_id: SessionId) -> usize {
        self.feeds
            .read()
            .await
            .get(&session_id)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// First sequence not yet covered by the saved snapshot.
    async fn committed_until(&self, session_id: SessionId) -> u64 {
        self.records
            .read()
            .await
            .get(&session_id)
            .map(|record| record.next_sequence)
            .unwrap_or(1)
    }

    /// Whether the session has been archived
    pub async fn is_archived(&self, session_id: SessionId) -> bool {
        self.archived.read().await.contains(&session_id)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: SessionId) -> Result<WorkoutSession, StoreError> {
        let record = self
            .records
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(StoreError::NotFound(session_id))?;

        let feed = self
            .feeds
            .read()
            .await
            .get(&session_id)
            .map(|log| log.values().cloned().collect())
            .unwrap_or_default();

        Ok(WorkoutSession::reconstitute(record, feed))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn append_feed(
        &self,
        session_id: SessionId,
        items: &[SessionFeedItem],
    ) -> Result<(), StoreError> {
        let committed_until = self.committed_until(session_id).await;
        let mut feeds = self.feeds.write().await;
        let log = feeds.entry(session_id).or_default();

        // Check the whole batch before inserting so a conflict appends nothing.
        for item in items {
            if item.sequence() >= committed_until {
                continue;
            }
            if let Some(existing) = log.get(&item.sequence()) {
                if existing.id() != item.id() {
                    return Err(StoreError::SequenceConflict {
                        session_id,
                        sequence: item.sequence(),
                    });
                }
            }
        }
        for item in items {
            log.insert(item.sequence(), item.clone());
        }
        Ok(())
    }

    async fn feed_since(
        &self,
        session_id: SessionId,
        after_sequence: u64,
    ) -> Result<Vec<SessionFeedItem>, StoreError> {
        let committed_until = self
            .records
            .read()
            .await
            .get(&session_id)
            .map(|record| record.next_sequence)
            .ok_or(StoreError::NotFound(session_id))?;

        let start = after_sequence.saturating_add(1);
        if start >= committed_until {
            return Ok(Vec::new());
        }
        let feeds = self.feeds.read().await;
        Ok(feeds
            .get(&session_id)
            .map(|log| {
                log.range(start..committed_until)
                    .map(|(_, item)| item.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn archive(&self, session_id: SessionId) -> Result<(), StoreError> {
        if !self.records.read().await.contains_key(&session_id) {
            return Err(StoreError::NotFound(session_id));
        }
        self.archived.write().await.insert(session_id);
        Ok(())
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(&session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::workout_session::{
        FeedItemKind, ParticipantRole, PostFeedItem, SessionConfiguration,
    };

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    fn session() -> WorkoutSession {
        WorkoutSession::create(
            SessionId::new(),
            owner(),
            "Olive".to_string(),
            SessionConfiguration::multiplayer(4),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn persist_and_load_round_trips_session() {
        let store = InMemorySessionStore::new();
        let mut session = session();
        store.persist(&session, session.feed()).await.unwrap();

        let outcome = session
            .join(
                UserId::new("bob").unwrap(),
                "Bob".to_string(),
                None,
                ParticipantRole::Participant,
            )
            .unwrap();
        store.persist(&session, &outcome.appended).await.unwrap();

        let loaded = store.load(*session.id()).await.unwrap();
        assert_eq!(loaded, session);
        assert_eq!(store.feed_len(*session.id()).await, 2);
    }

    #[tokio::test]
    async fn load_unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();
        assert_eq!(store.load(id).await, Err(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn append_is_idempotent_per_sequence() {
        let store = InMemorySessionStore::new();
        let session = session();
        store.persist(&session, session.feed()).await.unwrap();
        store.append_feed(*session.id(), session.feed()).await.unwrap();

        assert_eq!(store.feed_len(*session.id()).await, 1);
    }

    #[tokio::test]
    async fn different_item_under_same_sequence_conflicts() {
        let store = InMemorySessionStore::new();
        let first = session();
        store.persist(&first, first.feed()).await.unwrap();

        // Another session's first item also carries sequence 1.
        let other = session();
        let result = store.append_feed(*first.id(), other.feed()).await;
        assert_eq!(
            result,
            Err(StoreError::SequenceConflict {
                session_id: *first.id(),
                sequence: 1
            })
        );
    }

    #[tokio::test]
    async fn uncommitted_items_are_hidden_and_replaceable() {
        let store = InMemorySessionStore::new();
        let session = session();
        store.persist(&session, session.feed()).await.unwrap();

        // Bob's join reaches the log but its snapshot save never happens.
        let mut lost = session.clone();
        let bob = lost
            .join(
                UserId::new("bob").unwrap(),
                "Bob".to_string(),
                None,
                ParticipantRole::Participant,
            )
            .unwrap();
        store.append_feed(*session.id(), &bob.appended).await.unwrap();

        assert!(store.feed_since(*session.id(), 1).await.unwrap().is_empty());
        assert_eq!(store.load(*session.id()).await.unwrap(), session);

        // The next command reuses sequence 2 for a different item.
        let mut next = session.clone();
        let carl = next
            .join(
                UserId::new("carl").unwrap(),
                "Carl".to_string(),
                None,
                ParticipantRole::Participant,
            )
            .unwrap();
        store.persist(&next, &carl.appended).await.unwrap();

        let items = store.feed_since(*session.id(), 1).await.unwrap();
        assert_eq!(items, carl.appended);
        assert_eq!(store.load(*session.id()).await.unwrap(), next);
    }

    #[tokio::test]
    async fn feed_since_returns_items_after_sequence() {
        let store = InMemorySessionStore::new();
        let mut session = session();
        store.persist(&session, session.feed()).await.unwrap();
        for text in ["one", "two"] {
            let outcome = session
                .post_feed_item(
                    &owner(),
                    PostFeedItem {
                        content: text.to_string(),
                        kind: FeedItemKind::ChatMessage,
                    },
                )
                .unwrap();
            store.persist(&session, &outcome.appended).await.unwrap();
        }

        let items = store.feed_since(*session.id(), 1).await.unwrap();
        let contents: Vec<&str> = items.iter().map(|i| i.content()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn archived_session_stays_loadable() {
        let store = InMemorySessionStore::new();
        let session = session();
        store.persist(&session, session.feed()).await.unwrap();
        store.archive(*session.id()).await.unwrap();

        assert!(store.is_archived(*session.id()).await);
        assert!(store.load(*session.id()).await.is_ok());
    }
}
