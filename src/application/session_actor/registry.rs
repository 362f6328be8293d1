//! SessionActorRegistry - finds or spawns the actor for a session.
//!
//! The registry is the only way the rest of the application reaches a live
//! session. Commands always go through an actor, spawned on first use by
//! hydrating the session from the store. Reads of sessions without a live
//! actor go straight to the store so finished sessions do not wake actors.
//!
//! The actor map lock is never held across store I/O. Handles of stopped
//! actors are dropped whenever a new actor is registered.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::{CommandMetadata, SessionId, Timestamp, UserId};
use crate::domain::workout_session::{
    FeedCursor, SessionConfiguration, SessionFeedItem, WorkoutSession,
};
use crate::ports::{SessionBroadcaster, SessionStore};

use super::actor::{ActorConfig, SessionActor, SessionHandle};
use super::commands::{CommandReply, SessionCommand};
use super::errors::ActorError;

/// Input for starting a new workout session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub owner_id: UserId,
    pub owner_name: String,
    pub workout_name: Option<String>,
    pub configuration: SessionConfiguration,
}

pub struct SessionActorRegistry {
    store: Arc<dyn SessionStore>,
    broadcaster: Arc<dyn SessionBroadcaster>,
    config: ActorConfig,
    actors: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionActorRegistry {
    pub fn new(
        store: Arc<dyn SessionStore>,
        broadcaster: Arc<dyn SessionBroadcaster>,
        config: ActorConfig,
    ) -> Self {
        Self {
            store,
            broadcaster,
            config,
            actors: RwLock::new(HashMap::new()),
        }
    }

    /// Create, persist and start a new session.
    ///
    /// The session is stored before its actor starts, so a crash right after
    /// creation never loses it.
    pub async fn create_session(&self, new: NewSession) -> Result<WorkoutSession, ActorError> {
        let mut session = WorkoutSession::create(
            SessionId::new(),
            new.owner_id,
            new.owner_name,
            new.configuration,
        )?;
        if let Some(name) = new.workout_name.filter(|n| !n.trim().is_empty()) {
            session = session.with_workout_name(name.trim());
        }

        self.store.persist(&session, session.feed()).await?;

        let handle = SessionActor::spawn(
            session.clone(),
            self.store.clone(),
            self.broadcaster.clone(),
            self.config.clone(),
        );
        let mut actors = self.actors.write().await;
        forget_stopped(&mut actors);
        actors.insert(*session.id(), handle);
        drop(actors);

        tracing::info!(
            session_id = %session.id(),
            owner_id = %session.owner_id(),
            state = %session.state(),
            multiplayer = session.configuration().is_multiplayer,
            "Workout session created"
        );
        Ok(session)
    }

    /// Run a command against a session, spawning its actor if needed.
    pub async fn execute(
        &self,
        session_id: SessionId,
        command: SessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CommandReply, ActorError> {
        let handle = self.handle(session_id).await?;
        match handle.execute(command.clone(), metadata.clone()).await {
            // The actor stopped between lookup and send; start a fresh one.
            Err(ActorError::Unavailable(_)) => {
                let handle = self.handle(session_id).await?;
                handle.execute(command, metadata).await
            }
            result => result,
        }
    }

    /// Current state of a session.
    pub async fn snapshot(&self, session_id: SessionId) -> Result<WorkoutSession, ActorError> {
        if let Some(handle) = self.live_handle(session_id).await {
            if let Ok(session) = handle.snapshot().await {
                return Ok(session);
            }
        }
        Ok(self.store.load(session_id).await?)
    }

    /// Feed items after `cursor`, oldest first.
    pub async fn feed_since(
        &self,
        session_id: SessionId,
        cursor: FeedCursor,
    ) -> Result<Vec<SessionFeedItem>, ActorError> {
        if let Some(handle) = self.live_handle(session_id).await {
            if let Ok(items) = handle.feed_since(cursor).await {
                return Ok(items);
            }
        }
        match cursor {
            FeedCursor::Start => Ok(self.store.feed_since(session_id, 0).await?),
            FeedCursor::Sequence(after) => Ok(self.store.feed_since(session_id, after).await?),
            FeedCursor::Item(_) => {
                let session = self.store.load(session_id).await?;
                Ok(session.feed_since(cursor).cloned().collect())
            }
        }
    }

    /// Number of sessions with a running actor.
    pub async fn active_count(&self) -> usize {
        self.actors
            .read()
            .await
            .values()
            .filter(|h| !h.is_closed())
            .count()
    }

    async fn live_handle(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.actors
            .read()
            .await
            .get(&session_id)
            .filter(|h| !h.is_closed())
            .cloned()
    }

    async fn handle(&self, session_id: SessionId) -> Result<SessionHandle, ActorError> {
        loop {
            let previous = match self.actors.read().await.get(&session_id) {
                Some(handle) if !handle.is_closed() => return Ok(handle.clone()),
                other => other.cloned(),
            };

            // A closing actor may still persist drained commands; load after it is done.
            if let Some(previous) = &previous {
                previous.stopped().await;
            }
            let session = self.hydrate(session_id).await?;

            let mut actors = self.actors.write().await;
            match actors.get(&session_id) {
                // Another caller spawned it while we hydrated.
                Some(handle) if !handle.is_closed() => return Ok(handle.clone()),
                // An actor we did not wait for came and went; our load may be stale.
                Some(handle) if !previous.as_ref().is_some_and(|p| p.same_actor(handle)) => {
                    continue
                }
                _ => {}
            }

            forget_stopped(&mut actors);
            let handle = SessionActor::spawn(
                session,
                self.store.clone(),
                self.broadcaster.clone(),
                self.config.clone(),
            );
            actors.insert(session_id, handle.clone());
            return Ok(handle);
        }
    }

    /// Load a session and give its present participants a fresh heartbeat,
    /// so a session restored from storage does not time everyone out on the
    /// first sweep.
    async fn hydrate(&self, session_id: SessionId) -> Result<WorkoutSession, ActorError> {
        let mut session = self.store.load(session_id).await?;
        if !session.is_terminal() {
            let now = Timestamp::now();
            let present: Vec<UserId> = session
                .participants()
                .iter()
                .filter(|p| p.is_present())
                .map(|p| p.user_id().clone())
                .collect();
            for user_id in present {
                session.touch(&user_id, now)?;
            }
        }
        tracing::debug!(
            session_id = %session_id,
            state = %session.state(),
            feed_len = session.feed().len(),
            "Session hydrated from store"
        );
        Ok(session)
    }
}

/// Drop handles whose actor task has finished. Closed actors that are still
/// draining stay, so `handle` can wait for them.
fn forget_stopped(actors: &mut HashMap<SessionId, SessionHandle>) {
    actors.retain(|_, handle| !handle.is_stopped());
}
