//! SessionActor - single-writer task owning one live workout session.
//!
//! Every message for a session goes through the actor's mailbox and is
//! handled to completion before the next one starts, so commands against
//! one session never interleave.
//!
//! ## Command pipeline
//!
//! 1. Apply the command to a clone of the session
//! 2. Persist the clone's snapshot and new feed items (retrying transient
//!    failures with exponential backoff)
//! 3. Commit the clone as the actor's state
//! 4. Broadcast the appended items and state changes
//! 5. Reply to the caller
//!
//! A command that fails at step 1 or 2 changes nothing and broadcasts
//! nothing.
//!
//! ## Background duties
//!
//! On every sweep tick the actor marks participants whose heartbeat is older
//! than `heartbeat_timeout` as left, and stops itself after `idle_timeout`
//! without messages. It also stops once the session reaches a terminal
//! state, after archiving it in the store.
//!
//! Queued messages always win over the sweep, and an actor only evicts itself
//! with an empty mailbox. Messages that still slip in are answered during
//! shutdown; `SessionHandle::stopped` resolves once that is done.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::foundation::{CommandMetadata, SessionId, Timestamp};
use crate::domain::workout_session::{
    CommandOutcome, FeedCursor, SessionFeedItem, WorkoutSession,
};
use crate::ports::{SessionBroadcaster, SessionStore, SessionUpdate, StoreError};

use super::commands::{CommandReply, SessionCommand};
use super::errors::ActorError;

/// Tuning knobs for session actors.
#[derive(Debug, Clone)]
pub struct ActorConfig {
    /// Buffered messages per actor before senders wait.
    pub mailbox_capacity: usize,

    /// Stop an actor after this long without messages.
    pub idle_timeout: Duration,

    /// Participants silent for longer than this are marked as left.
    pub heartbeat_timeout: Duration,

    /// How often heartbeats and idleness are checked.
    pub sweep_interval: Duration,

    /// Total persistence attempts per command (first try included).
    pub persist_max_attempts: u32,

    /// Backoff before the second attempt; doubles on each retry.
    pub persist_base_delay: Duration,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            idle_timeout: Duration::from_secs(300),
            heartbeat_timeout: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(15),
            persist_max_attempts: 3,
            persist_base_delay: Duration::from_millis(100),
        }
    }
}

impl ActorConfig {
    /// Config with custom heartbeat timeout and sweep interval.
    pub fn with_heartbeat(mut self, timeout: Duration, sweep_interval: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self.sweep_interval = sweep_interval;
        self
    }

    /// Config with custom idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Config with custom persistence retry policy.
    pub fn with_persist_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.persist_max_attempts = max_attempts.max(1);
        self.persist_base_delay = base_delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.persist_base_delay.saturating_mul(factor)
    }
}

enum ActorMessage {
    Execute {
        command: SessionCommand,
        metadata: CommandMetadata,
        reply: oneshot::Sender<Result<CommandReply, ActorError>>,
    },
    Snapshot {
        reply: oneshot::Sender<WorkoutSession>,
    },
    FeedSince {
        cursor: FeedCursor,
        reply: oneshot::Sender<Vec<SessionFeedItem>>,
    },
}

/// Cheap, cloneable address of a running session actor.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<ActorMessage>,
    stopped: watch::Receiver<()>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// True once the actor has stopped accepting messages.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// True once the actor task has finished, shutdown work included.
    pub fn is_stopped(&self) -> bool {
        self.stopped.has_changed().is_err()
    }

    /// Wait until the actor task has finished. A closed actor may still be
    /// persisting commands it drained from its mailbox until then.
    pub async fn stopped(&self) {
        let mut stopped = self.stopped.clone();
        while stopped.changed().await.is_ok() {}
    }

    /// Whether both handles address the same actor.
    pub fn same_actor(&self, other: &SessionHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Run a command through the actor's pipeline.
    pub async fn execute(
        &self,
        command: SessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CommandReply, ActorError> {
        self.request(|reply| ActorMessage::Execute {
            command,
            metadata,
            reply,
        })
        .await?
    }

    /// Current in-memory session state.
    pub async fn snapshot(&self) -> Result<WorkoutSession, ActorError> {
        self.request(|reply| ActorMessage::Snapshot { reply }).await
    }

    /// Feed items after `cursor`, oldest first.
    pub async fn feed_since(
        &self,
        cursor: FeedCursor,
    ) -> Result<Vec<SessionFeedItem>, ActorError> {
        self.request(|reply| ActorMessage::FeedSince { cursor, reply })
            .await
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> ActorMessage,
    ) -> Result<T, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|_| ActorError::Unavailable(self.session_id))?;
        rx.await.map_err(|_| ActorError::Unavailable(self.session_id))
    }
}

/// The task behind a `SessionHandle`.
pub struct SessionActor {
    session: WorkoutSession,
    store: Arc<dyn SessionStore>,
    broadcaster: Arc<dyn SessionBroadcaster>,
    config: ActorConfig,
    inbox: mpsc::Receiver<ActorMessage>,
    last_message_at: Instant,
    /// Dropped with the actor, which wakes `SessionHandle::stopped`.
    _alive: watch::Sender<()>,
}

impl SessionActor {
    /// Spawn an actor for an already persisted session.
    pub fn spawn(
        session: WorkoutSession,
        store: Arc<dyn SessionStore>,
        broadcaster: Arc<dyn SessionBroadcaster>,
        config: ActorConfig,
    ) -> SessionHandle {
        let session_id = *session.id();
        let (sender, inbox) = mpsc::channel(config.mailbox_capacity.max(1));
        let (alive, stopped) = watch::channel(());

        let actor = Self {
            session,
            store,
            broadcaster,
            config,
            inbox,
            last_message_at: Instant::now(),
            _alive: alive,
        };
        tokio::spawn(actor.run());

        SessionHandle {
            session_id,
            sender,
            stopped,
        }
    }

    async fn run(mut self) {
        let session_id = *self.session.id();
        tracing::debug!(session_id = %session_id, "Session actor started");

        let mut sweep = time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        sweep.tick().await;

        loop {
            tokio::select! {
                biased;

                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    self.last_message_at = Instant::now();
                    self.handle(message).await;
                    if self.session.is_terminal() {
                        break;
                    }
                }

                _ = sweep.tick() => {
                    self.expire_heartbeats().await;
                    if self.session.is_terminal() {
                        break;
                    }
                    if self.inbox.is_empty()
                        && self.last_message_at.elapsed() >= self.config.idle_timeout
                    {
                        tracing::info!(session_id = %session_id, "Evicting idle session actor");
                        break;
                    }
                }
            }
        }

        self.shutdown().await;
    }

    /// Stop accepting messages, answer the ones already queued, and archive
    /// the session if it ended.
    async fn shutdown(mut self) {
        self.inbox.close();
        while let Some(message) = self.inbox.recv().await {
            self.handle(message).await;
        }

        let session_id = *self.session.id();
        if self.session.is_terminal() {
            if let Err(e) = self.store.archive(session_id).await {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to archive session");
            } else {
                tracing::info!(
                    session_id = %session_id,
                    state = %self.session.state(),
                    "Session archived"
                );
            }
        }
        tracing::debug!(session_id = %session_id, "Session actor stopped");
    }

    async fn handle(&mut self, message: ActorMessage) {
        match message {
            ActorMessage::Execute {
                command,
                metadata,
                reply,
            } => {
                let result = self.execute(command, &metadata).await;
                let _ = reply.send(result);
            }
            ActorMessage::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
            }
            ActorMessage::FeedSince { cursor, reply } => {
                let _ = reply.send(self.session.feed_since(cursor).cloned().collect());
            }
        }
    }

    async fn execute(
        &mut self,
        command: SessionCommand,
        metadata: &CommandMetadata,
    ) -> Result<CommandReply, ActorError> {
        let session_id = *self.session.id();
        let name = command.name();

        if command.is_heartbeat() {
            command.apply(&mut self.session)?;
            return Ok(CommandReply {
                session: self.session.clone(),
                outcome: CommandOutcome::default(),
            });
        }

        let mut next = self.session.clone();
        let outcome = match command.apply(&mut next) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(
                    session_id = %session_id,
                    command = name,
                    correlation_id = ?metadata.correlation_id_opt(),
                    error = %e,
                    "Command rejected"
                );
                return Err(e.into());
            }
        };

        if outcome.is_noop() {
            return Ok(CommandReply {
                session: self.session.clone(),
                outcome,
            });
        }

        self.persist_with_retry(&next, &outcome.appended)
            .await
            .map_err(ActorError::Persistence)?;

        self.session = next;
        self.broadcast(&outcome).await;

        tracing::debug!(
            session_id = %session_id,
            command = name,
            source = ?metadata.source(),
            appended = outcome.appended.len(),
            "Command applied"
        );
        if let Some(transition) = outcome.transition {
            tracing::info!(
                session_id = %session_id,
                from = %transition.from,
                to = %transition.to,
                "Session state changed"
            );
        }

        Ok(CommandReply {
            session: self.session.clone(),
            outcome,
        })
    }

    async fn persist_with_retry(
        &self,
        session: &WorkoutSession,
        appended: &[SessionFeedItem],
    ) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.store.persist(session, appended).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.config.persist_max_attempts => {
                    let delay = self.config.backoff(attempt);
                    tracing::warn!(
                        session_id = %session.id(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Persisting session failed, retrying"
                    );
                    time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        session_id = %session.id(),
                        attempts = attempt,
                        error = %e,
                        "Persisting session failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn broadcast(&self, outcome: &CommandOutcome) {
        let session_id = *self.session.id();

        for item in &outcome.appended {
            self.broadcaster
                .broadcast(session_id, SessionUpdate::FeedAppended(item.clone()))
                .await;
        }
        for user_id in &outcome.updated_participants {
            if let Some(participant) = self.session.participant(user_id) {
                self.broadcaster
                    .broadcast(
                        session_id,
                        SessionUpdate::ParticipantUpdated(participant.clone()),
                    )
                    .await;
            }
        }
        if let Some(transition) = outcome.transition {
            self.broadcaster
                .broadcast(
                    session_id,
                    SessionUpdate::StateChanged {
                        from: transition.from,
                        to: transition.to,
                    },
                )
                .await;
        }
    }

    /// Marks silent participants as left through the regular leave command.
    async fn expire_heartbeats(&mut self) {
        if self.session.is_terminal() {
            return;
        }
        let stale = self
            .session
            .stale_participants(Timestamp::now(), self.config.heartbeat_timeout);

        for user_id in stale {
            tracing::warn!(
                session_id = %self.session.id(),
                user_id = %user_id,
                "Heartbeat timed out, marking participant as left"
            );
            let metadata = CommandMetadata::new().with_source("heartbeat-sweep");
            let command = SessionCommand::Leave { user_id };
            if let Err(e) = self.execute(command, &metadata).await {
                tracing::warn!(
                    session_id = %self.session.id(),
                    error = %e,
                    "Timeout leave failed"
                );
            }
            if self.session.is_terminal() {
                break;
            }
        }
    }
}
