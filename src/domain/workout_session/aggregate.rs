//! WorkoutSession aggregate.
//!
//! A live workout: its configuration, roster, feed and lifecycle state.
//!
//! Every command validates first and mutates second, so a command that
//! returns an error leaves the aggregate untouched. The aggregate performs no
//! I/O; persisting the result and broadcasting the appended feed items is the
//! caller's job.
//!
//! # Policies
//!
//! - The owner is fixed at creation. When the owner leaves, ownership is not
//!   transferred and the session keeps running; the owner may rejoin.
//! - When the last present non-spectator leaves, the session is abandoned.
//! - `abandon` on an abandoned session is a no-op; on a completed session it
//!   fails with `InvalidTransition`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, StateMachine, Timestamp, UserId};

use super::configuration::SessionConfiguration;
use super::errors::SessionError;
use super::feed::{FeedCursor, FeedItemKind, FeedSince, SessionFeedItem, MAX_CONTENT_LENGTH};
use super::participant::{ParticipantRole, ParticipantStatus, SessionParticipant};
use super::state::SessionState;

/// Maximum length for display names and activity labels.
pub const MAX_NAME_LENGTH: usize = 200;

/// Abandon reason recorded when the roster empties.
pub const REASON_ALL_PARTICIPANTS_LEFT: &str = "all_participants_left";

/// A lifecycle change caused by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
}

/// What a successful command changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    /// Feed items appended by the command, in append order.
    pub appended: Vec<SessionFeedItem>,
    /// Lifecycle transition, if the command caused one.
    pub transition: Option<StateTransition>,
    /// Participants whose entry changed.
    pub updated_participants: Vec<UserId>,
}

impl CommandOutcome {
    /// True if the command changed nothing (idempotent repeat).
    pub fn is_noop(&self) -> bool {
        self.appended.is_empty()
            && self.transition.is_none()
            && self.updated_participants.is_empty()
    }

    fn touched(user_id: &UserId) -> Self {
        Self {
            updated_participants: vec![user_id.clone()],
            ..Self::default()
        }
    }
}

/// Caller-specified shape of a progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressKind {
    /// A whole activity finished.
    Activity {
        #[serde(default)]
        weight: Option<f64>,
        #[serde(default)]
        reps: Option<u32>,
        #[serde(default)]
        duration_seconds: Option<u32>,
    },
    /// One set of an activity finished.
    Set {
        set_number: u32,
        #[serde(default)]
        weight: Option<f64>,
        #[serde(default)]
        reps: Option<u32>,
    },
}

/// Input of `record_progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub activity_label: String,
    #[serde(default)]
    pub completed_delta: u32,
    pub kind: ProgressKind,
}

/// Input of `post_feed_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFeedItem {
    pub content: String,
    pub kind: FeedItemKind,
}

/// Persisted form of the aggregate without its feed.
///
/// The feed lives in a separate append-only log keyed by sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub owner_id: UserId,
    #[serde(default)]
    pub workout_name: Option<String>,
    pub configuration: SessionConfiguration,
    pub state: SessionState,
    pub participants: Vec<SessionParticipant>,
    pub next_sequence: u64,
    pub created_at: Timestamp,
    pub last_activity_at: Timestamp,
    #[serde(default)]
    pub started_at: Option<Timestamp>,
    #[serde(default)]
    pub ended_at: Option<Timestamp>,
    #[serde(default)]
    pub abandon_reason: Option<String>,
}

/// WorkoutSession aggregate root.
///
/// # Invariants
///
/// - `owner_id` names the only participant with role `Owner`
/// - `participants` has at most one entry per user
/// - present participants never exceed `configuration.max_participants`
/// - `feed` is ordered by `sequence`, which strictly increases
/// - no transitions out of `Completed` or `Abandoned`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    id: SessionId,
    owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workout_name: Option<String>,
    configuration: SessionConfiguration,
    state: SessionState,
    participants: Vec<SessionParticipant>,
    feed: Vec<SessionFeedItem>,
    next_sequence: u64,
    created_at: Timestamp,
    last_activity_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ended_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    abandon_reason: Option<String>,
}

impl WorkoutSession {
    /// Create a new session with the owner as its first participant.
    ///
    /// Multiplayer sessions start in `Waiting`; solo sessions start `Active`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the configuration or owner name is invalid
    pub fn create(
        id: SessionId,
        owner_id: UserId,
        owner_name: String,
        configuration: SessionConfiguration,
    ) -> Result<Self, SessionError> {
        configuration.validate()?;
        let owner_name = validate_name("user_name", &owner_name)?;

        let now = Timestamp::now();
        let initial_state = if configuration.is_multiplayer {
            SessionState::Waiting
        } else {
            SessionState::Active
        };

        let mut session = Self {
            id,
            owner_id: owner_id.clone(),
            workout_name: None,
            configuration,
            state: initial_state,
            participants: Vec::new(),
            feed: Vec::new(),
            next_sequence: 1,
            created_at: now,
            last_activity_at: now,
            started_at: (initial_state == SessionState::Active).then_some(now),
            ended_at: None,
            abandon_reason: None,
        };

        session.participants.push(SessionParticipant::new(
            owner_id.clone(),
            owner_name.clone(),
            None,
            ParticipantRole::Owner,
            now,
        ));
        session.append(
            owner_id,
            owner_name.clone(),
            format!("{} started the workout", owner_name),
            FeedItemKind::UserJoined {
                role: ParticipantRole::Owner,
            },
            now,
        );

        Ok(session)
    }

    /// Builder: attach a display name for the workout.
    pub fn with_workout_name(mut self, name: impl Into<String>) -> Self {
        self.workout_name = Some(name.into());
        self
    }

    /// Rebuild a session from its persisted record and feed log.
    ///
    /// The record is the commit point: log items at or beyond its
    /// `next_sequence` belong to a write whose snapshot never landed and are
    /// dropped. The rest is sorted by sequence.
    pub fn reconstitute(record: SessionRecord, mut feed: Vec<SessionFeedItem>) -> Self {
        feed.retain(|item| item.sequence() < record.next_sequence);
        feed.sort_by_key(|item| item.sequence());
        feed.dedup_by_key(|item| item.sequence());

        Self {
            id: record.id,
            owner_id: record.owner_id,
            workout_name: record.workout_name,
            configuration: record.configuration,
            state: record.state,
            participants: record.participants,
            feed,
            next_sequence: record.next_sequence,
            created_at: record.created_at,
            last_activity_at: record.last_activity_at,
            started_at: record.started_at,
            ended_at: record.ended_at,
            abandon_reason: record.abandon_reason,
        }
    }

    /// Persisted form without the feed.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            owner_id: self.owner_id.clone(),
            workout_name: self.workout_name.clone(),
            configuration: self.configuration.clone(),
            state: self.state,
            participants: self.participants.clone(),
            next_sequence: self.next_sequence,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            started_at: self.started_at,
            ended_at: self.ended_at,
            abandon_reason: self.abandon_reason.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn workout_name(&self) -> Option<&str> {
        self.workout_name.as_deref()
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.configuration
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn participants(&self) -> &[SessionParticipant] {
        &self.participants
    }

    pub fn feed(&self) -> &[SessionFeedItem] {
        &self.feed
    }

    /// Sequence number of the most recent feed item (0 when empty).
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn last_activity_at(&self) -> &Timestamp {
        &self.last_activity_at
    }

    pub fn started_at(&self) -> Option<&Timestamp> {
        self.started_at.as_ref()
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    pub fn abandon_reason(&self) -> Option<&str> {
        self.abandon_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Looks up a roster entry, including participants who left.
    pub fn participant(&self, user_id: &UserId) -> Option<&SessionParticipant> {
        self.participants.iter().find(|p| p.user_id() == user_id)
    }

    /// The owner's roster entry.
    pub fn owner(&self) -> Option<&SessionParticipant> {
        self.participant(&self.owner_id)
    }

    /// Participants whose status is `Active`.
    pub fn active_participants(&self) -> Vec<&SessionParticipant> {
        self.participants
            .iter()
            .filter(|p| p.status() == ParticipantStatus::Active)
            .collect()
    }

    /// Number of participants currently occupying a slot (status is not `Left`).
    pub fn participant_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_present()).count()
    }

    pub fn is_full(&self) -> bool {
        self.participant_count() >= self.configuration.max_participants as usize
    }

    /// Feed items appended after `cursor`, oldest first.
    pub fn feed_since(&self, cursor: FeedCursor) -> FeedSince<'_> {
        FeedSince::new(&self.feed, cursor)
    }

    /// Present participants not seen within `timeout` of `now`.
    pub fn stale_participants(&self, now: Timestamp, timeout: Duration) -> Vec<UserId> {
        let cutoff = now.minus(timeout);
        self.participants
            .iter()
            .filter(|p| p.is_present() && p.last_seen_at().is_before(&cutoff))
            .map(|p| p.user_id().clone())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Owner signals the start of a waiting session.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the session is `Waiting`
    /// - `Validation` if the requester is not the owner
    /// - `ParticipantNotFound` if the owner is not present
    pub fn start(&mut self, requested_by: &UserId) -> Result<CommandOutcome, SessionError> {
        self.ensure_transition(SessionState::Active)?;
        if requested_by != &self.owner_id {
            return Err(SessionError::validation(
                "user_id",
                "Only the session owner can start the workout",
            ));
        }
        self.present_index(requested_by)?;

        let now = Timestamp::now();
        let transition = self.transition(SessionState::Active, now)?;
        Ok(CommandOutcome {
            transition: Some(transition),
            ..CommandOutcome::default()
        })
    }

    /// Add a user to the roster, or bring back a user who left.
    ///
    /// A returning user keeps the role they had; `role` only applies to new
    /// entries.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `AlreadyJoined` if the user is present
    /// - `Validation` for an invalid name, an `Owner` role request, a solo
    ///   session, or a disallowed spectator
    /// - `CapacityExceeded` if the session is full
    pub fn join(
        &mut self,
        user_id: UserId,
        user_name: String,
        avatar: Option<String>,
        role: ParticipantRole,
    ) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;
        let user_name = validate_name("user_name", &user_name)?;

        let existing = self.participants.iter().position(|p| p.user_id() == &user_id);
        if let Some(idx) = existing {
            if self.participants[idx].is_present() {
                return Err(SessionError::AlreadyJoined(user_id));
            }
        } else {
            if role == ParticipantRole::Owner {
                return Err(SessionError::validation(
                    "role",
                    "The owner is fixed when the session is created",
                ));
            }
            if !self.configuration.is_multiplayer {
                return Err(SessionError::validation(
                    "session",
                    "Solo sessions cannot be joined",
                ));
            }
            if role == ParticipantRole::Spectator && !self.configuration.allow_spectators {
                return Err(SessionError::validation(
                    "role",
                    "This session does not allow spectators",
                ));
            }
        }
        if self.is_full() {
            return Err(SessionError::CapacityExceeded {
                max: self.configuration.max_participants,
            });
        }

        let now = Timestamp::now();
        let role = match existing {
            Some(idx) => {
                let participant = &mut self.participants[idx];
                participant.rejoin(user_name.clone(), avatar, now);
                participant.role()
            }
            None => {
                self.participants.push(SessionParticipant::new(
                    user_id.clone(),
                    user_name.clone(),
                    avatar,
                    role,
                    now,
                ));
                role
            }
        };

        let item = self.append(
            user_id.clone(),
            user_name.clone(),
            format!("{} joined the workout", user_name),
            FeedItemKind::UserJoined { role },
            now,
        );
        Ok(CommandOutcome {
            appended: vec![item],
            transition: None,
            updated_participants: vec![user_id],
        })
    }

    /// Mark a participant as left.
    ///
    /// Abandons the session when no present non-spectator remains.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `ParticipantNotFound` if the user is absent or already left
    pub fn leave(&mut self, user_id: &UserId) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;
        let idx = self.present_index(user_id)?;

        let now = Timestamp::now();
        let participant = &mut self.participants[idx];
        participant.mark_left(now);
        let user_name = participant.user_name().to_string();

        let item = self.append(
            user_id.clone(),
            user_name.clone(),
            format!("{} left the workout", user_name),
            FeedItemKind::UserLeft,
            now,
        );

        let mut outcome = CommandOutcome {
            appended: vec![item],
            transition: None,
            updated_participants: vec![user_id.clone()],
        };

        let anyone_working_out = self
            .participants
            .iter()
            .any(|p| p.is_present() && p.role() != ParticipantRole::Spectator);
        if !anyone_working_out {
            self.abandon_reason = Some(REASON_ALL_PARTICIPANTS_LEFT.to_string());
            outcome.transition = Some(self.transition(SessionState::Abandoned, now)?);
        }

        Ok(outcome)
    }

    /// Record that a participant finished an activity or a set.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `ParticipantNotFound` if the user is absent or left
    /// - `Validation` for spectators, a blank label or a negative weight
    pub fn record_progress(
        &mut self,
        user_id: &UserId,
        update: ProgressUpdate,
    ) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;
        let idx = self.present_index(user_id)?;
        if !self.participants[idx].role().can_record_progress() {
            return Err(SessionError::validation(
                "role",
                "Spectators cannot record progress",
            ));
        }
        let activity = validate_name("activity_label", &update.activity_label)?;
        let (weight, reps) = match &update.kind {
            ProgressKind::Activity { weight, reps, .. } => (*weight, *reps),
            ProgressKind::Set { weight, reps, .. } => (*weight, *reps),
        };
        if let Some(weight) = weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SessionError::validation(
                    "weight",
                    "Weight must be a non-negative number",
                ));
            }
        }

        let now = Timestamp::now();
        let participant = &mut self.participants[idx];
        participant.record_progress(activity.clone(), update.completed_delta, now);
        let user_name = participant.user_name().to_string();

        let (content, kind) = match update.kind {
            ProgressKind::Activity {
                duration_seconds, ..
            } => (
                format!("{} completed {}", user_name, activity),
                FeedItemKind::ActivityCompleted {
                    activity,
                    weight,
                    reps,
                    duration_seconds,
                },
            ),
            ProgressKind::Set { set_number, .. } => (
                format!("{} completed set {} of {}", user_name, set_number, activity),
                FeedItemKind::SetCompleted {
                    activity,
                    set_number,
                    weight,
                    reps,
                },
            ),
        };

        let item = self.append(user_id.clone(), user_name, content, kind, now);
        Ok(CommandOutcome {
            appended: vec![item],
            transition: None,
            updated_participants: vec![user_id.clone()],
        })
    }

    /// Switch a present participant between active, paused and completed.
    ///
    /// Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `ParticipantNotFound` if the user is absent or left
    /// - `Validation` when asked to set `Left` (use `leave`)
    pub fn update_participant_status(
        &mut self,
        user_id: &UserId,
        status: ParticipantStatus,
    ) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;
        let idx = self.present_index(user_id)?;
        if status == ParticipantStatus::Left {
            return Err(SessionError::validation(
                "status",
                "Use the leave command to leave a session",
            ));
        }

        let participant = &mut self.participants[idx];
        if participant.status() == status {
            return Ok(CommandOutcome::default());
        }
        participant.status().transition_to(status)?;

        let now = Timestamp::now();
        participant.set_status(status, now);
        self.last_activity_at = now;
        Ok(CommandOutcome::touched(user_id))
    }

    /// Append a chat message, encouragement or milestone.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `Validation` for a non-postable type, disabled chat, blank or
    ///   over-long content, or a spectator milestone
    /// - `ParticipantNotFound` if the poster (or encouragement target) is not
    ///   in the session
    pub fn post_feed_item(
        &mut self,
        user_id: &UserId,
        post: PostFeedItem,
    ) -> Result<CommandOutcome, SessionError> {
        self.ensure_open()?;

        let item_type = post.kind.item_type();
        if !item_type.is_postable() {
            return Err(SessionError::validation(
                "type",
                format!("Feed items of type '{}' cannot be posted", item_type),
            ));
        }
        if matches!(post.kind, FeedItemKind::ChatMessage) && !self.configuration.enable_chat {
            return Err(SessionError::validation(
                "type",
                "Chat is disabled for this session",
            ));
        }
        let content = post.content.trim();
        if content.is_empty() {
            return Err(SessionError::validation("content", "Content cannot be empty"));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(SessionError::validation(
                "content",
                format!(
                    "Content must be {} characters or less",
                    MAX_CONTENT_LENGTH
                ),
            ));
        }

        let idx = self.present_index(user_id)?;
        match &post.kind {
            FeedItemKind::MilestoneAchieved { milestone_id } => {
                if !self.participants[idx].role().can_record_progress() {
                    return Err(SessionError::validation(
                        "role",
                        "Spectators cannot achieve milestones",
                    ));
                }
                if milestone_id.trim().is_empty() {
                    return Err(SessionError::validation(
                        "milestone_id",
                        "Milestone id cannot be empty",
                    ));
                }
            }
            FeedItemKind::Encouragement {
                target_user_id: Some(target),
            } => {
                if self.participant(target).is_none() {
                    return Err(SessionError::ParticipantNotFound(target.clone()));
                }
            }
            _ => {}
        }

        let now = Timestamp::now();
        let participant = &mut self.participants[idx];
        participant.touch(now);
        let user_name = participant.user_name().to_string();

        let item = self.append(
            user_id.clone(),
            user_name,
            content.to_string(),
            post.kind,
            now,
        );
        Ok(CommandOutcome {
            appended: vec![item],
            ..CommandOutcome::default()
        })
    }

    /// Finish an active session.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the session is `Active`
    pub fn complete(&mut self) -> Result<CommandOutcome, SessionError> {
        let transition = self.transition(SessionState::Completed, Timestamp::now())?;
        Ok(CommandOutcome {
            transition: Some(transition),
            ..CommandOutcome::default()
        })
    }

    /// End the session early.
    ///
    /// Idempotent on an abandoned session.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the session is `Completed`
    pub fn abandon(&mut self, reason: Option<String>) -> Result<CommandOutcome, SessionError> {
        if self.state == SessionState::Abandoned {
            return Ok(CommandOutcome::default());
        }
        self.ensure_transition(SessionState::Abandoned)?;

        let transition = self.transition(SessionState::Abandoned, Timestamp::now())?;
        self.abandon_reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        Ok(CommandOutcome {
            transition: Some(transition),
            ..CommandOutcome::default()
        })
    }

    /// Refresh a participant's liveness.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is terminal
    /// - `ParticipantNotFound` if the user is absent or left
    pub fn touch(&mut self, user_id: &UserId, at: Timestamp) -> Result<(), SessionError> {
        self.ensure_open()?;
        let idx = self.present_index(user_id)?;
        self.participants[idx].touch(at);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(SessionError::SessionClosed(self.state))
        }
    }

    fn ensure_transition(&self, target: SessionState) -> Result<(), SessionError> {
        if self.state.can_transition_to(&target) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                to: target,
            })
        }
    }

    fn transition(
        &mut self,
        target: SessionState,
        now: Timestamp,
    ) -> Result<StateTransition, SessionError> {
        self.ensure_transition(target)?;
        let from = self.state;
        self.state = target;
        match target {
            SessionState::Active => self.started_at = Some(now),
            SessionState::Completed | SessionState::Abandoned => self.ended_at = Some(now),
            SessionState::Waiting => {}
        }
        self.last_activity_at = now;
        Ok(StateTransition { from, to: target })
    }

    fn present_index(&self, user_id: &UserId) -> Result<usize, SessionError> {
        self.participants
            .iter()
            .position(|p| p.user_id() == user_id && p.is_present())
            .ok_or_else(|| SessionError::ParticipantNotFound(user_id.clone()))
    }

    fn append(
        &mut self,
        user_id: UserId,
        user_name: String,
        content: String,
        kind: FeedItemKind,
        now: Timestamp,
    ) -> SessionFeedItem {
        let item = SessionFeedItem::new(self.next_sequence, user_id, user_name, content, kind, now);
        self.next_sequence += 1;
        self.last_activity_at = now;
        self.feed.push(item.clone());
        item
    }
}

fn validate_name(field: &str, value: &str) -> Result<String, SessionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::validation(field, "Cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(SessionError::validation(
            field,
            format!("Must be {} characters or less", MAX_NAME_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}
