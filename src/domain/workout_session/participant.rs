//! Session participants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{StateMachine, Timestamp, UserId};

/// What a user is allowed to do in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Owner,
    Participant,
    Spectator,
}

impl ParticipantRole {
    /// Spectators watch; they do not record progress.
    pub fn can_record_progress(&self) -> bool {
        !matches!(self, ParticipantRole::Spectator)
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticipantRole::Owner => "owner",
            ParticipantRole::Participant => "participant",
            ParticipantRole::Spectator => "spectator",
        };
        write!(f, "{}", s)
    }
}

/// Presence/progress status of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Active,
    Paused,
    Completed,
    Left,
}

impl ParticipantStatus {
    /// Everything except `Left` counts toward occupancy.
    pub fn is_present(&self) -> bool {
        !matches!(self, ParticipantStatus::Left)
    }
}

impl StateMachine for ParticipantStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    // Left -> Active is a rejoin.
    fn valid_transitions(&self) -> Vec<Self> {
        use ParticipantStatus::*;
        match self {
            Active => vec![Paused, Completed, Left],
            Paused => vec![Active, Completed, Left],
            Completed => vec![Active, Left],
            Left => vec![Active],
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Paused => "paused",
            ParticipantStatus::Completed => "completed",
            ParticipantStatus::Left => "left",
        };
        write!(f, "{}", s)
    }
}

/// One entry in the session roster. Unique by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParticipant {
    user_id: UserId,
    user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    role: ParticipantRole,
    status: ParticipantStatus,
    joined_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_activity: Option<String>,
    completed_activities: u32,
    last_seen_at: Timestamp,
}

impl SessionParticipant {
    pub(crate) fn new(
        user_id: UserId,
        user_name: String,
        avatar: Option<String>,
        role: ParticipantRole,
        now: Timestamp,
    ) -> Self {
        Self {
            user_id,
            user_name,
            avatar,
            role,
            status: ParticipantStatus::Active,
            joined_at: now,
            left_at: None,
            current_activity: None,
            completed_activities: 0,
            last_seen_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn role(&self) -> ParticipantRole {
        self.role
    }

    pub fn status(&self) -> ParticipantStatus {
        self.status
    }

    pub fn joined_at(&self) -> &Timestamp {
        &self.joined_at
    }

    pub fn left_at(&self) -> Option<&Timestamp> {
        self.left_at.as_ref()
    }

    pub fn current_activity(&self) -> Option<&str> {
        self.current_activity.as_deref()
    }

    pub fn completed_activities(&self) -> u32 {
        self.completed_activities
    }

    pub fn last_seen_at(&self) -> &Timestamp {
        &self.last_seen_at
    }

    pub fn is_owner(&self) -> bool {
        self.role == ParticipantRole::Owner
    }

    pub fn is_present(&self) -> bool {
        self.status.is_present()
    }

    // Mutators are crate-private: only the aggregate changes participants.

    pub(crate) fn mark_left(&mut self, now: Timestamp) {
        self.status = ParticipantStatus::Left;
        self.left_at = Some(now);
        self.last_seen_at = now;
    }

    /// Rejoin keeps the original role, progress and join time.
    pub(crate) fn rejoin(&mut self, user_name: String, avatar: Option<String>, now: Timestamp) {
        self.user_name = user_name;
        if avatar.is_some() {
            self.avatar = avatar;
        }
        self.status = ParticipantStatus::Active;
        self.left_at = None;
        self.last_seen_at = now;
    }

    pub(crate) fn set_status(&mut self, status: ParticipantStatus, now: Timestamp) {
        self.status = status;
        self.last_seen_at = now;
    }

    pub(crate) fn record_progress(&mut self, activity: String, delta: u32, now: Timestamp) {
        self.current_activity = Some(activity);
        self.completed_activities = self.completed_activities.saturating_add(delta);
        self.last_seen_at = now;
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        if now.is_after(&self.last_seen_at) {
            self.last_seen_at = now;
        }
    }
}
