//! Session actor configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::session_actor::ActorConfig;

/// Tuning for session actors and their broadcast rooms.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorSettings {
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_secs: u64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_persist_max_attempts")]
    pub persist_max_attempts: u32,

    #[serde(default = "default_persist_base_delay")]
    pub persist_base_delay_ms: u64,

    /// Broadcast buffer per room; slower clients must resync.
    #[serde(default = "default_room_capacity")]
    pub room_capacity: usize,
}

impl ActorSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 {
            return Err(ValidationError::MustBePositive("actor.mailbox_capacity"));
        }
        if self.idle_timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("actor.idle_timeout_secs"));
        }
        if self.heartbeat_timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("actor.heartbeat_timeout_secs"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("actor.sweep_interval_secs"));
        }
        if self.sweep_interval_secs > self.heartbeat_timeout_secs {
            return Err(ValidationError::SweepSlowerThanHeartbeat);
        }
        if self.persist_max_attempts == 0 {
            return Err(ValidationError::MustBePositive("actor.persist_max_attempts"));
        }
        if self.room_capacity == 0 {
            return Err(ValidationError::MustBePositive("actor.room_capacity"));
        }
        Ok(())
    }

    pub fn actor_config(&self) -> ActorConfig {
        ActorConfig {
            mailbox_capacity: self.mailbox_capacity,
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            persist_max_attempts: self.persist_max_attempts,
            persist_base_delay: Duration::from_millis(self.persist_base_delay_ms),
        }
    }
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            idle_timeout_secs: default_idle_timeout(),
            heartbeat_timeout_secs: default_heartbeat_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            persist_max_attempts: default_persist_max_attempts(),
            persist_base_delay_ms: default_persist_base_delay(),
            room_capacity: default_room_capacity(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_heartbeat_timeout() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    15
}

fn default_persist_max_attempts() -> u32 {
    3
}

fn default_persist_base_delay() -> u64 {
    100
}

fn default_room_capacity() -> usize {
    128
}
