//! Session configuration value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Smallest allowed participant limit.
pub const MIN_PARTICIPANTS: u32 = 1;

/// Largest allowed participant limit.
pub const MAX_PARTICIPANTS: u32 = 100;

/// Settings fixed when a session is created.
///
/// There is no update command: the configuration lives as long as the
/// session does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfiguration {
    pub is_multiplayer: bool,
    #[serde(default)]
    pub is_public: bool,
    pub max_participants: u32,
    #[serde(default)]
    pub allow_spectators: bool,
    #[serde(default = "default_true")]
    pub enable_chat: bool,
    #[serde(default)]
    pub enable_voice_announcements: bool,
    #[serde(default = "default_true")]
    pub show_other_participants_progress: bool,
    #[serde(default)]
    pub auto_advance_activities: bool,
}

impl SessionConfiguration {
    /// Configuration for a one-person workout.
    pub fn solo() -> Self {
        Self {
            is_multiplayer: false,
            is_public: false,
            max_participants: 1,
            allow_spectators: false,
            enable_chat: false,
            enable_voice_announcements: false,
            show_other_participants_progress: false,
            auto_advance_activities: false,
        }
    }

    /// Configuration for a group workout with the given capacity.
    pub fn multiplayer(max_participants: u32) -> Self {
        Self {
            is_multiplayer: true,
            is_public: false,
            max_participants,
            allow_spectators: false,
            enable_chat: true,
            enable_voice_announcements: false,
            show_other_participants_progress: true,
            auto_advance_activities: false,
        }
    }

    /// Builder: allow spectators to join.
    pub fn with_spectators(mut self) -> Self {
        self.allow_spectators = true;
        self
    }

    /// Builder: toggle chat.
    pub fn with_chat(mut self, enabled: bool) -> Self {
        self.enable_chat = enabled;
        self
    }

    /// Builder: make the session discoverable.
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Checks the participant limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&self.max_participants) {
            return Err(ValidationError::out_of_range(
                "max_participants",
                MIN_PARTICIPANTS as i64,
                MAX_PARTICIPANTS as i64,
                self.max_participants as i64,
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_is_valid() {
        assert!(SessionConfiguration::solo().validate().is_ok());
    }

    #[test]
    fn zero_participants_is_rejected() {
        let err = SessionConfiguration::multiplayer(0).validate().unwrap_err();
        assert_eq!(err.field(), "max_participants");
    }

    #[test]
    fn more_than_hundred_participants_is_rejected() {
        assert!(SessionConfiguration::multiplayer(101).validate().is_err());
        assert!(SessionConfiguration::multiplayer(100).validate().is_ok());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let config: SessionConfiguration =
            serde_json::from_str(r#"{"isMultiplayer": true, "maxParticipants": 4}"#).unwrap();
        assert!(config.is_multiplayer);
        assert_eq!(config.max_participants, 4);
        assert!(config.enable_chat);
        assert!(!config.allow_spectators);
    }
}
