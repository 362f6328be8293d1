//! Session lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of a workout session.
///
/// ```text
/// waiting ──► active ──► completed
///    │          │
///    └──────────┴──────► abandoned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, waiting for the owner to start.
    Waiting,
    /// Workout in progress.
    Active,
    /// Finished normally. Terminal.
    Completed,
    /// Ended early. Terminal.
    Abandoned,
}

impl SessionState {
    /// Returns true if the session still accepts mutating commands.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Waiting => "waiting",
            SessionState::Active => "active",
            SessionState::Completed => "completed",
            SessionState::Abandoned => "abandoned",
        }
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Waiting, Active) | (Waiting, Abandoned) | (Active, Completed) | (Active, Abandoned)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Waiting => vec![Active, Abandoned],
            Active => vec![Completed, Abandoned],
            Completed | Abandoned => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
