//! Workout session domain module.
//!
//! A workout session is a live, optionally multiplayer workout. The
//! `WorkoutSession` aggregate owns the roster, the activity feed and the
//! lifecycle state; all business rules live here and perform no I/O.
//!
//! # Lifecycle
//!
//! ```text
//! waiting ──start──▶ active ──complete──▶ completed
//!    │                  │
//!    └────abandon───────┴──abandon──▶ abandoned
//! ```

mod aggregate;
mod configuration;
mod errors;
mod feed;
mod participant;
mod state;

pub use aggregate::{
    CommandOutcome, PostFeedItem, ProgressKind, ProgressUpdate, SessionRecord, StateTransition,
    WorkoutSession, MAX_NAME_LENGTH, REASON_ALL_PARTICIPANTS_LEFT,
};
pub use configuration::{SessionConfiguration, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
pub use errors::SessionError;
pub use feed::{
    FeedCursor, FeedItemKind, FeedItemType, FeedSince, SessionFeedItem, MAX_CONTENT_LENGTH,
};
pub use participant::{ParticipantRole, ParticipantStatus, SessionParticipant};
pub use state::SessionState;
