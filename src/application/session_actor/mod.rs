//! Session actor layer.
//!
//! One actor per live workout session serializes every command against it,
//! persists the result before anyone sees it, and owns heartbeat timeouts.
//!
//! ```text
//!  HTTP / WebSocket ──▶ SessionActorRegistry ──▶ SessionHandle ──mpsc──▶ SessionActor
//!                                                                           │
//!                                       SessionStore ◀── persist ───────────┤
//!                                 SessionBroadcaster ◀── broadcast ─────────┘
//! ```

mod actor;
mod commands;
mod errors;
mod registry;

pub use actor::{ActorConfig, SessionActor, SessionHandle};
pub use commands::{CommandReply, SessionCommand};
pub use errors::ActorError;
pub use registry::{NewSession, SessionActorRegistry};
