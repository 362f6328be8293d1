//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Snapshot + feed log persistence for workout sessions
//! - `SessionBroadcaster` - Realtime fan-out of session updates

mod session_broadcaster;
mod session_store;

pub use session_broadcaster::{SessionBroadcaster, SessionUpdate};
pub use session_store::{SessionStore, StoreError};
