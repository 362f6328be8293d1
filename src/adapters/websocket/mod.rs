//! WebSocket adapters for live workout sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         SessionActor                                 │
//! │   persists a command's result, then broadcasts SessionUpdates       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ SessionBroadcaster
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomManager                                     │
//! │   Room: session-123    Room: session-456    Room: session-789       │
//! │   ├── client-a         ├── client-d         ├── client-g            │
//! │   └── client-b         └── client-e         └── client-h            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`rooms`] - Per-session rooms; implements `SessionBroadcaster`
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod rooms;

pub use handler::{ws_handler, WebSocketState};
pub use messages::{ClientMessage, ServerMessage};
pub use rooms::{ClientId, RoomManager};
