//! Command infrastructure shared by the actor layer and its adapters.
//!
//! `CommandMetadata` carries correlation context for a single inbound
//! command so that log lines emitted by the HTTP/WebSocket adapter, the
//! session actor and the store can be tied together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata context for a command dispatched to a session actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Links related operations across a single client request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Source of this command ("http", "websocket", "heartbeat-sweep").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates empty command metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the correlation ID only if explicitly set.
    pub fn correlation_id_opt(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the source if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_is_generated_when_missing() {
        let metadata = CommandMetadata::new();
        assert!(metadata.correlation_id_opt().is_none());
        assert_eq!(metadata.correlation_id().len(), 36);
    }

    #[test]
    fn builder_sets_fields() {
        let metadata = CommandMetadata::new()
            .with_correlation_id("req-1")
            .with_source("http");
        assert_eq!(metadata.correlation_id(), "req-1");
        assert_eq!(metadata.source(), Some("http"));
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let json = serde_json::to_string(&CommandMetadata::new()).unwrap();
        assert_eq!(json, "{}");
    }
}
