//! API request and response types
//!
//! Shared by the responder and the transport client.

use crate::session::Role;
use serde::{Deserialize, Serialize};

/// One transcript entry on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Request to resolve the last message of a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// Content of the last message; empty when there are no messages
    pub fn utterance(&self) -> &str {
        self.messages.last().map_or("", |m| m.content.as_str())
    }
}

/// Canned reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub entries: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
