//! Transport error types

use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn client_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ClientRequest, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Status, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }
}

/// Error classification, kept for logs; the session treats all kinds alike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Responder rejected the payload (400)
    ClientRequest,
    /// Connection failure or timeout
    Network,
    /// Any other non-success status
    Status,
    /// Response body was not `{ "response": text }`
    Decode,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientRequest => "client_request",
            Self::Network => "network",
            Self::Status => "status",
            Self::Decode => "decode",
        }
    }
}
