//! Client side of the chat wire contract
//!
//! One request per user turn: the transcript is projected to
//! `{role, content}` pairs and posted to the responder.

mod error;

#[allow(unused_imports)] // Public API re-exports
pub use error::{TransportError, TransportErrorKind};

use crate::api::{ChatRequest, ChatResponse, WireMessage};
use crate::session::Message;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Path of the responder endpoint
pub const CHAT_PATH: &str = "/api/chat";

/// Sends a transcript to the responder and returns its reply
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Perform exactly one round trip
    async fn send(&self, transcript: &[Message]) -> Result<String, TransportError>;

    /// Where requests go
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: TransportClient + ?Sized> TransportClient for Arc<T> {
    async fn send(&self, transcript: &[Message]) -> Result<String, TransportError> {
        (**self).send(transcript).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Project the transcript onto the wire format (ids and timestamps dropped)
pub fn build_request(transcript: &[Message]) -> ChatRequest {
    ChatRequest {
        messages: transcript
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect(),
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    fn classify_status(status: StatusCode, body: &str) -> TransportError {
        // Error bodies are `{ "error": text }`; fall back to the raw body
        let detail = serde_json::from_str::<crate::api::ErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |e| e.error);
        if status == StatusCode::BAD_REQUEST {
            TransportError::client_request(format!("Request rejected: {detail}"))
        } else {
            TransportError::status(format!("HTTP {status}: {detail}"))
        }
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    async fn send(&self, transcript: &[Message]) -> Result<String, TransportError> {
        let request = build_request(transcript);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {e}"))
                } else {
                    TransportError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::decode(format!("Failed to parse response: {e} - body: {body}")))?;

        Ok(parsed.response)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: TransportClient> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: TransportClient> TransportClient for LoggingTransport<T> {
    async fn send(&self, transcript: &[Message]) -> Result<String, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(transcript).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    messages = transcript.len(),
                    reply_len = reply.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
