//! Chat session state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Opaque, time-ordered message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// UUIDv7: unique and monotonic within the process
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Where the session is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Ready for user input
    #[default]
    Idle,
    /// One exchange in flight, issued while the transcript had the given generation
    Pending { issued_generation: u64 },
}

/// State owned by a single chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Append-only conversation, never empty
    pub transcript: Vec<Message>,
    pub phase: SessionPhase,
    /// Bumped on every clear; lets late replies be told apart
    pub generation: u64,
}

impl SessionState {
    pub fn new(transcript: Vec<Message>) -> Self {
        Self {
            transcript,
            phase: SessionPhase::Idle,
            generation: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, SessionPhase::Pending { .. })
    }

    /// Snapshot for the presentation layer
    pub fn view(&self) -> SessionView {
        SessionView {
            transcript: self.transcript.clone(),
            is_typing: self.is_pending(),
            is_loading: self.is_pending(),
        }
    }
}

/// What the presentation layer renders.
///
/// `is_loading` disables input, `is_typing` shows the typing indicator.
/// Both follow the pending phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub transcript: Vec<Message>,
    pub is_typing: bool,
    pub is_loading: bool,
}

/// What to do with a reply whose exchange was issued before a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleReplyPolicy {
    /// Append it to the cleared transcript
    #[default]
    Deliver,
    /// Drop it and report a diagnostic
    Discard,
}

impl StaleReplyPolicy {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "deliver" => Some(Self::Deliver),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

/// Storage key of the persisted transcript
pub const DEFAULT_STORAGE_KEY: &str = "chat-messages";

/// Context for a session (immutable configuration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub storage_key: String,
    pub stale_replies: StaleReplyPolicy,
}

impl SessionContext {
    pub fn new(stale_replies: StaleReplyPolicy) -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            stale_replies,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(StaleReplyPolicy::default())
    }
}
