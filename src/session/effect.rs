//! Effects produced by state transitions

use super::state::Message;
use std::fmt;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Mirror the current transcript to durable storage
    PersistTranscript,

    /// Remove the persisted transcript
    ClearStorage,

    /// Send the transcript to the responder (the only suspending effect)
    RequestReply { transcript: Vec<Message> },

    /// Push a fresh view to the presentation layer
    Publish,

    /// Emit on the diagnostic channel
    Report(Diagnostic),
}

/// Operator-facing signals that never interrupt the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Reading, writing or removing the persisted transcript failed
    StorageFailure {
        operation: StorageOperation,
        message: String,
    },
    /// Persisted transcript could not be decoded; the session started fresh
    TranscriptCorrupted { message: String },
    /// Reply to an exchange issued before a clear was dropped
    StaleReplyDiscarded { issued_generation: u64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::StorageFailure { operation, message } => {
                write!(f, "transcript {operation} failed: {message}")
            }
            Diagnostic::TranscriptCorrupted { message } => {
                write!(f, "saved transcript was unreadable and has been reset: {message}")
            }
            Diagnostic::StaleReplyDiscarded { issued_generation } => {
                write!(f, "discarded a reply to a conversation cleared since (generation {issued_generation})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Load,
    Save,
    Remove,
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageOperation::Load => "load",
            StorageOperation::Save => "save",
            StorageOperation::Remove => "remove",
        })
    }
}

impl Effect {
    pub fn request_reply(transcript: &[Message]) -> Self {
        Effect::RequestReply {
            transcript: transcript.to_vec(),
        }
    }
}
