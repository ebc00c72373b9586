//! Durable storage for the session transcript
//!
//! A small key/value interface. The transcript is stored as a JSON array of
//! messages under a single fixed key.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::session::Message;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value storage for persisted session data
pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    fn save(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// Serialize a transcript; timestamps become RFC 3339 text
pub fn encode_transcript(transcript: &[Message]) -> StoreResult<String> {
    Ok(serde_json::to_string(transcript)?)
}

/// Parse a persisted transcript back into messages
pub fn decode_transcript(json: &str) -> StoreResult<Vec<Message>> {
    Ok(serde_json::from_str(json)?)
}
