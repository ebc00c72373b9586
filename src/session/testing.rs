//! Mock implementations for testing
//!
//! These mocks let the session run without network or disk I/O.

use super::Message;
use crate::store::{SessionStore, StoreError, StoreResult};
use crate::transport::{TransportClient, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued replies
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    /// When set, each send waits for a notification before replying
    gate: Mutex<Option<Arc<Notify>>>,
    /// Record of all transcripts sent
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Park every send until the returned handle is notified
    pub fn hold_replies(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    async fn send(&self, transcript: &[Message]) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(transcript.to_vec());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock reply queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory key/value store with switchable failures
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated storage outage".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Self::check(&self.fail_reads)?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        Self::check(&self.fail_writes)?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new();
        mock.queue_reply("Hello");

        let reply = mock.send(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "Hello");

        // Second call should fail (no more replies)
        assert!(mock.send(&[Message::user("again")]).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[test]
    fn test_memory_store_failures() {
        let store = MemoryStore::new();
        store.save("k", "v").unwrap();

        store.fail_reads(true);
        assert!(store.load("k").is_err());
        store.fail_reads(false);
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));

        store.fail_writes(true);
        assert!(store.save("k", "w").is_err());
        assert!(store.remove("k").is_err());
    }
}
