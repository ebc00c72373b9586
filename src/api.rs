//! HTTP API for the support responder

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::knowledge::KnowledgeBase;
use crate::resolver::FallbackTemplate;
use std::sync::Arc;
use std::time::Duration;

/// Default artificial "thinking" delay before every reply
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(800);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub knowledge_base: Arc<KnowledgeBase>,
    pub fallback: Arc<FallbackTemplate>,
    pub reply_delay: Duration,
}

impl AppState {
    pub fn new(knowledge_base: KnowledgeBase, fallback: FallbackTemplate, reply_delay: Duration) -> Self {
        Self {
            knowledge_base: Arc::new(knowledge_base),
            fallback: Arc::new(fallback),
            reply_delay,
        }
    }
}
