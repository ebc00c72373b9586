//! Knowledge base of canned support replies
//!
//! An ordered list of rules. Order is significant: the resolver returns the
//! first entry with a matching keyword.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge base {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Entry {index} has an empty or whitespace-only keyword")]
    EmptyKeyword { index: usize },
}

/// One rule: trigger keywords and the reply they produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub keywords: Vec<String>,
    pub response: String,
}

impl KnowledgeEntry {
    pub fn new<I, S>(keywords: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            response: response.into(),
        }
    }

    /// Lowercase keywords and drop repeats, keeping first-seen order
    fn normalized(self) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(self.keywords.len());
        for keyword in self.keywords {
            let keyword = keyword.to_lowercase();
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Self {
            keywords,
            response: self.response,
        }
    }
}

/// Immutable, ordered rule table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Build a knowledge base, normalizing every entry.
    ///
    /// Empty and whitespace-only keywords are rejected: substring matching would make
    /// them match every utterance.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, KnowledgeError> {
        let mut normalized = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(KnowledgeError::EmptyKeyword { index });
            }
            let entry = entry.normalized();
            if entry.keywords.is_empty() {
                tracing::warn!(index, "Knowledge base entry has no keywords and can never match");
            }
            normalized.push(entry);
        }
        Ok(Self {
            entries: normalized,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, KnowledgeError> {
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The table shipped with the binary
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                KnowledgeEntry::new(
                    ["shipping", "delivery", "ship", "arrive", "tracking"],
                    "Standard shipping takes 3-5 business days and express shipping takes 1-2 business days. \
                     Once your order ships you will receive a tracking number by email.",
                ),
                KnowledgeEntry::new(
                    ["return", "refund", "exchange"],
                    "You can return any item within 30 days of delivery for a full refund. \
                     Start a return from the Orders page of your account and print the prepaid label.",
                ),
                KnowledgeEntry::new(
                    ["account", "password", "login", "sign in"],
                    "To manage your account, sign in and open Account Settings. \
                     If you forgot your password, use the \"Forgot password\" link on the sign-in page.",
                ),
                KnowledgeEntry::new(
                    ["contact", "phone", "email", "human", "agent"],
                    "You can reach our support team at support@example.com or by phone at \
                     1-800-555-0100, Monday to Friday, 9am to 6pm.",
                ),
                KnowledgeEntry::new(
                    ["order", "purchase", "cancel"],
                    "You can view and manage your orders from the Orders page. \
                     Orders can be cancelled free of charge until they ship.",
                ),
            ],
        }
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
