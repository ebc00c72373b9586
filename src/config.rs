//! Environment-driven configuration for both binary modes

use crate::api::DEFAULT_REPLY_DELAY;
use crate::locale::Locale;
use crate::session::StaleReplyPolicy;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for `support-chat serve`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON rule table; the built-in table is used when unset
    pub knowledge_base_path: Option<PathBuf>,
    pub reply_delay: Duration,
    pub locale: Locale,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or(&lookup, "SUPPORT_CHAT_PORT", DEFAULT_PORT);
        let reply_delay = lookup("SUPPORT_CHAT_REPLY_DELAY_MS")
            .map_or(DEFAULT_REPLY_DELAY, |ms| {
                ms.trim().parse().map(Duration::from_millis).unwrap_or_else(|_| {
                    tracing::warn!(value = %ms, "Invalid SUPPORT_CHAT_REPLY_DELAY_MS, using default");
                    DEFAULT_REPLY_DELAY
                })
            });

        Self {
            port,
            knowledge_base_path: lookup("SUPPORT_CHAT_KNOWLEDGE_BASE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            reply_delay,
            locale: locale(&lookup),
        }
    }
}

/// Settings for `support-chat chat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin; `/api/chat` is appended
    pub base_url: String,
    pub db_path: PathBuf,
    pub timeout: Duration,
    pub locale: Locale,
    pub stale_replies: StaleReplyPolicy,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("SUPPORT_CHAT_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.support-chat/session.db"))
            },
            PathBuf::from,
        );

        let stale_replies = lookup("SUPPORT_CHAT_STALE_REPLIES").map_or_else(StaleReplyPolicy::default, |tag| {
            StaleReplyPolicy::from_tag(&tag).unwrap_or_else(|| {
                tracing::warn!(value = %tag, "Unknown SUPPORT_CHAT_STALE_REPLIES, delivering late replies");
                StaleReplyPolicy::default()
            })
        });

        Self {
            base_url: lookup("SUPPORT_CHAT_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
            db_path,
            timeout: Duration::from_secs(parse_or(&lookup, "SUPPORT_CHAT_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())),
            locale: locale(&lookup),
            stale_replies,
        }
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "Invalid setting, using default");
            default
        }),
        None => default,
    }
}

fn locale(lookup: &impl Fn(&str) -> Option<String>) -> Locale {
    match lookup("SUPPORT_CHAT_LOCALE") {
        Some(tag) => Locale::from_tag(&tag).unwrap_or_else(|| {
            tracing::warn!(tag = %tag, "Unknown locale, using English");
            Locale::english()
        }),
        None => Locale::default(),
    }
}
