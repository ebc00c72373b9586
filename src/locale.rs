//! Localized strings supplied to the resolver and the chat session
//!
//! The core never hard-codes user-visible text; it is handed a `Locale`.

use crate::resolver::FallbackTemplate;

/// Strings the presentation layer expects the core to emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// First assistant message of every new or cleared session
    pub greeting: String,
    /// Assistant message appended when an exchange fails
    pub error_message: String,
    /// Reply used when no knowledge base entry matches
    pub fallback: FallbackTemplate,
}

impl Locale {
    pub fn english() -> Self {
        Self {
            greeting: "Hi! I'm the support assistant. Ask me anything about your orders, shipping, or account."
                .to_string(),
            error_message: "Sorry, something went wrong. Please try again.".to_string(),
            fallback: FallbackTemplate::english(),
        }
    }

    /// Persian greeting and error text of the original deployment.
    /// The fallback template stays English there as well.
    pub fn persian() -> Self {
        Self {
            greeting: "سلام! من دستیار پشتیبانی هستم. هر سؤالی درباره سفارش، ارسال یا حساب دارید بپرسید."
                .to_string(),
            error_message: "متأسفم، خطایی رخ داد. لطفاً دوباره تلاش کنید.".to_string(),
            fallback: FallbackTemplate::english(),
        }
    }

    /// Look up a preset by language tag (`en`, `fa`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::english()),
            "fa" | "persian" => Some(Self::persian()),
            _ => None,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}
