//! Keyword resolver: maps an utterance to a canned reply
//!
//! First-match policy over the knowledge base order. Matching is plain
//! substring containment on the lowercased utterance, so "order" also
//! matches "reorder".

#[cfg(test)]
mod proptests;

use crate::knowledge::KnowledgeBase;

const UTTERANCE_PLACEHOLDER: &str = "{utterance}";
const HINTS_PLACEHOLDER: &str = "{hints}";

/// Reply used when nothing in the knowledge base matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTemplate {
    /// Text with `{utterance}` and `{hints}` placeholders
    pub template: String,
    pub topic_hints: Vec<String>,
}

impl FallbackTemplate {
    pub fn english() -> Self {
        Self {
            template: "Thanks for your message! I understand you're asking about: \"{utterance}\". \
                       Could you provide a bit more detail, or try asking about {hints}?"
                .to_string(),
            topic_hints: ["shipping", "returns", "account", "contact", "orders"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Render the template around the verbatim utterance.
    ///
    /// Hints are substituted first so placeholder-looking text inside the
    /// utterance is never expanded.
    pub fn render(&self, utterance: &str) -> String {
        self.template
            .replace(HINTS_PLACEHOLDER, &join_hints(&self.topic_hints))
            .replace(UTTERANCE_PLACEHOLDER, utterance)
    }
}

/// "a", "a or b", "a, b, or c"
fn join_hints(hints: &[String]) -> String {
    match hints {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

/// Resolve an utterance against the knowledge base.
///
/// Total and deterministic: returns the response of the first entry with
/// any keyword contained in the lowercased utterance, else the rendered
/// fallback echoing the original utterance.
pub fn resolve(utterance: &str, knowledge_base: &KnowledgeBase, fallback: &FallbackTemplate) -> String {
    let normalized = utterance.to_lowercase();

    let matched = knowledge_base
        .entries()
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.keywords.iter().any(|keyword| normalized.contains(keyword.as_str())));

    if let Some((index, entry)) = matched {
        tracing::debug!(entry = index, "Matched knowledge base entry");
        entry.response.clone()
    } else {
        tracing::debug!("No knowledge base match, using fallback");
        fallback.render(utterance)
    }
}
