//! Property-based tests for the resolver

use super::*;
use crate::knowledge::KnowledgeEntry;
use proptest::prelude::*;

fn arb_entry() -> impl Strategy<Value = KnowledgeEntry> {
    (
        proptest::collection::vec("[a-z]{1,6}", 0..4),
        "[A-Z][a-z ]{0,20}",
    )
        .prop_map(|(keywords, response)| KnowledgeEntry::new(keywords, response))
}

fn arb_knowledge_base() -> impl Strategy<Value = KnowledgeBase> {
    proptest::collection::vec(arb_entry(), 0..6)
        .prop_map(|entries| KnowledgeBase::new(entries).expect("generated keywords are non-empty"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Same inputs, same reply; never panics on arbitrary text
    #[test]
    fn prop_resolve_is_deterministic(utterance in any::<String>(), kb in arb_knowledge_base()) {
        let fallback = FallbackTemplate::english();
        let first = resolve(&utterance, &kb, &fallback);
        let second = resolve(&utterance, &kb, &fallback);
        prop_assert_eq!(first, second);
    }

    // Casing of the utterance never changes which entry matches
    #[test]
    fn prop_case_insensitive_match(utterance in "[a-zA-Z ]{0,30}", kb in arb_knowledge_base()) {
        let fallback = FallbackTemplate::english();
        let upper = resolve(&utterance.to_uppercase(), &kb, &fallback);
        let lower = resolve(&utterance.to_lowercase(), &kb, &fallback);
        let upper_matched = kb.entries().iter().any(|e| e.response == upper);
        if upper_matched {
            prop_assert_eq!(upper, lower);
        } else {
            prop_assert!(!kb.entries().iter().any(|e| e.response == lower));
        }
    }

    // The reply is the response of the earliest entry containing a keyword
    #[test]
    fn prop_first_match_wins(utterance in "[a-z ]{0,30}", kb in arb_knowledge_base()) {
        let reply = resolve(&utterance, &kb, &FallbackTemplate::english());
        let expected = kb
            .entries()
            .iter()
            .find(|e| e.keywords.iter().any(|k| utterance.contains(k.as_str())))
            .map(|e| e.response.clone());

        match expected {
            Some(response) => prop_assert_eq!(reply, response),
            None => {
                let echoed = format!("\"{utterance}\"");
                prop_assert!(reply.contains(&echoed), "fallback does not echo the utterance");
            }
        }
    }

    // Prepending a matching entry always takes precedence
    #[test]
    fn prop_prepended_entry_takes_precedence(
        keyword in "[a-z]{1,6}",
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
        kb in arb_knowledge_base(),
    ) {
        let mut entries = vec![KnowledgeEntry::new([keyword.clone()], "FIRST")];
        entries.extend(kb.entries().iter().cloned());
        let kb = KnowledgeBase::new(entries).unwrap();

        let utterance = format!("{prefix}{keyword}{suffix}");
        prop_assert_eq!(resolve(&utterance, &kb, &FallbackTemplate::english()), "FIRST");
    }
}
