//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::effect::Effect;
use super::event::Event;
use super::state::*;
use super::transition::*;
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,20}",
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|t| Event::Submit {
            message: Message::user(t)
        }),
        "[a-zA-Z ]{1,20}".prop_map(|t| Event::ReplyReceived {
            message: Message::assistant(t)
        }),
        Just(Event::ReplyFailed {
            message: Message::assistant("error")
        }),
        Just(Event::Clear {
            greeting: Message::assistant("greeting")
        }),
    ]
}

fn arb_policy() -> impl Strategy<Value = StaleReplyPolicy> {
    prop_oneof![Just(StaleReplyPolicy::Deliver), Just(StaleReplyPolicy::Discard)]
}

fn initial_state() -> SessionState {
    SessionState::new(vec![Message::assistant("greeting")])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: the transcript is never empty
    #[test]
    fn prop_transcript_never_empty(
        events in proptest::collection::vec(arb_event(), 0..30),
        policy in arb_policy(),
    ) {
        let ctx = SessionContext::new(policy);
        let mut state = initial_state();
        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
                prop_assert!(!state.transcript.is_empty());
            }
        }
    }

    // Invariant 2: a request is only issued from Idle, so at most one is outstanding
    #[test]
    fn prop_single_outstanding_request(
        events in proptest::collection::vec(arb_event(), 0..30),
        policy in arb_policy(),
    ) {
        let ctx = SessionContext::new(policy);
        let mut state = initial_state();
        for event in events {
            let was_pending = state.is_pending();
            if let Ok(result) = transition(&state, &ctx, event) {
                let requests = result
                    .effects
                    .iter()
                    .filter(|e| matches!(e, Effect::RequestReply { .. }))
                    .count();
                prop_assert!(requests <= 1);
                if requests == 1 {
                    prop_assert!(!was_pending);
                    prop_assert!(result.new_state.is_pending());
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 3: without clears, the transcript is append-only
    #[test]
    fn prop_append_only_without_clear(
        events in proptest::collection::vec(arb_event(), 0..30),
        policy in arb_policy(),
    ) {
        let ctx = SessionContext::new(policy);
        let mut state = initial_state();
        for event in events {
            if matches!(event, Event::Clear { .. }) {
                continue;
            }
            if let Ok(result) = transition(&state, &ctx, event) {
                let new = &result.new_state.transcript;
                prop_assert!(new.len() >= state.transcript.len());
                prop_assert_eq!(&new[..state.transcript.len()], &state.transcript[..]);
                state = result.new_state;
            }
        }
    }

    // Invariant 4: every user message is followed by exactly one assistant message
    // before the next user message (strict request order)
    #[test]
    fn prop_user_and_assistant_alternate(
        texts in proptest::collection::vec("[a-z]{1,10}", 1..10),
        fail_mask in proptest::collection::vec(any::<bool>(), 10),
    ) {
        let ctx = SessionContext::default();
        let mut state = initial_state();
        for (i, text) in texts.iter().enumerate() {
            state = transition(&state, &ctx, Event::Submit { message: Message::user(text.clone()) })
                .unwrap()
                .new_state;
            // A second submit while pending is rejected
            let second = transition(&state, &ctx, Event::Submit { message: Message::user("x") });
            prop_assert!(second.is_err());
            let reply = if fail_mask[i] {
                Event::ReplyFailed { message: Message::assistant("error") }
            } else {
                Event::ReplyReceived { message: Message::assistant(format!("re: {text}")) }
            };
            state = transition(&state, &ctx, reply).unwrap().new_state;
        }

        prop_assert_eq!(state.transcript.len(), 1 + 2 * texts.len());
        for (i, pair) in state.transcript[1..].chunks(2).enumerate() {
            prop_assert_eq!(pair[0].role, Role::User);
            prop_assert_eq!(&pair[0].content, &texts[i]);
            prop_assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    // Invariant 5: clear always leaves exactly the greeting and bumps the generation
    #[test]
    fn prop_clear_resets_transcript(
        events in proptest::collection::vec(arb_event(), 0..20),
        policy in arb_policy(),
    ) {
        let ctx = SessionContext::new(policy);
        let mut state = initial_state();
        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
            }
        }
        let greeting = Message::assistant("fresh");
        let result = transition(&state, &ctx, Event::Clear { greeting: greeting.clone() }).unwrap();
        prop_assert_eq!(result.new_state.transcript, vec![greeting]);
        prop_assert_eq!(result.new_state.generation, state.generation + 1);
        prop_assert_eq!(result.new_state.phase, state.phase);
    }
}
