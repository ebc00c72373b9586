//! Pure state transition function
//!
//! Given the same state, context and event it always produces the same new
//! state and effects, with no I/O.

use super::effect::{Diagnostic, Effect};
use super::event::Event;
use super::state::{Message, SessionContext, SessionPhase, SessionState, StaleReplyPolicy};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still pending, cannot accept message")]
    Busy,
    #[error("Message is blank")]
    BlankMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // Idle + Submit -> Pending
        (SessionPhase::Idle, Event::Submit { message }) => {
            if message.content.trim().is_empty() {
                return Err(TransitionError::BlankMessage);
            }
            let new_state = SessionState {
                transcript: appended(&state.transcript, message),
                phase: SessionPhase::Pending {
                    issued_generation: state.generation,
                },
                generation: state.generation,
            };
            let request = Effect::request_reply(&new_state.transcript);
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PersistTranscript)
                .with_effect(Effect::Publish)
                .with_effect(request))
        }

        // Pending + Submit -> reject, at most one exchange in flight
        (SessionPhase::Pending { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        // Pending + reply from before a clear, discard policy -> Idle, reply dropped
        (
            SessionPhase::Pending { issued_generation },
            Event::ReplyReceived { .. } | Event::ReplyFailed { .. },
        ) if issued_generation != state.generation && context.stale_replies == StaleReplyPolicy::Discard => {
            let new_state = SessionState {
                transcript: state.transcript.clone(),
                phase: SessionPhase::Idle,
                generation: state.generation,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Publish)
                .with_effect(Effect::Report(Diagnostic::StaleReplyDiscarded { issued_generation })))
        }

        // Pending + reply (success or localized error) -> Idle
        (
            SessionPhase::Pending { .. },
            Event::ReplyReceived { message } | Event::ReplyFailed { message },
        ) => {
            let new_state = SessionState {
                transcript: appended(&state.transcript, message),
                phase: SessionPhase::Idle,
                generation: state.generation,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PersistTranscript)
                .with_effect(Effect::Publish))
        }

        // Any phase + Clear -> same phase, fresh greeting.
        // An in-flight exchange keeps running; its reply is handled by the policy above.
        (phase, Event::Clear { greeting }) => {
            let new_state = SessionState {
                transcript: vec![greeting],
                phase,
                generation: state.generation + 1,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearStorage)
                .with_effect(Effect::Publish))
        }

        (phase, event @ (Event::ReplyReceived { .. } | Event::ReplyFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "No transition from {phase:?} with event {event:?}"
            )))
        }
    }
}

fn appended(transcript: &[Message], message: Message) -> Vec<Message> {
    let mut transcript = transcript.to_vec();
    transcript.push(message);
    transcript
}
