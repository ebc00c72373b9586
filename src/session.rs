//! Client-side chat session
//!
//! A pure state machine (`transition`) plus `ChatSession`, which executes
//! its effects against a transport and a store. One instance per
//! conversation, passed explicitly to whatever renders it.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use effect::{Diagnostic, Effect, StorageOperation};
pub use event::Event;
pub use state::{Message, MessageId, Role, SessionContext, SessionState, SessionView, StaleReplyPolicy};
pub use transition::{transition, TransitionError};

use crate::locale::Locale;
use crate::store::{decode_transcript, encode_transcript, SessionStore, StoreError};
use crate::transport::TransportClient;
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

/// A single conversation: transcript, pending flags and persistence
pub struct ChatSession<T, S>
where
    T: TransportClient,
    S: SessionStore,
{
    context: SessionContext,
    locale: Locale,
    transport: T,
    store: S,
    /// Never held across an await
    state: Mutex<SessionState>,
    view_tx: watch::Sender<SessionView>,
    diagnostics_tx: broadcast::Sender<Diagnostic>,
}

impl<T, S> ChatSession<T, S>
where
    T: TransportClient,
    S: SessionStore,
{
    /// Start a session from persisted storage, or from a fresh greeting.
    ///
    /// Subscribe to `diagnostics_tx` before calling to observe restore
    /// failures.
    pub fn new(
        context: SessionContext,
        locale: Locale,
        transport: T,
        store: S,
        diagnostics_tx: broadcast::Sender<Diagnostic>,
    ) -> Self {
        let transcript = restore_transcript(&store, &context.storage_key, &locale, &diagnostics_tx);
        let state = SessionState::new(transcript);
        let (view_tx, _) = watch::channel(state.view());

        Self {
            context,
            locale,
            transport,
            store,
            state: Mutex::new(state),
            view_tx,
            diagnostics_tx,
        }
    }

    /// Current snapshot
    pub fn view(&self) -> SessionView {
        self.state.lock().unwrap().view()
    }

    /// Snapshots published after every change
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    /// Submit user text and wait for the exchange to finish.
    ///
    /// Blank text, or a submit while another exchange is pending, is a
    /// no-op reported as an error. Dropping the returned future mid-flight
    /// settles the exchange as failed, so the session never stays pending.
    pub async fn submit(&self, text: &str) -> Result<(), TransitionError> {
        let message = Message::user(text.trim());
        tracing::debug!(id = %message.id, "Submitting message");
        self.process_event(Event::Submit { message }).await
    }

    /// Replace the transcript with a fresh greeting and drop persisted data
    pub fn clear(&self) {
        let event = Event::Clear {
            greeting: Message::assistant(self.locale.greeting.clone()),
        };
        // Clear is accepted in every phase and never suspends
        self.process_sync_event(event);
    }

    async fn process_event(&self, event: Event) -> Result<(), TransitionError> {
        let mut effects = self.apply(event)?;

        // Effects can produce follow-up events (the reply); loop instead of recursing
        while !effects.is_empty() {
            let mut follow_ups = Vec::new();
            let mut exchange = None;
            for effect in effects {
                if let Effect::RequestReply { transcript } = effect {
                    let guard = InFlightExchange::new(self);
                    follow_ups.push(self.request_reply(&transcript).await);
                    exchange = Some(guard);
                } else {
                    self.execute_sync_effect(effect);
                }
            }

            effects = Vec::new();
            for event in follow_ups {
                match self.apply(event) {
                    Ok(more) => effects.extend(more),
                    Err(e) => tracing::error!(error = %e, "Dropped follow-up event"),
                }
            }
            if let Some(guard) = exchange {
                guard.disarm();
            }
        }

        Ok(())
    }

    /// Run the transition under the lock and store the new state
    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let mut state = self.state.lock().unwrap();
        let result = transition(&state, &self.context, event)?;
        *state = result.new_state;
        Ok(result.effects)
    }

    async fn request_reply(&self, transcript: &[Message]) -> Event {
        match self.transport.send(transcript).await {
            Ok(reply) => Event::ReplyReceived {
                message: Message::assistant(reply),
            },
            Err(e) => {
                tracing::warn!(kind = e.kind.as_str(), error = %e, "Exchange failed");
                Event::ReplyFailed {
                    message: Message::assistant(self.locale.error_message.clone()),
                }
            }
        }
    }

    /// Apply an event and run its effects, none of which may suspend
    fn process_sync_event(&self, event: Event) {
        match self.apply(event) {
            Ok(effects) => {
                for effect in effects {
                    self.execute_sync_effect(effect);
                }
            }
            Err(e) => tracing::error!(error = %e, "Event rejected"),
        }
    }

    fn execute_sync_effect(&self, effect: Effect) {
        match effect {
            Effect::PersistTranscript => self.persist(),
            Effect::ClearStorage => {
                if let Err(e) = self.store.remove(&self.context.storage_key) {
                    self.report_storage_failure(StorageOperation::Remove, &e);
                }
            }
            Effect::Publish => {
                self.view_tx.send_replace(self.view());
            }
            Effect::Report(diagnostic) => {
                tracing::warn!(diagnostic = ?diagnostic, "Session diagnostic");
                let _ = self.diagnostics_tx.send(diagnostic);
            }
            Effect::RequestReply { .. } => {
                tracing::error!("RequestReply reached the synchronous effect path");
            }
        }
    }

    /// Best effort: failures are reported, never propagated
    fn persist(&self) {
        let transcript = self.state.lock().unwrap().transcript.clone();
        let result = encode_transcript(&transcript).and_then(|json| self.store.save(&self.context.storage_key, &json));
        if let Err(e) = result {
            self.report_storage_failure(StorageOperation::Save, &e);
        }
    }

    fn report_storage_failure(&self, operation: StorageOperation, error: &StoreError) {
        tracing::warn!(operation = %operation, error = %error, "Transcript storage failed");
        let _ = self.diagnostics_tx.send(Diagnostic::StorageFailure {
            operation,
            message: error.to_string(),
        });
    }
}

/// Settles an exchange whose submitting future was dropped before the reply
/// event was applied
struct InFlightExchange<'a, T, S>
where
    T: TransportClient,
    S: SessionStore,
{
    session: &'a ChatSession<T, S>,
    armed: bool,
}

impl<'a, T, S> InFlightExchange<'a, T, S>
where
    T: TransportClient,
    S: SessionStore,
{
    fn new(session: &'a ChatSession<T, S>) -> Self {
        Self { session, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T, S> Drop for InFlightExchange<'_, T, S>
where
    T: TransportClient,
    S: SessionStore,
{
    fn drop(&mut self) {
        if !self.armed || std::thread::panicking() {
            return;
        }
        tracing::warn!("Exchange abandoned before its reply arrived");
        self.session.process_sync_event(Event::ReplyFailed {
            message: Message::assistant(self.session.locale.error_message.clone()),
        });
    }
}

/// Load the persisted transcript, falling back to a single greeting when
/// it is absent, unreadable, corrupt or empty
fn restore_transcript<S: SessionStore>(
    store: &S,
    key: &str,
    locale: &Locale,
    diagnostics_tx: &broadcast::Sender<Diagnostic>,
) -> Vec<Message> {
    let greeting = || vec![Message::assistant(locale.greeting.clone())];

    let saved = match store.load(key) {
        Ok(Some(saved)) => saved,
        Ok(None) => return greeting(),
        Err(e) => {
            tracing::warn!(operation = "load", error = %e, "Transcript storage failed");
            let _ = diagnostics_tx.send(Diagnostic::StorageFailure {
                operation: StorageOperation::Load,
                message: e.to_string(),
            });
            return greeting();
        }
    };

    match decode_transcript(&saved) {
        Ok(transcript) if !transcript.is_empty() => {
            tracing::debug!(messages = transcript.len(), "Restored transcript");
            transcript
        }
        Ok(_) => greeting(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse saved messages");
            let _ = diagnostics_tx.send(Diagnostic::TranscriptCorrupted { message: e.to_string() });
            greeting()
        }
    }
}
