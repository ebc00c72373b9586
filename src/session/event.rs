//! Events that drive a chat session

use super::state::Message;

/// Events that trigger state transitions.
///
/// Messages arrive already minted (id and timestamp) so the transition
/// function stays pure.
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted text
    Submit { message: Message },
    /// Responder replied
    ReplyReceived { message: Message },
    /// Exchange failed; `message` carries the localized error text
    ReplyFailed { message: Message },
    /// User cleared the conversation
    Clear { greeting: Message },
}
