use crate::conversation::ConversationError;
use crate::correlator::ConnectionState;
use crate::envelope::EnvelopeEncodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelatorError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Encode(#[from] EnvelopeEncodeError),

    /// The correlator was closed and has not been reset.
    #[error("client is closed")]
    Closed,

    /// `FirePolicy::RequireHandshake` is in effect and the handshake has not
    /// completed.
    #[error("procedure call attempted before handshake (state: {0:?})")]
    HandshakeRequired(ConnectionState),
}
