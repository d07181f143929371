use ribbon_bridge::conversation::ConversationCancelled;
use ribbon_bridge::correlator::CorrelatorError;
use ribbon_bridge::envelope::EnvelopeDecodeError;
use std::io;
use thiserror::Error;

/// Represents errors that can occur during an RPC call from the perspective of the caller.
#[derive(Debug, Error)]
pub enum RibbonCallerError {
    /// The transport refused or failed to accept outbound bytes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No emit function was supplied before the first request.
    #[error("transport is not configured: no emit function")]
    TransportNotConfigured,

    #[error(transparent)]
    Correlator(#[from] CorrelatorError),

    /// Inbound bytes were not a valid server envelope.
    #[error("malformed server envelope: {0}")]
    Decode(#[from] EnvelopeDecodeError),

    /// The conversation ended without a reply (disconnect, shutdown or explicit cancel).
    #[error(transparent)]
    Cancelled(#[from] ConversationCancelled),

    /// The reply variant did not match the request, e.g. `Versions` for a `Fire`.
    #[error("conversation {conversation_id} expected a {expected} reply")]
    UnexpectedReply {
        conversation_id: u32,
        expected: &'static str,
    },

    /// The name is not in the procedure registry attached to the client.
    #[error("{0} is not a procedure of this proxy")]
    UnknownProcedure(String),

    /// Encoding arguments or decoding a result/broadcast payload failed.
    #[error("payload codec error: {0}")]
    Codec(io::Error),

    #[error("conversation {conversation_id} timed out")]
    Timeout { conversation_id: u32 },
}

impl From<RibbonCallerError> for io::Error {
    fn from(err: RibbonCallerError) -> Self {
        match err {
            RibbonCallerError::Io(e) | RibbonCallerError::Codec(e) => e,
            RibbonCallerError::Timeout { .. } => io::Error::new(io::ErrorKind::TimedOut, err),
            RibbonCallerError::TransportNotConfigured => {
                io::Error::new(io::ErrorKind::NotConnected, err)
            }
            RibbonCallerError::Cancelled(_) => io::Error::new(io::ErrorKind::Interrupted, err),
            RibbonCallerError::Decode(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            RibbonCallerError::Correlator(CorrelatorError::Encode(_)) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            _ => io::Error::other(err),
        }
    }
}

/// Raised while building or loading a [`ProcedureRegistry`](crate::ProcedureRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("procedure {0} is listed twice")]
    DuplicateName(String),

    /// Two distinct names hash to the same wire id. The server could not tell
    /// them apart.
    #[error("procedures {first} and {second} share id {id}")]
    IdCollision {
        id: u32,
        first: String,
        second: String,
    },

    #[error("invalid procedure schema document: {0}")]
    Parse(#[from] serde_json::Error),
}
