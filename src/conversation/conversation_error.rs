use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// An id was registered twice. `new_id` never produces this, so seeing it
    /// means the table was driven with hand-picked ids.
    #[error("conversation {0} is already open")]
    DuplicateConversation(u32),

    /// The table was shut down with `cancel_all` and has not been reset.
    #[error("conversation table is closed")]
    TableClosed,
}

/// Observed by a caller whose conversation ended without a reply: it was
/// cancelled explicitly, swept by `cancel_all`, or its table was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("conversation {id} was cancelled")]
pub struct ConversationCancelled {
    pub id: u32,
}
