mod conversation_error;
mod conversation_table;
mod pending_reply;
mod raw_reply;

pub use conversation_error::{ConversationCancelled, ConversationError};
pub use conversation_table::{Conversation, ConversationKind, ConversationTable};
pub use pending_reply::PendingReply;
pub use raw_reply::RawReply;
