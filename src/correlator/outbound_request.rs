use crate::conversation::PendingReply;

/// A request that has been framed and, where a reply is expected, registered.
///
/// The bytes still have to be handed to the transport. If that fails, the
/// caller cancels `id` so the conversation does not linger.
#[derive(Debug)]
pub struct OutboundRequest {
    pub id: u32,
    pub bytes: Vec<u8>,
    /// `None` for requests that open no conversation (`Disconnect`).
    pub reply: Option<PendingReply>,
}
