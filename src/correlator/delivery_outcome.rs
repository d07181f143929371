use crate::broadcast::BroadcastDelivery;

/// What `RpcCorrelator::deliver` did with an inbound envelope.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// A conversation was resolved and removed.
    Resolved { conversation_id: u32 },

    /// The reply matched no open conversation, or its caller had already
    /// stopped waiting. Logged; not an error.
    UnknownConversation { conversation_id: u32 },

    /// An informational status reply. Nothing was resolved.
    Status { in_reply_to: u32, value: i32 },

    /// A broadcast matched against its handler. Run it once any lock around
    /// the correlator has been released.
    Broadcast(BroadcastDelivery),
}
