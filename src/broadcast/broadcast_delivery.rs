use crate::broadcast::BroadcastHandlerFn;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No handler is subscribed to the topic; the broadcast was dropped.
    Unsubscribed,
    /// The handler returned an error or panicked. The failure was logged and
    /// contained.
    HandlerFailed,
}

/// A broadcast matched against its handler, ready to run.
pub struct BroadcastDelivery {
    topic_id: u32,
    payload: Vec<u8>,
    handler: Option<BroadcastHandlerFn>,
}

impl std::fmt::Debug for BroadcastDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastDelivery")
            .field("topic_id", &self.topic_id)
            .field("payload_len", &self.payload.len())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl BroadcastDelivery {
    pub(crate) fn new(topic_id: u32, payload: Vec<u8>, handler: Option<BroadcastHandlerFn>) -> Self {
        Self {
            topic_id,
            payload,
            handler,
        }
    }

    pub fn topic_id(&self) -> u32 {
        self.topic_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Invokes the handler. Errors and panics stop here so that one bad
    /// handler cannot break delivery of the messages behind it.
    pub fn run(self) -> DispatchOutcome {
        let Some(handler) = self.handler else {
            tracing::debug!("Received unhandled broadcast. ID: {}", self.topic_id);
            return DispatchOutcome::Unsubscribed;
        };

        match catch_unwind(AssertUnwindSafe(|| handler(&self.payload))) {
            Ok(Ok(())) => {
                tracing::trace!("Broadcast {} handled", self.topic_id);
                DispatchOutcome::Handled
            }
            Ok(Err(err)) => {
                tracing::error!("Could not handle broadcast {}: {}", self.topic_id, err);
                DispatchOutcome::HandlerFailed
            }
            Err(_) => {
                tracing::error!("Broadcast handler for {} panicked", self.topic_id);
                DispatchOutcome::HandlerFailed
            }
        }
    }
}
