use crate::{
    broadcast::{BroadcastDelivery, DispatchOutcome},
    hash::procedure_id_hash,
};
use std::collections::HashMap;
use std::sync::Arc;

pub type BroadcastHandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A broadcast handler. Receives the raw broadcast payload.
pub type BroadcastHandlerFn =
    Arc<dyn Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync>;

/// Routes broadcasts to handlers keyed by hashed topic name.
///
/// At most one handler exists per topic id; subscribing again replaces it.
#[derive(Default)]
pub struct BroadcastRouter {
    handlers: HashMap<u32, BroadcastHandlerFn>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn subscribe<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync + 'static,
    {
        self.subscribe_id(procedure_id_hash(name), Arc::new(handler));
    }

    pub fn subscribe_id(&mut self, topic_id: u32, handler: BroadcastHandlerFn) {
        if self.handlers.insert(topic_id, handler).is_some() {
            tracing::debug!("Replaced broadcast handler for topic {}", topic_id);
        }
    }

    /// Returns `true` if a handler was removed.
    pub fn unsubscribe(&mut self, name: &str) -> bool {
        self.unsubscribe_id(procedure_id_hash(name))
    }

    pub fn unsubscribe_id(&mut self, topic_id: u32) -> bool {
        self.handlers.remove(&topic_id).is_some()
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.handlers.contains_key(&procedure_id_hash(name))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Looks up the handler for `topic_id` without running it.
    ///
    /// The returned delivery owns everything it needs, so it can be run after
    /// whatever lock guards the router has been released.
    pub fn prepare(&self, topic_id: u32, payload: Vec<u8>) -> BroadcastDelivery {
        BroadcastDelivery::new(topic_id, payload, self.handlers.get(&topic_id).cloned())
    }

    /// Runs the handler for `topic_id`, if any. Never fails: unknown topics
    /// are dropped and handler failures are logged.
    pub fn dispatch(&self, topic_id: u32, payload: Vec<u8>) -> DispatchOutcome {
        self.prepare(topic_id, payload).run()
    }
}
