use crate::{
    constants::{CONVERSATION_PRUNE_THRESHOLD, REQUEST_ID_SEED_MAX, REQUEST_ID_SEED_MIN},
    conversation::{ConversationError, PendingReply, RawReply},
    utils::now,
};
use futures::channel::oneshot;
use rand::Rng;
use std::collections::HashMap;

/// What an open conversation is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// The version handshake.
    Connect,
    /// A procedure call.
    Fire { procedure_id: u32 },
}

/// One outstanding request and the write half of its result slot.
#[derive(Debug)]
pub struct Conversation {
    pub id: u32,
    pub kind: ConversationKind,
    /// Microseconds since the UNIX epoch.
    pub created_at: u64,
    result_slot: oneshot::Sender<RawReply>,
}

/// Maps conversation ids to pending result slots and hands out fresh ids.
///
/// Every entry is removed in the same step that settles it, so a
/// conversation resolves at most once. The table performs no locking of its
/// own; callers sharing it across threads wrap it (or the correlator owning
/// it) in a mutex.
#[derive(Debug)]
pub struct ConversationTable {
    last_id: u32,
    open: HashMap<u32, Conversation>,
    closed: bool,
    prune_at: usize,
}

impl Default for ConversationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTable {
    /// Creates a table whose id counter starts at a random seed in
    /// `[REQUEST_ID_SEED_MIN, REQUEST_ID_SEED_MAX)`.
    pub fn new() -> Self {
        let seed = rand::rng().random_range(REQUEST_ID_SEED_MIN..REQUEST_ID_SEED_MAX);
        Self::with_seed(seed)
    }

    /// Creates a table with a fixed seed. The first id handed out is
    /// `seed + 1` (wrapping).
    pub fn with_seed(seed: u32) -> Self {
        Self {
            last_id: seed,
            open: HashMap::new(),
            closed: false,
            prune_at: CONVERSATION_PRUNE_THRESHOLD,
        }
    }

    /// Returns the next id not held by an open conversation.
    ///
    /// Ids increase by one and wrap at `2^32`; ids still open after a
    /// wraparound are skipped.
    pub fn new_id(&mut self) -> u32 {
        loop {
            self.last_id = self.last_id.wrapping_add(1);
            if !self.open.contains_key(&self.last_id) {
                return self.last_id;
            }
            tracing::debug!("Skipping conversation id {} still in use", self.last_id);
        }
    }

    /// Opens a conversation under `id` and returns the caller's half of it.
    ///
    /// An id that is already open is an invariant violation. It is logged at
    /// error level and returned as `DuplicateConversation` in every build
    /// profile rather than panicking, so transports can drop the request and
    /// keep serving the rest of the table. Ids from [`new_id`](Self::new_id)
    /// never collide.
    ///
    /// Abandoned entries are swept once the table grows past a threshold that
    /// doubles with the surviving count, so registration stays amortized O(1).
    pub fn register(
        &mut self,
        id: u32,
        kind: ConversationKind,
    ) -> Result<PendingReply, ConversationError> {
        if self.closed {
            return Err(ConversationError::TableClosed);
        }

        if self.open.len() >= self.prune_at {
            self.prune_abandoned();
            self.prune_at = CONVERSATION_PRUNE_THRESHOLD.max(self.open.len() * 2);
        }

        if self.open.contains_key(&id) {
            tracing::error!("Attempted to register duplicate conversation {}", id);
            return Err(ConversationError::DuplicateConversation(id));
        }

        let (tx, rx) = oneshot::channel();
        self.open.insert(
            id,
            Conversation {
                id,
                kind,
                created_at: now(),
                result_slot: tx,
            },
        );

        Ok(PendingReply::new(id, rx))
    }

    /// Removes the conversation and completes it with `reply`.
    ///
    /// Returns `false` when no conversation is open under `id`, or when its
    /// caller already stopped waiting. Both are normal outcomes for late or
    /// duplicate replies.
    pub fn resolve(&mut self, id: u32, reply: RawReply) -> bool {
        let Some(conversation) = self.open.remove(&id) else {
            tracing::warn!("Received reply to nonexistent conversation: {}", id);
            return false;
        };

        match conversation.result_slot.send(reply) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Conversation {} was abandoned by its caller", id);
                false
            }
        }
    }

    /// Removes a single conversation. Its caller observes a cancellation.
    pub fn cancel(&mut self, id: u32) -> bool {
        self.open.remove(&id).is_some()
    }

    /// Cancels every open conversation and refuses new registrations until
    /// [`reset`](Self::reset) is called. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        self.closed = true;

        let cancelled = self.open.len();
        // Dropping each result slot wakes its caller with a cancellation.
        self.open.clear();

        if cancelled > 0 {
            tracing::debug!("Cancelled {} open conversations", cancelled);
        }

        cancelled
    }

    /// Reopens a table closed by `cancel_all`. The id counter keeps running
    /// so ids from before the reset are not immediately reused.
    pub fn reset(&mut self) {
        self.closed = false;
    }

    /// Drops entries whose caller no longer holds the pending reply.
    pub fn prune_abandoned(&mut self) -> usize {
        let before = self.open.len();
        self.open.retain(|_, c| !c.result_slot.is_canceled());
        before - self.open.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn contains(&self, id: u32) -> bool {
        self.open.contains_key(&id)
    }

    /// Whether any open conversation is of `kind`.
    pub fn contains_kind(&self, kind: ConversationKind) -> bool {
        self.open.values().any(|c| c.kind == kind)
    }

    pub fn kind_of(&self, id: u32) -> Option<ConversationKind> {
        self.open.get(&id).map(|c| c.kind)
    }

    pub fn get(&self, id: u32) -> Option<&Conversation> {
        self.open.get(&id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
