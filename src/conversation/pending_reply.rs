use crate::conversation::{ConversationCancelled, RawReply};
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The caller's half of an open conversation.
///
/// Resolves with the reply once `ConversationTable::resolve` is called for
/// the same id, or with `ConversationCancelled` when the conversation is
/// cancelled. Dropping it abandons the conversation; a late reply is then
/// discarded and the table entry is swept by a later registration.
///
/// The future is `Send` and can be awaited on any executor or blocked on from
/// a plain thread.
#[derive(Debug)]
pub struct PendingReply {
    id: u32,
    rx: oneshot::Receiver<RawReply>,
}

impl PendingReply {
    pub(crate) fn new(id: u32, rx: oneshot::Receiver<RawReply>) -> Self {
        Self { id, rx }
    }

    /// Id of the conversation this reply belongs to.
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Future for PendingReply {
    type Output = Result<RawReply, ConversationCancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| ConversationCancelled { id }))
    }
}
