use crate::{ProcedureRegistry, error::RibbonCallerError, with_correlator_trait::WithCorrelator};
use ribbon_bridge::{
    broadcast::BroadcastHandlerError,
    conversation::{PendingReply, RawReply},
    correlator::{ConnectionState, CorrelatorError, DeliveryOutcome, OutboundRequest, RpcCorrelator},
    envelope::VersionInfo,
    hash::procedure_id_hash,
};
use std::io;
use std::sync::Arc;

/// Hands encoded bytes to the transport. Must not block: implementations
/// queue the bytes for the I/O task and return.
pub type EmitFn = Arc<dyn Fn(Vec<u8>) -> io::Result<()> + Send + Sync>;

/// A `Fire` that has been emitted and is waiting for its `Result` reply.
#[derive(Debug)]
pub struct PendingCall {
    procedure_id: u32,
    reply: PendingReply,
}

impl PendingCall {
    pub fn id(&self) -> u32 {
        self.reply.id()
    }

    pub fn procedure_id(&self) -> u32 {
        self.procedure_id
    }

    /// Waits for the reply and returns its payload.
    pub async fn result(self) -> Result<Vec<u8>, RibbonCallerError> {
        let conversation_id = self.reply.id();

        match self.reply.await? {
            RawReply::Result {
                procedure_id,
                payload,
            } => {
                if procedure_id != self.procedure_id {
                    tracing::warn!(
                        "Conversation {} answered for procedure {} but {} was called",
                        conversation_id,
                        procedure_id,
                        self.procedure_id
                    );
                }
                Ok(payload)
            }
            RawReply::Versions(_) => Err(RibbonCallerError::UnexpectedReply {
                conversation_id,
                expected: "result",
            }),
        }
    }
}

/// Classifies one inbound message and settles whatever it answers.
///
/// Broadcast handlers run after the correlator lock is released, so they may
/// call back into the client. Transport receive loops that only hold the
/// lock (not the whole client) call this directly.
pub async fn deliver_inbound<L>(correlator: &L, bytes: &[u8]) -> Result<(), RibbonCallerError>
where
    L: WithCorrelator + ?Sized,
{
    let outcome = correlator.with_correlator(|c| c.deliver(bytes)).await?;

    match outcome {
        DeliveryOutcome::Resolved { conversation_id } => {
            tracing::trace!("Resolved conversation {}", conversation_id);
        }
        DeliveryOutcome::UnknownConversation { conversation_id } => {
            tracing::debug!("Dropped reply for conversation {}", conversation_id);
        }
        DeliveryOutcome::Status { in_reply_to, value } => {
            tracing::debug!("Status {} for conversation {}", value, in_reply_to);
        }
        DeliveryOutcome::Broadcast(delivery) => {
            delivery.run();
        }
    }

    Ok(())
}

/// Defines a generic capability for talking to a ribbon-bridge server.
///
/// Anything that can provide a locked `RpcCorrelator` and an emit function
/// (a WebSocket client, a test loopback, a serial link) implements the two
/// required getters and gains connect, call, deliver and broadcast routing.
#[async_trait::async_trait]
pub trait RibbonCallerInterface: Send + Sync {
    /// The specific Mutex type used to protect the correlator.
    type CorrelatorLock: WithCorrelator;

    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT (e.g., RibbonClient) ---

    fn get_correlator(&self) -> Arc<Self::CorrelatorLock>;

    /// `None` until a transport is attached.
    fn get_emit_fn(&self) -> Option<EmitFn>;

    /// When present, `call` rejects names the registry does not list.
    fn get_procedure_registry(&self) -> Option<Arc<ProcedureRegistry>> {
        None
    }

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    fn emit(&self, bytes: Vec<u8>) -> Result<(), RibbonCallerError> {
        let emit = self
            .get_emit_fn()
            .ok_or(RibbonCallerError::TransportNotConfigured)?;

        emit(bytes).map_err(RibbonCallerError::Io)
    }

    /// Prepares a request under the lock, then emits it with the lock
    /// released. A failed emit cancels the request: its conversation is
    /// removed, and a `Connect` or `Disconnect` puts the state back.
    async fn send_request<F>(
        &self,
        prepare: F,
    ) -> Result<(u32, Option<PendingReply>), RibbonCallerError>
    where
        F: FnOnce(&mut RpcCorrelator) -> Result<OutboundRequest, CorrelatorError> + Send,
    {
        let emit = self
            .get_emit_fn()
            .ok_or(RibbonCallerError::TransportNotConfigured)?;
        let correlator = self.get_correlator();

        let OutboundRequest { id, bytes, reply } = correlator.with_correlator(prepare).await?;

        if let Err(err) = emit(bytes) {
            tracing::error!("Failed to emit request {}: {}", id, err);
            correlator.with_correlator(|c| c.cancel(id)).await;
            return Err(RibbonCallerError::Io(err));
        }

        Ok((id, reply))
    }

    /// Runs the version handshake and returns the server's versions.
    async fn connect(&self) -> Result<VersionInfo, RibbonCallerError> {
        let (id, reply) = self.send_request(|c| c.connect()).await?;

        let Some(reply) = reply else {
            return Err(RibbonCallerError::UnexpectedReply {
                conversation_id: id,
                expected: "versions",
            });
        };

        match reply.await? {
            RawReply::Versions(versions) => Ok(versions),
            RawReply::Result { .. } => Err(RibbonCallerError::UnexpectedReply {
                conversation_id: id,
                expected: "versions",
            }),
        }
    }

    /// Sends `Disconnect`, then cancels everything still pending. Returns the
    /// number of cancelled conversations.
    async fn disconnect(&self) -> Result<usize, RibbonCallerError> {
        self.send_request(|c| c.disconnect()).await?;

        let cancelled = self
            .get_correlator()
            .with_correlator(|c| c.finish_disconnect())
            .await;

        tracing::info!("Disconnected; cancelled {} pending conversations", cancelled);
        Ok(cancelled)
    }

    /// Emits a `Fire` for `procedure_name` without waiting for the reply.
    async fn start_call(
        &self,
        procedure_name: &str,
        payload: Vec<u8>,
    ) -> Result<PendingCall, RibbonCallerError> {
        if let Some(registry) = self.get_procedure_registry() {
            if !registry.contains(procedure_name) {
                return Err(RibbonCallerError::UnknownProcedure(
                    procedure_name.to_string(),
                ));
            }
        }

        self.start_fire(procedure_id_hash(procedure_name), payload)
            .await
    }

    /// Emits a `Fire` for an already hashed procedure id.
    async fn start_fire(
        &self,
        procedure_id: u32,
        payload: Vec<u8>,
    ) -> Result<PendingCall, RibbonCallerError> {
        let (id, reply) = self
            .send_request(move |c| c.fire(procedure_id, payload))
            .await?;

        let Some(reply) = reply else {
            return Err(RibbonCallerError::UnexpectedReply {
                conversation_id: id,
                expected: "result",
            });
        };

        Ok(PendingCall {
            procedure_id,
            reply,
        })
    }

    /// Calls a procedure by name and waits for its result payload.
    async fn call(
        &self,
        procedure_name: &str,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, RibbonCallerError> {
        self.start_call(procedure_name, payload)
            .await?
            .result()
            .await
    }

    async fn fire(&self, procedure_id: u32, payload: Vec<u8>) -> Result<Vec<u8>, RibbonCallerError> {
        self.start_fire(procedure_id, payload).await?.result().await
    }

    /// Feeds one inbound message from the transport.
    async fn deliver(&self, bytes: &[u8]) -> Result<(), RibbonCallerError> {
        deliver_inbound(self.get_correlator().as_ref(), bytes).await
    }

    async fn add_broadcast_handler<F>(&self, name: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync + 'static,
    {
        self.get_correlator()
            .with_correlator(|c| c.add_broadcast_handler(name, handler))
            .await
    }

    async fn remove_broadcast_handler(&self, name: &str) -> bool {
        self.get_correlator()
            .with_correlator(|c| c.remove_broadcast_handler(name))
            .await
    }

    /// Drops pending work with a cancellation error and closes the correlator.
    async fn close(&self) -> usize {
        self.get_correlator().with_correlator(|c| c.close()).await
    }

    /// Drops one pending conversation, e.g. after a caller-side timeout.
    async fn cancel(&self, conversation_id: u32) -> bool {
        self.get_correlator()
            .with_correlator(|c| c.cancel(conversation_id))
            .await
    }

    async fn connection_state(&self) -> ConnectionState {
        self.get_correlator().with_correlator(|c| c.state()).await
    }

    async fn server_versions(&self) -> Option<VersionInfo> {
        self.get_correlator()
            .with_correlator(|c| c.server_versions())
            .await
    }
}
