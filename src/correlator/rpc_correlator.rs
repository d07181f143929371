use crate::{
    broadcast::{BroadcastHandlerError, BroadcastRouter},
    config::{FirePolicy, RibbonConfig},
    conversation::{ConversationKind, ConversationTable, RawReply},
    correlator::{ConnectionState, CorrelatorError, DeliveryOutcome, OutboundRequest},
    envelope::{
        BinaryEnvelopeCodec, ClientEnvelope, EnvelopeCodec, EnvelopeDecodeError, Reply, Request,
        ServerEnvelope, VersionInfo, checked_payload_len,
    },
    hash::procedure_id_hash,
};

/// Correlates outbound requests with inbound replies for one client.
///
/// The correlator frames `Connect`, `Disconnect` and `Fire` requests, keeps
/// the conversation table and broadcast router, and classifies whatever the
/// transport delivers. It never touches the transport itself: every request
/// comes back as an [`OutboundRequest`] whose bytes the caller emits.
///
/// Nothing here blocks or awaits. Shared between threads it goes behind a
/// mutex; on a single cooperative scheduler it can be used directly.
pub struct RpcCorrelator {
    config: RibbonConfig,
    codec: Box<dyn EnvelopeCodec>,
    conversations: ConversationTable,
    broadcasts: BroadcastRouter,
    state: ConnectionState,
    /// Id of the `Disconnect` in flight and the state it left.
    pending_disconnect: Option<(u32, ConnectionState)>,
    server_versions: Option<VersionInfo>,
}

impl Default for RpcCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcCorrelator {
    pub fn new() -> Self {
        Self::with_config(RibbonConfig::default())
    }

    pub fn with_config(config: RibbonConfig) -> Self {
        Self::with_codec(config, Box::new(BinaryEnvelopeCodec))
    }

    pub fn with_codec(config: RibbonConfig, codec: Box<dyn EnvelopeCodec>) -> Self {
        let conversations = match config.initial_request_id {
            Some(seed) => ConversationTable::with_seed(seed),
            None => ConversationTable::new(),
        };

        Self {
            config,
            codec,
            conversations,
            broadcasts: BroadcastRouter::new(),
            state: ConnectionState::Unconnected,
            pending_disconnect: None,
            server_versions: None,
        }
    }

    pub fn config(&self) -> &RibbonConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Versions reported by the last completed handshake.
    pub fn server_versions(&self) -> Option<VersionInfo> {
        self.server_versions
    }

    pub fn conversations(&self) -> &ConversationTable {
        &self.conversations
    }

    pub fn broadcasts(&self) -> &BroadcastRouter {
        &self.broadcasts
    }

    /// Prepares the version handshake.
    ///
    /// Several handshakes may be open at once; whichever `Versions` reply
    /// arrives first completes the connection.
    pub fn connect(&mut self) -> Result<OutboundRequest, CorrelatorError> {
        self.ensure_open()?;

        let request = self.open_conversation(Request::Connect, ConversationKind::Connect)?;

        self.state = ConnectionState::Connecting;

        tracing::info!("Scheduled 'CONNECT' op with id {}", request.id);
        Ok(request)
    }

    /// Prepares a `Disconnect`. No conversation is opened for it; once the
    /// bytes have been handed to the transport, call
    /// [`finish_disconnect`](Self::finish_disconnect). If they could not be
    /// handed over, [`cancel`](Self::cancel) with the returned id restores
    /// the previous state.
    pub fn disconnect(&mut self) -> Result<OutboundRequest, CorrelatorError> {
        self.ensure_open()?;

        let id = self.conversations.new_id();
        let bytes = self.codec.encode_client(&ClientEnvelope {
            id,
            request: Request::Disconnect,
        });

        self.pending_disconnect = Some((id, self.state));
        self.state = ConnectionState::Disconnecting;

        tracing::info!("Scheduled 'DISCONNECT' op with id {}", id);
        Ok(OutboundRequest {
            id,
            bytes,
            reply: None,
        })
    }

    /// Completes a disconnect: every open conversation is cancelled and the
    /// correlator closes. Returns how many conversations were cancelled.
    pub fn finish_disconnect(&mut self) -> usize {
        self.close()
    }

    /// Prepares a `Fire` for the named procedure.
    pub fn call(
        &mut self,
        procedure_name: &str,
        payload: Vec<u8>,
    ) -> Result<OutboundRequest, CorrelatorError> {
        self.fire(procedure_id_hash(procedure_name), payload)
    }

    /// Prepares a `Fire` for an already hashed procedure id.
    pub fn fire(
        &mut self,
        procedure_id: u32,
        payload: Vec<u8>,
    ) -> Result<OutboundRequest, CorrelatorError> {
        if !self.state.accepts_fire() {
            return Err(CorrelatorError::Closed);
        }

        if self.config.fire_policy == FirePolicy::RequireHandshake
            && self.state != ConnectionState::Connected
        {
            return Err(CorrelatorError::HandshakeRequired(self.state));
        }

        checked_payload_len(payload.len())?;

        let request = self.open_conversation(
            Request::Fire {
                procedure_id,
                payload,
            },
            ConversationKind::Fire { procedure_id },
        )?;

        tracing::info!("Scheduled 'FIRE' op with id {}", request.id);
        Ok(request)
    }

    /// Decodes and classifies inbound bytes.
    ///
    /// Only malformed bytes produce an error. Replies to unknown
    /// conversations and broadcasts nobody listens to are ordinary outcomes.
    pub fn deliver(&mut self, bytes: &[u8]) -> Result<DeliveryOutcome, EnvelopeDecodeError> {
        let envelope = self.codec.decode_server(bytes)?;
        Ok(self.deliver_envelope(envelope))
    }

    pub fn deliver_envelope(&mut self, envelope: ServerEnvelope) -> DeliveryOutcome {
        match envelope {
            ServerEnvelope::Reply { in_reply_to, reply } => {
                tracing::debug!("Processing REPLY with id {}", in_reply_to);
                self.process_reply(in_reply_to, reply)
            }
            ServerEnvelope::Broadcast { topic_id, payload } => {
                tracing::debug!("Processing BROADCAST with id {}", topic_id);
                DeliveryOutcome::Broadcast(self.broadcasts.prepare(topic_id, payload))
            }
        }
    }

    fn process_reply(&mut self, in_reply_to: u32, reply: Reply) -> DeliveryOutcome {
        let raw = match reply {
            Reply::Result {
                procedure_id,
                payload,
            } => RawReply::Result {
                procedure_id,
                payload,
            },
            Reply::Versions(versions) => {
                if self.conversations.kind_of(in_reply_to) == Some(ConversationKind::Connect) {
                    self.server_versions = Some(versions);
                    if self.state == ConnectionState::Connecting {
                        tracing::info!("Connection established: {}", versions);
                        self.state = ConnectionState::Connected;
                    }
                }
                RawReply::Versions(versions)
            }
            Reply::Status { value } => {
                tracing::info!("Received status {} in reply to {}", value, in_reply_to);
                return DeliveryOutcome::Status { in_reply_to, value };
            }
        };

        if self.conversations.resolve(in_reply_to, raw) {
            DeliveryOutcome::Resolved {
                conversation_id: in_reply_to,
            }
        } else {
            DeliveryOutcome::UnknownConversation {
                conversation_id: in_reply_to,
            }
        }
    }

    /// Cancels one conversation, e.g. after a timeout or a failed emit.
    ///
    /// Cancelling the last open handshake while `Connecting` returns to
    /// `Unconnected`. Cancelling a pending `Disconnect` (which owns no
    /// conversation, so `false` is returned) restores the state it left.
    pub fn cancel(&mut self, id: u32) -> bool {
        if let Some((disconnect_id, previous)) = self.pending_disconnect {
            if disconnect_id == id && self.state == ConnectionState::Disconnecting {
                tracing::info!("Aborted 'DISCONNECT' op with id {}", id);
                self.pending_disconnect = None;
                self.state = previous;
                return false;
            }
        }

        let is_handshake = self.conversations.kind_of(id) == Some(ConversationKind::Connect);
        let cancelled = self.conversations.cancel(id);

        if is_handshake
            && self.state == ConnectionState::Connecting
            && !self.conversations.contains_kind(ConversationKind::Connect)
        {
            self.state = ConnectionState::Unconnected;
        }

        cancelled
    }

    pub fn add_broadcast_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync + 'static,
    {
        self.broadcasts.subscribe(name, handler);
    }

    pub fn remove_broadcast_handler(&mut self, name: &str) -> bool {
        self.broadcasts.unsubscribe(name)
    }

    /// Cancels every open conversation and moves to `Closed`. Used on
    /// disconnect and when the transport goes away.
    pub fn close(&mut self) -> usize {
        let cancelled = self.conversations.cancel_all();
        self.pending_disconnect = None;
        self.state = ConnectionState::Closed;
        cancelled
    }

    /// Makes a closed correlator usable again for a new transport session.
    /// Broadcast subscriptions survive.
    pub fn reset(&mut self) {
        self.conversations.reset();
        self.pending_disconnect = None;
        self.server_versions = None;
        self.state = ConnectionState::Unconnected;
    }

    fn ensure_open(&self) -> Result<(), CorrelatorError> {
        match self.state {
            ConnectionState::Closed => Err(CorrelatorError::Closed),
            _ => Ok(()),
        }
    }

    fn open_conversation(
        &mut self,
        request: Request,
        kind: ConversationKind,
    ) -> Result<OutboundRequest, CorrelatorError> {
        let id = self.conversations.new_id();
        let reply = self.conversations.register(id, kind)?;
        let bytes = self.codec.encode_client(&ClientEnvelope { id, request });

        Ok(OutboundRequest {
            id,
            bytes,
            reply: Some(reply),
        })
    }
}
