use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use ribbon_bridge::{RibbonConfig, correlator::RpcCorrelator};
use ribbon_bridge_caller::{
    EmitFn, ProcedureRegistry, RibbonCallerInterface, RibbonTransportState, deliver_inbound,
    error::RibbonCallerError,
};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message as WsMessage},
};

pub type StateChangeHandler = Box<dyn Fn(RibbonTransportState) + Send + Sync>;

/// A ribbon-bridge client speaking over a WebSocket.
///
/// Transport I/O runs on spawned Tokio tasks: one reads frames and delivers
/// them to the correlator, one drains the outbound queue. Calls can be made
/// from any task; emitting only queues bytes for the send task.
pub struct RibbonClient {
    correlator: Arc<Mutex<RpcCorrelator>>,
    tx: mpsc::UnboundedSender<WsMessage>,
    state_change_handler: Arc<StdMutex<Option<StateChangeHandler>>>,
    is_connected: Arc<AtomicBool>,
    procedure_registry: Option<Arc<ProcedureRegistry>>,
    task_handles: Vec<JoinHandle<()>>,
}

impl Drop for RibbonClient {
    fn drop(&mut self) {
        for handle in &self.task_handles {
            handle.abort();
        }

        if let Ok(mut correlator) = self.correlator.try_lock() {
            correlator.close();
        }

        Self::transport_lost(&self.is_connected, &self.state_change_handler);
    }
}

impl RibbonClient {
    /// Opens the WebSocket at `websocket_address` (e.g. `ws://127.0.0.1:8080/ws`).
    ///
    /// The version handshake is not performed here; call `connect` once the
    /// client exists.
    pub async fn new(websocket_address: &str) -> Result<RibbonClient, io::Error> {
        Self::with_config(websocket_address, RibbonConfig::default()).await
    }

    pub async fn with_config(
        websocket_address: &str,
        config: RibbonConfig,
    ) -> Result<RibbonClient, io::Error> {
        let (ws_stream, _) = connect_async(websocket_address).await.map_err(|e| match e {
            WsError::Io(io_err) => io_err,
            other => io::Error::new(io::ErrorKind::ConnectionRefused, other),
        })?;

        tracing::info!("WebSocket open: {}", websocket_address);

        let (mut sender, mut receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

        let correlator = Arc::new(Mutex::new(RpcCorrelator::with_config(config)));
        let state_change_handler: Arc<StdMutex<Option<StateChangeHandler>>> =
            Arc::new(StdMutex::new(None));
        let is_connected = Arc::new(AtomicBool::new(true));

        // Receive loop
        let recv_handle = tokio::spawn({
            let correlator = correlator.clone();
            let state_change_handler = state_change_handler.clone();
            let is_connected = is_connected.clone();

            async move {
                while let Some(msg) = receiver.next().await {
                    match msg {
                        Ok(WsMessage::Binary(bytes)) => {
                            if let Err(err) = deliver_inbound(correlator.as_ref(), &bytes).await {
                                tracing::error!("Discarded inbound message: {}", err);
                            }
                        }
                        Ok(WsMessage::Close(_)) => {
                            tracing::info!("Server closed the connection");
                            break;
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::error!("WebSocket receive error: {}", err);
                            break;
                        }
                    }
                }

                let cancelled = correlator.lock().await.close();
                if cancelled > 0 {
                    tracing::warn!("Transport ended with {} pending conversations", cancelled);
                }

                Self::transport_lost(&is_connected, &state_change_handler);
            }
        });

        // Send loop
        let send_handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(err) = sender.send(msg).await {
                    tracing::error!("WebSocket send error: {}", err);
                    break;
                }
            }
        });

        Ok(RibbonClient {
            correlator,
            tx,
            state_change_handler,
            is_connected,
            procedure_registry: None,
            task_handles: vec![recv_handle, send_handle],
        })
    }

    /// Restricts `call` to the procedures listed in `registry`.
    pub fn with_procedure_registry(mut self, registry: ProcedureRegistry) -> Self {
        self.procedure_registry = Some(Arc::new(registry));
        self
    }

    /// Sets a callback invoked when the transport connects or disconnects.
    ///
    /// If the transport is already up the handler is immediately called
    /// with `Connected`.
    pub fn set_state_change_handler(
        &self,
        handler: impl Fn(RibbonTransportState) + Send + Sync + 'static,
    ) {
        let mut slot = self
            .state_change_handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        *slot = Some(Box::new(handler));

        if self.is_connected.load(Ordering::SeqCst) {
            if let Some(handler) = slot.as_ref() {
                handler(RibbonTransportState::Connected);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    /// Calls a procedure, giving up after `timeout`.
    ///
    /// On expiry the conversation is removed, so a reply arriving later is
    /// dropped as unknown.
    pub async fn call_with_timeout(
        &self,
        procedure_name: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, RibbonCallerError> {
        let pending = self.start_call(procedure_name, payload).await?;
        let conversation_id = pending.id();

        match tokio::time::timeout(timeout, pending.result()).await {
            Ok(result) => result,
            Err(_) => {
                self.cancel(conversation_id).await;
                tracing::warn!(
                    "Call to {} timed out after {:?} (conversation {})",
                    procedure_name,
                    timeout,
                    conversation_id
                );
                Err(RibbonCallerError::Timeout { conversation_id })
            }
        }
    }

    /// Marks the transport down and notifies the handler once.
    fn transport_lost(
        is_connected: &AtomicBool,
        state_change_handler: &StdMutex<Option<StateChangeHandler>>,
    ) {
        if !is_connected.swap(false, Ordering::SeqCst) {
            return;
        }

        tracing::info!("Transport disconnected");

        let slot = state_change_handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(handler) = slot.as_ref() {
            handler(RibbonTransportState::Disconnected);
        }
    }
}

#[async_trait::async_trait]
impl RibbonCallerInterface for RibbonClient {
    type CorrelatorLock = Mutex<RpcCorrelator>;

    fn get_correlator(&self) -> Arc<Self::CorrelatorLock> {
        self.correlator.clone()
    }

    fn get_emit_fn(&self) -> Option<EmitFn> {
        let tx = self.tx.clone();

        Some(Arc::new(move |bytes: Vec<u8>| {
            tx.send(WsMessage::Binary(Bytes::from(bytes)))
                .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "send loop has stopped"))
        }))
    }

    fn get_procedure_registry(&self) -> Option<Arc<ProcedureRegistry>> {
        self.procedure_registry.clone()
    }
}
