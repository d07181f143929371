use crate::RibbonClient;
use futures::channel::oneshot;
use ribbon_bridge::{RibbonConfig, broadcast::BroadcastHandlerError, envelope::VersionInfo};
use ribbon_bridge_caller::{
    RibbonCallerInterface, error::RibbonCallerError, procedure::RibbonCallProcedure,
};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};

type ReadySignal = Result<(Arc<RibbonClient>, Handle), io::Error>;

/// A [`RibbonClient`] for synchronous code.
///
/// The transport runs on a dedicated I/O thread with its own Tokio runtime.
/// Construction blocks until that thread reports the WebSocket is open (or
/// that opening it failed). Every method then blocks the calling thread on
/// the I/O runtime, so they are usable from any plain thread but must not be
/// called from inside an async context.
pub struct BlockingRibbonClient {
    client: Arc<RibbonClient>,
    handle: Handle,
    shutdown_tx: Option<oneshot::Sender<()>>,
    io_thread: Option<thread::JoinHandle<()>>,
}

impl BlockingRibbonClient {
    pub fn new(websocket_address: &str) -> Result<Self, io::Error> {
        Self::with_config(websocket_address, RibbonConfig::default())
    }

    pub fn with_config(websocket_address: &str, config: RibbonConfig) -> Result<Self, io::Error> {
        let (ready_tx, ready_rx) = oneshot::channel::<ReadySignal>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let websocket_address = websocket_address.to_string();

        let io_thread = thread::Builder::new()
            .name("ribbon-bridge-io".into())
            .spawn(move || {
                let runtime = match Builder::new_multi_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                runtime.block_on(async move {
                    match RibbonClient::with_config(&websocket_address, config).await {
                        Ok(client) => {
                            if ready_tx
                                .send(Ok((Arc::new(client), Handle::current())))
                                .is_err()
                            {
                                return;
                            }
                            // Keeps the runtime alive until the owner shuts down.
                            let _ = shutdown_rx.await;
                        }
                        Err(err) => {
                            let _ = ready_tx.send(Err(err));
                        }
                    }
                });

                tracing::debug!("I/O thread exiting");
            })?;

        let (client, handle) = futures::executor::block_on(ready_rx).map_err(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "I/O thread exited before ready")
        })??;

        Ok(Self {
            client,
            handle,
            shutdown_tx: Some(shutdown_tx),
            io_thread: Some(io_thread),
        })
    }

    /// The async client driven by the I/O thread.
    pub fn client(&self) -> &RibbonClient {
        &self.client
    }

    pub fn connect(&self) -> Result<VersionInfo, RibbonCallerError> {
        self.handle.block_on(self.client.connect())
    }

    pub fn disconnect(&self) -> Result<usize, RibbonCallerError> {
        self.handle.block_on(self.client.disconnect())
    }

    pub fn call(&self, procedure_name: &str, payload: Vec<u8>) -> Result<Vec<u8>, RibbonCallerError> {
        self.handle.block_on(self.client.call(procedure_name, payload))
    }

    pub fn call_with_timeout(
        &self,
        procedure_name: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, RibbonCallerError> {
        self.handle
            .block_on(self.client.call_with_timeout(procedure_name, payload, timeout))
    }

    /// Calls a typed procedure definition.
    pub fn call_procedure<P>(&self, input: P::Input) -> Result<P::Output, RibbonCallerError>
    where
        P: RibbonCallProcedure,
    {
        self.handle.block_on(P::call(self.client.as_ref(), input))
    }

    pub fn add_broadcast_handler<F>(&self, name: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<(), BroadcastHandlerError> + Send + Sync + 'static,
    {
        self.handle
            .block_on(self.client.add_broadcast_handler(name, handler))
    }

    pub fn remove_broadcast_handler(&self, name: &str) -> bool {
        self.handle
            .block_on(self.client.remove_broadcast_handler(name))
    }

    /// Cancels pending conversations and closes the correlator. The I/O
    /// thread keeps running until the client is dropped.
    pub fn close(&self) -> usize {
        self.handle.block_on(self.client.close())
    }
}

impl Drop for BlockingRibbonClient {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(io_thread) = self.io_thread.take() {
            if io_thread.join().is_err() {
                tracing::error!("I/O thread panicked");
            }
        }
    }
}
