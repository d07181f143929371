//! A small in-process ribbon-bridge server for tests and demos.
//!
//! It answers the handshake, serves a handful of fixed procedures and pushes
//! an `alert` broadcast on request. It has no authentication and keeps no
//! state between connections.

use axum::{
    Router,
    extract::ConnectInfo,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use example_ribbon_bridge_service_definition::{
    broadcasts::Alert,
    procedures::{Ping, RobotPing, RobotPong, SendRobotPing},
};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use ribbon_bridge::envelope::{
    ClientEnvelope, Reply, Request, SemVer, ServerEnvelope, VersionInfo,
};
use ribbon_bridge::hash::procedure_id_hash;
use ribbon_bridge_caller::procedure::{RibbonBroadcast, RibbonProcedure};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, sync::mpsc, time::timeout};

/// The interval at which the server pings the client.
const HEARTBEAT_INTERVAL: u64 = 5;

/// How long the server waits for any client message before hanging up.
const CLIENT_TIMEOUT: u64 = 15;

pub const LOOPBACK_VERSIONS: VersionInfo = VersionInfo {
    rpc: SemVer::new(0, 3, 0),
    interface: SemVer::new(0, 2, 2),
};

/// Status sent in reply to `Disconnect` before the socket closes.
pub const STATUS_DISCONNECTED: i32 = 0;
pub const STATUS_UNKNOWN_PROCEDURE: i32 = -1;
pub const STATUS_BAD_ARGUMENTS: i32 = -2;

/// Procedures the loopback server answers, as `(name, argument, result)`.
///
/// `slow` is accepted but never answered.
pub const LOOPBACK_PROCEDURES: &[(&str, &str, &str)] = &[
    (Ping::NAME, "bytes", "bytes"),
    ("echo", "bytes", "bytes"),
    (SendRobotPing::NAME, "RobotPing", "RobotPong"),
    ("triggerAlert", "utf8", "empty"),
    ("slow", "bytes", "never"),
];

/// What the server sends back for one request.
#[derive(Debug, Default, PartialEq)]
pub struct LoopbackResponse {
    pub envelopes: Vec<ServerEnvelope>,
    /// Close the socket after sending `envelopes`.
    pub close: bool,
}

impl LoopbackResponse {
    fn send(envelope: ServerEnvelope) -> Self {
        Self {
            envelopes: vec![envelope],
            close: false,
        }
    }
}

pub struct LoopbackServer {
    versions: VersionInfo,
}

impl Default for LoopbackServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackServer {
    pub fn new() -> Self {
        Self::with_versions(LOOPBACK_VERSIONS)
    }

    pub fn with_versions(versions: VersionInfo) -> Self {
        LoopbackServer { versions }
    }

    pub fn versions(&self) -> VersionInfo {
        self.versions
    }

    /// The procedure schema document clients load into a `ProcedureRegistry`.
    pub fn schema_document() -> String {
        let procedures: Vec<serde_json::Value> = LOOPBACK_PROCEDURES
            .iter()
            .map(|(name, argument_schema, result_schema)| {
                serde_json::json!({
                    "name": name,
                    "argument_schema": argument_schema,
                    "result_schema": result_schema,
                })
            })
            .collect();

        serde_json::json!({ "procedures": procedures }).to_string()
    }

    /// Computes the response to one decoded request.
    pub fn handle(&self, envelope: ClientEnvelope) -> LoopbackResponse {
        let in_reply_to = envelope.id;

        match envelope.request {
            Request::Connect => LoopbackResponse::send(ServerEnvelope::Reply {
                in_reply_to,
                reply: Reply::Versions(self.versions),
            }),
            Request::Disconnect => LoopbackResponse {
                envelopes: vec![ServerEnvelope::Reply {
                    in_reply_to,
                    reply: Reply::Status {
                        value: STATUS_DISCONNECTED,
                    },
                }],
                close: true,
            },
            Request::Fire {
                procedure_id,
                payload,
            } => self.handle_fire(in_reply_to, procedure_id, payload),
        }
    }

    fn handle_fire(&self, in_reply_to: u32, procedure_id: u32, payload: Vec<u8>) -> LoopbackResponse {
        let result = |payload: Vec<u8>| ServerEnvelope::Reply {
            in_reply_to,
            reply: Reply::Result {
                procedure_id,
                payload,
            },
        };
        let status = |value: i32| ServerEnvelope::Reply {
            in_reply_to,
            reply: Reply::Status { value },
        };

        if procedure_id == Ping::PROCEDURE_ID {
            LoopbackResponse::send(result(b"pong".to_vec()))
        } else if procedure_id == procedure_id_hash("echo") {
            LoopbackResponse::send(result(payload))
        } else if procedure_id == SendRobotPing::PROCEDURE_ID {
            match bitcode::decode::<RobotPing>(&payload) {
                Ok(ping) => LoopbackResponse::send(result(bitcode::encode(&RobotPong {
                    sequence: ping.sequence,
                    message: format!("pong: {}", ping.message),
                }))),
                Err(err) => {
                    tracing::warn!("Bad sendRobotPing arguments: {}", err);
                    LoopbackResponse::send(status(STATUS_BAD_ARGUMENTS))
                }
            }
        } else if procedure_id == procedure_id_hash("triggerAlert") {
            LoopbackResponse {
                envelopes: vec![
                    ServerEnvelope::Broadcast {
                        topic_id: Alert::TOPIC_ID,
                        payload,
                    },
                    result(Vec::new()),
                ],
                close: false,
            }
        } else if procedure_id == procedure_id_hash("slow") {
            LoopbackResponse::default()
        } else {
            tracing::warn!("Unknown procedure id {}", procedure_id);
            LoopbackResponse::send(status(STATUS_UNKNOWN_PROCEDURE))
        }
    }

    /// Serves WebSocket clients on `/ws` using a pre-bound listener.
    pub async fn serve_with_listener(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<SocketAddr, axum::BoxError> {
        let address = listener.local_addr()?;
        let app = Router::new().route(
            "/ws",
            get({
                let server = self.clone();
                move |ws, conn| Self::ws_handler(ws, conn, server)
            }),
        );
        tracing::info!("Loopback server running on {:?}", address);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(address)
    }

    async fn ws_handler(
        ws: WebSocketUpgrade,
        ConnectInfo(addr): ConnectInfo<SocketAddr>,
        server: Arc<LoopbackServer>,
    ) -> impl IntoResponse {
        tracing::info!("Client connected: {}", addr);
        ws.on_upgrade(move |socket| server.handle_socket(socket, addr))
    }

    async fn handle_socket(self: Arc<Self>, socket: WebSocket, addr: SocketAddr) {
        let (mut sender, receiver) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(self.receiver_task(receiver, tx, addr));
    }

    async fn receiver_task(
        self: Arc<Self>,
        mut receiver: SplitStream<WebSocket>,
        tx: mpsc::UnboundedSender<Message>,
        addr: SocketAddr,
    ) {
        let heartbeat_interval = Duration::from_secs(HEARTBEAT_INTERVAL);
        let client_timeout = Duration::from_secs(CLIENT_TIMEOUT);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(heartbeat_interval) => {
                    if tx.send(Message::Ping(Bytes::new())).is_err() {
                        tracing::info!("Client {} disconnected (failed to send ping).", addr);
                        break;
                    }
                }

                result = timeout(client_timeout, receiver.next()) => {
                    match result {
                        Err(_) => {
                            tracing::warn!("Client {} timed out. Closing connection.", addr);
                            break;
                        }
                        Ok(Some(Ok(Message::Binary(bytes)))) => {
                            let request = match ClientEnvelope::decode(&bytes) {
                                Ok(request) => request,
                                Err(err) => {
                                    tracing::error!("Malformed request from {}: {}", addr, err);
                                    continue;
                                }
                            };

                            let response = self.handle(request);
                            for envelope in response.envelopes {
                                let _ = tx.send(Message::Binary(Bytes::from(envelope.encode())));
                            }

                            if response.close {
                                tracing::info!("Client {} disconnected by request.", addr);
                                let _ = tx.send(Message::Close(None));
                                break;
                            }
                        }
                        Ok(Some(Ok(Message::Close(_)))) => {
                            tracing::info!("Client {} initiated close.", addr);
                            break;
                        }
                        Ok(Some(Ok(_))) => {}
                        Ok(None) | Ok(Some(Err(_))) => {
                            tracing::info!("Client {} disconnected.", addr);
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Terminated connection for {}.", addr);
    }
}
