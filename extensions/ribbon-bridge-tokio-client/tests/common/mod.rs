#![allow(dead_code)]

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use ribbon_bridge::envelope::{ClientEnvelope, Reply, Request, SemVer, ServerEnvelope, VersionInfo};
use ribbon_bridge::hash::procedure_id_hash;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message as WsMessage};

pub const SERVER_VERSIONS: VersionInfo = VersionInfo {
    rpc: SemVer::new(0, 3, 0),
    interface: SemVer::new(0, 2, 2),
};

/// What the scripted server does with one request.
pub enum Script {
    Send(Vec<ServerEnvelope>),
    Ignore,
    Hangup,
}

/// Answers `Connect` with versions, `ping` with `pong`, echoes `echo` and
/// hangs up on `hangup`. Anything else is left unanswered.
pub fn default_script(envelope: ClientEnvelope) -> Script {
    match envelope.request {
        Request::Connect => Script::Send(vec![ServerEnvelope::Reply {
            in_reply_to: envelope.id,
            reply: Reply::Versions(SERVER_VERSIONS),
        }]),
        Request::Disconnect => Script::Ignore,
        Request::Fire {
            procedure_id,
            payload,
        } => {
            let result = |payload: Vec<u8>| {
                Script::Send(vec![ServerEnvelope::Reply {
                    in_reply_to: envelope.id,
                    reply: Reply::Result {
                        procedure_id,
                        payload,
                    },
                }])
            };

            if procedure_id == procedure_id_hash("ping") {
                result(b"pong".to_vec())
            } else if procedure_id == procedure_id_hash("echo") {
                result(payload)
            } else if procedure_id == procedure_id_hash("hangup") {
                Script::Hangup
            } else {
                Script::Ignore
            }
        }
    }
}

/// Serves one WebSocket connection on a random port and returns its URL.
pub async fn spawn_scripted_server(script: fn(ClientEnvelope) -> Script) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        while let Some(Ok(msg)) = ws.next().await {
            let WsMessage::Binary(bytes) = msg else {
                continue;
            };

            match script(ClientEnvelope::decode(&bytes).unwrap()) {
                Script::Send(envelopes) => {
                    for envelope in envelopes {
                        ws.send(WsMessage::Binary(Bytes::from(envelope.encode())))
                            .await
                            .unwrap();
                    }
                }
                Script::Ignore => {}
                Script::Hangup => {
                    let _ = ws.close(None).await;
                    break;
                }
            }
        }
    });

    format!("ws://{}", addr)
}
