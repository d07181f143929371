use std::io::Result;
use tokio::net::TcpListener;

/// The URL a client uses to reach a `LoopbackServer` bound to `listener`.
pub fn tcp_listener_to_ws_url(listener: &TcpListener) -> Result<String> {
    let addr = listener.local_addr()?;

    Ok(format!("ws://{}/ws", addr))
}
