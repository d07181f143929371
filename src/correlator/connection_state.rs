/// Lifecycle of a correlator.
///
/// `Unconnected -> Connecting -> Connected -> Disconnecting -> Closed`.
/// `reset` returns a `Closed` correlator to `Unconnected`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Unconnected,
    /// `Connect` sent, waiting for `Versions`.
    Connecting,
    Connected,
    /// `Disconnect` prepared, not yet handed to the transport.
    Disconnecting,
    Closed,
}

impl ConnectionState {
    /// Whether a `Fire` request is structurally allowed.
    pub fn accepts_fire(self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }
}
