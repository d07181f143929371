/// Connection state of the underlying transport, reported to state-change
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RibbonTransportState {
    Connected,
    Disconnected,
}
