mod connection_state;
mod correlator_error;
mod delivery_outcome;
mod outbound_request;
mod rpc_correlator;

pub use connection_state::ConnectionState;
pub use correlator_error::CorrelatorError;
pub use delivery_outcome::DeliveryOutcome;
pub use outbound_request::OutboundRequest;
pub use rpc_correlator::RpcCorrelator;
