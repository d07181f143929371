mod broadcast_delivery;
mod broadcast_router;

pub use broadcast_delivery::{BroadcastDelivery, DispatchOutcome};
pub use broadcast_router::{BroadcastHandlerError, BroadcastHandlerFn, BroadcastRouter};
