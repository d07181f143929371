mod caller_interface;
pub use caller_interface::*;
pub mod error;
pub mod procedure;
mod procedure_registry;
pub use procedure_registry::*;
mod transport_state;
pub use transport_state::*;
mod with_correlator_trait;
pub use with_correlator_trait::*;
