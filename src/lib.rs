pub mod broadcast;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod correlator;
pub mod envelope;
pub mod hash;
pub mod utils;

pub use config::{FirePolicy, RibbonConfig};
pub use hash::procedure_id_hash;
