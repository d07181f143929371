mod loopback_server;
pub use loopback_server::{
    LOOPBACK_PROCEDURES, LOOPBACK_VERSIONS, LoopbackResponse, LoopbackServer,
    STATUS_BAD_ARGUMENTS, STATUS_DISCONNECTED, STATUS_UNKNOWN_PROCEDURE,
};

pub mod utils;
