use serde::Deserialize;
use std::io;

/// Whether `Fire` requests may be issued before the version handshake has
/// completed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePolicy {
    /// `Fire` is allowed from any state except `Closed`. Ordering against the
    /// handshake is left to the calling layer.
    #[default]
    Permissive,

    /// `Fire` is rejected unless the handshake has produced a `Versions` reply.
    RequireHandshake,
}

/// Client-side settings for a correlator.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RibbonConfig {
    pub fire_policy: FirePolicy,

    /// Fixed seed for the conversation id counter. `None` picks a random seed
    /// in `[REQUEST_ID_SEED_MIN, REQUEST_ID_SEED_MAX)`.
    pub initial_request_id: Option<u32>,
}

impl RibbonConfig {
    /// Parses a config from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, io::Error> {
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
