use ribbon_bridge_caller::procedure::RibbonBroadcast;
use std::io;

/// Free-form alert text pushed by the server.
pub struct Alert;

impl RibbonBroadcast for Alert {
    const NAME: &'static str = "alert";

    type Payload = String;

    fn decode(bytes: &[u8]) -> Result<Self::Payload, io::Error> {
        String::from_utf8(bytes.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
