use ribbon_bridge_caller::procedure::RibbonProcedure;
use std::io;

/// Liveness probe. The server answers `pong` regardless of the payload.
pub struct Ping;

impl RibbonProcedure for Ping {
    const NAME: &'static str = "ping";

    type Input = Vec<u8>;
    type Output = Vec<u8>;

    fn encode_args(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(input)
    }

    fn decode_result(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        Ok(bytes.to_vec())
    }
}
