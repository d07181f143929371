use bitcode::{Decode, Encode};
use ribbon_bridge_caller::{ProcedureDescriptor, procedure::RibbonProcedure};
use std::io;

#[derive(Encode, Decode, PartialEq, Debug, Clone)]
pub struct RobotPing {
    pub sequence: u32,
    pub message: String,
}

#[derive(Encode, Decode, PartialEq, Debug, Clone)]
pub struct RobotPong {
    pub sequence: u32,
    pub message: String,
}

pub struct SendRobotPing;

impl RibbonProcedure for SendRobotPing {
    const NAME: &'static str = "sendRobotPing";

    type Input = RobotPing;
    type Output = RobotPong;

    fn encode_args(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&input))
    }

    fn decode_result(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        bitcode::decode::<RobotPong>(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn descriptor() -> ProcedureDescriptor {
        ProcedureDescriptor::new(Self::NAME)
            .with_schemas("RobotPing".into(), "RobotPong".into())
    }
}
