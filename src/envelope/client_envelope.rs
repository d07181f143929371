use super::envelope_codec::{EnvelopeReader, EnvelopeWriter};
use crate::{
    constants::{CLIENT_ENVELOPE_HEADER_SIZE, ENVELOPE_ID_SIZE, ENVELOPE_PAYLOAD_LENGTH_SIZE},
    envelope::{EnvelopeDecodeError, RequestKind},
};

/// A request as sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Opens the version handshake.
    Connect,
    Disconnect,
    /// A procedure call. `procedure_id` is the hashed procedure name.
    Fire { procedure_id: u32, payload: Vec<u8> },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Connect => RequestKind::Connect,
            Request::Disconnect => RequestKind::Disconnect,
            Request::Fire { .. } => RequestKind::Fire,
        }
    }
}

/// Outbound envelope. `id` names the conversation the reply must answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEnvelope {
    pub id: u32,
    pub request: Request,
}

impl ClientEnvelope {
    pub fn encode(&self) -> Vec<u8> {
        let body_size = match &self.request {
            Request::Fire { payload, .. } => {
                ENVELOPE_ID_SIZE + ENVELOPE_PAYLOAD_LENGTH_SIZE + payload.len()
            }
            _ => 0,
        };

        let mut writer = EnvelopeWriter::with_capacity(CLIENT_ENVELOPE_HEADER_SIZE + body_size);
        writer.u32(self.id).u8(self.request.kind().into());

        if let Request::Fire {
            procedure_id,
            payload,
        } = &self.request
        {
            writer.u32(*procedure_id).payload(payload);
        }

        writer.finish()
    }

    /// Decodes a client envelope. Servers and loopback tests use this; the
    /// client itself never parses its own requests.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeDecodeError> {
        let mut reader = EnvelopeReader::new(bytes);

        let id = reader.u32()?;
        let tag = reader.u8()?;
        let kind =
            RequestKind::try_from(tag).map_err(|_| EnvelopeDecodeError::UnknownRequestKind(tag))?;

        let request = match kind {
            RequestKind::Connect => Request::Connect,
            RequestKind::Disconnect => Request::Disconnect,
            RequestKind::Fire => Request::Fire {
                procedure_id: reader.u32()?,
                payload: reader.payload()?,
            },
        };

        reader.finish()?;

        Ok(Self { id, request })
    }
}
