use super::envelope_codec::{EnvelopeReader, EnvelopeWriter};
use crate::{
    constants::{
        ENVELOPE_ID_SIZE, ENVELOPE_PAYLOAD_LENGTH_SIZE, ENVELOPE_SEMVER_SIZE, ENVELOPE_STATUS_SIZE,
        SERVER_REPLY_HEADER_SIZE,
    },
    envelope::{EnvelopeDecodeError, ReplyKind, ServerMessageKind, VersionInfo},
};

/// Body of a server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Result of a `Fire`. The payload is opaque to the correlator.
    Result { procedure_id: u32, payload: Vec<u8> },
    /// Answer to `Connect`.
    Versions(VersionInfo),
    /// Informational status; never resolves a conversation.
    Status { value: i32 },
}

impl Reply {
    pub fn kind(&self) -> ReplyKind {
        match self {
            Reply::Result { .. } => ReplyKind::Result,
            Reply::Versions(_) => ReplyKind::Versions,
            Reply::Status { .. } => ReplyKind::Status,
        }
    }
}

/// Inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEnvelope {
    Reply { in_reply_to: u32, reply: Reply },
    /// Unsolicited event routed by hashed topic name.
    Broadcast { topic_id: u32, payload: Vec<u8> },
}

impl ServerEnvelope {
    pub fn kind(&self) -> ServerMessageKind {
        match self {
            ServerEnvelope::Reply { .. } => ServerMessageKind::Reply,
            ServerEnvelope::Broadcast { .. } => ServerMessageKind::Broadcast,
        }
    }

    /// Encodes a server envelope. Only servers and loopback tests need this.
    pub fn encode(&self) -> Vec<u8> {
        let capacity = match self {
            ServerEnvelope::Reply { reply, .. } => {
                SERVER_REPLY_HEADER_SIZE
                    + match reply {
                        Reply::Result { payload, .. } => {
                            ENVELOPE_ID_SIZE + ENVELOPE_PAYLOAD_LENGTH_SIZE + payload.len()
                        }
                        Reply::Versions(_) => 2 * ENVELOPE_SEMVER_SIZE,
                        Reply::Status { .. } => ENVELOPE_STATUS_SIZE,
                    }
            }
            ServerEnvelope::Broadcast { payload, .. } => {
                1 + ENVELOPE_ID_SIZE + ENVELOPE_PAYLOAD_LENGTH_SIZE + payload.len()
            }
        };

        let mut writer = EnvelopeWriter::with_capacity(capacity);
        writer.u8(self.kind().into());

        match self {
            ServerEnvelope::Reply { in_reply_to, reply } => {
                writer.u32(*in_reply_to).u8(reply.kind().into());
                match reply {
                    Reply::Result {
                        procedure_id,
                        payload,
                    } => {
                        writer.u32(*procedure_id).payload(payload);
                    }
                    Reply::Versions(versions) => {
                        writer.sem_ver(&versions.rpc).sem_ver(&versions.interface);
                    }
                    Reply::Status { value } => {
                        writer.i32(*value);
                    }
                }
            }
            ServerEnvelope::Broadcast { topic_id, payload } => {
                writer.u32(*topic_id).payload(payload);
            }
        }

        writer.finish()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeDecodeError> {
        let mut reader = EnvelopeReader::new(bytes);

        let tag = reader.u8()?;
        let kind = ServerMessageKind::try_from(tag)
            .map_err(|_| EnvelopeDecodeError::UnknownServerMessageKind(tag))?;

        let envelope = match kind {
            ServerMessageKind::Reply => {
                let in_reply_to = reader.u32()?;
                let reply_tag = reader.u8()?;
                let reply_kind = ReplyKind::try_from(reply_tag)
                    .map_err(|_| EnvelopeDecodeError::UnknownReplyKind(reply_tag))?;

                let reply = match reply_kind {
                    ReplyKind::Result => Reply::Result {
                        procedure_id: reader.u32()?,
                        payload: reader.payload()?,
                    },
                    ReplyKind::Versions => Reply::Versions(VersionInfo {
                        rpc: reader.sem_ver()?,
                        interface: reader.sem_ver()?,
                    }),
                    ReplyKind::Status => Reply::Status {
                        value: reader.i32()?,
                    },
                };

                ServerEnvelope::Reply { in_reply_to, reply }
            }
            ServerMessageKind::Broadcast => ServerEnvelope::Broadcast {
                topic_id: reader.u32()?,
                payload: reader.payload()?,
            },
        };

        reader.finish()?;

        Ok(envelope)
    }
}
