mod client_envelope;
mod envelope_codec;
mod envelope_error;
mod envelope_kind;
mod sem_ver;
mod server_envelope;

pub use client_envelope::{ClientEnvelope, Request};
pub use envelope_codec::{BinaryEnvelopeCodec, EnvelopeCodec, checked_payload_len};
pub use envelope_error::{EnvelopeDecodeError, EnvelopeEncodeError};
pub use envelope_kind::{ReplyKind, RequestKind, ServerMessageKind};
pub use sem_ver::{SemVer, VersionInfo};
pub use server_envelope::{Reply, ServerEnvelope};
