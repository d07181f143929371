use crate::{
    constants::{
        ENVELOPE_ID_SIZE, ENVELOPE_PAYLOAD_LENGTH_SIZE, ENVELOPE_STATUS_SIZE,
        MAX_ENVELOPE_PAYLOAD_LEN,
    },
    envelope::{
        ClientEnvelope, EnvelopeDecodeError, EnvelopeEncodeError, SemVer, ServerEnvelope,
    },
};

/// Converts envelopes to and from bytes.
///
/// The correlator only ever encodes client envelopes and decodes server
/// envelopes; the opposite directions exist on the concrete envelope types
/// for servers and tests.
pub trait EnvelopeCodec: Send + Sync {
    /// Payloads must fit the `u32` length prefix (see [`checked_payload_len`]);
    /// the correlator checks this before encoding.
    fn encode_client(&self, envelope: &ClientEnvelope) -> Vec<u8>;

    fn decode_server(&self, bytes: &[u8]) -> Result<ServerEnvelope, EnvelopeDecodeError>;
}

/// The default little-endian envelope encoding.
///
/// Every id is a `u32`, every payload is prefixed with its `u32` length, and
/// each variant is introduced by a one-byte tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryEnvelopeCodec;

impl EnvelopeCodec for BinaryEnvelopeCodec {
    fn encode_client(&self, envelope: &ClientEnvelope) -> Vec<u8> {
        envelope.encode()
    }

    fn decode_server(&self, bytes: &[u8]) -> Result<ServerEnvelope, EnvelopeDecodeError> {
        ServerEnvelope::decode(bytes)
    }
}

/// Returns `len` as the on-wire length prefix, or an error if it does not
/// fit in a `u32`.
pub fn checked_payload_len(len: usize) -> Result<u32, EnvelopeEncodeError> {
    u32::try_from(len).map_err(|_| EnvelopeEncodeError::PayloadTooLarge {
        len,
        max: MAX_ENVELOPE_PAYLOAD_LEN,
    })
}

pub(crate) struct EnvelopeWriter {
    buf: Vec<u8>,
}

impl EnvelopeWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend(&value.to_le_bytes());
        self
    }

    pub(crate) fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend(&value.to_le_bytes());
        self
    }

    pub(crate) fn sem_ver(&mut self, value: &SemVer) -> &mut Self {
        self.u32(value.major).u32(value.minor).u32(value.patch)
    }

    /// Callers check the length with [`checked_payload_len`] first.
    pub(crate) fn payload(&mut self, payload: &[u8]) -> &mut Self {
        debug_assert!(payload.len() <= MAX_ENVELOPE_PAYLOAD_LEN);
        self.u32(payload.len() as u32);
        self.buf.extend(payload);
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

pub(crate) struct EnvelopeReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> EnvelopeReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], EnvelopeDecodeError> {
        let available = self.buf.len() - self.offset;
        if available < needed {
            return Err(EnvelopeDecodeError::Truncated {
                offset: self.offset,
                needed,
                available,
            });
        }

        let slice = &self.buf[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], EnvelopeDecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, EnvelopeDecodeError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, EnvelopeDecodeError> {
        Ok(u32::from_le_bytes(self.array::<ENVELOPE_ID_SIZE>()?))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, EnvelopeDecodeError> {
        Ok(i32::from_le_bytes(self.array::<ENVELOPE_STATUS_SIZE>()?))
    }

    pub(crate) fn sem_ver(&mut self) -> Result<SemVer, EnvelopeDecodeError> {
        Ok(SemVer::new(self.u32()?, self.u32()?, self.u32()?))
    }

    pub(crate) fn payload(&mut self) -> Result<Vec<u8>, EnvelopeDecodeError> {
        let len = u32::from_le_bytes(self.array::<ENVELOPE_PAYLOAD_LENGTH_SIZE>()?) as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Fails if any bytes remain unread.
    pub(crate) fn finish(self) -> Result<(), EnvelopeDecodeError> {
        match self.buf.len() - self.offset {
            0 => Ok(()),
            remaining => Err(EnvelopeDecodeError::TrailingBytes(remaining)),
        }
    }
}
