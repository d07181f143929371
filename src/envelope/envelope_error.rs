use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeDecodeError {
    /// The buffer ended before a field could be read.
    #[error("envelope truncated: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown request kind tag {0}")]
    UnknownRequestKind(u8),

    #[error("unknown server message kind tag {0}")]
    UnknownServerMessageKind(u8),

    #[error("unknown reply kind tag {0}")]
    UnknownReplyKind(u8),

    /// Bytes remained after a complete envelope was decoded.
    #[error("{0} trailing bytes after envelope")]
    TrailingBytes(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeEncodeError {
    /// The payload is longer than its `u32` length prefix can express.
    #[error("payload of {len} bytes exceeds the {max} byte envelope limit")]
    PayloadTooLarge { len: usize, max: usize },
}
