// Identifier hashing
pub const PROCEDURE_ID_HASH_MULTIPLIER: u32 = 101;

// Conversation id seeding. The first id handed out is `seed + 1`.
pub const REQUEST_ID_SEED_MIN: u32 = 100;
pub const REQUEST_ID_SEED_MAX: u32 = 32_000;

/// Size of the fixed client envelope prefix: the 4-byte conversation id
/// followed by the 1-byte request kind.
pub const CLIENT_ENVELOPE_HEADER_SIZE: usize = 5;

/// Size of the fixed server reply prefix: message kind (1), in-reply-to id (4)
/// and reply kind (1).
pub const SERVER_REPLY_HEADER_SIZE: usize = 6;

/// Size in bytes of every id field on the wire (conversation, procedure, topic).
pub const ENVELOPE_ID_SIZE: usize = 4;

/// Size in bytes of the payload length prefix (u32).
pub const ENVELOPE_PAYLOAD_LENGTH_SIZE: usize = 4;

/// Size in bytes of one encoded `SemVer` (three u32 components).
pub const ENVELOPE_SEMVER_SIZE: usize = 12;

/// Size in bytes of a status value (i32).
pub const ENVELOPE_STATUS_SIZE: usize = 4;

/// Largest payload the `u32` length prefix can describe.
pub const MAX_ENVELOPE_PAYLOAD_LEN: usize = u32::MAX as usize;

/// Open-conversation count at which `register` first sweeps abandoned
/// entries. After each sweep the next one is scheduled at twice the
/// surviving count.
pub const CONVERSATION_PRUNE_THRESHOLD: usize = 64;
