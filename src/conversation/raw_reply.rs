use crate::envelope::VersionInfo;

/// The terminal value a conversation resolves with.
///
/// `Status` replies never resolve a conversation, so they have no variant
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawReply {
    Result { procedure_id: u32, payload: Vec<u8> },
    Versions(VersionInfo),
}
