use std::fmt;

/// A `major.minor.patch` version as reported by the handshake.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Versions the server reports in reply to `Connect`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    /// Version of the RPC protocol itself.
    pub rpc: SemVer,
    /// Version of the procedure interface the server implements.
    pub interface: SemVer,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc {} / interface {}", self.rpc, self.interface)
    }
}
