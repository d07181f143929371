use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Wire tag of a client request.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RequestKind {
    Connect = 0,
    Disconnect = 1,
    Fire = 2,
}

/// Wire tag of a server message.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum ServerMessageKind {
    Reply = 0,
    Broadcast = 1,
}

/// Wire tag of a reply body.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum ReplyKind {
    Result = 0,
    Versions = 1,
    Status = 2,
}
