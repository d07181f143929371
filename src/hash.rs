use crate::constants::PROCEDURE_ID_HASH_MULTIPLIER;

/// Hashes a procedure or broadcast name into the 32-bit identifier sent on
/// the wire.
///
/// The server computes the same value for the same name, so this function is
/// part of the protocol: starting from `0`, every byte `c` of the name folds in
/// as `acc = 101 * acc + c` modulo `2^32`. Names are hashed as their UTF-8
/// bytes, which is identical to ASCII for the ASCII names servers use.
///
/// Collisions are not detected; two schema names that hash alike are a
/// schema-authoring error.
///
/// ```rust
/// use ribbon_bridge::procedure_id_hash;
/// assert_eq!(procedure_id_hash(""), 0);
/// assert_eq!(procedure_id_hash("a"), 97);
/// ```
pub const fn procedure_id_hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut acc: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        acc = acc
            .wrapping_mul(PROCEDURE_ID_HASH_MULTIPLIER)
            .wrapping_add(bytes[i] as u32);
        i += 1;
    }
    acc
}

/// Compile-time procedure id generator.
///
/// Expands to a `const` evaluation of [`procedure_id_hash`], so typed
/// procedure definitions can embed their wire id without any runtime cost.
///
/// ## Example
///
/// ```rust
/// use ribbon_bridge::rpc_procedure_id;
/// let ping = rpc_procedure_id!("sendRobotPing");
/// let alert = rpc_procedure_id!("alert");
/// assert_ne!(ping, alert);
/// ```
#[macro_export]
macro_rules! rpc_procedure_id {
    ($name:literal) => {{
        const ID: u32 = $crate::hash::procedure_id_hash($name);
        ID
    }};
}
