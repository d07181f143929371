use ribbon_bridge::{procedure_id_hash, rpc_procedure_id};

#[test]
fn test_hash_of_empty_name_is_zero() {
    assert_eq!(procedure_id_hash(""), 0);
}

#[test]
fn test_hash_of_single_byte_is_the_byte() {
    assert_eq!(procedure_id_hash("a"), 97);
}

#[test]
fn test_hash_folds_bytes_in_order() {
    assert_eq!(procedure_id_hash("ab"), 101 * 97 + 98);
    assert_ne!(procedure_id_hash("ab"), procedure_id_hash("ba"));
}

#[test]
fn test_hash_is_deterministic() {
    assert_eq!(
        procedure_id_hash("sendRobotPing"),
        procedure_id_hash("sendRobotPing")
    );
}

#[test]
fn test_hash_wraps_modulo_u32() {
    let name = "resolveSerialIdWithAVeryLongProcedureNameThatOverflows";

    let mut expected: u64 = 0;
    for b in name.bytes() {
        expected = (101 * expected + b as u64) % (1u64 << 32);
    }

    assert_eq!(procedure_id_hash(name) as u64, expected);
}

#[test]
fn test_macro_matches_runtime_hash() {
    const PING: u32 = rpc_procedure_id!("ping");
    assert_eq!(PING, procedure_id_hash("ping"));
}
