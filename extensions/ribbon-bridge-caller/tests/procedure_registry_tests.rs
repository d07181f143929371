use ribbon_bridge::hash::procedure_id_hash;
use ribbon_bridge_caller::{
    ProcedureDescriptor, ProcedureRegistry, error::RegistryError, procedure::RibbonProcedure,
};
use std::io;

struct SetLed;

impl RibbonProcedure for SetLed {
    const NAME: &'static str = "setLed";

    type Input = bool;
    type Output = ();

    fn encode_args(on: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(vec![on as u8])
    }

    fn decode_result(_bytes: &[u8]) -> Result<Self::Output, io::Error> {
        Ok(())
    }
}

#[test]
fn test_builder_keeps_declaration_order() {
    let registry = ProcedureRegistry::builder()
        .procedure(ProcedureDescriptor::new("sendRobotPing"))
        .register::<SetLed>()
        .procedure(ProcedureDescriptor::new("ping"))
        .build()
        .unwrap();

    assert_eq!(registry.procedures(), vec!["sendRobotPing", "setLed", "ping"]);
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("setLed"));
    assert!(!registry.contains("setled"));
}

#[test]
fn test_procedure_id_defaults_to_name_hash() {
    assert_eq!(SetLed::PROCEDURE_ID, procedure_id_hash("setLed"));
    assert_eq!(
        ProcedureDescriptor::new("setLed").procedure_id(),
        SetLed::PROCEDURE_ID
    );
}

#[test]
fn test_duplicate_name_is_rejected() {
    let result = ProcedureRegistry::builder()
        .procedure(ProcedureDescriptor::new("ping"))
        .procedure(ProcedureDescriptor::new("ping"))
        .build();

    assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "ping"));
}

#[test]
fn test_colliding_hashes_are_rejected() {
    // 101 * 'a' + 'e' == 101 * 'b' + 0
    assert_eq!(procedure_id_hash("ae"), procedure_id_hash("b\u{0}"));

    let result = ProcedureRegistry::builder()
        .procedure(ProcedureDescriptor::new("ae"))
        .procedure(ProcedureDescriptor::new("b\u{0}"))
        .build();

    match result {
        Err(RegistryError::IdCollision { id, first, second }) => {
            assert_eq!(id, procedure_id_hash("ae"));
            assert_eq!(first, "ae");
            assert_eq!(second, "b\u{0}");
        }
        other => panic!("expected a collision, got {:?}", other),
    }
}

#[test]
fn test_load_from_json_document() {
    let json = r#"{
        "procedures": [
            {
                "name": "sendRobotPing",
                "argument_schema": {"type": "object", "fields": ["sequence", "message"]},
                "result_schema": {"type": "object"}
            },
            { "name": "ping" }
        ]
    }"#;

    let registry = ProcedureRegistry::from_json_str(json).unwrap();

    assert_eq!(registry.procedures(), vec!["sendRobotPing", "ping"]);

    let descriptor = registry.get("sendRobotPing").unwrap();
    assert_eq!(descriptor.argument_schema["type"], "object");
    assert_eq!(descriptor.argument_schema["fields"][1], "message");

    let ping = registry.get("ping").unwrap();
    assert!(ping.argument_schema.is_null());
    assert!(ping.result_schema.is_null());
}

#[test]
fn test_invalid_json_document() {
    assert!(matches!(
        ProcedureRegistry::from_json_str(r#"{"procedures": 3}"#),
        Err(RegistryError::Parse(_))
    ));

    assert!(matches!(
        ProcedureRegistry::from_json_str(r#"{"procedures": [{"name": "a"}, {"name": "a"}]}"#),
        Err(RegistryError::DuplicateName(_))
    ));
}

#[test]
fn test_empty_registry() {
    let registry = ProcedureRegistry::default();

    assert!(registry.is_empty());
    assert!(registry.procedures().is_empty());
    assert!(registry.get("ping").is_none());
}
