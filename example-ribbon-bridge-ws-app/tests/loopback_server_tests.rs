use example_ribbon_bridge_service_definition::procedures::{RobotPing, RobotPong, SendRobotPing};
use example_ribbon_bridge_ws_app::{
    LOOPBACK_PROCEDURES, LOOPBACK_VERSIONS, LoopbackResponse, LoopbackServer,
    STATUS_BAD_ARGUMENTS, STATUS_DISCONNECTED, STATUS_UNKNOWN_PROCEDURE,
};
use ribbon_bridge::envelope::{ClientEnvelope, Reply, Request, ServerEnvelope};
use ribbon_bridge::hash::procedure_id_hash;
use ribbon_bridge_caller::{ProcedureRegistry, procedure::RibbonProcedure};

fn fire(id: u32, name: &str, payload: Vec<u8>) -> ClientEnvelope {
    ClientEnvelope {
        id,
        request: Request::Fire {
            procedure_id: procedure_id_hash(name),
            payload,
        },
    }
}

#[test]
fn test_connect_answers_versions() {
    let response = LoopbackServer::new().handle(ClientEnvelope {
        id: 7,
        request: Request::Connect,
    });

    assert_eq!(
        response,
        LoopbackResponse {
            envelopes: vec![ServerEnvelope::Reply {
                in_reply_to: 7,
                reply: Reply::Versions(LOOPBACK_VERSIONS),
            }],
            close: false,
        }
    );
    assert_eq!(LOOPBACK_VERSIONS.rpc.to_string(), "0.3.0");
    assert_eq!(LOOPBACK_VERSIONS.interface.to_string(), "0.2.2");
}

#[test]
fn test_disconnect_answers_status_and_closes() {
    let response = LoopbackServer::new().handle(ClientEnvelope {
        id: 8,
        request: Request::Disconnect,
    });

    assert!(response.close);
    assert_eq!(
        response.envelopes,
        vec![ServerEnvelope::Reply {
            in_reply_to: 8,
            reply: Reply::Status {
                value: STATUS_DISCONNECTED
            },
        }]
    );
}

#[test]
fn test_ping_answers_pong() {
    let response = LoopbackServer::new().handle(fire(9, "ping", Vec::new()));

    assert_eq!(
        response.envelopes,
        vec![ServerEnvelope::Reply {
            in_reply_to: 9,
            reply: Reply::Result {
                procedure_id: procedure_id_hash("ping"),
                payload: b"pong".to_vec(),
            },
        }]
    );
}

#[test]
fn test_robot_ping_round_trip() {
    let args = SendRobotPing::encode_args(RobotPing {
        sequence: 3,
        message: "hi".into(),
    })
    .unwrap();

    let response = LoopbackServer::new().handle(fire(10, "sendRobotPing", args));

    let [ServerEnvelope::Reply {
        reply: Reply::Result { payload, .. },
        ..
    }] = response.envelopes.as_slice()
    else {
        panic!("unexpected response {:?}", response);
    };

    assert_eq!(
        SendRobotPing::decode_result(payload).unwrap(),
        RobotPong {
            sequence: 3,
            message: "pong: hi".into(),
        }
    );
}

#[test]
fn test_error_statuses() {
    let server = LoopbackServer::new();

    let bad_args = server.handle(fire(11, "sendRobotPing", vec![0xff]));
    assert_eq!(
        bad_args.envelopes,
        vec![ServerEnvelope::Reply {
            in_reply_to: 11,
            reply: Reply::Status {
                value: STATUS_BAD_ARGUMENTS
            },
        }]
    );

    let unknown = server.handle(fire(12, "selfDestruct", Vec::new()));
    assert_eq!(
        unknown.envelopes,
        vec![ServerEnvelope::Reply {
            in_reply_to: 12,
            reply: Reply::Status {
                value: STATUS_UNKNOWN_PROCEDURE
            },
        }]
    );
}

#[test]
fn test_trigger_alert_broadcasts_before_replying() {
    let response = LoopbackServer::new().handle(fire(13, "triggerAlert", b"oops".to_vec()));

    assert_eq!(
        response.envelopes,
        vec![
            ServerEnvelope::Broadcast {
                topic_id: procedure_id_hash("alert"),
                payload: b"oops".to_vec(),
            },
            ServerEnvelope::Reply {
                in_reply_to: 13,
                reply: Reply::Result {
                    procedure_id: procedure_id_hash("triggerAlert"),
                    payload: Vec::new(),
                },
            },
        ]
    );
}

#[test]
fn test_slow_is_never_answered() {
    let response = LoopbackServer::new().handle(fire(14, "slow", Vec::new()));

    assert_eq!(response, LoopbackResponse::default());
}

#[test]
fn test_schema_document_loads_into_registry() {
    let registry = ProcedureRegistry::from_json_str(&LoopbackServer::schema_document()).unwrap();

    let expected: Vec<&str> = LOOPBACK_PROCEDURES.iter().map(|(name, _, _)| *name).collect();
    assert_eq!(registry.procedures(), expected);
    assert_eq!(
        registry.get("sendRobotPing").unwrap().argument_schema,
        "RobotPing"
    );
}
