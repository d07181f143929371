use ribbon_bridge::constants::MAX_ENVELOPE_PAYLOAD_LEN;
use ribbon_bridge::envelope::{
    BinaryEnvelopeCodec, ClientEnvelope, EnvelopeCodec, EnvelopeDecodeError, EnvelopeEncodeError,
    Reply, Request, SemVer, ServerEnvelope, VersionInfo, checked_payload_len,
};

#[test]
fn test_fire_request_layout() {
    let envelope = ClientEnvelope {
        id: 0x0102_0304,
        request: Request::Fire {
            procedure_id: 97,
            payload: b"hi".to_vec(),
        },
    };

    let bytes = BinaryEnvelopeCodec.encode_client(&envelope);

    assert_eq!(
        bytes,
        vec![
            0x04, 0x03, 0x02, 0x01, // id
            2,    // FIRE
            97, 0, 0, 0, // procedure id
            2, 0, 0, 0, // payload length
            b'h', b'i',
        ]
    );
    assert_eq!(ClientEnvelope::decode(&bytes).unwrap(), envelope);
}

#[test]
fn test_connect_request_has_no_body() {
    let bytes = ClientEnvelope {
        id: 7,
        request: Request::Connect,
    }
    .encode();

    assert_eq!(bytes, vec![7, 0, 0, 0, 0]);
}

#[test]
fn test_versions_reply_decodes() {
    let envelope = ServerEnvelope::Reply {
        in_reply_to: 4242,
        reply: Reply::Versions(VersionInfo {
            rpc: SemVer::new(0, 3, 0),
            interface: SemVer::new(0, 2, 2),
        }),
    };

    let decoded = BinaryEnvelopeCodec
        .decode_server(&envelope.encode())
        .unwrap();

    assert_eq!(decoded, envelope);
}

#[test]
fn test_status_reply_keeps_negative_values() {
    let envelope = ServerEnvelope::Reply {
        in_reply_to: 1,
        reply: Reply::Status { value: -3 },
    };

    assert_eq!(ServerEnvelope::decode(&envelope.encode()).unwrap(), envelope);
}

#[test]
fn test_truncated_broadcast_is_rejected() {
    let mut bytes = ServerEnvelope::Broadcast {
        topic_id: 9,
        payload: b"oops".to_vec(),
    }
    .encode();
    bytes.pop();

    assert!(matches!(
        ServerEnvelope::decode(&bytes),
        Err(EnvelopeDecodeError::Truncated { needed: 4, available: 3, .. })
    ));
}

#[test]
fn test_trailing_bytes_are_rejected() {
    let mut bytes = ServerEnvelope::Reply {
        in_reply_to: 1,
        reply: Reply::Status { value: 0 },
    }
    .encode();
    bytes.push(0xFF);

    assert_eq!(
        ServerEnvelope::decode(&bytes),
        Err(EnvelopeDecodeError::TrailingBytes(1))
    );
}

#[test]
fn test_unknown_tags_are_rejected() {
    assert_eq!(
        ServerEnvelope::decode(&[9]),
        Err(EnvelopeDecodeError::UnknownServerMessageKind(9))
    );
    assert_eq!(
        ServerEnvelope::decode(&[0, 1, 0, 0, 0, 7]),
        Err(EnvelopeDecodeError::UnknownReplyKind(7))
    );
    assert_eq!(
        ClientEnvelope::decode(&[1, 0, 0, 0, 5]),
        Err(EnvelopeDecodeError::UnknownRequestKind(5))
    );
}

#[test]
fn test_empty_buffer_is_truncated() {
    assert!(matches!(
        ServerEnvelope::decode(&[]),
        Err(EnvelopeDecodeError::Truncated { offset: 0, .. })
    ));
}

#[test]
fn test_sem_ver_display() {
    assert_eq!(SemVer::new(0, 3, 0).to_string(), "0.3.0");
}

#[test]
fn test_payload_length_prefix_limit() {
    assert_eq!(checked_payload_len(0), Ok(0));
    assert_eq!(checked_payload_len(MAX_ENVELOPE_PAYLOAD_LEN), Ok(u32::MAX));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_oversized_payload_length_is_rejected() {
    let len = MAX_ENVELOPE_PAYLOAD_LEN + 1;

    let err = checked_payload_len(len).unwrap_err();
    assert_eq!(
        err,
        EnvelopeEncodeError::PayloadTooLarge {
            len,
            max: MAX_ENVELOPE_PAYLOAD_LEN,
        }
    );
    assert!(err.to_string().contains("4294967296"));
}
