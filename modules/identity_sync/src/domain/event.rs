use serde::Deserialize;

use crate::contract::model::{EventKind, InboundEvent};
use crate::domain::error::DomainError;

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: Option<String>,
    #[serde(default)]
    email_addresses: Option<Vec<RawEmail>>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEmail {
    email_address: Option<String>,
}

/// Decode a verified webhook body into an [`InboundEvent`].
///
/// Unknown fields are ignored; only `type` and `data.id` are required.
pub fn decode_event(body: &[u8]) -> Result<InboundEvent, DomainError> {
    let raw: RawEnvelope = serde_json::from_slice(body)
        .map_err(|e| DomainError::malformed(format!("invalid JSON body: {e}")))?;

    let kind = raw
        .kind
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| DomainError::malformed("missing field `type`"))?;
    let data = raw
        .data
        .ok_or_else(|| DomainError::malformed("missing field `data`"))?;
    let subject_id = data
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| DomainError::malformed("missing field `data.id`"))?;

    let email = data
        .email_addresses
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|e| e.email_address)
        .filter(|e| !e.is_empty());

    Ok(InboundEvent {
        kind: EventKind::from_wire(&kind),
        subject_id,
        email,
        first_name: data.first_name,
        last_name: data.last_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_created_event() {
        let body = br#"{
            "type": "user.created",
            "object": "event",
            "data": {
                "id": "u1",
                "first_name": "Ana",
                "last_name": "Silva",
                "email_addresses": [
                    {"id": "idn_1", "email_address": "ana@x.com"},
                    {"id": "idn_2", "email_address": "other@x.com"}
                ],
                "image_url": "https://img"
            }
        }"#;

        let event = decode_event(body).unwrap();
        assert_eq!(event.kind, EventKind::UserCreated);
        assert_eq!(event.subject_id, "u1");
        assert_eq!(event.email.as_deref(), Some("ana@x.com"));
        assert_eq!(event.full_name().as_deref(), Some("Ana Silva"));
    }

    #[test]
    fn deleted_event_needs_only_id() {
        let event = decode_event(br#"{"type":"user.deleted","data":{"id":"u1","deleted":true}}"#)
            .unwrap();
        assert_eq!(event.kind, EventKind::UserDeleted);
        assert_eq!(event.email, None);
        assert_eq!(event.full_name(), None);
    }

    #[test]
    fn empty_or_null_email_list_yields_none() {
        for body in [
            br#"{"type":"user.updated","data":{"id":"u1","email_addresses":[]}}"#.as_slice(),
            br#"{"type":"user.updated","data":{"id":"u1","email_addresses":null}}"#.as_slice(),
            br#"{"type":"user.updated","data":{"id":"u1","first_name":null}}"#.as_slice(),
        ] {
            assert_eq!(decode_event(body).unwrap().email, None);
        }
    }

    #[test]
    fn unknown_type_is_kept_as_other() {
        let event = decode_event(br#"{"type":"session.created","data":{"id":"sess_1"}}"#).unwrap();
        assert_eq!(event.kind, EventKind::Other("session.created".into()));
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        let cases: [(&[u8], &str); 5] = [
            (br#"{"data":{"id":"u1"}}"#, "`type`"),
            (br#"{"type":"","data":{"id":"u1"}}"#, "`type`"),
            (br#"{"type":"user.created"}"#, "`data`"),
            (br#"{"type":"user.created","data":{}}"#, "`data.id`"),
            (br#"{"type":"user.created","data":{"id":"  "}}"#, "`data.id`"),
        ];

        for (body, field) in cases {
            let err = decode_event(body).unwrap_err();
            assert!(matches!(err, DomainError::MalformedPayload { .. }));
            assert!(err.to_string().contains(field), "{err} should name {field}");
        }
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        for body in [
            b"not json".as_slice(),
            b"[]".as_slice(),
            br#"{"type":42,"data":{"id":"u1"}}"#.as_slice(),
            br#"{"type":"user.created","data":{"id":7}}"#.as_slice(),
        ] {
            assert!(matches!(
                decode_event(body).unwrap_err(),
                DomainError::MalformedPayload { .. }
            ));
        }
    }
}
