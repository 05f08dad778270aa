//! Unit tests for Events API envelope decoding and event classification.

use serde_json::json;

use crash_relay::models::event::{EventEnvelope, JoinedUser, ReactionItem, SlackEvent};

fn callback(event: serde_json::Value) -> EventEnvelope {
    serde_json::from_value(json!({
        "type": "event_callback",
        "event_id": "Ev1",
        "event_time": 1_700_000_000,
        "event": event,
    }))
    .expect("envelope decodes")
}

#[test]
fn url_verification_is_recognised() {
    let envelope = EventEnvelope::from_slice(
        br#"{"token":"x","challenge":"abc","type":"url_verification"}"#,
    )
    .expect("decodes");
    assert!(envelope.is_url_verification());
    assert_eq!(envelope.challenge.as_deref(), Some("abc"));
    assert!(envelope.event.is_none());
}

#[test]
fn non_json_body_is_a_parse_error() {
    let err = EventEnvelope::from_slice(b"not json").expect_err("must fail");
    assert!(err.to_string().starts_with("parse: "), "{err}");
}

#[test]
fn envelope_metadata_is_exposed() {
    let envelope = callback(json!({ "type": "team_join", "user": { "id": "U1" } }));
    assert!(!envelope.is_url_verification());
    assert_eq!(envelope.event_type(), Some("team_join"));
    assert_eq!(envelope.event_id.as_deref(), Some("Ev1"));
    assert_eq!(envelope.event_time, Some(1_700_000_000));
}

#[test]
fn team_join_classifies() {
    let event = callback(json!({ "type": "team_join", "user": { "id": "U1", "name": "ada" } }))
        .classify()
        .expect("classifies");
    assert_eq!(
        event,
        SlackEvent::TeamJoin {
            user: JoinedUser { id: "U1".into() }
        }
    );
}

#[test]
fn reaction_on_file_has_no_channel() {
    let event = callback(json!({
        "type": "reaction_added",
        "user": "U1",
        "reaction": "tada",
        "item": { "type": "file", "file": "F1" },
    }))
    .classify()
    .expect("classifies");
    assert_eq!(
        event,
        SlackEvent::ReactionAdded {
            user: "U1".into(),
            item: ReactionItem { channel: None },
        }
    );
}

#[test]
fn pin_added_classifies() {
    let event = callback(json!({ "type": "pin_added", "user": "U1", "channel_id": "C1" }))
        .classify()
        .expect("classifies");
    assert_eq!(
        event,
        SlackEvent::PinAdded {
            user: "U1".into(),
            channel_id: "C1".into(),
        }
    );
}

#[test]
fn message_with_attachments_classifies() {
    let event = callback(json!({
        "type": "message",
        "channel": "C1",
        "attachments": [{ "fallback": "crash", "fields": [{ "title": "Platform", "value": "iOS" }] }],
    }))
    .classify()
    .expect("classifies");

    let SlackEvent::Message(message) = event else {
        panic!("expected message event");
    };
    assert_eq!(message.channel.as_deref(), Some("C1"));
    assert_eq!(message.user, None);
    let attachments = message.attachments.expect("attachments");
    assert_eq!(attachments[0].fallback.as_deref(), Some("crash"));
}

#[test]
fn unknown_event_type_is_unsupported() {
    let event = callback(json!({ "type": "emoji_changed", "subtype": "add" }))
        .classify()
        .expect("classifies");
    assert_eq!(event, SlackEvent::Unsupported);
}

#[test]
fn missing_required_field_is_a_parse_error() {
    let err = callback(json!({ "type": "team_join" }))
        .classify()
        .expect_err("must fail");
    assert!(
        err.to_string().starts_with("parse: malformed team_join event"),
        "{err}"
    );
}

#[test]
fn envelope_without_event_cannot_classify() {
    let envelope = EventEnvelope::from_slice(br#"{"type":"event_callback"}"#).expect("decodes");
    assert_eq!(envelope.event_type(), None);
    assert!(envelope.classify().is_err());
}
