//! Outbound failure handling: drops are logged, state stays consistent.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crash_relay::models::tutorial::TaskId;
use crash_relay::slack::events::DispatchOutcome;

use super::test_helpers::{
    dispatcher, dispatcher_with_timeout, envelope, ChatCall, RecordingChat, RecordingSink,
};

#[tokio::test]
async fn webhook_failure_does_not_block_onboarding() {
    let chat = Arc::new(RecordingChat::default());
    let sink = Arc::new(RecordingSink::default());
    sink.set_failing(true);
    let dispatcher = dispatcher(&chat, &sink);

    let outcome = dispatcher
        .dispatch(envelope(json!({
            "type": "message",
            "text": "start",
            "user": "U1",
            "channel": "C1",
        })))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::MessageHandled {
            forwarded: false,
            onboarding_started: true,
        }
    );
    assert_eq!(sink.forwarded().len(), 1, "forward was attempted once");
    assert!(dispatcher.store().get("C1", "U1").await.is_some());
}

#[tokio::test]
async fn onboarding_failure_does_not_block_forwarding() {
    let chat = Arc::new(RecordingChat::default());
    chat.set_failing(true);
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = dispatcher(&chat, &sink);

    let outcome = dispatcher
        .dispatch(envelope(json!({
            "type": "message",
            "text": "start",
            "user": "U1",
            "channel": "C1",
        })))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::MessageHandled {
            forwarded: true,
            onboarding_started: false,
        }
    );

    let handle = dispatcher.store().get("C1", "U1").await.expect("tracked");
    assert_eq!(handle.lock().await.message_ts(), None);
}

#[tokio::test]
async fn failed_dm_open_drops_team_join_without_tracking() {
    let chat = Arc::new(RecordingChat::default());
    chat.set_failing(true);
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = dispatcher(&chat, &sink);

    let outcome = dispatcher
        .dispatch(envelope(json!({ "type": "team_join", "user": { "id": "U1" } })))
        .await;

    match outcome {
        DispatchOutcome::Dropped(reason) => assert!(reason.starts_with("slack: "), "{reason}"),
        other => panic!("expected Dropped, got {other:?}"),
    }
    assert_eq!(chat.calls(), vec![ChatCall::OpenDirect("U1".into())]);
    assert!(dispatcher.store().is_empty().await);
}

#[tokio::test]
async fn failed_update_keeps_task_and_previous_timestamp() {
    let chat = Arc::new(RecordingChat::with_direct_channel("C1"));
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = dispatcher(&chat, &sink);

    dispatcher
        .dispatch(envelope(json!({ "type": "team_join", "user": { "id": "U1" } })))
        .await;

    chat.set_failing(true);
    let outcome = dispatcher
        .dispatch(envelope(json!({ "type": "pin_added", "user": "U1", "channel_id": "C1" })))
        .await;
    assert!(matches!(outcome, DispatchOutcome::Dropped(_)));

    let handle = dispatcher.store().get("C1", "U1").await.expect("tracked");
    {
        let tutorial = handle.lock().await;
        assert!(tutorial.is_completed(TaskId::Pin));
        assert_eq!(tutorial.message_ts(), Some("ts-1"));
    }

    chat.set_failing(false);
    let outcome = dispatcher
        .dispatch(envelope(json!({
            "type": "reaction_added",
            "user": "U1",
            "item": { "channel": "C1" },
        })))
        .await;
    assert!(matches!(outcome, DispatchOutcome::TaskCompleted { .. }));
    assert!(handle.lock().await.is_finished());
}

#[tokio::test]
async fn slow_chat_call_times_out() {
    let chat = Arc::new(RecordingChat::with_delay(Duration::from_millis(500)));
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = dispatcher_with_timeout(&chat, &sink, Duration::from_millis(50));

    let outcome = dispatcher
        .dispatch(envelope(json!({ "type": "team_join", "user": { "id": "U1" } })))
        .await;

    match outcome {
        DispatchOutcome::Dropped(reason) => {
            assert!(reason.starts_with("timeout: "), "{reason}");
            assert!(reason.contains("conversations.open"), "{reason}");
        }
        other => panic!("expected Dropped, got {other:?}"),
    }
    assert!(dispatcher.store().is_empty().await);
}

#[tokio::test]
async fn malformed_event_body_is_dropped_as_parse_error() {
    let chat = Arc::new(RecordingChat::default());
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = dispatcher(&chat, &sink);

    let outcome = dispatcher
        .dispatch(envelope(json!({ "type": "pin_added", "user": "U1" })))
        .await;

    match outcome {
        DispatchOutcome::Dropped(reason) => {
            assert!(reason.starts_with("parse: malformed pin_added event"), "{reason}");
        }
        other => panic!("expected Dropped, got {other:?}"),
    }
    assert!(chat.calls().is_empty());
}
