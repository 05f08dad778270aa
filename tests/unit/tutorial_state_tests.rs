//! Unit tests for tutorial progress tracking and payload selection.

use crash_relay::models::tutorial::{
    TaskId, TutorialRequest, TutorialState, TUTORIAL_ICON_EMOJI, TUTORIAL_USERNAME,
};

fn blocks_json(request: &TutorialRequest) -> String {
    serde_json::to_string(&request.message().blocks).expect("serialise blocks")
}

#[test]
fn new_tutorial_has_nothing_completed() {
    let state = TutorialState::new("D1");
    assert_eq!(state.channel(), "D1");
    assert_eq!(state.message_ts(), None);
    assert!(state.completed_tasks().is_empty());
    assert!(!state.is_finished());
}

#[test]
fn first_render_is_a_post() {
    let request = TutorialState::new("D1").render_payload();
    assert!(!request.is_update());
    let message = request.message();
    assert_eq!(message.channel, "D1");
    assert_eq!(message.username, TUTORIAL_USERNAME);
    assert_eq!(message.icon_emoji, TUTORIAL_ICON_EMOJI);
    assert!(!message.text.is_empty());
}

#[test]
fn render_after_timestamp_is_an_update() {
    let mut state = TutorialState::new("D1");
    state.record_timestamp("1700000000.000100");

    match state.render_payload() {
        TutorialRequest::Update { ts, message } => {
            assert_eq!(ts, "1700000000.000100");
            assert_eq!(message.channel, "D1");
        }
        TutorialRequest::Post(_) => panic!("expected update"),
    }
}

#[test]
fn marking_is_idempotent() {
    let mut state = TutorialState::new("D1");
    state.mark_task_completed(TaskId::Pin);
    state.mark_task_completed(TaskId::Pin);
    assert_eq!(state.completed_tasks().len(), 1);
    assert!(state.is_completed(TaskId::Pin));
    assert!(!state.is_completed(TaskId::Reaction));
}

#[test]
fn finished_once_every_task_is_done() {
    let mut state = TutorialState::new("D1");
    for task in TaskId::ALL {
        assert!(!state.is_finished());
        state.mark_task_completed(task);
    }
    assert!(state.is_finished());
}

#[test]
fn render_reflects_completion_marks() {
    let mut state = TutorialState::new("D1");
    let before = blocks_json(&state.render_payload());
    assert_eq!(before.matches(":white_large_square:").count(), 2);
    assert!(!before.contains(":white_check_mark:"));

    state.mark_task_completed(TaskId::Reaction);
    let after = blocks_json(&state.render_payload());
    assert!(after.contains(":white_check_mark: *Add an emoji reaction"));
    assert!(after.contains(":white_large_square: *Pin this message"));
}

#[test]
fn render_block_layout_is_stable() {
    let request = TutorialState::new("D1").render_payload();
    let blocks = serde_json::to_value(&request.message().blocks).expect("serialise");
    let kinds: Vec<&str> = blocks
        .as_array()
        .expect("array")
        .iter()
        .map(|block| block["type"].as_str().expect("type"))
        .collect();
    assert_eq!(
        kinds,
        vec!["section", "divider", "section", "context", "divider", "section", "context"]
    );
}

#[test]
fn task_names_are_stable() {
    assert_eq!(TaskId::Reaction.as_str(), "reaction");
    assert_eq!(TaskId::Pin.as_str(), "pin");
    assert_eq!(
        serde_json::to_string(&TaskId::Reaction).expect("serialise"),
        "\"reaction\""
    );
}
