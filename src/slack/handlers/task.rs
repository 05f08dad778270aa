//! Tutorial task completion (`reaction_added`, `pin_added`).

use tracing::{debug, info};

use crate::models::tutorial::TaskId;
use crate::slack::events::RelayState;
use crate::Result;

/// Mark `task` completed on the tutorial tracked for `(channel, user_id)`,
/// re-render it in place, and record the new message timestamp.
///
/// Returns `Ok(false)` without any outbound call when no tutorial is tracked
/// for the key.
///
/// # Errors
///
/// Returns the Slack or timeout error from `chat.update`. The completed task
/// stays recorded so the next successful render shows it.
pub async fn complete_task(
    channel: &str,
    user_id: &str,
    task: TaskId,
    state: &RelayState,
) -> Result<bool> {
    let Some(handle) = state.store.get(channel, user_id).await else {
        debug!(channel, user_id, task = task.as_str(), "no tutorial tracked");
        return Ok(false);
    };

    let mut tutorial = handle.lock().await;
    tutorial.mark_task_completed(task);

    let request = tutorial.render_payload();
    let method = if request.is_update() {
        "chat.update"
    } else {
        "chat.postMessage"
    };
    let ts = state
        .call(method, state.chat.send_tutorial(request))
        .await?;
    tutorial.record_timestamp(ts.as_str());

    info!(
        channel,
        user_id,
        task = task.as_str(),
        finished = tutorial.is_finished(),
        "tutorial task completed"
    );
    Ok(true)
}
