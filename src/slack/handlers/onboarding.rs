//! Onboarding tutorial start (`team_join` and the `start` keyword).

use tracing::info;

use crate::slack::events::RelayState;
use crate::Result;

/// Open a direct-message conversation with a newly joined user.
///
/// # Errors
///
/// Returns the Slack or timeout error from `conversations.open`.
pub async fn open_direct_channel(user_id: &str, state: &RelayState) -> Result<String> {
    state
        .call(
            "conversations.open",
            state.chat.open_direct_channel(user_id.to_owned()),
        )
        .await
}

/// Register a fresh tutorial for `(channel, user_id)`, post it, and record
/// the posted message timestamp.
///
/// The new tutorial stays locked for the whole post so task events for the
/// same key wait until the timestamp is known. If the post fails the entry
/// remains tracked without a timestamp; its next render posts a new message.
///
/// # Errors
///
/// Returns the Slack or timeout error from `chat.postMessage`.
pub async fn start_onboarding(user_id: &str, channel: &str, state: &RelayState) -> Result<()> {
    let handle = state.store.start(channel, user_id).await;
    let mut tutorial = handle.lock().await;

    let request = tutorial.render_payload();
    let ts = state
        .call("chat.postMessage", state.chat.send_tutorial(request))
        .await?;
    tutorial.record_timestamp(ts.as_str());

    info!(channel, user_id, ts, "onboarding tutorial posted");
    Ok(())
}
