//! Message forwarding and the `start` keyword.
//!
//! Every message is rendered to markdown and forwarded to the webhook. A
//! message carrying attachments is treated as a crash report (first
//! attachment only); anything else is forwarded as a plain notice. A message
//! whose display text is `start` additionally begins onboarding in the
//! channel it was sent in.

use tracing::{info, warn};

use crate::forward::markdown;
use crate::models::crash_report::{format_event_time, CrashReport};
use crate::models::event::{Attachment, MessageEvent};
use crate::slack::events::RelayState;
use crate::slack::handlers::onboarding;

const START_KEYWORD: &str = "start";
const MISSING_TEXT: &str = "null";

/// Markdown prepared for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Text checked against the `start` keyword: the attachment fallback for
    /// crash reports, the message text otherwise.
    pub display_text: String,
    /// Body forwarded to the webhook.
    pub markdown: String,
}

/// Result of handling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageOutcome {
    /// Whether the webhook accepted the report.
    pub forwarded: bool,
    /// Whether an onboarding tutorial was posted.
    pub onboarding_started: bool,
}

/// Render the webhook markdown for `message`.
///
/// Crash reports that cannot be rendered safely fall back to the plain
/// notice built from the attachment fallback text.
#[must_use]
pub fn render_message(message: &MessageEvent, event_time: Option<i64>) -> RenderedMessage {
    let timestamp = format_event_time(event_time);

    match message.attachments.as_deref().and_then(<[Attachment]>::first) {
        Some(attachment) => {
            let report = CrashReport::from_attachment(attachment, timestamp);
            let markdown = markdown::render_crash_report(&report).unwrap_or_else(|err| {
                warn!(%err, "crash report rendering failed; forwarding plain notice");
                markdown::render_plain(&report.summary_text, &report.timestamp)
            });
            RenderedMessage {
                display_text: report.summary_text,
                markdown,
            }
        }
        None => {
            let text = message
                .text
                .clone()
                .unwrap_or_else(|| MISSING_TEXT.to_owned());
            let markdown = markdown::render_plain(&text, &timestamp);
            RenderedMessage {
                display_text: text,
                markdown,
            }
        }
    }
}

/// Whether `text` asks for the onboarding tutorial.
#[must_use]
pub fn is_start_command(text: &str) -> bool {
    text.eq_ignore_ascii_case(START_KEYWORD)
}

/// Forward `message` and, when requested, start onboarding.
///
/// The two effects are independent: failure of one is logged and does not
/// prevent the other.
pub async fn handle_message(
    message: &MessageEvent,
    event_time: Option<i64>,
    state: &RelayState,
) -> MessageOutcome {
    let rendered = render_message(message, event_time);

    let forwarded = match state
        .call("webhook forward", state.sink.forward(rendered.markdown))
        .await
    {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "forwarding failed; report dropped");
            false
        }
    };

    let onboarding_started = if is_start_command(&rendered.display_text) {
        match (message.user.as_deref(), message.channel.as_deref()) {
            (Some(user), Some(channel)) => {
                info!(channel, user, "start keyword received");
                match onboarding::start_onboarding(user, channel, state).await {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(%err, channel, user, "onboarding start failed");
                        false
                    }
                }
            }
            _ => {
                warn!("start keyword without user or channel ignored");
                false
            }
        }
    } else {
        false
    };

    MessageOutcome {
        forwarded,
        onboarding_started,
    }
}
