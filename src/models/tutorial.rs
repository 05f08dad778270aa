//! Onboarding tutorial progress and its Slack rendering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slack_morphism::prelude::SlackBlock;

use crate::slack::blocks;

/// Display name the tutorial message is posted under.
pub const TUTORIAL_USERNAME: &str = "Welcome Robot!";
/// Icon the tutorial message is posted with.
pub const TUTORIAL_ICON_EMOJI: &str = ":robot_face:";
/// Notification text for clients that cannot render blocks.
pub const TUTORIAL_FALLBACK_TEXT: &str =
    "Welcome to Slack! Complete the onboarding steps below to get started.";

/// A trackable onboarding action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    /// Add an emoji reaction to the tutorial message.
    Reaction,
    /// Pin the tutorial message.
    Pin,
}

impl TaskId {
    /// Every task, in display order.
    pub const ALL: [Self; 2] = [Self::Reaction, Self::Pin];

    /// Stable lowercase name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reaction => "reaction",
            Self::Pin => "pin",
        }
    }
}

/// Rendered tutorial message, independent of whether it is posted or updated.
#[derive(Debug, Clone)]
pub struct TutorialMessage {
    /// Conversation the tutorial lives in.
    pub channel: String,
    /// Bot display name override.
    pub username: String,
    /// Bot icon override.
    pub icon_emoji: String,
    /// Plain-text fallback.
    pub text: String,
    /// Block Kit body.
    pub blocks: Vec<SlackBlock>,
}

/// Outbound request shape chosen by [`TutorialState::render_payload`].
#[derive(Debug, Clone)]
pub enum TutorialRequest {
    /// First delivery via `chat.postMessage`.
    Post(TutorialMessage),
    /// Re-render via `chat.update` of the message at `ts`.
    Update {
        /// Timestamp of the message being replaced.
        ts: String,
        /// New content.
        message: TutorialMessage,
    },
}

impl TutorialRequest {
    /// The rendered message regardless of request shape.
    #[must_use]
    pub fn message(&self) -> &TutorialMessage {
        match self {
            Self::Post(message) | Self::Update { message, .. } => message,
        }
    }

    /// Whether this request replaces an existing message.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }
}

/// Progress of one tutorial instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialState {
    channel: String,
    message_ts: Option<String>,
    completed_tasks: BTreeSet<TaskId>,
}

impl TutorialState {
    /// Fresh tutorial targeting `channel` with nothing completed.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message_ts: None,
            completed_tasks: BTreeSet::new(),
        }
    }

    /// Target conversation.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Timestamp of the last successful post or update.
    #[must_use]
    pub fn message_ts(&self) -> Option<&str> {
        self.message_ts.as_deref()
    }

    /// Completed tasks in display order.
    #[must_use]
    pub fn completed_tasks(&self) -> &BTreeSet<TaskId> {
        &self.completed_tasks
    }

    /// Whether `task` has been completed.
    #[must_use]
    pub fn is_completed(&self, task: TaskId) -> bool {
        self.completed_tasks.contains(&task)
    }

    /// Whether every task has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        TaskId::ALL.iter().all(|task| self.is_completed(*task))
    }

    /// Mark `task` completed. Idempotent.
    pub fn mark_task_completed(&mut self, task: TaskId) {
        self.completed_tasks.insert(task);
    }

    /// Remember the timestamp Slack returned for the latest post or update.
    pub fn record_timestamp(&mut self, ts: impl Into<String>) {
        self.message_ts = Some(ts.into());
    }

    /// Build the outbound request reflecting current progress.
    #[must_use]
    pub fn render_payload(&self) -> TutorialRequest {
        let message = TutorialMessage {
            channel: self.channel.clone(),
            username: TUTORIAL_USERNAME.to_owned(),
            icon_emoji: TUTORIAL_ICON_EMOJI.to_owned(),
            text: TUTORIAL_FALLBACK_TEXT.to_owned(),
            blocks: self.render_blocks(),
        };

        match &self.message_ts {
            Some(ts) => TutorialRequest::Update {
                ts: ts.clone(),
                message,
            },
            None => TutorialRequest::Post(message),
        }
    }

    fn render_blocks(&self) -> Vec<SlackBlock> {
        let mut out = vec![blocks::welcome_section(), blocks::divider()];
        for (index, task) in TaskId::ALL.iter().enumerate() {
            if index > 0 {
                out.push(blocks::divider());
            }
            out.extend(blocks::task_blocks(*task, self.is_completed(*task)));
        }
        out
    }
}
