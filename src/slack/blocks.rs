//! Slack Block Kit builders for the onboarding tutorial message.

use slack_morphism::prelude::{
    SlackBlock, SlackBlockMarkDownText, SlackBlockText, SlackContextBlock,
    SlackContextBlockElement, SlackDividerBlock, SlackSectionBlock,
};

use crate::models::tutorial::TaskId;

const WELCOME_TEXT: &str = "Welcome to Slack! :wave: We're so glad you're here. :blush:\n\n\
                            *Get started by completing the steps below:*";

const DONE_MARK: &str = ":white_check_mark:";
const TODO_MARK: &str = ":white_large_square:";

/// Build a markdown section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

/// Build a context block holding a single markdown element.
#[must_use]
pub fn context_line(text: &str) -> SlackBlock {
    SlackBlock::Context(SlackContextBlock::new(vec![
        SlackContextBlockElement::MarkDown(SlackBlockMarkDownText::new(text.to_owned())),
    ]))
}

/// Build a divider block.
#[must_use]
pub fn divider() -> SlackBlock {
    SlackBlock::Divider(SlackDividerBlock::new())
}

/// Greeting shown at the top of every tutorial rendering.
#[must_use]
pub fn welcome_section() -> SlackBlock {
    text_section(WELCOME_TEXT)
}

/// Checkbox emoji for a task's completion state.
#[must_use]
pub fn checkmark(completed: bool) -> &'static str {
    if completed {
        DONE_MARK
    } else {
        TODO_MARK
    }
}

/// Section plus help context describing one task.
#[must_use]
pub fn task_blocks(task: TaskId, completed: bool) -> Vec<SlackBlock> {
    let mark = checkmark(completed);
    let (body, help) = match task {
        TaskId::Reaction => (
            format!(
                "{mark} *Add an emoji reaction to this message* :thinking_face:\n\
                 You can quickly respond to any message on Slack with an emoji reaction. \
                 Reactions can be used for any purpose: voting, checking off to-do items, \
                 showing excitement."
            ),
            ":information_source: *<https://get.slack.help/hc/en-us/articles/206870317-Emoji-reactions|\
             Learn How to Use Emoji Reactions>*",
        ),
        TaskId::Pin => (
            format!(
                "{mark} *Pin this message* :round_pushpin:\n\
                 Important messages and files can be pinned to the details pane in any channel \
                 or direct message, including group messages, for easy reference."
            ),
            ":information_source: *<https://get.slack.help/hc/en-us/articles/205239997-Pinning-messages-and-files|\
             Learn How to Pin a Message>*",
        ),
    };
    vec![text_section(&body), context_line(help)]
}
