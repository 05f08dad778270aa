//! Markdown rendering for the WeCom group-robot webhook.
//!
//! The layout uses WeCom's markdown dialect (`<font color="warning">`,
//! `>` quote lines) and must stay byte-compatible with what the downstream
//! group chat renders.

use crate::models::crash_report::CrashReport;
use crate::{AppError, Result};

const CRASH_NOTICE: &str = "发生了异常崩溃,请相关同事注意。";
const PLAIN_NOTICE: &str = "异常信息,请相关同事注意。";

fn warning(text: &str) -> String {
    format!("<font color=\"warning\">{text}</font>")
}

/// Render a crash report.
///
/// A report without a detail link renders its label as plain text.
///
/// # Errors
///
/// Returns `AppError::Format` if the link or label would break the markdown
/// link syntax; callers should fall back to [`render_plain`].
pub fn render_crash_report(report: &CrashReport) -> Result<String> {
    let detail = if report.detail_link.is_empty() {
        report.detail_label.clone()
    } else {
        validate_link(&report.detail_link, &report.detail_label)?;
        format!("[{}]({})", report.detail_label, report.detail_link)
    };

    Ok(format!(
        "{summary}\n\n{CRASH_NOTICE}\n\n>崩溃终端:{platform}\n\n>版本号:{version}\n\n>崩溃时间:{time}\n\n>崩溃信息:{detail}",
        summary = warning(&report.summary_text),
        platform = warning(&report.platform),
        version = warning(&report.version),
        time = warning(&report.timestamp),
    ))
}

/// Render a message that carried no attachment.
#[must_use]
pub fn render_plain(text: &str, timestamp: &str) -> String {
    format!(
        "{}\n\n{PLAIN_NOTICE}\n>异常时间:{}",
        warning(text),
        warning(timestamp)
    )
}

fn validate_link(link: &str, label: &str) -> Result<()> {
    if link
        .chars()
        .any(|c| c.is_whitespace() || c == '(' || c == ')')
    {
        return Err(AppError::Format(format!(
            "detail link is not a markdown-safe url: {link}"
        )));
    }
    if label.contains('[') || label.contains(']') {
        return Err(AppError::Format(
            "detail label contains square brackets".into(),
        ));
    }
    Ok(())
}
