//! Normalized crash report extracted from a Slack message attachment.
//!
//! Crash reporters post a legacy attachment whose `fallback` is a short
//! description and whose `fields` carry `Platform`, `Version` and a
//! `Summary` of the form `<url|stack excerpt>`. Parsing is total: missing or
//! malformed pieces degrade to empty strings.

use chrono::{Local, TimeZone};
use tracing::debug;

use crate::models::event::Attachment;

/// Display format for crash timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SUMMARY_TITLE: &str = "Summary";
const PLATFORM_TITLE: &str = "Platform";
const VERSION_TITLE: &str = "Version";

/// Crash report fields ready for markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrashReport {
    /// Short description (attachment `fallback`, or `"null"`).
    pub summary_text: String,
    /// Reporting platform, empty when absent.
    pub platform: String,
    /// Application version, empty when absent.
    pub version: String,
    /// URL half of the summary field.
    pub detail_link: String,
    /// Label half of the summary field (usually a stack excerpt).
    pub detail_label: String,
    /// Event time formatted with [`TIMESTAMP_FORMAT`] in local time.
    pub timestamp: String,
}

impl CrashReport {
    /// Extract a report from `attachment`, stamping it with `timestamp`.
    #[must_use]
    pub fn from_attachment(attachment: &Attachment, timestamp: impl Into<String>) -> Self {
        let summary_text = attachment
            .fallback
            .clone()
            .unwrap_or_else(|| "null".to_owned());

        let mut platform = String::new();
        let mut version = String::new();
        let mut summary = String::new();

        for field in attachment.fields.iter().flatten() {
            let value = field.value.clone().unwrap_or_default();
            match field.title.as_deref() {
                Some(SUMMARY_TITLE) => summary = value,
                Some(PLATFORM_TITLE) => platform = value,
                Some(VERSION_TITLE) => version = value,
                _ => {}
            }
        }

        let (detail_link, detail_label) = split_link(unwrap_summary(&summary));

        Self {
            summary_text,
            platform,
            version,
            detail_link: detail_link.to_owned(),
            detail_label: detail_label.to_owned(),
            timestamp: timestamp.into(),
        }
    }
}

/// Strip the `<` … `>` delimiters Slack wraps around link markup.
///
/// Anything that is not a wrapped value (too short, or missing either
/// delimiter) degrades to an empty string.
#[must_use]
pub fn unwrap_summary(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.chars().count() < 2 {
        return "";
    }
    trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or_else(|| {
            debug!(summary = trimmed, "summary field is not angle-bracket wrapped");
            ""
        })
}

/// Split `url|label` at the first pipe. Without a pipe the whole value is
/// the label and the link is empty.
#[must_use]
pub fn split_link(summary: &str) -> (&str, &str) {
    summary.split_once('|').unwrap_or(("", summary))
}

/// Format an Events API `event_time` in local time.
///
/// A missing or out-of-range timestamp falls back to the current time.
#[must_use]
pub fn format_event_time(event_time: Option<i64>) -> String {
    event_time
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Local::now)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
