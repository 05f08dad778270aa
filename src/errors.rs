//! Error types shared across the relay.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all relay failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or credential loading failure.
    Config(String),
    /// Slack Web API failure (open DM, post, update).
    Slack(String),
    /// Outbound markdown webhook failure.
    Webhook(String),
    /// Inbound payload could not be decoded.
    Parse(String),
    /// Markdown rendering would produce malformed output.
    Format(String),
    /// An outbound call exceeded its deadline.
    Timeout(String),
    /// Inbound request failed signature verification.
    Unauthorized(String),
    /// Socket or other I/O failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Slack(msg) => write!(f, "slack: {msg}"),
            Self::Webhook(msg) => write!(f, "webhook: {msg}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::Format(msg) => write!(f, "format: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Webhook(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
