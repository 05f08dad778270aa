//! Relay configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Environment variable holding the Slack request-signing secret.
pub const SIGNING_SECRET_ENV: &str = "SLACK_SIGNING_SECRET";
/// Environment variable holding the Slack bot token.
pub const BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
/// Environment variable holding the WeCom group-robot webhook URL.
pub const WEBHOOK_URL_ENV: &str = "WECHAT_BOT_WEBHOOK";

/// Secrets required to talk to Slack and the outbound webhook.
///
/// Never read from the TOML file; populated from the environment at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Secret used to verify inbound Slack request signatures.
    pub signing_secret: String,
    /// Bot user token used for `conversations.open`, `chat.postMessage`, `chat.update`.
    pub bot_token: String,
    /// Destination URL for forwarded markdown reports.
    pub webhook_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("signing_secret", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("webhook_url", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve every credential through `lookup`, treating empty values as missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first variable that is absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("required env var {key} is not set")))
        };

        Ok(Self {
            signing_secret: require(SIGNING_SECRET_ENV)?,
            bot_token: require(BOT_TOKEN_ENV)?,
            webhook_url: require(WEBHOOK_URL_ENV)?,
        })
    }
}

fn default_http_host() -> String {
    "127.0.0.1".into()
}

fn default_http_port() -> u16 {
    3000
}

fn default_events_path() -> String {
    "/slack/events".into()
}

fn default_outbound_timeout() -> u64 {
    10
}

fn default_signature_tolerance() -> u64 {
    300
}

/// Relay configuration parsed from an optional `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RelayConfig {
    /// Interface the HTTP listener binds to.
    #[serde(default = "default_http_host")]
    pub http_host: String,
    /// Port the HTTP listener binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Route that receives Slack Events API deliveries.
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Upper bound for any single outbound call.
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_seconds: u64,
    /// Maximum accepted age of a signed inbound request.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_seconds: u64,
    /// Secrets (populated at runtime).
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            events_path: default_events_path(),
            outbound_timeout_seconds: default_outbound_timeout(),
            signature_tolerance_seconds: default_signature_tolerance(),
            credentials: Credentials::default(),
        }
    }
}

impl RelayConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load credentials from `SLACK_SIGNING_SECRET`, `SLACK_BOT_TOKEN` and
    /// `WECHAT_BOT_WEBHOOK`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any of the variables is unset or empty.
    pub fn load_credentials(&mut self) -> Result<()> {
        self.credentials = Credentials::from_lookup(|key| env::var(key).ok())?;
        Ok(())
    }

    /// Deadline applied to each outbound call.
    #[must_use]
    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_seconds)
    }

    /// `host:port` string the listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    fn validate(&self) -> Result<()> {
        if !self.events_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "events_path must start with '/': {}",
                self.events_path
            )));
        }

        if self.outbound_timeout_seconds == 0 {
            return Err(AppError::Config(
                "outbound_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.signature_tolerance_seconds == 0 {
            return Err(AppError::Config(
                "signature_tolerance_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
