//! Outbound delivery of markdown reports to the group-robot webhook.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{AppError, Result};

/// Boxed future returned by [`MarkdownSink::forward`].
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Destination for rendered markdown reports.
pub trait MarkdownSink: Send + Sync {
    /// Deliver `content` as a markdown message.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Webhook`] if delivery fails.
    fn forward(&self, content: String) -> SinkFuture<'_>;
}

/// Acknowledgement body returned by the group-robot API.
#[derive(Debug, Deserialize)]
struct WebhookAck {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Build the JSON body the webhook expects for a markdown message.
#[must_use]
pub fn markdown_body(content: &str) -> serde_json::Value {
    json!({
        "msgtype": "markdown",
        "markdown": { "content": content },
    })
}

/// `reqwest` backed [`MarkdownSink`] posting to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    http: reqwest::Client,
    url: String,
}

impl WebhookForwarder {
    /// Create a forwarder for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Webhook` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Webhook(format!("failed to create webhook client: {err}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn deliver(&self, content: String) -> Result<()> {
        let body = markdown_body(&content);
        debug!(bytes = content.len(), "posting markdown to webhook");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        // Non-JSON acknowledgements are tolerated; only an explicit errcode fails.
        let text = response.text().await?;
        if let Ok(ack) = serde_json::from_str::<WebhookAck>(&text) {
            if ack.errcode != 0 {
                return Err(AppError::Webhook(format!(
                    "webhook rejected message: {} ({})",
                    ack.errmsg, ack.errcode
                )));
            }
        }

        info!("forwarded markdown report");
        Ok(())
    }
}

impl MarkdownSink for WebhookForwarder {
    fn forward(&self, content: String) -> SinkFuture<'_> {
        Box::pin(self.deliver(content))
    }
}
