//! Slack Web API access for the onboarding tutorial.
//!
//! [`ChatApi`] is the seam the dispatcher talks to; [`SlackService`] is the
//! production implementation over `slack-morphism`'s hyper client.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiChatUpdateRequest, SlackApiConversationsOpenRequest,
    SlackApiToken, SlackApiTokenType, SlackApiTokenValue, SlackBlock, SlackChannelId, SlackClient,
    SlackClientHyperHttpsConnector, SlackClientSession, SlackMessageContent, SlackTs, SlackUserId,
};
use tracing::{debug, info};

use crate::models::tutorial::{TutorialMessage, TutorialRequest};
use crate::{AppError, Result};

/// Boxed future returned by [`ChatApi`] methods.
pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Chat platform operations the relay depends on.
pub trait ChatApi: Send + Sync {
    /// Open (or reuse) a direct-message conversation with `user_id` and
    /// return its channel id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`] if the API call fails.
    fn open_direct_channel(&self, user_id: String) -> ChatFuture<'_, String>;

    /// Post or update a tutorial message, returning the resulting message
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`] if the API call fails.
    fn send_tutorial(&self, request: TutorialRequest) -> ChatFuture<'_, String>;
}

/// `slack-morphism` backed [`ChatApi`] authenticated with the bot token.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
}

impl SlackService {
    /// Build the HTTPS client for the given bot token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn new(bot_token: &str) -> Result<Self> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let client = Arc::new(SlackClient::new(connector));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(bot_token.to_owned()))
            .with_token_type(SlackApiTokenType::Bot);

        info!("slack web api client initialised");

        Ok(Self { client, bot_token })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    async fn open_direct(&self, user_id: String) -> Result<String> {
        let request =
            SlackApiConversationsOpenRequest::new().with_users(vec![SlackUserId(user_id.clone())]);
        let response = self
            .http_session()
            .conversations_open(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to open dm with {user_id}: {err}")))?;
        let channel = response.channel.id.to_string();
        debug!(user_id, channel, "opened direct channel");
        Ok(channel)
    }

    async fn post(&self, message: TutorialMessage) -> Result<String> {
        let channel = message.channel.clone();
        let request = SlackApiChatPostMessageRequest::new(
            SlackChannelId(message.channel),
            content(message.text, message.blocks),
        )
        .with_username(message.username)
        .with_icon_emoji(message.icon_emoji);

        let response = self
            .http_session()
            .chat_post_message(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to post to {channel}: {err}")))?;
        Ok(response.ts.to_string())
    }

    async fn update(&self, ts: String, message: TutorialMessage) -> Result<String> {
        let channel = message.channel.clone();
        let request = SlackApiChatUpdateRequest::new(
            SlackChannelId(message.channel),
            content(message.text, message.blocks),
            SlackTs(ts),
        );

        let response = self
            .http_session()
            .chat_update(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to update message in {channel}: {err}")))?;
        Ok(response.ts.to_string())
    }
}

fn content(text: String, blocks: Vec<SlackBlock>) -> SlackMessageContent {
    SlackMessageContent::new().with_text(text).with_blocks(blocks)
}

impl ChatApi for SlackService {
    fn open_direct_channel(&self, user_id: String) -> ChatFuture<'_, String> {
        Box::pin(self.open_direct(user_id))
    }

    fn send_tutorial(&self, request: TutorialRequest) -> ChatFuture<'_, String> {
        Box::pin(async move {
            match request {
                TutorialRequest::Post(message) => self.post(message).await,
                TutorialRequest::Update { ts, message } => self.update(ts, message).await,
            }
        })
    }
}
