//! Events API dispatch.
//!
//! Classifies each inbound envelope by its inner `event.type` and routes it
//! to the matching handler:
//!
//! | event            | handler                                          |
//! |------------------|--------------------------------------------------|
//! | `team_join`      | [`handlers::onboarding`]: open DM, post tutorial |
//! | `reaction_added` | [`handlers::task`]: mark reaction, update        |
//! | `pin_added`      | [`handlers::task`]: mark pin, update             |
//! | `message`        | [`handlers::message`]: forward, maybe onboard    |
//!
//! Outbound failures never escape [`EventDispatcher::dispatch`]: they are
//! logged and the event is dropped without retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::forward::webhook::MarkdownSink;
use crate::models::event::{EventEnvelope, SlackEvent};
use crate::models::tutorial::TaskId;
use crate::slack::client::ChatApi;
use crate::slack::handlers;
use crate::store::TutorialStore;
use crate::{AppError, Result};

/// Shared state handed to every event handler.
pub struct RelayState {
    /// Live onboarding tutorials.
    pub store: TutorialStore,
    /// Slack Web API.
    pub chat: Arc<dyn ChatApi>,
    /// Markdown webhook.
    pub sink: Arc<dyn MarkdownSink>,
    /// Deadline applied to every outbound call.
    pub outbound_timeout: Duration,
}

impl RelayState {
    /// Run an outbound call under the configured deadline.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or `AppError::Timeout` naming `what`
    /// when the deadline elapses first.
    pub async fn call<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.outbound_timeout, call)
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "{what} did not complete within {}s",
                    self.outbound_timeout.as_secs()
                ))
            })?
    }
}

/// What a single dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An onboarding tutorial was posted and is now tracked.
    TutorialStarted {
        /// Direct-message channel holding the tutorial.
        channel: String,
        /// User being onboarded.
        user: String,
    },
    /// A tracked tutorial recorded a completed task and was re-rendered.
    TaskCompleted {
        /// Tutorial channel.
        channel: String,
        /// Acting user.
        user: String,
        /// Task that was completed.
        task: TaskId,
    },
    /// A task event arrived for a `(channel, user)` with no tutorial.
    Untracked {
        /// Task the event would have completed.
        task: TaskId,
    },
    /// A message was processed.
    MessageHandled {
        /// Whether the markdown report reached the webhook.
        forwarded: bool,
        /// Whether the message triggered and completed an onboarding start.
        onboarding_started: bool,
    },
    /// The envelope carried nothing the relay acts on.
    Ignored,
    /// Processing failed; the event was dropped.
    Dropped(String),
}

/// Routes inbound events to handlers.
#[derive(Clone)]
pub struct EventDispatcher {
    state: Arc<RelayState>,
}

impl EventDispatcher {
    /// Create a dispatcher with an empty tutorial store.
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatApi>,
        sink: Arc<dyn MarkdownSink>,
        outbound_timeout: Duration,
    ) -> Self {
        Self::with_store(TutorialStore::new(), chat, sink, outbound_timeout)
    }

    /// Create a dispatcher over an existing store.
    #[must_use]
    pub fn with_store(
        store: TutorialStore,
        chat: Arc<dyn ChatApi>,
        sink: Arc<dyn MarkdownSink>,
        outbound_timeout: Duration,
    ) -> Self {
        Self {
            state: Arc::new(RelayState {
                store,
                chat,
                sink,
                outbound_timeout,
            }),
        }
    }

    /// Tutorials tracked by this dispatcher.
    #[must_use]
    pub fn store(&self) -> &TutorialStore {
        &self.state.store
    }

    /// Process one envelope to completion. Never fails; errors are logged.
    pub async fn dispatch(&self, envelope: EventEnvelope) -> DispatchOutcome {
        let span = info_span!(
            "dispatch_event",
            event_type = envelope.event_type().unwrap_or("none"),
            event_id = envelope.event_id.as_deref().unwrap_or(""),
        );

        async move {
            match self.route(&envelope).await {
                Ok(outcome) => {
                    debug!(?outcome, "event handled");
                    outcome
                }
                Err(err) => {
                    warn!(%err, "event dropped");
                    DispatchOutcome::Dropped(err.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn route(&self, envelope: &EventEnvelope) -> Result<DispatchOutcome> {
        if envelope.event.is_none() {
            debug!("envelope without event ignored");
            return Ok(DispatchOutcome::Ignored);
        }

        let state = &self.state;
        match envelope.classify()? {
            SlackEvent::TeamJoin { user } => {
                let channel = handlers::onboarding::open_direct_channel(&user.id, state).await?;
                handlers::onboarding::start_onboarding(&user.id, &channel, state).await?;
                Ok(DispatchOutcome::TutorialStarted {
                    channel,
                    user: user.id,
                })
            }
            SlackEvent::ReactionAdded { user, item } => {
                let Some(channel) = item.channel else {
                    debug!(user, "reaction on an item without a channel ignored");
                    return Ok(DispatchOutcome::Untracked {
                        task: TaskId::Reaction,
                    });
                };
                let tracked =
                    handlers::task::complete_task(&channel, &user, TaskId::Reaction, state).await?;
                Ok(Self::task_outcome(tracked, channel, user, TaskId::Reaction))
            }
            SlackEvent::PinAdded { user, channel_id } => {
                let tracked =
                    handlers::task::complete_task(&channel_id, &user, TaskId::Pin, state).await?;
                Ok(Self::task_outcome(tracked, channel_id, user, TaskId::Pin))
            }
            SlackEvent::Message(message) => {
                let outcome =
                    handlers::message::handle_message(&message, envelope.event_time, state).await;
                Ok(DispatchOutcome::MessageHandled {
                    forwarded: outcome.forwarded,
                    onboarding_started: outcome.onboarding_started,
                })
            }
            SlackEvent::Unsupported => {
                info!("unsupported event type ignored");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    fn task_outcome(tracked: bool, channel: String, user: String, task: TaskId) -> DispatchOutcome {
        if tracked {
            DispatchOutcome::TaskCompleted {
                channel,
                user,
                task,
            }
        } else {
            DispatchOutcome::Untracked { task }
        }
    }
}
