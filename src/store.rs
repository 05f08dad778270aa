//! In-memory registry of onboarding tutorials keyed by `(channel, user)`.
//!
//! The store is created empty at startup, owned by the dispatcher, and
//! dropped at exit; nothing survives a restart. Each tutorial sits behind its
//! own async mutex so a handler can hold one key across the
//! mark → render → send → record sequence without blocking other keys.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::tutorial::TutorialState;

/// Shared, lockable handle to one tutorial.
pub type TutorialHandle = Arc<Mutex<TutorialState>>;

type UserTutorials = HashMap<String, TutorialHandle>;

/// Registry of live tutorials.
#[derive(Debug, Default)]
pub struct TutorialStore {
    channels: Mutex<HashMap<String, UserTutorials>>,
}

impl TutorialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh tutorial for `(channel, user)`, replacing any
    /// previous one for that key.
    pub async fn start(&self, channel: &str, user: &str) -> TutorialHandle {
        let handle = Arc::new(Mutex::new(TutorialState::new(channel)));
        let mut channels = self.channels.lock().await;
        let replaced = channels
            .entry(channel.to_owned())
            .or_default()
            .insert(user.to_owned(), Arc::clone(&handle))
            .is_some();
        debug!(channel, user, replaced, "tutorial registered");
        handle
    }

    /// Look up the tutorial for `(channel, user)`.
    pub async fn get(&self, channel: &str, user: &str) -> Option<TutorialHandle> {
        self.channels
            .lock()
            .await
            .get(channel)
            .and_then(|users| users.get(user))
            .cloned()
    }

    /// Record the timestamp of the latest post or update for `(channel, user)`.
    ///
    /// Returns `false` when no tutorial is tracked for the key.
    pub async fn record_timestamp(&self, channel: &str, user: &str, ts: &str) -> bool {
        let Some(handle) = self.get(channel, user).await else {
            return false;
        };
        handle.lock().await.record_timestamp(ts);
        true
    }

    /// Number of tracked tutorials across all channels.
    pub async fn len(&self) -> usize {
        self.channels.lock().await.values().map(HashMap::len).sum()
    }

    /// Whether no tutorial is tracked.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
