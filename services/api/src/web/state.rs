//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the registry of pending,
//! cancellable chat tasks.

use crate::config::Config;
use fact_tutor_core::{ChatStore, ContentAnalyzer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests and Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ChatStore>>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub config: Arc<Config>,
    pub tasks: PendingTasks,
}

impl AppState {
    pub fn new(config: Arc<Config>, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        Self {
            store: Arc::new(Mutex::new(ChatStore::with_capacity(
                config.event_channel_capacity,
            ))),
            analyzer,
            config,
            tasks: PendingTasks::default(),
        }
    }
}

//=========================================================================================
// PendingTasks (Delayed Work Tied to a Chat's Lifetime)
//=========================================================================================

/// One cancellation token per chat. Every delayed job for a chat gets a child
/// token, so deleting the chat cancels all of its pending work at once.
#[derive(Clone, Default)]
pub struct PendingTasks {
    tokens: Arc<StdMutex<HashMap<Uuid, CancellationToken>>>,
}

impl PendingTasks {
    /// Returns a token that is cancelled when the chat is deleted or the session resets.
    pub fn token_for(&self, chat_id: Uuid) -> CancellationToken {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.entry(chat_id).or_default().child_token()
    }

    /// Whether any job is still registered for the chat.
    pub fn is_tracking(&self, chat_id: Uuid) -> bool {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.contains_key(&chat_id)
    }

    pub fn cancel_chat(&self, chat_id: Uuid) {
        let token = {
            let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
            tokens.remove(&chat_id)
        };
        if let Some(token) = token {
            debug!(%chat_id, "Cancelling pending tasks for chat");
            token.cancel();
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<(Uuid, CancellationToken)> = {
            let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
            tokens.drain().collect()
        };
        for (chat_id, token) in drained {
            debug!(%chat_id, "Cancelling pending tasks for chat");
            token.cancel();
        }
    }
}
