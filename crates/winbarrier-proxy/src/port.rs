//! Outgoing message channel to the remote caller.
//!
//! Posting is fire-and-forget: a port never reports back whether the
//! remote side received anything.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Method names of outgoing notifications.
pub mod methods {
    pub const ON_CREATED: &str = "onCreated";
    pub const ON_REMOVED: &str = "onRemoved";
    pub const ON_GET_ALL: &str = "onGetAll";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMessage {
    pub source: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<serde_json::Value>>,
}

pub trait MessagePort: Send {
    fn post_message(&self, message: PostMessage);
}

impl MessagePort for mpsc::UnboundedSender<PostMessage> {
    fn post_message(&self, message: PostMessage) {
        if self.send(message).is_err() {
            debug!("port receiver dropped, message discarded");
        }
    }
}

/// Port that keeps every posted message in memory until drained.
#[derive(Debug, Clone, Default)]
pub struct BufferedPort {
    messages: Arc<Mutex<Vec<PostMessage>>>,
}

impl BufferedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all messages posted so far.
    pub fn drain(&self) -> Vec<PostMessage> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessagePort for BufferedPort {
    fn post_message(&self, message: PostMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}
