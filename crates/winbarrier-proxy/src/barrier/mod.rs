//! Per-connection barrier over the host's window lifecycle.
//!
//! `WindowsBarrier` owns one connection's capability store and outgoing
//! port. Host events are fed in through the translator methods
//! (`on_created`, `on_removed`, `on_get_all`); only events concerning
//! windows this connection created ever turn into outgoing messages.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};
use winbarrier_common::{Window, WindowId};

use crate::port::{MessagePort, PostMessage};
use crate::store::{CapabilityStore, WindowHandle};

mod translator;

#[cfg(test)]
mod tests;

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A window as the remote caller sees it: the host's window object plus the
/// connection-local handle to refer to it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedWindow {
    pub handle: WindowHandle,
    #[serde(flatten)]
    pub window: Window,
}

pub struct WindowsBarrier {
    /// The debugger origin this connection serves. Audit only.
    origin: String,
    name: String,
    source: String,
    store: CapabilityStore,
    /// Ids the host returned for our own create requests, awaiting their
    /// created event.
    pending: HashSet<WindowId>,
    port: Option<Box<dyn MessagePort>>,
    listening: bool,
}

impl WindowsBarrier {
    pub fn new(
        origin: impl Into<String>,
        source_path: &str,
        port: Box<dyn MessagePort>,
    ) -> Self {
        let instance = INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        let barrier = Self {
            origin: origin.into(),
            name: format!("{source_path}.{instance}"),
            source: source_path.to_string(),
            store: CapabilityStore::new(),
            pending: HashSet::new(),
            port: Some(port),
            listening: false,
        };
        info!(connection = %barrier.name, origin = %barrier.origin, "connect");
        barrier
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn store(&self) -> &CapabilityStore {
        &self.store
    }

    /// Whether removals are being tracked. Turns on with the first window
    /// recorded, off again at disconnect.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Replace the outgoing port; `None` silences the barrier.
    pub fn set_port(&mut self, port: Option<Box<dyn MessagePort>>) {
        self.port = port;
    }

    /// Mark `id` as the result of one of our own create requests so its
    /// created event is admitted.
    pub fn expect_created(&mut self, id: WindowId) {
        self.pending.insert(id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Terminal. The port goes first, so anything still in flight posts
    /// into nothing.
    pub fn disconnect(&mut self) {
        info!(connection = %self.name, origin = %self.origin, "disconnect");
        self.set_port(None);
        self.listening = false;
        self.pending.clear();
    }

    fn post(&self, method: &str, params: Vec<serde_json::Value>) {
        let Some(port) = &self.port else {
            trace!(connection = %self.name, method, "port closed, message dropped");
            return;
        };
        port.post_message(PostMessage {
            source: self.source.clone(),
            method: method.to_string(),
            params: Some(params),
        });
    }
}
