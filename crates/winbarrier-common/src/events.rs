//! Global host lifecycle notifications.
//!
//! The host broadcasts every window creation and removal to every
//! subscriber, unscoped. Each connection holds its own receivers and
//! filters what it sees; dropping a receiver is the unsubscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Window, WindowId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostEvent {
    /// `None` when the host withholds the window object (private windows).
    WindowCreated(Option<Window>),
    WindowRemoved(WindowId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEventKind {
    Created,
    Removed,
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            Self::WindowCreated(_) => HostEventKind::Created,
            Self::WindowRemoved(_) => HostEventKind::Removed,
        }
    }
}

/// One broadcast channel per event kind, so a connection can listen for
/// removals without also paying for creations and vice versa.
#[derive(Debug, Clone)]
pub struct HostEventBus {
    created: broadcast::Sender<Option<Window>>,
    removed: broadcast::Sender<WindowId>,
}

impl HostEventBus {
    /// A zero `capacity` is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (created, _) = broadcast::channel(capacity);
        let (removed, _) = broadcast::channel(capacity);
        Self { created, removed }
    }

    pub fn subscribe_created(&self) -> broadcast::Receiver<Option<Window>> {
        self.created.subscribe()
    }

    pub fn subscribe_removed(&self) -> broadcast::Receiver<WindowId> {
        self.removed.subscribe()
    }

    /// Returns the number of subscribers the event reached.
    pub fn publish(&self, event: HostEvent) -> usize {
        match event {
            HostEvent::WindowCreated(window) => self.created.send(window).unwrap_or(0),
            HostEvent::WindowRemoved(id) => self.removed.send(id).unwrap_or(0),
        }
    }

    pub fn subscriber_count(&self, kind: HostEventKind) -> usize {
        match kind {
            HostEventKind::Created => self.created.receiver_count(),
            HostEventKind::Removed => self.removed.receiver_count(),
        }
    }
}
