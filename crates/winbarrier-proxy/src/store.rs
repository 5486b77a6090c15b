//! Capability store: the per-connection allow-list.
//!
//! Holds the real window ids this connection may reference, in creation
//! order, plus the single tab each of those windows was created with.
//! Every window also gets an opaque handle, assigned once and never
//! reused, so callers have a reference that survives removals of other
//! windows. The position index is still reported but shifts down by one
//! whenever an earlier window is removed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use winbarrier_common::{TabId, WindowId};

/// Connection-local reference to a window, safe to hand to the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a membership check: where the window sits in the allow-list
/// right now, and its stable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub index: usize,
    pub handle: WindowHandle,
}

#[derive(Debug, Default)]
pub struct CapabilityStore {
    windows: Vec<WindowId>,
    handles: HashMap<WindowId, WindowHandle>,
    tabs: Vec<TabId>,
    tab_owners: HashMap<TabId, WindowId>,
    next_handle: u64,
}

impl CapabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a window (and its tab) unless already present.
    pub fn record_created(&mut self, id: WindowId, tab: Option<TabId>) -> Grant {
        if let Some(grant) = self.check(id) {
            return grant;
        }

        let handle = WindowHandle(self.next_handle);
        self.next_handle += 1;

        self.windows.push(id);
        self.handles.insert(id, handle);

        if let Some(tab) = tab {
            if !self.tab_owners.contains_key(&tab) {
                self.tabs.push(tab);
                self.tab_owners.insert(tab, id);
            }
        }

        Grant {
            index: self.windows.len() - 1,
            handle,
        }
    }

    /// Membership query. Never mutates; callers that want the entry gone
    /// follow up with `remove_recorded`.
    pub fn check(&self, id: WindowId) -> Option<Grant> {
        let handle = *self.handles.get(&id)?;
        let index = self.windows.iter().position(|w| *w == id)?;
        Some(Grant { index, handle })
    }

    /// Remove a window and the tab it owns. Later windows move down one slot.
    pub fn remove_recorded(&mut self, id: WindowId) -> Option<Grant> {
        let grant = self.check(id)?;
        self.windows.remove(grant.index);
        self.handles.remove(&id);

        self.tabs.retain(|t| self.tab_owners.get(t) != Some(&id));
        self.tab_owners.retain(|_, owner| *owner != id);

        Some(grant)
    }

    pub fn is_accessible_tab(&self, tab: TabId) -> bool {
        self.tabs.contains(&tab)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn window_ids(&self) -> &[WindowId] {
        &self.windows
    }

    pub fn tab_ids(&self) -> &[TabId] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
