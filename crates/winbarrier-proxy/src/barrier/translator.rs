use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, trace, warn};
use winbarrier_common::{BarrierError, Window, WindowId};

use crate::port::methods;
use crate::store::Grant;

use super::{ScopedWindow, WindowsBarrier};

impl WindowsBarrier {
    /// Host created a window somewhere.
    ///
    /// Admitted only if it answers one of this connection's own create
    /// requests. Returns the grant of a newly recorded window; anything
    /// else (foreign, private, duplicate) is `Ok(None)`.
    pub fn on_created(&mut self, window: Option<Window>) -> Result<Option<Grant>, BarrierError> {
        let Some(window) = window else {
            debug!(connection = %self.name, "created event without window object ignored");
            return Ok(None);
        };

        if !self.pending.remove(&window.id) {
            trace!(connection = %self.name, window_id = %window.id, "created: not ours");
            return Ok(None);
        }

        if window.incognito {
            debug!(connection = %self.name, window_id = %window.id, "private window not tracked");
            return Ok(None);
        }

        let tabs = window.tab_count();
        if tabs > 1 {
            return Err(BarrierError::UnsupportedShape {
                window_id: window.id,
                tabs,
            });
        }

        let grant = self.store.record_created(window.id, window.first_tab());
        if !self.listening {
            self.listening = true;
            debug!(connection = %self.name, "tracking removals");
        }

        debug!(
            connection = %self.name,
            window_id = %window.id,
            handle = %grant.handle,
            index = grant.index,
            "window granted"
        );
        let scoped = ScopedWindow {
            handle: grant.handle,
            window,
        };
        self.post(methods::ON_CREATED, scoped_params(std::slice::from_ref(&scoped)));
        Ok(Some(grant))
    }

    /// Host removed a window somewhere. Swallowed unless it is ours.
    pub fn on_removed(&mut self, id: WindowId) -> Option<Grant> {
        if !self.listening {
            return None;
        }

        let Some(grant) = self.store.check(id) else {
            trace!(connection = %self.name, window_id = %id, "removed: not ours");
            return None;
        };
        self.store.remove_recorded(id);

        debug!(connection = %self.name, window_id = %id, handle = %grant.handle, "window released");
        self.post(methods::ON_REMOVED, vec![Value::from(grant.handle.get())]);
        Some(grant)
    }

    /// Host answered an enumeration. Keeps only our windows, in host order,
    /// and always posts exactly one `onGetAll`, even when empty.
    pub fn on_get_all(&self, windows: Vec<Window>) -> Vec<ScopedWindow> {
        let total = windows.len();
        let visible: Vec<ScopedWindow> = windows
            .into_iter()
            .filter_map(|window| {
                let grant = self.store.check(window.id)?;
                Some(ScopedWindow {
                    handle: grant.handle,
                    window,
                })
            })
            .collect();

        debug!(
            connection = %self.name,
            total,
            visible = visible.len(),
            "enumeration filtered"
        );
        self.post(methods::ON_GET_ALL, scoped_params(&visible));
        visible
    }

    /// Catch up after missed created events, from a full host listing.
    ///
    /// Pending windows the host still lists are admitted as if their event
    /// had arrived; pending ids it no longer lists are dropped. Returns the
    /// errors `on_created` raised along the way.
    pub fn resync_created(&mut self, windows: Vec<Window>) -> Vec<BarrierError> {
        let mut listed: HashMap<WindowId, Window> =
            windows.into_iter().map(|w| (w.id, w)).collect();
        let mut pending: Vec<WindowId> = self.pending.iter().copied().collect();
        pending.sort();

        let mut errors = Vec::new();
        for id in pending {
            match listed.remove(&id) {
                Some(window) => {
                    if let Err(e) = self.on_created(Some(window)) {
                        errors.push(e);
                    }
                }
                None => {
                    self.pending.remove(&id);
                    debug!(connection = %self.name, window_id = %id, "pending window gone from host");
                }
            }
        }
        errors
    }

    /// Catch up after missed removed events, from a full host listing.
    /// Every recorded window the host no longer lists is released.
    pub fn resync_removed(&mut self, windows: &[Window]) -> Vec<Grant> {
        let live: HashSet<WindowId> = windows.iter().map(|w| w.id).collect();
        let stale: Vec<WindowId> = self
            .store
            .window_ids()
            .iter()
            .copied()
            .filter(|id| !live.contains(id))
            .collect();
        stale.into_iter().filter_map(|id| self.on_removed(id)).collect()
    }
}

fn scoped_params(windows: &[ScopedWindow]) -> Vec<Value> {
    windows
        .iter()
        .filter_map(|w| match serde_json::to_value(w) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(window_id = %w.window.id, "failed to encode window: {e}");
                None
            }
        })
        .collect()
}
