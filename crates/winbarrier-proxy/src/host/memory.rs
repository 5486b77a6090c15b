//! In-process host used by tests and the replay CLI.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use winbarrier_common::{
    CreateData, CreateUrl, GetAllInfo, HostError, HostEvent, HostEventBus, Tab, TabId, Window,
    WindowId,
};

use super::WindowHost;

#[derive(Debug)]
struct HostState {
    next_window: i64,
    next_tab: i64,
    windows: Vec<Window>,
    create_failure: Option<HostError>,
    query_failure: Option<HostError>,
}

/// A host that keeps its windows in memory and broadcasts lifecycle events
/// to every subscriber, like a real windowing subsystem would.
///
/// Each URL in a create request becomes one tab; a request without a URL
/// still gets a single blank tab.
#[derive(Debug)]
pub struct MemoryHost {
    bus: HostEventBus,
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new(bus_capacity: usize) -> Self {
        Self::starting_at(bus_capacity, 1, 1)
    }

    /// Start id allocation at the given window and tab ids.
    pub fn starting_at(bus_capacity: usize, first_window: i64, first_tab: i64) -> Self {
        Self {
            bus: HostEventBus::new(bus_capacity),
            state: Mutex::new(HostState {
                next_window: first_window,
                next_tab: first_tab,
                windows: Vec::new(),
                create_failure: None,
                query_failure: None,
            }),
        }
    }

    /// Make the next `create_window` call fail with `error`.
    pub fn fail_next_create(&self, error: HostError) -> Result<(), HostError> {
        self.lock()?.create_failure = Some(error);
        Ok(())
    }

    /// Make the next `get_all` call fail with `error`.
    pub fn fail_next_query(&self, error: HostError) -> Result<(), HostError> {
        self.lock()?.query_failure = Some(error);
        Ok(())
    }

    /// Open a window outside of any proxy, e.g. by the local user.
    pub fn open(&self, request: &CreateData) -> Result<Window, HostError> {
        let window = self.insert(request)?;
        self.announce(&window);
        Ok(window)
    }

    /// Close a window. Returns false if the host had no such window.
    pub fn remove(&self, id: WindowId) -> Result<bool, HostError> {
        let existed = {
            let mut state = self.lock()?;
            let before = state.windows.len();
            state.windows.retain(|w| w.id != id);
            state.windows.len() != before
        };
        if existed {
            debug!(window_id = %id, "host removed window");
            self.bus.publish(HostEvent::WindowRemoved(id));
        }
        Ok(existed)
    }

    pub fn windows(&self) -> Result<Vec<Window>, HostError> {
        Ok(self.lock()?.windows.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HostState>, HostError> {
        self.state.lock().map_err(|_| HostError::Unavailable)
    }

    fn insert(&self, request: &CreateData) -> Result<Window, HostError> {
        let mut state = self.lock()?;

        let id = WindowId(state.next_window);
        state.next_window += 1;

        let urls: Vec<Option<String>> = match &request.url {
            Some(CreateUrl::Single(url)) => vec![Some(url.clone())],
            Some(CreateUrl::Many(urls)) if !urls.is_empty() => {
                urls.iter().cloned().map(Some).collect()
            }
            _ => vec![None],
        };
        let mut tabs = Vec::with_capacity(urls.len());
        for url in urls {
            let mut tab = Tab::new(TabId(state.next_tab));
            state.next_tab += 1;
            tab.url = url;
            tabs.push(tab);
        }

        let window = Window {
            id,
            focused: request.focused.unwrap_or(false),
            incognito: request.incognito.unwrap_or(false),
            kind: request.kind.unwrap_or_default(),
            left: request.left,
            top: request.top,
            width: request.width,
            height: request.height,
            tabs: Some(tabs),
        };
        state.windows.push(window.clone());
        Ok(window)
    }

    /// Private windows are announced without their window object.
    fn announce(&self, window: &Window) {
        let payload = (!window.incognito).then(|| window.clone());
        let reached = self.bus.publish(HostEvent::WindowCreated(payload));
        debug!(window_id = %window.id, subscribers = reached, "host created window");
    }
}

#[async_trait]
impl WindowHost for MemoryHost {
    async fn create_window(&self, request: CreateData) -> Result<Option<WindowId>, HostError> {
        if let Some(error) = self.lock()?.create_failure.take() {
            return Err(error);
        }

        let window = self.insert(&request)?;
        self.announce(&window);
        Ok((!window.incognito).then_some(window.id))
    }

    async fn get_all(&self, filter: GetAllInfo) -> Result<Vec<Window>, HostError> {
        let populate = filter.populate.unwrap_or(false);
        let mut state = self.lock()?;
        if let Some(error) = state.query_failure.take() {
            return Err(error);
        }
        let windows = state
            .windows
            .iter()
            .filter(|w| {
                filter
                    .window_types
                    .as_ref()
                    .map_or(true, |types| types.contains(&w.kind))
            })
            .cloned()
            .map(|mut w| {
                if !populate {
                    w.tabs = None;
                }
                w
            })
            .collect();
        Ok(windows)
    }

    fn events(&self) -> &HostEventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winbarrier_common::WindowType;

    #[tokio::test]
    async fn create_allocates_ids_and_announces() {
        let host = MemoryHost::starting_at(16, 101, 1);
        let mut created = host.events().subscribe_created();

        let id = host.create_window(CreateData::default()).await.unwrap();
        assert_eq!(id, Some(WindowId(101)));

        let window = created.recv().await.unwrap().unwrap();
        assert_eq!(window.id, WindowId(101));
        assert_eq!(window.tab_count(), 1);
        assert_eq!(window.first_tab(), Some(TabId(1)));
    }

    #[tokio::test]
    async fn url_list_creates_one_tab_per_url() {
        let host = MemoryHost::new(16);
        let request = CreateData {
            url: Some(CreateUrl::Many(vec!["a".into(), "b".into()])),
            ..Default::default()
        };
        host.create_window(request).await.unwrap();
        let windows = host.windows().unwrap();
        assert_eq!(windows[0].tab_count(), 2);
    }

    #[tokio::test]
    async fn private_window_is_announced_without_payload() {
        let host = MemoryHost::new(16);
        let mut created = host.events().subscribe_created();
        let request = CreateData {
            incognito: Some(true),
            ..Default::default()
        };

        assert_eq!(host.create_window(request).await.unwrap(), None);
        assert!(created.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let host = MemoryHost::new(16);
        host.fail_next_create(HostError::CreateFailed("no display".into()))
            .unwrap();

        let err = host.create_window(CreateData::default()).await.unwrap_err();
        assert_eq!(err, HostError::CreateFailed("no display".into()));
        assert!(host.windows().unwrap().is_empty());

        assert!(host.create_window(CreateData::default()).await.is_ok());
    }

    #[tokio::test]
    async fn injected_query_failure_applies_once() {
        let host = MemoryHost::new(16);
        host.open(&CreateData::default()).unwrap();
        host.fail_next_query(HostError::QueryFailed("busy".into()))
            .unwrap();

        let err = host.get_all(GetAllInfo::default()).await.unwrap_err();
        assert_eq!(err, HostError::QueryFailed("busy".into()));
        assert_eq!(host.get_all(GetAllInfo::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_capacity_host_does_not_panic() {
        let host = MemoryHost::new(0);
        let mut created = host.events().subscribe_created();
        host.create_window(CreateData::default()).await.unwrap();
        assert!(created.recv().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_all_strips_tabs_unless_populated() {
        let host = MemoryHost::new(16);
        host.create_window(CreateData::default()).await.unwrap();

        let bare = host.get_all(GetAllInfo::default()).await.unwrap();
        assert!(bare[0].tabs.is_none());

        let populated = host
            .get_all(GetAllInfo {
                populate: Some(true),
                window_types: None,
            })
            .await
            .unwrap();
        assert_eq!(populated[0].tab_count(), 1);
    }

    #[tokio::test]
    async fn get_all_filters_window_types() {
        let host = MemoryHost::new(16);
        host.open(&CreateData {
            kind: Some(WindowType::Popup),
            ..Default::default()
        })
        .unwrap();
        host.open(&CreateData::default()).unwrap();

        let popups = host
            .get_all(GetAllInfo {
                populate: None,
                window_types: Some(vec![WindowType::Popup]),
            })
            .await
            .unwrap();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].kind, WindowType::Popup);
    }

    #[tokio::test]
    async fn remove_announces_only_existing_windows() {
        let host = MemoryHost::new(16);
        let mut removed = host.events().subscribe_removed();
        let window = host.open(&CreateData::default()).unwrap();

        assert!(!host.remove(WindowId(999)).unwrap());
        assert!(host.remove(window.id).unwrap());
        assert_eq!(removed.recv().await.unwrap(), window.id);
        assert!(removed.try_recv().is_err());
    }
}
