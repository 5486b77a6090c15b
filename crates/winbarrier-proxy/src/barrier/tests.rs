//! Translator behaviour against hand-fed host events.

use super::*;
use crate::port::BufferedPort;
use crate::store::Grant;
use winbarrier_common::{BarrierError, Tab, TabId};

fn barrier() -> (WindowsBarrier, BufferedPort) {
    let port = BufferedPort::new();
    let barrier = WindowsBarrier::new("https://debugger.test", "chrome.windows", Box::new(port.clone()));
    (barrier, port)
}

fn window(id: i64, tab: i64) -> Window {
    Window::new(WindowId(id)).with_tab(Tab::new(TabId(tab)))
}

/// Simulate a create request answered by the host with `id`.
fn create(barrier: &mut WindowsBarrier, id: i64, tab: i64) -> Grant {
    barrier.expect_created(WindowId(id));
    barrier
        .on_created(Some(window(id, tab)))
        .unwrap()
        .expect("window should be granted")
}

#[test]
fn name_combines_source_and_instance() {
    let (a, _) = barrier();
    let (b, _) = barrier();
    assert!(a.name().starts_with("chrome.windows."));
    assert_ne!(a.name(), b.name());
    assert_eq!(a.origin(), "https://debugger.test");
    assert_eq!(a.source(), "chrome.windows");
}

#[test]
fn not_listening_before_first_creation() {
    let (mut barrier, port) = barrier();
    assert!(!barrier.is_listening());
    assert!(barrier.on_removed(WindowId(1)).is_none());
    assert!(port.is_empty());

    create(&mut barrier, 1, 10);
    assert!(barrier.is_listening());
}

#[test]
fn created_posts_exactly_one_notification_with_handle() {
    let (mut barrier, port) = barrier();
    let grant = create(&mut barrier, 101, 5);

    let messages = port.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].source, "chrome.windows");
    assert_eq!(messages[0].method, "onCreated");

    let params = messages[0].params.as_ref().unwrap();
    assert_eq!(params.len(), 1);
    let scoped: ScopedWindow = serde_json::from_value(params[0].clone()).unwrap();
    assert_eq!(scoped.handle, grant.handle);
    assert_eq!(scoped.window.id, WindowId(101));
}

#[test]
fn duplicate_created_event_is_not_posted_twice() {
    let (mut barrier, port) = barrier();
    create(&mut barrier, 101, 5);
    let again = barrier.on_created(Some(window(101, 5))).unwrap();
    assert!(again.is_none());
    assert_eq!(port.drain().len(), 1);
    assert_eq!(barrier.store().len(), 1);
}

#[test]
fn foreign_created_event_is_swallowed() {
    let (mut barrier, port) = barrier();
    let result = barrier.on_created(Some(window(999, 9))).unwrap();
    assert!(result.is_none());
    assert!(barrier.store().is_empty());
    assert!(port.is_empty());
    assert!(!barrier.is_listening());
}

#[test]
fn missing_window_object_is_ignored() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(1));
    assert!(barrier.on_created(None).unwrap().is_none());
    assert!(barrier.store().is_empty());
    assert!(port.is_empty());
}

#[test]
fn private_window_never_enters_store() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(1));
    let mut private = window(1, 10);
    private.incognito = true;

    assert!(barrier.on_created(Some(private)).unwrap().is_none());
    assert!(barrier.store().is_empty());
    assert!(!barrier.store().is_accessible_tab(TabId(10)));
    assert!(port.is_empty());
    assert_eq!(barrier.pending_count(), 0);
}

#[test]
fn multi_tab_window_is_unsupported_shape() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(3));
    let crowded = window(3, 30).with_tab(Tab::new(TabId(31)));

    let err = barrier.on_created(Some(crowded)).unwrap_err();
    assert!(matches!(
        err,
        BarrierError::UnsupportedShape { window_id: WindowId(3), tabs: 2 }
    ));
    assert!(barrier.store().is_empty());
    assert!(port.is_empty());
}

#[test]
fn window_without_tabs_is_accepted() {
    let (mut barrier, _) = barrier();
    barrier.expect_created(WindowId(4));
    let grant = barrier.on_created(Some(Window::new(WindowId(4)))).unwrap();
    assert!(grant.is_some());
    assert!(barrier.store().tab_ids().is_empty());
}

#[test]
fn created_window_tab_becomes_accessible() {
    let (mut barrier, _) = barrier();
    create(&mut barrier, 1, 10);
    assert!(barrier.store().is_accessible_tab(TabId(10)));
    assert!(!barrier.store().is_accessible_tab(TabId(11)));
}

#[test]
fn removal_of_own_window_posts_handle() {
    let (mut barrier, port) = barrier();
    let grant = create(&mut barrier, 101, 5);
    port.drain();

    let removed = barrier.on_removed(WindowId(101)).unwrap();
    assert_eq!(removed, grant);
    assert!(barrier.store().is_empty());
    assert!(!barrier.store().is_accessible_tab(TabId(5)));

    let messages = port.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].method, "onRemoved");
    assert_eq!(
        messages[0].params,
        Some(vec![serde_json::json!(grant.handle.get())])
    );
}

#[test]
fn removal_of_foreign_window_is_swallowed() {
    let (mut barrier, port) = barrier();
    create(&mut barrier, 101, 5);
    port.drain();

    assert!(barrier.on_removed(WindowId(555)).is_none());
    assert_eq!(barrier.store().len(), 1);
    assert!(port.is_empty());
}

#[test]
fn get_all_filters_and_keeps_host_order() {
    let (mut barrier, port) = barrier();
    let a = create(&mut barrier, 1, 10);
    let b = create(&mut barrier, 2, 20);
    port.drain();

    let host_view = vec![
        Window::new(WindowId(2)),
        Window::new(WindowId(77)),
        Window::new(WindowId(1)),
    ];
    let visible = barrier.on_get_all(host_view);

    let ids: Vec<WindowId> = visible.iter().map(|w| w.window.id).collect();
    assert_eq!(ids, vec![WindowId(2), WindowId(1)]);
    assert_eq!(visible[0].handle, b.handle);
    assert_eq!(visible[1].handle, a.handle);

    let messages = port.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].method, "onGetAll");
    assert_eq!(messages[0].params.as_ref().unwrap().len(), 2);
}

#[test]
fn get_all_with_nothing_visible_still_posts() {
    let (barrier, port) = barrier();
    let visible = barrier.on_get_all(vec![Window::new(WindowId(8))]);
    assert!(visible.is_empty());

    let messages = port.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].params, Some(vec![]));
}

#[test]
fn scenario_create_create_remove_list() {
    let (mut barrier, port) = barrier();

    let first = create(&mut barrier, 101, 1);
    assert_eq!(first.index, 0);
    assert_eq!(barrier.store().window_ids(), &[WindowId(101)]);

    let second = create(&mut barrier, 202, 2);
    assert_eq!(second.index, 1);
    assert_eq!(barrier.store().window_ids(), &[WindowId(101), WindowId(202)]);

    barrier.on_removed(WindowId(101));
    assert_eq!(barrier.store().window_ids(), &[WindowId(202)]);
    assert_eq!(barrier.store().check(WindowId(202)).unwrap().index, 0);

    let visible = barrier.on_get_all(vec![Window::new(WindowId(101)), Window::new(WindowId(202))]);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].window.id, WindowId(202));
    assert_eq!(visible[0].handle, second.handle);

    let methods: Vec<String> = port.drain().into_iter().map(|m| m.method).collect();
    assert_eq!(methods, vec!["onCreated", "onCreated", "onRemoved", "onGetAll"]);
}

#[test]
fn disconnect_makes_barrier_inert() {
    let (mut barrier, port) = barrier();
    create(&mut barrier, 101, 1);
    barrier.expect_created(WindowId(202));
    port.drain();

    barrier.disconnect();
    assert!(!barrier.is_connected());
    assert!(!barrier.is_listening());

    assert!(barrier.on_removed(WindowId(101)).is_none());
    assert!(barrier.on_created(Some(window(202, 2))).unwrap().is_none());
    barrier.on_get_all(vec![Window::new(WindowId(101))]);
    assert!(port.is_empty());
}

#[test]
fn set_port_redirects_output() {
    let (mut barrier, first) = barrier();
    let second = BufferedPort::new();
    barrier.set_port(Some(Box::new(second.clone())));

    barrier.on_get_all(Vec::new());
    assert!(first.is_empty());
    assert_eq!(second.len(), 1);
}

#[test]
fn resync_created_admits_pending_windows_the_host_still_has() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(2));
    barrier.expect_created(WindowId(1));
    barrier.expect_created(WindowId(9));

    let listing = vec![window(1, 10), window(77, 70), window(2, 20)];
    let errors = barrier.resync_created(listing);
    assert!(errors.is_empty());

    assert_eq!(barrier.store().window_ids(), &[WindowId(1), WindowId(2)]);
    assert_eq!(barrier.pending_count(), 0);
    assert!(barrier.is_listening());

    let messages = port.drain();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.method == "onCreated"));
}

#[test]
fn resync_created_then_late_event_is_not_posted_twice() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(5));
    barrier.resync_created(vec![window(5, 50)]);

    assert!(barrier.on_created(Some(window(5, 50))).unwrap().is_none());
    assert_eq!(port.drain().len(), 1);
}

#[test]
fn resync_created_reports_unsupported_shape() {
    let (mut barrier, port) = barrier();
    barrier.expect_created(WindowId(3));
    let crowded = window(3, 30).with_tab(Tab::new(TabId(31)));

    let errors = barrier.resync_created(vec![crowded]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], BarrierError::UnsupportedShape { tabs: 2, .. }));
    assert!(barrier.store().is_empty());
    assert_eq!(barrier.pending_count(), 0);
    assert!(port.is_empty());
}

#[test]
fn resync_removed_releases_windows_missing_from_host() {
    let (mut barrier, port) = barrier();
    let gone = create(&mut barrier, 1, 10);
    create(&mut barrier, 2, 20);
    port.drain();

    let released = barrier.resync_removed(&[Window::new(WindowId(2)), Window::new(WindowId(8))]);
    assert_eq!(released, vec![gone]);
    assert_eq!(barrier.store().window_ids(), &[WindowId(2)]);
    assert!(!barrier.store().is_accessible_tab(TabId(10)));

    let messages = port.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].method, "onRemoved");
}
