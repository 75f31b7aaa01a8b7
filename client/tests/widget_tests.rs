//! Polling widget tests
//!
//! Covers the deliberate asymmetry between the two widgets:
//! - alert dismissal is client-side only, persisted in the session store
//! - notification read state is server-tracked with an idempotent
//!   optimistic counter

use std::sync::Arc;
use std::time::Duration;

use pestcheck_client::mock::MockBackend;
use pestcheck_client::poll::{AlertBanner, NotificationBell};
use pestcheck_client::session::{MemorySessionStore, Session};

async fn session_over(store: Arc<MemorySessionStore>) -> Session {
    Session::load(store).await.unwrap()
}

// ============================================================================
// Alert banner
// ============================================================================

#[tokio::test]
async fn dismissal_hides_the_alert_without_any_server_call() {
    let mock = Arc::new(MockBackend::new());
    let store = Arc::new(MemorySessionStore::default());
    let banner = AlertBanner::new(mock.clone(), session_over(store).await);

    banner.refresh().await.unwrap();
    let visible = banner.visible_alerts();
    assert_eq!(visible.len(), 1);
    let fetches_before = mock.alert_fetches();

    banner.dismiss(visible[0].id).await.unwrap();
    assert!(banner.visible_alerts().is_empty());

    // Dismiss is local: no additional fetch, and no dismissal endpoint
    // exists on the API trait at all.
    assert_eq!(mock.alert_fetches(), fetches_before);
}

#[tokio::test]
async fn dismissal_survives_reload_from_the_same_store() {
    let mock = Arc::new(MockBackend::new());
    let store = Arc::new(MemorySessionStore::default());

    let banner = AlertBanner::new(mock.clone(), session_over(store.clone()).await);
    banner.refresh().await.unwrap();
    let id = banner.visible_alerts()[0].id;
    banner.dismiss(id).await.unwrap();

    // Simulate an app restart: new session over the same persisted store.
    let reloaded = AlertBanner::new(mock, session_over(store).await);
    reloaded.refresh().await.unwrap();
    assert!(reloaded.visible_alerts().is_empty());
}

#[tokio::test]
async fn dismissing_one_alert_keeps_the_others() {
    let mock = Arc::new(MockBackend::new());
    let store = Arc::new(MemorySessionStore::default());
    let banner = AlertBanner::new(mock, session_over(store).await);

    banner.refresh().await.unwrap();
    let before = banner.visible_alerts().len();
    banner
        .dismiss(banner.visible_alerts()[0].id)
        .await
        .unwrap();
    assert_eq!(banner.visible_alerts().len(), before - 1);
}

// ============================================================================
// Notification bell
// ============================================================================

#[tokio::test]
async fn mark_read_decrements_by_exactly_one_and_is_idempotent() {
    let mock = Arc::new(MockBackend::new());
    let bell = NotificationBell::new(mock);

    bell.refresh().await.unwrap();
    assert_eq!(bell.unread(), 1);

    let unread_id = bell
        .notifications()
        .into_iter()
        .find(|n| !n.is_read)
        .unwrap()
        .id;

    bell.mark_read(unread_id).await;
    assert_eq!(bell.unread(), 0);

    // Marking the same notification again must not go negative.
    bell.mark_read(unread_id).await;
    assert_eq!(bell.unread(), 0);
}

#[tokio::test]
async fn marking_an_already_read_notification_changes_nothing() {
    let mock = Arc::new(MockBackend::new());
    let bell = NotificationBell::new(mock);
    bell.refresh().await.unwrap();

    let read_id = bell
        .notifications()
        .into_iter()
        .find(|n| n.is_read)
        .unwrap()
        .id;
    let before = bell.unread();
    bell.mark_read(read_id).await;
    assert_eq!(bell.unread(), before);
}

#[tokio::test]
async fn mark_all_read_zeroes_the_counter() {
    let mock = Arc::new(MockBackend::new());
    let bell = NotificationBell::new(mock.clone());
    bell.refresh().await.unwrap();

    bell.mark_all_read().await;
    assert_eq!(bell.unread(), 0);
    assert!(bell.notifications().iter().all(|n| n.is_read));

    // The server agrees on the next refresh.
    bell.refresh().await.unwrap();
    assert_eq!(bell.unread(), 0);
}

// ============================================================================
// Poller lifecycle
// ============================================================================

#[tokio::test]
async fn stopped_poller_fetches_nothing_further() {
    let mock = Arc::new(MockBackend::new());
    let bell = NotificationBell::new(mock.clone());

    let handle = bell.spawn(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(mock.notification_fetches() >= 2);

    handle.stop().await;
    let after_stop = mock.notification_fetches();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock.notification_fetches(), after_stop);
}

#[tokio::test]
async fn alert_poller_applies_the_dismissal_filter() {
    let mock = Arc::new(MockBackend::new());
    let store = Arc::new(MemorySessionStore::default());
    let session = session_over(store).await;
    let banner = AlertBanner::new(mock.clone(), session.clone());

    banner.refresh().await.unwrap();
    let id = banner.visible_alerts()[0].id;
    session.dismiss_alert(id).await.unwrap();

    let handle = banner.spawn(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop().await;

    assert!(banner.visible_alerts().is_empty());
}
