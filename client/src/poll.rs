//! Polling widgets: alert banner and notification bell
//!
//! Both poll a read endpoint on a fixed interval and merge results into
//! shared widget state. Each poller is a cancellable scheduled task that is
//! explicitly stopped on teardown, and a fetch that resolves after shutdown
//! is dropped rather than written into state.
//!
//! The two widgets deliberately do not share a "seen" abstraction: alert
//! dismissal is client-side only (a dismissed-id list in the session store,
//! no server call), while notification read state is server-tracked with an
//! optimistic local counter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::PestCheckApi;
use crate::error::ApiResult;
use crate::session::Session;
use shared::{Alert, Notification};

/// Handle to a running poller; stops the task on demand
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Signal shutdown and wait for the task to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    /// Abort without waiting. Used from synchronous teardown paths.
    pub fn abort(&self) {
        let _ = self.shutdown.send(true);
        self.handle.abort();
    }
}

// ----------------------------------------------------------------------
// Alert banner
// ----------------------------------------------------------------------

/// Banner showing active broadcast alerts, minus locally dismissed ones
pub struct AlertBanner<A: PestCheckApi + ?Sized> {
    api: Arc<A>,
    session: Session,
    visible: Arc<Mutex<Vec<Alert>>>,
}

impl<A: PestCheckApi + ?Sized> Clone for AlertBanner<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: self.session.clone(),
            visible: self.visible.clone(),
        }
    }
}

impl<A: PestCheckApi + ?Sized + 'static> AlertBanner<A> {
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            visible: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Alerts currently shown to the user.
    pub fn visible_alerts(&self) -> Vec<Alert> {
        self.visible.lock().expect("banner lock poisoned").clone()
    }

    /// Fetch active alerts and apply the local dismissal filter.
    pub async fn refresh(&self) -> ApiResult<()> {
        let alerts = self.api.active_alerts().await?;
        self.apply(alerts);
        Ok(())
    }

    /// Hide an alert for this user. Persisted in the session store only;
    /// no server endpoint exists for alert dismissal.
    pub async fn dismiss(&self, id: Uuid) -> ApiResult<()> {
        self.session.dismiss_alert(id).await?;
        self.visible
            .lock()
            .expect("banner lock poisoned")
            .retain(|alert| alert.id != id);
        Ok(())
    }

    /// Start polling. Alerts poll slowly; broadcast content is not urgent.
    pub fn spawn(&self, period: Duration) -> PollHandle {
        let widget = self.clone();
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let fetched = widget.api.active_alerts().await;
                        if *rx.borrow() {
                            // Shut down while the request was in flight.
                            break;
                        }
                        match fetched {
                            Ok(alerts) => widget.apply(alerts),
                            Err(e) => tracing::warn!(error = %e, "alert poll failed"),
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
            tracing::debug!("alert poller stopped");
        });
        PollHandle { shutdown, handle }
    }

    fn apply(&self, alerts: Vec<Alert>) {
        let now = chrono::Utc::now();
        let filtered: Vec<Alert> = alerts
            .into_iter()
            .filter(|alert| alert.is_live(now) && !self.session.is_alert_dismissed(alert.id))
            .collect();
        *self.visible.lock().expect("banner lock poisoned") = filtered;
    }
}

// ----------------------------------------------------------------------
// Notification bell
// ----------------------------------------------------------------------

#[derive(Default)]
struct BellState {
    notifications: Vec<Notification>,
    unread: u64,
}

/// Bell widget with the unread counter and the notification list
pub struct NotificationBell<A: PestCheckApi + ?Sized> {
    api: Arc<A>,
    state: Arc<Mutex<BellState>>,
}

impl<A: PestCheckApi + ?Sized> Clone for NotificationBell<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A: PestCheckApi + ?Sized + 'static> NotificationBell<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(BellState::default())),
        }
    }

    pub fn unread(&self) -> u64 {
        self.state.lock().expect("bell lock poisoned").unread
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state
            .lock()
            .expect("bell lock poisoned")
            .notifications
            .clone()
    }

    /// Fetch the list and the unread counter together.
    pub async fn refresh(&self) -> ApiResult<()> {
        let (notifications, unread) =
            tokio::try_join!(self.api.notifications(), self.api.unread_count())?;
        let mut state = self.state.lock().expect("bell lock poisoned");
        state.notifications = notifications;
        state.unread = unread;
        Ok(())
    }

    /// Mark one notification read.
    ///
    /// The local update is optimistic and idempotent: the counter drops by
    /// exactly one the first time and never goes negative. The POST is
    /// fire-and-forget; a failure is logged, not surfaced.
    pub async fn mark_read(&self, id: Uuid) {
        let newly_read = {
            let mut state = self.state.lock().expect("bell lock poisoned");
            let mut newly_read = false;
            if let Some(notification) =
                state.notifications.iter_mut().find(|n| n.id == id)
            {
                if !notification.is_read {
                    notification.is_read = true;
                    newly_read = true;
                }
            }
            if newly_read {
                state.unread = state.unread.saturating_sub(1);
            }
            newly_read
        };

        if newly_read {
            if let Err(e) = self.api.mark_notification_read(id).await {
                tracing::warn!(notification_id = %id, error = %e, "mark_read failed");
            }
        }
    }

    /// Mark everything read and zero the counter.
    pub async fn mark_all_read(&self) {
        {
            let mut state = self.state.lock().expect("bell lock poisoned");
            for notification in state.notifications.iter_mut() {
                notification.is_read = true;
            }
            state.unread = 0;
        }
        if let Err(e) = self.api.mark_all_notifications_read().await {
            tracing::warn!(error = %e, "mark_all_read failed");
        }
    }

    /// Start polling. Notifications poll fast; the counter drives a badge.
    pub fn spawn(&self, period: Duration) -> PollHandle {
        let widget = self.clone();
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let fetched = tokio::try_join!(
                            widget.api.notifications(),
                            widget.api.unread_count()
                        );
                        if *rx.borrow() {
                            break;
                        }
                        match fetched {
                            Ok((notifications, unread)) => {
                                let mut state =
                                    widget.state.lock().expect("bell lock poisoned");
                                state.notifications = notifications;
                                state.unread = unread;
                            }
                            Err(e) => tracing::warn!(error = %e, "notification poll failed"),
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
            tracing::debug!("notification poller stopped");
        });
        PollHandle { shutdown, handle }
    }
}
