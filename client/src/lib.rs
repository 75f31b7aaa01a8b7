//! PestCheck client SDK
//!
//! Headless client core for the PestCheck platform: farmers photograph crop
//! pests, submit geotagged detections to a REST backend, and browse
//! infestation data; administrators moderate users, farms, detections, and
//! alerts. This crate owns everything below the rendering layer: the typed
//! API surface with bearer auth and token refresh, the detection
//! preview/confirm state machine, the polling widgets, the session store,
//! and the admin collection filters.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod mock;
pub mod poll;
pub mod session;
pub mod workflow;

pub use config::{BackendKind, Config};
pub use error::{ApiError, ApiResult};

use api::{PestCheckApi, RestClient};
use mock::MockBackend;
use poll::{AlertBanner, NotificationBell};
use session::{FileSessionStore, Session, SessionStore};

/// Initialize tracing for the client process
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pestcheck_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the API implementation selected by configuration.
///
/// The mock is a first-class implementation of the same trait, chosen here
/// by dependency injection rather than by URL matching inside the client.
pub fn build_api(config: &Config, session: Session) -> ApiResult<Arc<dyn PestCheckApi>> {
    match config.api.backend {
        BackendKind::Rest => Ok(Arc::new(RestClient::new(&config.api, session)?)),
        BackendKind::Mock => Ok(Arc::new(MockBackend::new())),
    }
}

/// Explicit context object passed to screens
///
/// Replaces the original ambient local-storage access: the session is loaded
/// once at bootstrap and every screen works through this context.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: Session,
    pub api: Arc<dyn PestCheckApi>,
}

impl AppContext {
    /// Load configuration and the persisted session, then build the API.
    pub async fn bootstrap() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::load().context("failed to load configuration")?;

        tracing::info!(environment = %config.environment, "starting PestCheck client");

        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.session.path.clone()));
        let session = Session::load(store)
            .await
            .context("failed to load persisted session")?;
        let api = build_api(&config, session.clone()).context("failed to build API client")?;

        Ok(Self {
            config,
            session,
            api,
        })
    }

    /// Build a context over an explicit store and API, used in tests.
    pub fn with_parts(config: Config, session: Session, api: Arc<dyn PestCheckApi>) -> Self {
        Self {
            config,
            session,
            api,
        }
    }

    /// Whether a user is logged in; screens redirect to login otherwise.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Alert banner widget polling at the configured interval.
    pub fn alert_banner(&self) -> AlertBanner<dyn PestCheckApi> {
        AlertBanner::new(self.api.clone(), self.session.clone())
    }

    /// Notification bell widget polling at the configured interval.
    pub fn notification_bell(&self) -> NotificationBell<dyn PestCheckApi> {
        NotificationBell::new(self.api.clone())
    }

    pub fn alert_poll_period(&self) -> Duration {
        Duration::from_secs(self.config.polling.alert_interval_secs)
    }

    pub fn notification_poll_period(&self) -> Duration {
        Duration::from_secs(self.config.polling.notification_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_builds_a_context_from_defaults() {
        let context = AppContext::bootstrap().await.expect("bootstrap");
        assert_eq!(context.config.api.request_timeout_secs, 90);
        assert!(!context.is_authenticated());
    }
}
