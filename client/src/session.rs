//! Session state and persistence
//!
//! Replaces the original ambient local-storage access with an explicit
//! store interface: the token pair, the authenticated user, and the list of
//! dismissed alert ids are loaded once at startup and written through on
//! every change.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use shared::User;

/// Access/refresh token pair issued by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// Everything the client persists between launches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub tokens: Option<AuthTokens>,
    pub user: Option<User>,
    /// Alerts the user dismissed. Client-side only; the server has no
    /// per-user alert dismissal in this contract.
    pub dismissed_alert_ids: Vec<Uuid>,
}

/// Persistence backend for session data
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> ApiResult<SessionData>;
    async fn save(&self, data: &SessionData) -> ApiResult<()>;
}

/// File-backed store used on devices
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> ApiResult<SessionData> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Session(format!("corrupt session file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionData::default()),
            Err(e) => Err(ApiError::Session(e.to_string())),
        }
    }

    async fn save(&self, data: &SessionData) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Session(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(data).map_err(|e| ApiError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ApiError::Session(e.to_string()))
    }
}

/// In-memory store for tests and the mock backend
#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<SessionData>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ApiResult<SessionData> {
        Ok(self.data.lock().expect("session store poisoned").clone())
    }

    async fn save(&self, data: &SessionData) -> ApiResult<()> {
        *self.data.lock().expect("session store poisoned") = data.clone();
        Ok(())
    }
}

/// Shared handle to the live session, written through to its store
#[derive(Clone)]
pub struct Session {
    data: Arc<RwLock<SessionData>>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Load the persisted session once at startup.
    pub async fn load(store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let data = store.load().await?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            store,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().tokens.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().tokens.as_ref().map(|t| t.access.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().tokens.as_ref().map(|t| t.refresh.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Store the user and token pair after a successful login or register.
    pub async fn set_login(&self, user: User, tokens: AuthTokens) -> ApiResult<()> {
        {
            let mut data = self.write();
            data.user = Some(user);
            data.tokens = Some(tokens);
        }
        self.persist().await
    }

    /// Replace only the access token after a successful refresh.
    pub async fn set_access_token(&self, access: String) -> ApiResult<()> {
        {
            let mut data = self.write();
            if let Some(tokens) = data.tokens.as_mut() {
                tokens.access = access;
            }
        }
        self.persist().await
    }

    /// Drop credentials. Dismissed alert ids survive logout on purpose:
    /// a broadcast alert should not reappear because the user re-logged in.
    pub async fn clear_credentials(&self) -> ApiResult<()> {
        {
            let mut data = self.write();
            data.tokens = None;
            data.user = None;
        }
        self.persist().await
    }

    pub fn is_alert_dismissed(&self, id: Uuid) -> bool {
        self.read().dismissed_alert_ids.contains(&id)
    }

    pub fn dismissed_alert_ids(&self) -> Vec<Uuid> {
        self.read().dismissed_alert_ids.clone()
    }

    /// Record an alert dismissal. No server call is made.
    pub async fn dismiss_alert(&self, id: Uuid) -> ApiResult<()> {
        {
            let mut data = self.write();
            if !data.dismissed_alert_ids.contains(&id) {
                data.dismissed_alert_ids.push(id);
            }
        }
        self.persist().await
    }

    async fn persist(&self) -> ApiResult<()> {
        let snapshot = self.read().clone();
        self.store.save(&snapshot).await
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionData> {
        self.data.read().expect("session lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionData> {
        self.data.write().expect("session lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        let mut data = SessionData::default();
        data.dismissed_alert_ids.push(Uuid::new_v4());
        store.save(&data).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.dismissed_alert_ids, data.dismissed_alert_ids);
    }

    #[tokio::test]
    async fn missing_session_file_loads_a_default_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        let loaded = store.load().await.unwrap();
        assert!(loaded.tokens.is_none());
        assert!(loaded.dismissed_alert_ids.is_empty());
    }

    #[tokio::test]
    async fn dismissal_survives_a_reload_from_the_same_store() {
        let store = Arc::new(MemorySessionStore::default());
        let id = Uuid::new_v4();

        let session = Session::load(store.clone()).await.unwrap();
        session.dismiss_alert(id).await.unwrap();
        assert!(session.is_alert_dismissed(id));

        // Simulate an app restart against the same persisted store.
        let reloaded = Session::load(store).await.unwrap();
        assert!(reloaded.is_alert_dismissed(id));
    }

    #[tokio::test]
    async fn dismissing_twice_stores_one_id() {
        let store = Arc::new(MemorySessionStore::default());
        let session = Session::load(store).await.unwrap();
        let id = Uuid::new_v4();

        session.dismiss_alert(id).await.unwrap();
        session.dismiss_alert(id).await.unwrap();
        assert_eq!(session.dismissed_alert_ids().len(), 1);
    }

    #[tokio::test]
    async fn clearing_credentials_keeps_dismissals() {
        let store = Arc::new(MemorySessionStore::default());
        let session = Session::load(store).await.unwrap();
        let id = Uuid::new_v4();

        session.dismiss_alert(id).await.unwrap();
        session.clear_credentials().await.unwrap();
        assert!(session.is_alert_dismissed(id));
        assert!(!session.is_authenticated());
    }
}
