//! Shared, persisted session handle.

use super::model::{Session, UserProfile};
use super::token_store::TokenStore;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Handle to the current user's session.
///
/// Cloning is cheap and all clones see the same state. Every mutation
/// (login, token write, logout) runs under a single write lock. The token
/// is persisted after that lock is released; saves are serialized and each
/// one writes the token current at the time it runs, so the last save always
/// matches memory.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Session>>,
    persist_lock: Arc<Mutex<()>>,
    token_store: Arc<dyn TokenStore>,
}

impl SessionStore {
    /// Creates an empty session backed by `token_store`.
    ///
    /// Call [`SessionStore::restore`] to pick up a token from a previous run.
    pub fn new(token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            persist_lock: Arc::new(Mutex::new(())),
            token_store,
        }
    }

    /// Creates a session and loads the persisted token into it.
    pub async fn restore(token_store: Arc<dyn TokenStore>) -> Result<Self> {
        let store = Self::new(token_store);
        let persisted = store.token_store.load_token().await?;
        if let Some(token) = persisted.filter(|t| !t.is_empty()) {
            tracing::debug!("[SessionStore] Restored persisted token");
            store.session.write().await.token = token;
        }
        Ok(store)
    }

    pub async fn token(&self) -> String {
        self.session.read().await.token.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_logged_in()
    }

    pub async fn is_admin(&self) -> bool {
        self.session.read().await.is_admin()
    }

    /// Returns a copy of the whole session.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Replaces the token only, leaving account, role and cart untouched.
    pub async fn set_token(&self, token: impl Into<String>) {
        self.session.write().await.token = token.into();
        self.persist().await;
    }

    pub async fn login(&self, profile: UserProfile) {
        {
            let mut session = self.session.write().await;
            session.login(profile);
            tracing::info!(
                "[SessionStore] Logged in as '{}' ({})",
                session.account,
                session.role
            );
        }
        self.persist().await;
    }

    pub async fn logout(&self) {
        let was_logged_in = {
            let mut session = self.session.write().await;
            let was_logged_in = session.is_logged_in();
            session.logout();
            was_logged_in
        };
        if was_logged_in {
            tracing::info!("[SessionStore] Logged out");
        }
        self.persist().await;
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let token = self.token().await;
        if let Err(e) = self.token_store.save_token(&token).await {
            tracing::warn!("[SessionStore] Failed to persist token: {}", e);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
