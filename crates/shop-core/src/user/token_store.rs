//! Persistence seam for the bearer token.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Durable storage for the session token.
///
/// Only the token survives restarts. Implementations must treat an empty
/// string as "logged out". Blocking I/O belongs off the async executor.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the persisted token, `None` when nothing was stored yet.
    async fn load_token(&self) -> Result<Option<String>>;

    /// Persists the token, replacing any previous value.
    async fn save_token(&self, token: &str) -> Result<()>;
}

/// Process-local token store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|e| crate::ShopError::internal(format!("token lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| crate::ShopError::internal(format!("token lock poisoned: {e}")))?;
        *guard = Some(token.to_string());
        Ok(())
    }
}
