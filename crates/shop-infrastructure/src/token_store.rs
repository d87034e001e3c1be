//! File-backed token persistence.

use crate::paths::ShopPaths;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_core::user::TokenStore;
use shop_core::{Result, ShopError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;

/// On-disk shape of `<storage_key>.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// Persists the session token to a TOML file named after the storage key.
///
/// File access (including waiting on the lock file held by another process)
/// runs on the blocking thread pool.
///
/// # Example
///
/// ```ignore
/// use shop_infrastructure::{FileTokenStore, ShopPaths};
///
/// let store = FileTokenStore::new(&ShopPaths::new(), "shop-user")?;
/// ```
pub struct FileTokenStore {
    file: Arc<AtomicTomlFile<PersistedSession>>,
}

impl FileTokenStore {
    pub fn new(paths: &ShopPaths, storage_key: &str) -> Result<Self> {
        if storage_key.is_empty() || storage_key.contains(&['/', '\\'][..]) {
            return Err(ShopError::config(format!(
                "invalid storage key '{storage_key}'"
            )));
        }
        let path = paths
            .session_file(storage_key)
            .map_err(|e| ShopError::config(format!("Failed to get session path: {}", e)))?;
        Ok(Self::at(path))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load_token(&self) -> Result<Option<String>> {
        let file = Arc::clone(&self.file);
        let persisted = task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| ShopError::internal(format!("Failed to spawn blocking task: {}", e)))??;
        Ok(persisted.map(|persisted| persisted.token))
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        let file = Arc::clone(&self.file);
        let value = token.to_string();
        task::spawn_blocking(move || {
            file.update(PersistedSession::default(), |persisted| {
                persisted.token = value;
                persisted.saved_at = Some(Utc::now());
            })
        })
        .await
        .map_err(|e| ShopError::internal(format!("Failed to spawn blocking task: {}", e)))??;

        tracing::debug!(
            "[FileTokenStore] Token saved to {:?} (empty: {})",
            self.file.path(),
            token.is_empty()
        );
        Ok(())
    }
}
