//! Configuration service implementation.
//!
//! Loads `ShopConfig` from `config.toml` and applies environment overrides.
//!
//! Priority: environment variables > config.toml > built-in defaults.

use crate::paths::ShopPaths;
use shop_core::config::ShopConfig;
use shop_core::{Result, ShopError};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "SHOP_API_URL";
/// Overrides `i18n.locale`.
pub const ENV_LOCALE: &str = "SHOP_LOCALE";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ShopConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &ShopPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| ShopError::config(format!("Failed to get config path: {}", e)))?;
        Ok(Self::at(path))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file on first access.
    pub fn get_config(&self) -> Result<ShopConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_file()?;
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok());

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_file(&self) -> Result<ShopConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {:?}, using defaults",
                self.path
            );
            return Ok(ShopConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: ShopConfig = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded config from {:?}", self.path);
        Ok(config)
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ShopConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
        config.i18n.locale = locale.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::config::RefreshFailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::at(temp_dir.path().join("config.toml"));
        let mut config = service.load_file().unwrap();
        apply_env_overrides(&mut config, |_| None);
        assert_eq!(config, ShopConfig::default());
    }

    #[test]
    fn test_file_values_and_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[session]\nrefresh_failure = \"logout_on_rejection\"\n[api]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let service = ConfigService::at(path.clone());
        let config = service.load_file().unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.session.refresh_failure,
            RefreshFailurePolicy::LogoutOnRejection
        );

        let first = service.get_config().unwrap();
        std::fs::write(&path, "[api]\ntimeout_secs = 9\n").unwrap();
        assert_eq!(service.get_config().unwrap(), first);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().api.timeout_secs, 9);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ShopConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_API_URL => Some("https://api.shop.test/ ".to_string()),
            ENV_LOCALE => Some("en".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://api.shop.test");
        assert_eq!(config.i18n.locale, "en");
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config = ShopConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config, ShopConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api\n").unwrap();
        assert!(ConfigService::at(path).get_config().is_err());
    }
}
