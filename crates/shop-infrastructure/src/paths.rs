//! Unified path management for shopfront files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/shopfront/         # Config directory
//! ├── config.toml              # Application configuration
//! └── shop-user.toml           # Persisted session token (storage key)
//! ```
//!
//! Tests and embedders can root everything somewhere else with
//! [`ShopPaths::with_base`].

use std::path::{Path, PathBuf};

const APP_DIR: &str = "shopfront";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where shopfront keeps its files.
#[derive(Debug, Clone, Default)]
pub struct ShopPaths {
    base: Option<PathBuf>,
}

impl ShopPaths {
    /// Paths under the platform config directory (`dirs::config_dir()/shopfront`).
    pub fn new() -> Self {
        Self { base: None }
    }

    /// Paths under an explicit base directory.
    pub fn with_base(base: impl AsRef<Path>) -> Self {
        Self {
            base: Some(base.as_ref().to_path_buf()),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Path of the persisted token for `storage_key`.
    pub fn session_file(&self, storage_key: &str) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(format!("{storage_key}.toml")))
    }
}
