//! Configuration types for shopfront.
//!
//! Loaded from `config.toml` by `shop_infrastructure::ConfigService`. Every
//! section has defaults, so an empty or missing file is a valid config.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_REFRESH_PATH: &str = "/user/refresh";
pub const DEFAULT_STORAGE_KEY: &str = "shop-user";
pub const DEFAULT_LOCALE: &str = "zhHant";

/// Root configuration.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ShopConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
}

/// Where and how to reach the storefront API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// Transport-level timeout for every request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            refresh_path: default_refresh_path(),
        }
    }
}

/// What to do with the session when a token refresh fails.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefreshFailurePolicy {
    /// Log out on any refresh failure, including network errors.
    #[default]
    AlwaysLogout,
    /// Log out only when the server answered the refresh with an error.
    LogoutOnRejection,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Storage key of the persisted token file (`<key>.toml`).
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub refresh_failure: RefreshFailurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            refresh_failure: RefreshFailurePolicy::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_locale")]
    pub fallback: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            fallback: default_locale(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
