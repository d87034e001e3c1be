pub mod config;
pub mod error;
pub mod i18n;
pub mod router;
pub mod user;

// Re-export common error type
pub use error::{Result, ShopError};
