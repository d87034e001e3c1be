//! User session domain module.
//!
//! # Module Structure
//!
//! - `model`: `Session`, `UserRole` and the `UserProfile` payload
//! - `token_store`: persistence seam for the bearer token
//! - `store`: `SessionStore`, the shared session handle
//!
//! # Usage
//!
//! ```ignore
//! use shop_core::user::{SessionStore, MemoryTokenStore, UserProfile};
//! ```

mod model;
mod store;
mod token_store;

pub use model::{Session, UserProfile, UserRole};
pub use store::SessionStore;
pub use token_store::{MemoryTokenStore, TokenStore};
