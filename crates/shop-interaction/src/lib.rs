//! Storefront API client: request channels, token refresh and navigation.

pub mod error;
pub mod gateway;
pub mod navigator;
pub mod policy;
pub mod refresh_gate;
pub mod request;
pub mod transport;
pub mod user_api;

pub use error::RequestError;
pub use gateway::{AuthenticatedRequestGateway, Exchange};
pub use navigator::{Navigator, ResolvedPage};
pub use policy::{FailureAction, PropagateReason, RefreshPolicy, RequestPhase};
pub use refresh_gate::{RefreshError, RefreshFailure, RefreshGate};
pub use request::{ApiResponse, OutgoingRequest};
pub use transport::{HttpTransport, ReqwestTransport};
pub use user_api::UserApi;
