//! Retry policy for authenticated requests.
//!
//! The gateway asks the policy what to do with a failure instead of
//! hard-coding the decision in the send path. Per request the outcome is
//! one of the terminal [`RequestPhase`]s, reached after at most one refresh.

use crate::error::RequestError;
use crate::request::OutgoingRequest;
use shop_core::config::{DEFAULT_REFRESH_PATH, RefreshFailurePolicy, ShopConfig};

pub const TOKEN_EXPIRED: &str = "userTokenExpired";

/// Why a failure is handed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateReason {
    /// No response was received; the token may not be the cause.
    NoResponse,
    /// The server rejected the request for some other reason.
    NotExpired,
    /// The refresh call itself reported expiry.
    RefreshEndpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Propagate(PropagateReason),
    Refresh,
}

/// Terminal state of one authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// First attempt succeeded.
    Ok,
    /// First attempt failed and the failure was propagated.
    Failed(PropagateReason),
    /// Refreshed, retried, retry succeeded.
    RetryOk,
    /// Refreshed, retried, retry failed.
    RetryFailed,
    /// Refresh failed and the session was logged out.
    LoggedOutFailed,
    /// Refresh failed but policy kept the session.
    RefreshFailed,
    /// Session was already logged out, so no refresh was attempted.
    SessionClosed,
}

impl RequestPhase {
    pub fn is_success(self) -> bool {
        matches!(self, RequestPhase::Ok | RequestPhase::RetryOk)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub refresh_path: String,
    pub expired_sentinel: String,
    pub on_refresh_failure: RefreshFailurePolicy,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            expired_sentinel: TOKEN_EXPIRED.to_string(),
            on_refresh_failure: RefreshFailurePolicy::default(),
        }
    }
}

impl RefreshPolicy {
    pub fn from_config(config: &ShopConfig) -> Self {
        Self {
            refresh_path: config.api.refresh_path.clone(),
            expired_sentinel: TOKEN_EXPIRED.to_string(),
            on_refresh_failure: config.session.refresh_failure,
        }
    }

    pub fn with_failure_policy(mut self, policy: RefreshFailurePolicy) -> Self {
        self.on_refresh_failure = policy;
        self
    }

    pub fn is_refresh_request(&self, request: &OutgoingRequest) -> bool {
        request.route() == self.refresh_path
    }

    /// Decides what to do with a failed authenticated request.
    pub fn evaluate(&self, request: &OutgoingRequest, error: &RequestError) -> FailureAction {
        if !error.has_response() {
            FailureAction::Propagate(PropagateReason::NoResponse)
        } else if !error.is_auth_expired(&self.expired_sentinel) {
            FailureAction::Propagate(PropagateReason::NotExpired)
        } else if self.is_refresh_request(request) {
            FailureAction::Propagate(PropagateReason::RefreshEndpoint)
        } else {
            FailureAction::Refresh
        }
    }

    /// Whether a failed refresh ends the session.
    pub fn should_logout(&self, refresh_error: &RequestError) -> bool {
        match self.on_refresh_failure {
            RefreshFailurePolicy::AlwaysLogout => true,
            RefreshFailurePolicy::LogoutOnRejection => {
                matches!(refresh_error, RequestError::Server { .. })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expired() -> RequestError {
        RequestError::server(401, json!({ "message": TOKEN_EXPIRED }))
    }

    #[test]
    fn test_evaluate_branches() {
        let policy = RefreshPolicy::default();
        let orders = OutgoingRequest::get("/order");

        assert_eq!(policy.evaluate(&orders, &expired()), FailureAction::Refresh);
        assert_eq!(
            policy.evaluate(&orders, &RequestError::network("reset")),
            FailureAction::Propagate(PropagateReason::NoResponse)
        );
        assert_eq!(
            policy.evaluate(
                &orders,
                &RequestError::server(403, json!({ "message": "forbidden" }))
            ),
            FailureAction::Propagate(PropagateReason::NotExpired)
        );
        assert_eq!(
            policy.evaluate(&OutgoingRequest::patch("/user/refresh"), &expired()),
            FailureAction::Propagate(PropagateReason::RefreshEndpoint)
        );
    }

    #[test]
    fn test_expiry_is_detected_by_message_not_status() {
        let policy = RefreshPolicy::default();
        let err = RequestError::server(400, json!({ "message": TOKEN_EXPIRED }));
        assert_eq!(
            policy.evaluate(&OutgoingRequest::get("/cart"), &err),
            FailureAction::Refresh
        );
    }

    #[test]
    fn test_logout_policy() {
        let always = RefreshPolicy::default();
        assert!(always.should_logout(&RequestError::network("down")));
        assert!(always.should_logout(&expired()));

        let lenient =
            RefreshPolicy::default().with_failure_policy(RefreshFailurePolicy::LogoutOnRejection);
        assert!(!lenient.should_logout(&RequestError::network("down")));
        assert!(!lenient.should_logout(&RequestError::decode("no result")));
        assert!(lenient.should_logout(&expired()));
    }

    #[test]
    fn test_from_config() {
        let mut config = ShopConfig::default();
        config.api.refresh_path = "/auth/renew".into();
        let policy = RefreshPolicy::from_config(&config);
        assert!(policy.is_refresh_request(&OutgoingRequest::patch("/auth/renew")));
        assert!(!policy.is_refresh_request(&OutgoingRequest::patch("/user/refresh")));
    }
}
