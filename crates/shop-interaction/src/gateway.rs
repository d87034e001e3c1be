//! AuthenticatedRequestGateway - plain and authenticated request channels.
//!
//! The authenticated channel attaches the session's bearer token at send
//! time. When the server reports an expired token it refreshes the token
//! once (shared with any concurrent callers, see [`RefreshGate`]) and
//! resends the original request a single time.

use crate::error::RequestError;
use crate::policy::{FailureAction, RefreshPolicy, RequestPhase};
use crate::refresh_gate::{RefreshError, RefreshFailure, RefreshGate};
use crate::request::{ApiResponse, OutgoingRequest};
use crate::transport::HttpTransport;
use futures::FutureExt;
use shop_core::user::SessionStore;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Outcome of an authenticated request together with the path it took.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub result: Result<ApiResponse, RequestError>,
    pub phase: RequestPhase,
}

impl Exchange {
    fn new(result: Result<ApiResponse, RequestError>, phase: RequestPhase) -> Self {
        Self { result, phase }
    }
}

struct GatewayInner {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    policy: RefreshPolicy,
    gate: RefreshGate,
}

/// Sends storefront API requests, keeping the bearer token fresh.
///
/// Cheap to clone; clones share the session, transport and refresh state.
///
/// # Example
///
/// ```ignore
/// let gateway = AuthenticatedRequestGateway::new(transport, session, RefreshPolicy::default());
/// let profile = gateway.send_authenticated(OutgoingRequest::get("/user/profile")).await?;
/// ```
#[derive(Clone)]
pub struct AuthenticatedRequestGateway {
    inner: Arc<GatewayInner>,
}

impl AuthenticatedRequestGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: SessionStore,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                session,
                policy,
                gate: RefreshGate::new(),
            }),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.inner.policy
    }

    /// Number of refresh calls issued by this gateway.
    pub fn refreshes_started(&self) -> u64 {
        self.inner.gate.refreshes_started()
    }

    /// Sends without an auth header; failures are returned unchanged.
    pub async fn send_plain(&self, request: OutgoingRequest) -> Result<ApiResponse, RequestError> {
        self.inner.transport.send(&request).await
    }

    /// Sends with the current bearer token, refreshing it once on expiry.
    pub async fn send_authenticated(
        &self,
        request: OutgoingRequest,
    ) -> Result<ApiResponse, RequestError> {
        self.dispatch_authenticated(request).await.result
    }

    /// Like [`send_authenticated`](Self::send_authenticated) but also reports
    /// the terminal phase the request reached.
    pub async fn dispatch_authenticated(&self, request: OutgoingRequest) -> Exchange {
        let span = tracing::debug_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.route(),
        );

        async move {
            let exchange = self.run_authenticated(request).await;
            tracing::debug!("[Gateway] Finished in phase {:?}", exchange.phase);
            exchange
        }
        .instrument(span)
        .await
    }

    async fn run_authenticated(&self, mut request: OutgoingRequest) -> Exchange {
        let token = self.inner.session.token().await;
        request.set_bearer(&token);

        let error = match self.inner.transport.send(&request).await {
            Ok(response) => return Exchange::new(Ok(response), RequestPhase::Ok),
            Err(error) => error,
        };

        match self.inner.policy.evaluate(&request, &error) {
            FailureAction::Propagate(reason) => {
                tracing::debug!("[Gateway] Propagating failure ({:?}): {}", reason, error);
                Exchange::new(Err(error), RequestPhase::Failed(reason))
            }
            FailureAction::Refresh => self.recover(request, &token, error).await,
        }
    }

    /// Refresh-and-retry after an expiry. `original` is what the caller
    /// gets back if the refresh fails.
    async fn recover(
        &self,
        mut request: OutgoingRequest,
        stale_token: &str,
        original: RequestError,
    ) -> Exchange {
        tracing::info!("[Gateway] Token expired, refreshing");

        let refresher = TokenRefresher {
            transport: Arc::clone(&self.inner.transport),
            session: self.inner.session.clone(),
            policy: self.inner.policy.clone(),
        };
        let refreshed = self
            .inner
            .gate
            .acquire(&self.inner.session, stale_token, move |token| {
                async move { refresher.refresh(token).await }.boxed()
            })
            .await;

        match refreshed {
            Ok(new_token) => {
                request.set_bearer(&new_token);
                match self.send_plain(request).await {
                    Ok(response) => Exchange::new(Ok(response), RequestPhase::RetryOk),
                    Err(error) => {
                        tracing::debug!("[Gateway] Retry after refresh failed: {}", error);
                        Exchange::new(Err(error), RequestPhase::RetryFailed)
                    }
                }
            }
            Err(RefreshError::SessionClosed) => {
                Exchange::new(Err(original), RequestPhase::SessionClosed)
            }
            Err(RefreshError::Failed { logged_out, .. }) => {
                let phase = if logged_out {
                    RequestPhase::LoggedOutFailed
                } else {
                    RequestPhase::RefreshFailed
                };
                Exchange::new(Err(original), phase)
            }
        }
    }
}

/// What a refresh cycle needs. Owns its handles so the in-flight refresh
/// held by the gate does not keep the gateway alive.
struct TokenRefresher {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    policy: RefreshPolicy,
}

impl TokenRefresher {
    /// Exchanges `token` for a new one and stores it in the session.
    ///
    /// Runs at most once per refresh cycle no matter how many callers wait
    /// on it, so the session write and any logout also happen once.
    async fn refresh(self, token: String) -> Result<String, RefreshFailure> {
        let mut request = OutgoingRequest::patch(self.policy.refresh_path.clone());
        request.set_bearer(&token);

        let outcome = match self.transport.send(&request).await {
            Ok(response) => response.result::<String>().and_then(|new_token| {
                if new_token.is_empty() {
                    Err(RequestError::decode("refresh returned an empty token"))
                } else {
                    Ok(new_token)
                }
            }),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(new_token) => {
                self.session.set_token(new_token.clone()).await;
                tracing::info!("[Gateway] Token refreshed");
                Ok(new_token)
            }
            Err(error) => {
                tracing::warn!("[Gateway] Token refresh failed: {}", error);
                let logged_out = self.policy.should_logout(&error);
                if logged_out {
                    self.session.logout().await;
                }
                Err(RefreshFailure { error, logged_out })
            }
        }
    }
}
