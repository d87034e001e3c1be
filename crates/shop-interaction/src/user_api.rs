//! Typed calls to the `/user` endpoints.

use crate::error::RequestError;
use crate::gateway::AuthenticatedRequestGateway;
use crate::request::OutgoingRequest;
use serde_json::json;
use shop_core::user::{Session, SessionStore, UserProfile};

pub const USER_PATH: &str = "/user";
pub const LOGIN_PATH: &str = "/user/login";
pub const PROFILE_PATH: &str = "/user/profile";
pub const LOGOUT_PATH: &str = "/user/logout";

#[derive(Clone)]
pub struct UserApi {
    gateway: AuthenticatedRequestGateway,
}

impl UserApi {
    pub fn new(gateway: AuthenticatedRequestGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &AuthenticatedRequestGateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    /// Creates an account. Does not sign in.
    pub async fn register(
        &self,
        account: &str,
        email: &str,
        password: &str,
    ) -> Result<(), RequestError> {
        let request = OutgoingRequest::post(USER_PATH).with_json(json!({
            "account": account,
            "email": email,
            "password": password,
        }));
        self.gateway.send_plain(request).await?;
        tracing::info!("[UserApi] Registered account '{}'", account);
        Ok(())
    }

    /// Signs in and applies the returned profile (including its token) to the session.
    pub async fn login(&self, account: &str, password: &str) -> Result<Session, RequestError> {
        let request = OutgoingRequest::post(LOGIN_PATH).with_json(json!({
            "account": account,
            "password": password,
        }));
        let response = self.gateway.send_plain(request).await?;
        let profile: UserProfile = response.result()?;
        if profile.token.as_deref().is_none_or(str::is_empty) {
            return Err(RequestError::decode("login response carries no token"));
        }

        self.session().login(profile).await;
        Ok(self.session().snapshot().await)
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, RequestError> {
        let response = self
            .gateway
            .send_authenticated(OutgoingRequest::get(PROFILE_PATH))
            .await?;
        response.result()
    }

    /// Fetches the profile and applies it to the session (token untouched).
    pub async fn sync_profile(&self) -> Result<Session, RequestError> {
        let profile = self.fetch_profile().await?;
        self.session().login(profile).await;
        Ok(self.session().snapshot().await)
    }

    /// Ends the session. The server call is best-effort; the local
    /// session is always cleared.
    pub async fn logout(&self) {
        if self.session().is_logged_in().await
            && let Err(e) = self
                .gateway
                .send_authenticated(OutgoingRequest::delete(LOGOUT_PATH))
                .await
        {
            tracing::warn!("[UserApi] Server-side logout failed: {}", e);
        }
        self.session().logout().await;
    }
}
