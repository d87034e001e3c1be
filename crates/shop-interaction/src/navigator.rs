//! Page navigation with session-aware guards.
//!
//! Mirrors the storefront router: the first navigation of a restored
//! session re-fetches the profile, then each navigation is checked against
//! the route's login/admin requirements.

use crate::user_api::UserApi;
use shop_core::i18n::I18n;
use shop_core::router::{Navigation, NavigationGuard, RouteMeta, RouteTable, TITLE_SUFFIX};
use tokio::sync::OnceCell;

/// Redirect chains longer than this are cut off.
const MAX_REDIRECTS: usize = 3;

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub path: String,
    /// Localized page title with the site suffix.
    pub title: String,
    /// Whether the guard redirected away from the requested path.
    pub redirected: bool,
}

pub struct Navigator {
    api: UserApi,
    routes: RouteTable,
    i18n: I18n,
    startup: OnceCell<()>,
}

impl Navigator {
    pub fn new(api: UserApi, routes: RouteTable, i18n: I18n) -> Self {
        Self {
            api,
            routes,
            i18n,
            startup: OnceCell::new(),
        }
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn i18n_mut(&mut self) -> &mut I18n {
        &mut self.i18n
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn navigate(&self, to: &str) -> ResolvedPage {
        self.startup.get_or_init(|| self.restore_profile()).await;

        let session = self.api.session().snapshot().await;
        let mut path = to.to_string();
        let mut redirected = false;

        for _ in 0..MAX_REDIRECTS {
            match NavigationGuard::decide(&session, &path, &self.meta(&path)) {
                Navigation::Proceed => break,
                Navigation::Redirect(target) => {
                    tracing::debug!("[Navigator] {} -> {}", path, target);
                    path = target;
                    redirected = true;
                }
            }
        }

        let title = self.title(&self.meta(&path));
        ResolvedPage {
            path,
            title,
            redirected,
        }
    }

    fn meta(&self, path: &str) -> RouteMeta {
        self.routes.get(path).cloned().unwrap_or_default()
    }

    fn title(&self, meta: &RouteMeta) -> String {
        format!("{}{}", self.i18n.t(&meta.title), TITLE_SUFFIX)
    }

    /// Refreshes account/role/cart for a session restored from disk; any
    /// failure ends the session.
    async fn restore_profile(&self) {
        if !self.api.session().is_logged_in().await {
            return;
        }
        match self.api.sync_profile().await {
            Ok(session) => {
                tracing::debug!("[Navigator] Restored profile for '{}'", session.account)
            }
            Err(e) => {
                tracing::warn!("[Navigator] Profile fetch failed, logging out: {}", e);
                self.api.session().logout().await;
            }
        }
    }
}
