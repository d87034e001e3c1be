//! Navigation guard for storefront pages.
//!
//! Pages declare whether they need a signed-in user or an admin; the guard
//! turns that plus the current session into a navigation decision.

use crate::user::Session;
use std::collections::HashMap;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const CART_PATH: &str = "/cart";
pub const ORDERS_PATH: &str = "/orders";
pub const ADMIN_PATH: &str = "/admin";
pub const ADMIN_PRODUCTS_PATH: &str = "/admin/products";
pub const ADMIN_ORDERS_PATH: &str = "/admin/orders";

/// Suffix appended to every page title.
pub const TITLE_SUFFIX: &str = " | 購物網站";

/// Per-page requirements and title key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub login: bool,
    pub admin: bool,
    /// i18n key of the page title.
    pub title: String,
}

impl RouteMeta {
    pub fn public(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn member(title: impl Into<String>) -> Self {
        Self {
            login: true,
            admin: false,
            title: title.into(),
        }
    }

    pub fn admin(title: impl Into<String>) -> Self {
        Self {
            login: true,
            admin: true,
            title: title.into(),
        }
    }
}

/// Path to page meta lookup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteMeta>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's pages with their access requirements.
    pub fn storefront() -> Self {
        Self::new()
            .with_route(HOME_PATH, RouteMeta::public("nav.home"))
            .with_route(LOGIN_PATH, RouteMeta::public("nav.login"))
            .with_route(REGISTER_PATH, RouteMeta::public("nav.register"))
            .with_route(CART_PATH, RouteMeta::member("nav.cart"))
            .with_route(ORDERS_PATH, RouteMeta::member("nav.orders"))
            .with_route(ADMIN_PATH, RouteMeta::admin("nav.admin"))
            .with_route(ADMIN_PRODUCTS_PATH, RouteMeta::admin("nav.adminProducts"))
            .with_route(ADMIN_ORDERS_PATH, RouteMeta::admin("nav.adminOrders"))
    }

    pub fn with_route(mut self, path: impl Into<String>, meta: RouteMeta) -> Self {
        self.insert(path, meta);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, meta: RouteMeta) {
        self.routes.insert(path.into(), meta);
    }

    pub fn get(&self, path: &str) -> Option<&RouteMeta> {
        self.routes.get(path)
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

/// Stateless route guard.
pub struct NavigationGuard;

impl NavigationGuard {
    /// Decides whether `session` may open `to`.
    ///
    /// Rules are checked in order:
    /// 1. signed-in users are sent home from the login and register pages
    /// 2. pages needing login send anonymous users to the login page
    /// 3. admin pages send non-admins home
    pub fn decide(session: &Session, to: &str, meta: &RouteMeta) -> Navigation {
        if session.is_logged_in() && (to == LOGIN_PATH || to == REGISTER_PATH) {
            Navigation::Redirect(HOME_PATH.to_string())
        } else if meta.login && !session.is_logged_in() {
            Navigation::Redirect(LOGIN_PATH.to_string())
        } else if meta.admin && !session.is_admin() {
            Navigation::Redirect(HOME_PATH.to_string())
        } else {
            Navigation::Proceed
        }
    }
}
