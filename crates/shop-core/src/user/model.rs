//! Session domain model.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Role of the signed-in account.
///
/// On the wire the API uses numeric codes (`0` user, `1` admin); the names
/// `"USER"`/`"ADMIN"` are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn code(self) -> u8 {
        match self {
            UserRole::User => 0,
            UserRole::Admin => 1,
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Code(u64),
            Name(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Code(0) => Ok(UserRole::User),
            Wire::Code(1) => Ok(UserRole::Admin),
            Wire::Code(other) => Err(D::Error::custom(format!("unknown role code {other}"))),
            Wire::Name(name) => name
                .parse()
                .map_err(|_| D::Error::custom(format!("unknown role '{name}'"))),
        }
    }
}

/// Profile payload returned by `POST /user/login` and `GET /user/profile`.
///
/// Login responses carry a `token`; profile responses do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub cart: u32,
}

/// In-memory state of the current user.
///
/// An empty token means logged out. Only the token is persisted; the rest
/// is refilled from the profile endpoint after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub account: String,
    pub role: UserRole,
    pub cart: u32,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn avatar_url(&self) -> String {
        format!("https://api.multiavatar.com/{}.png", self.account)
    }

    /// Applies a login or profile payload.
    ///
    /// The token is replaced only when the payload carries a non-empty one;
    /// account, role and cart are always overwritten.
    pub fn login(&mut self, profile: UserProfile) {
        if let Some(token) = profile.token.filter(|t| !t.is_empty()) {
            self.token = token;
        }
        self.account = profile.account;
        self.role = profile.role;
        self.cart = profile.cart;
    }

    pub fn logout(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_then_profile_preserves_token() {
        let mut session = Session::default();
        session.login(UserProfile {
            token: Some("t1".into()),
            account: "a".into(),
            role: UserRole::Admin,
            cart: 3,
        });
        assert_eq!(session.token, "t1");
        assert!(session.is_admin());
        assert_eq!(session.cart, 3);

        session.login(UserProfile {
            token: None,
            account: "a2".into(),
            role: UserRole::User,
            cart: 0,
        });
        assert_eq!(session.token, "t1");
        assert_eq!(session.account, "a2");
        assert!(!session.is_admin());
        assert_eq!(session.cart, 0);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut session = Session {
            token: "t".into(),
            account: "a".into(),
            role: UserRole::Admin,
            cart: 9,
        };
        session.logout();
        let once = session.clone();
        session.logout();
        assert_eq!(session, once);
        assert_eq!(session, Session::default());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_role_accepts_codes_and_names() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"account":"a","role":1,"cart":2}"#).unwrap();
        assert_eq!(profile.role, UserRole::Admin);

        let profile: UserProfile =
            serde_json::from_str(r#"{"account":"a","role":"ADMIN","cart":2}"#).unwrap();
        assert_eq!(profile.role, UserRole::Admin);

        let profile: UserProfile = serde_json::from_str(r#"{"account":"a","role":"user"}"#).unwrap();
        assert_eq!(profile.role, UserRole::User);
        assert_eq!(profile.cart, 0);

        assert!(serde_json::from_str::<UserProfile>(r#"{"role":7}"#).is_err());
    }

    #[test]
    fn test_avatar_url() {
        let session = Session {
            account: "alice".into(),
            ..Default::default()
        };
        assert_eq!(session.avatar_url(), "https://api.multiavatar.com/alice.png");
    }
}
