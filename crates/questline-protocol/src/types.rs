//! Payload types for the login and refresh calls.
//!
//! Field names follow the browser client's JSON (camelCase), so
//! `TokenPair` serializes as `{"accessToken", "refreshToken", "user"}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque, stable identifier of an account.
///
/// Newtype over `String` so a user id can't be mixed up with an email or
/// a token. `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a session belongs to.
///
/// Immutable once created: the auth service hands out clones, never
/// mutable references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable account id; becomes the `sub` claim of every token.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Login email, stored in its canonical spelling.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TokenPair
// ---------------------------------------------------------------------------

/// The result of a successful login or refresh exchange.
///
/// Both tokens always encode `identity.id` as their subject.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential for ordinary requests.
    pub access_token: String,
    /// Long-lived credential, only ever sent to the refresh endpoint.
    pub refresh_token: String,
    /// The account both tokens were minted for.
    #[serde(rename = "user")]
    pub identity: Identity,
}

// Tokens are credentials: keep them out of logs and panic messages.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these shapes directly, so the tests pin
    //! the JSON field names rather than just round-tripping.

    use super::*;
    use chrono::TimeZone;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("00000000-0000-0000-0000-000000000001"),
            username: "Wanderer".into(),
            email: "wanderer@example.com".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_user_id_display_is_raw_id() {
        assert_eq!(UserId::new("u-7").to_string(), "u-7");
    }

    #[test]
    fn test_identity_uses_camel_case_created_at() {
        let json = serde_json::to_value(identity()).unwrap();

        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000001");
        assert_eq!(json["username"], "Wanderer");
        assert_eq!(json["email"], "wanderer@example.com");
        assert!(json["createdAt"].is_string());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_token_pair_json_shape_matches_auth_response() {
        let pair = TokenPair {
            access_token: "a.b.c".into(),
            refresh_token: "d.e.f".into(),
            identity: identity(),
        };
        let json = serde_json::to_value(&pair).unwrap();

        assert_eq!(json["accessToken"], "a.b.c");
        assert_eq!(json["refreshToken"], "d.e.f");
        assert_eq!(json["user"]["username"], "Wanderer");
    }

    #[test]
    fn test_token_pair_debug_redacts_tokens() {
        let pair = TokenPair {
            access_token: "secret-access".into(),
            refresh_token: "secret-refresh".into(),
            identity: identity(),
        };
        let printed = format!("{pair:?}");

        assert!(!printed.contains("secret-access"));
        assert!(!printed.contains("secret-refresh"));
        assert!(printed.contains("Wanderer"));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{req:?}").contains("hunter2"));
    }

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let json: serde_json::Value = serde_json::to_value(RefreshRequest {
            refresh_token: "x".into(),
        })
        .unwrap();
        assert_eq!(json["refreshToken"], "x");
    }
}
