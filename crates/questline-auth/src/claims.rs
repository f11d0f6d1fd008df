//! The claims payload signed inside every token.

use questline_protocol::{Identity, UserId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Claims carried by both access and refresh tokens.
///
/// The two kinds share this shape; only the signing secret and the expiry
/// window differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account id.
    pub sub: UserId,
    pub email: String,
    pub username: String,
    /// Issued-at, Unix seconds.
    pub iat: u64,
    /// Expires-at, Unix seconds. The token is dead once `now >= exp`.
    pub exp: u64,
    /// Random token id. Two tokens minted in the same second still differ.
    pub jti: String,
}

impl TokenClaims {
    /// Claims for `identity`, valid from `issued_at` for `ttl_secs`.
    pub fn for_identity(identity: &Identity, issued_at: u64, ttl_secs: u64) -> Self {
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            username: identity.username.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: generate_token_id(),
        }
    }

    /// `true` once the clock has reached `exp`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }
}

/// 16 random bytes as 32 lowercase hex characters.
fn generate_token_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("u-1"),
            username: "Wanderer".into(),
            email: "wanderer@example.com".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_for_identity_copies_subject_fields() {
        let claims = TokenClaims::for_identity(&identity(), 1_000, 60);

        assert_eq!(claims.sub, UserId::new("u-1"));
        assert_eq!(claims.email, "wanderer@example.com");
        assert_eq!(claims.username, "Wanderer");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
        assert_eq!(claims.jti.len(), 32);
    }

    #[test]
    fn test_for_identity_token_ids_are_unique() {
        let a = TokenClaims::for_identity(&identity(), 1_000, 60);
        let b = TokenClaims::for_identity(&identity(), 1_000, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_is_expired_at_boundary_is_expired() {
        let claims = TokenClaims::for_identity(&identity(), 1_000, 60);

        assert!(!claims.is_expired_at(1_059));
        assert!(claims.is_expired_at(1_060));
        assert!(claims.is_expired_at(5_000));
    }
}
