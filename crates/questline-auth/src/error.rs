//! Error types for the auth layer.
//!
//! Three enums, one per concern:
//!
//! - [`TokenError`]: why a single token failed to sign or verify. Only the
//!   codec and the issuer/validator internals see these.
//! - [`AuthError`]: what an auth operation tells its caller. Token failures
//!   are collapsed here so callers can't learn *why* a token was refused.
//! - [`ConfigError`]: the service refuses to start.

/// Failure to sign or verify one token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not three dot-separated parts, or a part isn't valid base64/JSON,
    /// or required claims are missing.
    #[error("malformed token")]
    Malformed,

    /// Structurally fine but signed with a different secret or algorithm.
    #[error("token signature does not match")]
    InvalidSignature,

    /// The clock has reached the token's `exp`.
    #[error("token expired")]
    Expired,

    /// Signing failed. Only possible with unusable key material.
    #[error("token signing failed: {0}")]
    Encode(String),
}

/// Errors returned by login, refresh, and request validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password did not match. Deliberately says nothing about
    /// which one.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The access token on an inbound request was malformed, forged,
    /// expired, or names an unknown account.
    #[error("unauthorized")]
    Unauthorized,

    /// The refresh exchange can't proceed with the presented token.
    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,

    /// A token could not be minted.
    #[error("failed to issue token: {0}")]
    Issue(#[source] TokenError),
}

impl AuthError {
    /// HTTP-style status the transport layer should render.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::Unauthorized | Self::InvalidRefreshToken => 401,
            Self::Issue(_) => 500,
        }
    }
}

/// Invalid auth configuration. Raised at startup, never per request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required secret is absent or empty.
    #[error("missing required secret {0}")]
    MissingSecret(&'static str),

    /// A secret loaded from the environment is shorter than the minimum.
    #[error("{name} must be at least {min} characters long")]
    SecretTooShort { name: &'static str, min: usize },

    /// Access and refresh tokens must not share key material.
    #[error("access and refresh secrets must differ")]
    SharedSecret,

    /// A TTL string could not be parsed, or parsed to zero.
    #[error("invalid duration for {name}: {value:?}")]
    InvalidDuration { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_is_unauthorized_for_auth_failures() {
        assert_eq!(AuthError::InvalidCredentials.status(), 401);
        assert_eq!(AuthError::Unauthorized.status(), 401);
        assert_eq!(AuthError::InvalidRefreshToken.status(), 401);
        assert_eq!(AuthError::Issue(TokenError::Encode("k".into())).status(), 500);
    }

    #[test]
    fn test_invalid_credentials_message_does_not_name_a_field() {
        let msg = AuthError::InvalidCredentials.to_string();
        assert!(!msg.contains("email"));
        assert!(!msg.contains("password"));
    }
}
