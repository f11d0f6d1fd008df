//! Access-token checks for protected requests.

use std::sync::Arc;

use questline_protocol::Identity;

use crate::{AccountStore, AuthError, TokenCodec, TokenSecret};

/// Turns a presented access token into the [`Identity`] it was issued to.
#[derive(Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
    access_secret: TokenSecret,
    accounts: Arc<dyn AccountStore>,
}

impl TokenValidator {
    pub fn new(
        codec: TokenCodec,
        access_secret: TokenSecret,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            codec,
            access_secret,
            accounts,
        }
    }

    /// Validates a bare access token.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`] for every failure. The cause is logged
    /// at debug level and never surfaced to the caller.
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.verify(token, &self.access_secret).map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            AuthError::Unauthorized
        })?;

        if claims.sub.as_str().is_empty() || claims.email.is_empty() {
            tracing::debug!("access token missing subject claims");
            return Err(AuthError::Unauthorized);
        }

        self.accounts.find_by_id(&claims.sub).ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "access token for unknown account");
            AuthError::Unauthorized
        })
    }

    /// Validates the value of an `Authorization` header.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`] if the header is absent, is not a
    /// bearer credential, or carries an invalid token.
    pub fn validate_header(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let token = header.and_then(extract_bearer).ok_or_else(|| {
            tracing::debug!("missing or non-bearer authorization header");
            AuthError::Unauthorized
        })?;
        self.validate(token)
    }
}

/// Pulls the token out of `Bearer <token>`. The scheme is matched
/// case-insensitively; an empty token yields `None`.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
