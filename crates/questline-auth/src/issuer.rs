//! Minting token pairs: on login and on refresh exchange.

use std::sync::Arc;
use std::time::Duration;

use questline_protocol::{Identity, TokenPair};

use crate::{AccountStore, AuthConfig, AuthError, ConfigError, TokenCodec, TokenSecret};

/// Issues fresh (access, refresh) pairs.
///
/// There is no revocation list: a refresh token stays usable until its
/// own `exp`, even after it has been exchanged once.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_secret: TokenSecret,
    refresh_secret: TokenSecret,
    access_ttl: Duration,
    refresh_ttl: Duration,
    accounts: Arc<dyn AccountStore>,
}

impl TokenIssuer {
    /// # Errors
    /// Returns the config's validation error, if any.
    pub fn new(
        config: &AuthConfig,
        codec: TokenCodec,
        accounts: Arc<dyn AccountStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            codec,
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            accounts,
        })
    }

    /// Mints a new pair for `identity`. Every call mints new tokens.
    ///
    /// # Errors
    /// [`AuthError::Issue`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let access_token = self
            .codec
            .sign(identity, &self.access_secret, self.access_ttl)
            .map_err(AuthError::Issue)?;
        let refresh_token = self
            .codec
            .sign(identity, &self.refresh_secret, self.refresh_ttl)
            .map_err(AuthError::Issue)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            identity: identity.clone(),
        })
    }

    /// Exchanges a refresh token for a brand-new pair.
    ///
    /// # Errors
    /// - [`AuthError::InvalidRefreshToken`]: malformed, signed with another
    ///   secret, expired, or its subject is not a known account
    /// - [`AuthError::Issue`]: signing the new pair failed
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .verify(refresh_token, &self.refresh_secret)
            .map_err(|e| {
                tracing::debug!(error = %e, "refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;

        let identity = self.accounts.find_by_id(&claims.sub).ok_or_else(|| {
            tracing::warn!(user_id = %claims.sub, "refresh token for unknown account");
            AuthError::InvalidRefreshToken
        })?;

        let pair = self.issue(&identity)?;
        tracing::info!(user_id = %identity.id, "token pair refreshed");
        Ok(pair)
    }
}
