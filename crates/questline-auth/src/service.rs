//! The server-side facade: login, refresh exchange, request authorization.

use std::sync::Arc;

use questline_protocol::{Identity, LoginRequest, RefreshRequest, TokenPair};

use crate::{
    AccountStore, AuthConfig, AuthError, Clock, ConfigError, CredentialValidator, SystemClock,
    TokenCodec, TokenIssuer, TokenValidator,
};

/// Wires the credential check, the issuer, and the validator around one
/// account store and one clock.
///
/// Cheap to clone; every component is `Arc`-backed.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialValidator,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl AuthService {
    /// # Errors
    /// Returns the config's validation error, if any.
    pub fn new(config: &AuthConfig, accounts: Arc<dyn AccountStore>) -> Result<Self, ConfigError> {
        Self::with_clock(config, accounts, Arc::new(SystemClock))
    }

    /// Same as [`new`](Self::new) but reading time from `clock`.
    ///
    /// # Errors
    /// Returns the config's validation error, if any.
    pub fn with_clock(
        config: &AuthConfig,
        accounts: Arc<dyn AccountStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let codec = TokenCodec::with_clock(clock);
        let issuer = TokenIssuer::new(config, codec.clone(), accounts.clone())?;
        let validator = TokenValidator::new(codec, config.access_secret.clone(), accounts.clone());
        Ok(Self {
            credentials: CredentialValidator::new(accounts),
            issuer,
            validator,
        })
    }

    /// Checks credentials and issues a fresh pair.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] or [`AuthError::Issue`].
    pub fn login(&self, request: &LoginRequest) -> Result<TokenPair, AuthError> {
        let identity = self.credentials.authenticate(&request.email, &request.password)?;
        let pair = self.issuer.issue(&identity)?;
        tracing::info!(user_id = %identity.id, "login succeeded");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// # Errors
    /// [`AuthError::InvalidRefreshToken`] or [`AuthError::Issue`].
    pub fn refresh(&self, request: &RefreshRequest) -> Result<TokenPair, AuthError> {
        self.issuer.refresh(&request.refresh_token)
    }

    /// Resolves the caller of a protected request from its
    /// `Authorization` header value.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`].
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        self.validator.validate_header(authorization)
    }

    pub fn credentials(&self) -> &CredentialValidator {
        &self.credentials
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}
