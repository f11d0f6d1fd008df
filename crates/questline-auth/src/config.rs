//! Auth configuration: secrets and token lifetimes.
//!
//! The core needs four values: an access secret, a refresh secret, and a
//! TTL for each. [`AuthConfig::new`] enforces what the core itself
//! requires (non-empty, distinct secrets; non-zero TTLs).
//! [`AuthConfig::from_env`] is the loader used at process start, and it
//! also enforces the minimum secret length.

use std::fmt;
use std::time::Duration;

use crate::ConfigError;

/// Environment variable holding the access-token secret.
pub const ACCESS_SECRET_VAR: &str = "JWT_ACCESS_SECRET";
/// Environment variable holding the refresh-token secret.
pub const REFRESH_SECRET_VAR: &str = "JWT_REFRESH_SECRET";
/// Environment variable holding the access-token TTL (e.g. `15m`).
pub const ACCESS_TTL_VAR: &str = "JWT_ACCESS_EXPIRES_IN";
/// Environment variable holding the refresh-token TTL (e.g. `7d`).
pub const REFRESH_TTL_VAR: &str = "JWT_REFRESH_EXPIRES_IN";

// ---------------------------------------------------------------------------
// TokenSecret
// ---------------------------------------------------------------------------

/// Symmetric key material for one token kind.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret(<{} bytes>)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Secrets and lifetimes for both token kinds.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: TokenSecret,
    pub refresh_secret: TokenSecret,
    /// Short: minutes.
    pub access_ttl: Duration,
    /// Long: days.
    pub refresh_ttl: Duration,
}

impl AuthConfig {
    /// Minimum secret length enforced by the environment loader.
    pub const MIN_SECRET_LEN: usize = 32;
    /// Access TTL used when `JWT_ACCESS_EXPIRES_IN` is unset.
    pub const DEFAULT_ACCESS_TTL: &'static str = "15m";
    /// Refresh TTL used when `JWT_REFRESH_EXPIRES_IN` is unset.
    pub const DEFAULT_REFRESH_TTL: &'static str = "7d";

    /// Builds a config from explicit values.
    ///
    /// # Errors
    /// See [`validate`](Self::validate).
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            access_secret: TokenSecret::new(access_secret),
            refresh_secret: TokenSecret::new(refresh_secret),
            access_ttl,
            refresh_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from process environment variables.
    ///
    /// # Errors
    /// Missing or short secrets, shared secrets, unparseable TTLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the config through an arbitrary `name → value` lookup.
    ///
    /// This is `from_env` without the global state, so it can be driven
    /// from a map in tests or from another config source.
    ///
    /// # Errors
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = required_secret(&lookup, ACCESS_SECRET_VAR)?;
        let refresh_secret = required_secret(&lookup, REFRESH_SECRET_VAR)?;

        let access_ttl = lookup(ACCESS_TTL_VAR)
            .unwrap_or_else(|| Self::DEFAULT_ACCESS_TTL.to_string());
        let refresh_ttl = lookup(REFRESH_TTL_VAR)
            .unwrap_or_else(|| Self::DEFAULT_REFRESH_TTL.to_string());

        Self::new(
            access_secret,
            refresh_secret,
            parse_duration(ACCESS_TTL_VAR, &access_ttl)?,
            parse_duration(REFRESH_TTL_VAR, &refresh_ttl)?,
        )
    }

    /// Checks the invariants the token core relies on.
    ///
    /// # Errors
    /// - [`ConfigError::MissingSecret`]: a secret is empty
    /// - [`ConfigError::SharedSecret`]: both kinds use the same secret
    /// - [`ConfigError::InvalidDuration`]: a TTL is shorter than one second
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::MissingSecret(ACCESS_SECRET_VAR));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::MissingSecret(REFRESH_SECRET_VAR));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        if self.access_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidDuration {
                name: ACCESS_TTL_VAR,
                value: format!("{:?}", self.access_ttl),
            });
        }
        if self.refresh_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidDuration {
                name: REFRESH_TTL_VAR,
                value: format!("{:?}", self.refresh_ttl),
            });
        }
        Ok(())
    }
}

fn required_secret<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup(name)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingSecret(name))?;
    if secret.len() < AuthConfig::MIN_SECRET_LEN {
        return Err(ConfigError::SecretTooShort {
            name,
            min: AuthConfig::MIN_SECRET_LEN,
        });
    }
    Ok(secret)
}

/// Parses a TTL string: `"900"` (seconds) or a number followed by one of
/// `s`, `m`, `h`, `d`, `w`.
///
/// # Errors
/// [`ConfigError::InvalidDuration`] for anything else, including zero and
/// values that overflow.
pub fn parse_duration(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration {
        name,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    match amount.checked_mul(multiplier) {
        Some(0) | None => Err(invalid()),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}
