//! Server-side token lifecycle for Questline.
//!
//! This crate decides who a caller is:
//!
//! 1. **Login**: [`CredentialValidator`] checks email and password against
//!    an [`AccountStore`], then [`TokenIssuer`] mints an access/refresh pair.
//! 2. **Refresh exchange**: [`TokenIssuer::refresh`] trades a valid refresh
//!    token for a brand-new pair.
//! 3. **Per-request validation**: [`TokenValidator`] turns an access token
//!    back into an [`Identity`](questline_protocol::Identity).
//!
//! [`AuthService`] bundles the three around one [`AuthConfig`] and one
//! [`Clock`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway / routing (above)  ← renders AuthError::status() as a response
//!     ↕
//! Auth layer (this crate)    ← TokenCodec signs and verifies HS256 JWTs
//!     ↕
//! Protocol layer (below)     ← Identity, TokenPair, LoginRequest, RefreshRequest
//! ```

mod accounts;
mod claims;
mod clock;
mod codec;
mod config;
mod credentials;
mod error;
mod issuer;
mod service;
mod validator;

pub use accounts::{Account, AccountStore, InMemoryAccountStore};
pub use claims::TokenClaims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::TokenCodec;
pub use config::{
    parse_duration, AuthConfig, TokenSecret, ACCESS_SECRET_VAR, ACCESS_TTL_VAR,
    REFRESH_SECRET_VAR, REFRESH_TTL_VAR,
};
pub use credentials::CredentialValidator;
pub use error::{AuthError, ConfigError, TokenError};
pub use issuer::TokenIssuer;
pub use service::AuthService;
pub use validator::{extract_bearer, TokenValidator};
