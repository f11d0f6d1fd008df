//! # Questline
//!
//! Session token lifecycle for the Questline adventure app.
//!
//! The server half ([`questline_auth`]) issues and validates short-lived
//! access tokens and long-lived refresh tokens. The client half
//! ([`questline_session`]) keeps the session and recovers from an expired
//! access token with exactly one refresh exchange, however many requests
//! hit the expiry at once. [`Gateway`] joins the two in-process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use questline::prelude::*;
//!
//! # async fn run(accounts: Arc<InMemoryAccountStore>) -> Result<(), QuestlineError> {
//! let config = AuthConfig::from_env()?;
//! let gateway = Gateway::new(AuthService::new(&config, accounts)?);
//!
//! let client = RefreshCoordinator::new(gateway, Arc::new(MemorySessionStore::new()));
//! client.login("wanderer@example.com", "lantern-light").await?;
//! let _profile = client.send(ApiRequest::get(PROFILE_PATH)).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod gateway;
pub mod logging;

pub use error::QuestlineError;
pub use gateway::{Gateway, RouteHandler};

pub use questline_auth as auth;
pub use questline_protocol as protocol;
pub use questline_session as session;

/// Everything needed to wire a service and a client together.
pub mod prelude {
    pub use crate::{Gateway, QuestlineError};
    pub use questline_auth::{
        Account, AccountStore, AuthConfig, AuthError, AuthService, InMemoryAccountStore,
    };
    pub use questline_protocol::{
        ApiRequest, ApiResponse, Identity, Method, TokenPair, UserId, PROFILE_PATH,
    };
    pub use questline_session::{
        CoordinatorConfig, FileSessionStore, MemorySessionStore, RefreshCoordinator,
        SessionError, SessionStore,
    };
}
