//! Client-side session handling for Questline.
//!
//! This crate keeps the browser-side half of the token lifecycle:
//!
//! 1. **Session storage**: the current tokens and identity, in memory or
//!    on disk ([`SessionStore`], [`MemorySessionStore`],
//!    [`FileSessionStore`])
//! 2. **Transport seam**: how requests leave the client ([`Transport`])
//! 3. **Refresh coordination**: stamping requests with the access token
//!    and recovering from expiry with a single refresh exchange
//!    ([`RefreshCoordinator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application code (above)  ← calls RefreshCoordinator::send
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Transport (below)         ← HTTP in production, a Gateway in tests
//! ```

mod coordinator;
mod error;
mod session;
mod store;
mod transport;

pub use coordinator::{CoordinatorConfig, Phase, RefreshCoordinator};
pub use error::{SessionError, StoreError, TransportError};
pub use session::Session;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use transport::Transport;
