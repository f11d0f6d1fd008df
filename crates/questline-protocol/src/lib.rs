//! Wire protocol for Questline authentication.
//!
//! This crate defines what the client and the auth service exchange:
//!
//! - **Types** ([`Identity`], [`TokenPair`], [`LoginRequest`],
//!   [`RefreshRequest`]): the payloads of the login and refresh calls.
//! - **Requests** ([`ApiRequest`], [`ApiResponse`]): a transport-neutral
//!   request/response shape. The real HTTP stack lives outside this
//!   workspace; everything inside it speaks these two structs.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Session layer (client)  ──ApiRequest──→  Gateway / auth service (server)
//!                         ←─ApiResponse──
//! ```

mod codec;
mod error;
mod request;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use request::{
    ApiRequest, ApiResponse, Method, AUTHORIZATION_HEADER, LOGIN_PATH,
    PROFILE_PATH, REFRESH_PATH,
};
pub use types::{Identity, LoginRequest, RefreshRequest, TokenPair, UserId};
