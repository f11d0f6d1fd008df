//! Error types for the client session layer.

use questline_protocol::ProtocolError;

/// What a request made through the session layer can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// There is no usable session: never logged in, logged out, or the
    /// refresh exchange failed. The caller has to log in again.
    #[error("session expired; log in again")]
    SessionExpired,

    /// The login call was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The refresh exchange did not answer within the configured limit.
    #[error("refresh exchange timed out")]
    RefreshTimedOut,

    /// An auth endpoint answered with a status it never sends on purpose.
    #[error("unexpected response status {0}")]
    UnexpectedStatus(u16),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("transport closed")]
    Closed,
}

/// Reading or writing the persisted session record failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record unreadable: {0}")]
    Codec(#[from] ProtocolError),
}
