//! Unified error type for Questline.

use questline_auth::{AuthError, ConfigError};
use questline_protocol::ProtocolError;
use questline_session::{SessionError, TransportError};

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` lift sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum QuestlineError {
    /// Encoding or decoding a payload failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login, refresh, or request validation was refused.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The auth configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client session could not serve a request.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error() {
        let err: QuestlineError = ConfigError::SharedSecret.into();
        assert!(matches!(err, QuestlineError::Config(_)));
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_from_auth_error() {
        let err: QuestlineError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, QuestlineError::Auth(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: QuestlineError = SessionError::SessionExpired.into();
        assert!(matches!(err, QuestlineError::Session(_)));
        assert!(err.to_string().contains("log in again"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: QuestlineError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, QuestlineError::Protocol(_)));
    }
}
