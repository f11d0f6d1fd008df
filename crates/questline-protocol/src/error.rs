//! Error types for the protocol layer.
//!
//! Each crate in Questline defines its own error enum, so a
//! `ProtocolError` always means "the bytes or the request shape were
//! wrong", never "the token was bad" or "the network failed".

/// Errors that can occur while encoding or decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The request or response is structurally valid but unusable,
    /// e.g. a body was expected and none was sent.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
