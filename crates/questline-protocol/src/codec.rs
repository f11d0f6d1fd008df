//! Codec trait and implementations for request and response bodies.
//!
//! The rest of the workspace never calls `serde_json` directly on the wire
//! path: it goes through a [`Codec`], so bodies and the persisted session
//! record share one encoding and one error type.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs are held inside long-lived,
/// shared state (the gateway, the session store) that tokio tasks on any
/// worker thread may touch.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// This is the format the browser client already speaks, so it is the
/// default (behind the `json` feature).
///
/// ```rust
/// use questline_protocol::{Codec, JsonCodec, RefreshRequest};
///
/// let codec = JsonCodec;
/// let request = RefreshRequest { refresh_token: "r.t.s".into() };
///
/// let bytes = codec.encode(&request).unwrap();
/// assert_eq!(bytes, br#"{"refreshToken":"r.t.s"}"#);
///
/// let decoded: RefreshRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, request);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
