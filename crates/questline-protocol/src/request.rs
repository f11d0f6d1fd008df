//! Transport-neutral request and response envelopes.
//!
//! An [`ApiRequest`] is what the client-side session layer hands to its
//! transport; an [`ApiResponse`] is what comes back. Header names are
//! stored lower-cased so lookups are case-insensitive like HTTP.

use std::collections::BTreeMap;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Codec, ProtocolError};

/// Login endpoint. Carries credentials in its body, never a bearer token.
pub const LOGIN_PATH: &str = "/auth/login";

/// Refresh exchange endpoint. Carries the refresh token in its body.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Returns the identity behind the presented access token.
pub const PROFILE_PATH: &str = "/auth/profile";

/// Header carrying `Bearer <access token>`.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Request method. Only the verbs the client actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// An outbound request.
///
/// Cloneable on purpose: the refresh coordinator keeps the original around
/// so it can replay it with a new access token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` with a raw body.
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    /// Builds a request whose body is `value` encoded with `codec`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be serialized.
    pub fn encoded<C: Codec, T: Serialize>(
        method: Method,
        path: impl Into<String>,
        codec: &C,
        value: &T,
    ) -> Result<Self, ProtocolError> {
        Ok(Self::new(method, path).with_body(codec.encode(value)?))
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Removes a header, if present.
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(&name.to_ascii_lowercase());
        self
    }

    /// Looks up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Stamps the request with `Authorization: Bearer <token>`, or strips
    /// the header when `token` is `None`.
    pub fn with_bearer(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => {
                self.with_header(AUTHORIZATION_HEADER, format!("Bearer {token}"))
            }
            None => self.without_header(AUTHORIZATION_HEADER),
        }
    }

    /// `true` for the login and refresh endpoints.
    ///
    /// These carry their own credentials, so they are never stamped with an
    /// access token and a rejection from them never starts a refresh.
    pub fn is_auth_endpoint(&self) -> bool {
        let path = self.path.split('?').next().unwrap_or_default();
        path == LOGIN_PATH || path == REFRESH_PATH
    }

    /// Decodes the body with `codec`.
    ///
    /// # Errors
    /// `InvalidMessage` when there is no body, `Decode` when it doesn't parse.
    pub fn decode_body<C: Codec, T: DeserializeOwned>(
        &self,
        codec: &C,
    ) -> Result<T, ProtocolError> {
        let body = self.body.as_deref().ok_or_else(|| {
            ProtocolError::InvalidMessage(format!("{} {} has no body", self.method, self.path))
        })?;
        codec.decode(body)
    }
}

// The authorization header holds a live credential.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name == AUTHORIZATION_HEADER {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// An inbound response: an HTTP-style status code and a raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;

    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// A `200` with the given body.
    pub fn ok(body: Vec<u8>) -> Self {
        Self::new(Self::OK, body)
    }

    /// An empty-bodied response with the given status.
    pub fn status(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// A response whose body is `value` encoded with `codec`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be serialized.
    pub fn encoded<C: Codec, T: Serialize>(
        status: u16,
        codec: &C,
        value: &T,
    ) -> Result<Self, ProtocolError> {
        Ok(Self::new(status, codec.encode(value)?))
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` when the server rejected the presented credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Self::UNAUTHORIZED
    }

    /// Decodes the body with `codec`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` when the body doesn't parse.
    pub fn decode_body<C: Codec, T: DeserializeOwned>(
        &self,
        codec: &C,
    ) -> Result<T, ProtocolError> {
        codec.decode(&self.body)
    }
}
