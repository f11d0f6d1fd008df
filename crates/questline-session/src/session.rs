//! The client's notion of "logged in".

use std::fmt;

use questline_protocol::{Identity, TokenPair};
use serde::{Deserialize, Serialize};

/// The current tokens and the identity they were issued to.
///
/// Created by login or refresh and replaced whole on every successful
/// refresh, so the two tokens always come from the same exchange. This is
/// also the persisted record: same field names as the login response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "user")]
    pub identity: Identity,
}

impl From<TokenPair> for Session {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            identity: pair.identity,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
