//! Signing and verifying tokens.
//!
//! Tokens are compact HS256 JWTs: `header.claims.signature`, each part
//! base64url. Signature and structure checks are delegated to
//! `jsonwebtoken`; expiry is checked here against the injected [`Clock`],
//! with no leeway, so "expired" means exactly `now >= exp`.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use questline_protocol::Identity;

use crate::{Clock, SystemClock, TokenClaims, TokenError, TokenSecret};

/// Encodes, signs, and verifies [`TokenClaims`].
///
/// Holds only a clock, so it is cheap to clone and the same codec serves
/// both token kinds: the secret is chosen per call.
#[derive(Clone)]
pub struct TokenCodec {
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// A codec reading wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A codec reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Current time according to this codec's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Mints a token for `identity` that expires `ttl` from now.
    ///
    /// # Errors
    /// [`TokenError::Encode`] if signing fails.
    pub fn sign(
        &self,
        identity: &Identity,
        secret: &TokenSecret,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims::for_identity(identity, self.now(), ttl.as_secs());
        self.sign_claims(&claims, secret)
    }

    /// Signs an already-built claims set as is.
    ///
    /// # Errors
    /// [`TokenError::Encode`] if signing fails.
    pub fn sign_claims(
        &self,
        claims: &TokenClaims,
        secret: &TokenSecret,
    ) -> Result<String, TokenError> {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies `token` against `secret` and returns its claims.
    ///
    /// # Errors
    /// - [`TokenError::Malformed`]: not three parts, bad base64/JSON, or
    ///   missing claims
    /// - [`TokenError::InvalidSignature`]: wrong secret or algorithm
    /// - [`TokenError::Expired`]: `now >= exp`
    pub fn verify(&self, token: &str, secret: &TokenSecret) -> Result<TokenClaims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        if data.claims.is_expired_at(self.now()) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// HS256 only; `exp` must be present but is checked by [`TokenCodec`].
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use questline_protocol::UserId;

    use super::*;
    use crate::ManualClock;

    const START: u64 = 1_700_000_000;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("00000000-0000-0000-0000-000000000001"),
            username: "Wanderer".into(),
            email: "wanderer@example.com".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn secret_a() -> TokenSecret {
        TokenSecret::new("secret-a-secret-a-secret-a-secret-a")
    }

    fn secret_b() -> TokenSecret {
        TokenSecret::new("secret-b-secret-b-secret-b-secret-b")
    }

    fn codec_at(start: u64) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (TokenCodec::with_clock(clock.clone()), clock)
    }

    // =====================================================================
    // sign() / verify()
    // =====================================================================

    #[test]
    fn test_verify_before_ttl_returns_original_claims() {
        let (codec, clock) = codec_at(START);
        let token = codec.sign(&identity(), &secret_a(), Duration::from_secs(900)).unwrap();

        clock.advance(Duration::from_secs(899));
        let claims = codec.verify(&token, &secret_a()).expect("still valid");

        assert_eq!(claims.sub, identity().id);
        assert_eq!(claims.email, "wanderer@example.com");
        assert_eq!(claims.username, "Wanderer");
        assert_eq!(claims.iat, START);
        assert_eq!(claims.exp, START + 900);
    }

    #[test]
    fn test_verify_at_exact_expiry_returns_expired() {
        let (codec, clock) = codec_at(START);
        let token = codec.sign(&identity(), &secret_a(), Duration::from_secs(900)).unwrap();

        clock.advance(Duration::from_secs(900));

        assert_eq!(codec.verify(&token, &secret_a()), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_long_after_expiry_returns_expired() {
        let (codec, clock) = codec_at(START);
        let token = codec.sign(&identity(), &secret_a(), Duration::from_secs(60)).unwrap();

        clock.advance(Duration::from_secs(86_400));

        assert_eq!(codec.verify(&token, &secret_a()), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_with_other_secret_returns_invalid_signature() {
        let (codec, _) = codec_at(START);
        let token = codec.sign(&identity(), &secret_b(), Duration::from_secs(60)).unwrap();

        assert_eq!(
            codec.verify(&token, &secret_a()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_wrong_secret_wins_over_expiry() {
        // A forged token must never be reported as merely "expired".
        let (codec, clock) = codec_at(START);
        let token = codec.sign(&identity(), &secret_b(), Duration::from_secs(60)).unwrap();
        clock.advance(Duration::from_secs(3_600));

        assert_eq!(
            codec.verify(&token, &secret_a()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_tampered_payload_returns_invalid_signature() {
        let (codec, _) = codec_at(START);
        let token = codec.sign(&identity(), &secret_a(), Duration::from_secs(60)).unwrap();

        // Swap in the payload of a token for a different account.
        let mut other = identity();
        other.id = UserId::new("intruder");
        let forged_source =
            codec.sign(&other, &secret_b(), Duration::from_secs(60)).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_source.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(
            codec.verify(&forged, &secret_a()),
            Err(TokenError::InvalidSignature)
        );
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_verify_wrong_part_count_returns_malformed() {
        let (codec, _) = codec_at(START);

        for bad in ["", "abc", "a.b", "a.b.c.d"] {
            assert_eq!(
                codec.verify(bad, &secret_a()),
                Err(TokenError::Malformed),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_verify_garbage_parts_returns_malformed() {
        let (codec, _) = codec_at(START);
        assert_eq!(
            codec.verify("!!!.???.***", &secret_a()),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_verify_missing_exp_claim_returns_malformed() {
        #[derive(serde::Serialize)]
        struct NoExp {
            sub: &'static str,
        }

        let (codec, _) = codec_at(START);
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &NoExp { sub: "u-1" },
            &EncodingKey::from_secret(secret_a().as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&token, &secret_a()), Err(TokenError::Malformed));
    }

    #[test]
    fn test_sign_twice_same_second_yields_distinct_tokens() {
        let (codec, _) = codec_at(START);
        let a = codec.sign(&identity(), &secret_a(), Duration::from_secs(60)).unwrap();
        let b = codec.sign(&identity(), &secret_a(), Duration::from_secs(60)).unwrap();
        assert_ne!(a, b);
    }
}
