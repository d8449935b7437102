//! Signed identity tokens.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer tag stamped into every token and required on verification.
const ISSUER: &str = "backend";

/// Claim set carried by an identity token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: String, // Identity (Subject)
    pub iss: String, // Fixed issuer tag
    pub exp: i64,    // Expiration time (UNIX timestamp)
}

/// Why a token failed verification.
///
/// Deliberately coarse: callers reject the connection either way, and the
/// variants exist for logging, not for telling the client more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The expiry timestamp is not strictly in the future.
    #[error("token expired")]
    Expired,
    /// Bad signature, wrong issuer, or not a token at all.
    #[error("token invalid")]
    Invalid,
}

/// Issues and verifies signed, time-limited identity tokens.
///
/// Tokens are self-contained HS256 JWTs, so verification consults no
/// server-side session state and can run on every connection attempt.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of Debug output.
        f.debug_struct("TokenService")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service signing with `secret`, issuing tokens valid for
    /// `validity_minutes`.
    #[must_use]
    pub fn new(secret: &str, validity_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The default 60s leeway would keep expired tokens alive past their
        // window; expiry must be strict.
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity: Duration::minutes(validity_minutes),
        }
    }

    /// Mint a token for `identity`, valid from now for the configured window.
    pub fn issue(&self, identity: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = TokenClaims {
            sub: identity.to_string(),
            iss: ISSUER.to_string(),
            exp: (Utc::now() + self.validity).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify a token and return the identity it names.
    ///
    /// A token passes iff its signature verifies under the service secret,
    /// its issuer matches, and its expiry is strictly in the future.
    /// Malformed input is a [`TokenError::Invalid`] outcome, never a panic.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(token_data) => Ok(token_data.claims.sub),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}
