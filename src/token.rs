//! Session token signing and verification.
//!
//! The gate treats signing as a black box: it hands a [`Claims`] payload to a
//! [`TokenCodec`] and gets back an opaque string, then asks the same codec to
//! verify that string. The default codec issues HS256 JSON Web Tokens.

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by every session token.
///
/// Only these two fields are written. There is no expiry claim: the gate is
/// re-evaluated on every request, so the token never outlives a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Fresh identifier for this session
    pub id: String,

    /// Always `true` for tokens issued by the gate
    pub secure: bool,
}

impl Claims {
    /// Claims for a newly authorized session.
    pub fn authorized(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secure: true,
        }
    }
}

/// Errors raised while producing or checking a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The claims could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The token was malformed or its signature did not match.
    #[error("token verification failed: {0}")]
    Verification(String),
}

/// Sign/verify capability used by the gate.
pub trait TokenCodec: Send + Sync {
    /// Sign `claims` into a token string.
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Verify `token` and return the claims it carries.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JSON Web Token codec keyed with a shared secret.
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        // Issued tokens carry no registered claims
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for JwtCodec {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Verification(e.to_string()))
    }
}
