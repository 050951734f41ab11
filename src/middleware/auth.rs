//! Origin + API key access gate.
//!
//! This middleware intercepts every protected request to:
//! 1. Read the `Origin` and `x-api-key` headers
//! 2. Check the origin against the allowed set and the key against the configured key
//! 3. Issue a signed session token and self-verify it
//! 4. Attach the token as a cookie and forward, or reject with HTTP 401

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{config::GateConfig, cookie::session_cookie, error::GateError, token::Claims};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Outcome of evaluating one request.
#[derive(Debug)]
pub enum Decision {
    /// Forward to the next handler and attach `cookie` to its response.
    Forward { cookie: HeaderValue, claims: Claims },

    /// Stop here.
    Deny(GateError),
}

/// Access gate built from a [`GateConfig`].
///
/// Cheap to clone; the configuration is shared and never mutated.
#[derive(Debug, Clone)]
pub struct AccessGate {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: GateConfig,
    api_key_digest: [u8; 32],
}

/// Build a gate. No side effects beyond capturing the configuration.
pub fn create_gate(config: GateConfig) -> AccessGate {
    AccessGate::new(config)
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        let api_key_digest = digest(&config.api_key);
        Self {
            inner: Arc::new(Inner {
                config,
                api_key_digest,
            }),
        }
    }

    /// Evaluate the request headers.
    ///
    /// Runs eligibility, token issuance and the post-issuance self-check in
    /// order; the first failing step decides the outcome.
    pub fn decide(&self, headers: &HeaderMap) -> Decision {
        match self.authorize(headers) {
            Ok((cookie, claims)) => Decision::Forward { cookie, claims },
            Err(err) => Decision::Deny(err),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(HeaderValue, Claims), GateError> {
        let config = &self.inner.config;

        // Step 1: Eligibility
        let origin = header_str(headers, header::ORIGIN.as_str());
        let origin_allowed = match (&config.origins, origin) {
            (Some(allowed), Some(origin)) => allowed.contains(origin),
            _ => false,
        };
        if !origin_allowed {
            return Err(GateError::OriginNotAllowed);
        }

        let key_matches = header_str(headers, API_KEY_HEADER)
            .is_some_and(|key| digest(key) == self.inner.api_key_digest);
        if !key_matches {
            return Err(GateError::ApiKeyMismatch);
        }

        // Step 2: Issue a token for a fresh session
        let claims = Claims::authorized(config.ids.generate());
        let token = config.codec.sign(&claims)?;
        let cookie = HeaderValue::from_str(&session_cookie(
            &config.token_name,
            &token,
            config.same_site,
        ))?;

        // Step 3: Self-check the token just issued
        let verified = config.codec.verify(&token)?;

        Ok((cookie, verified))
    }
}

/// Access gate middleware function.
///
/// # Flow
///
/// 1. Evaluate `Origin` and `x-api-key` via [`AccessGate::decide`]
/// 2. If allowed: run the next handler once and append the session cookie
///    to its response
/// 3. If denied: return HTTP 401 with the configured denial body; the next
///    handler is never run
///
/// # Usage
///
/// ```ignore
/// let gate = create_gate(GateConfig::new("K", "S").origins(["https://a.com"]));
/// let app = Router::new()
///     .route("/api/v1/secure", get(handler))
///     .route_layer(axum::middleware::from_fn_with_state(gate, access_gate));
/// ```
pub async fn access_gate(State(gate): State<AccessGate>, request: Request, next: Next) -> Response {
    match gate.decide(request.headers()) {
        Decision::Forward { cookie, claims } => {
            tracing::debug!(session_id = %claims.id, "session token issued");

            let mut response = next.run(request).await;
            response.headers_mut().append(header::SET_COOKIE, cookie);
            response
        }
        Decision::Deny(err) => {
            let origin = header_str(request.headers(), header::ORIGIN.as_str()).unwrap_or("-");
            if err.status().is_server_error() {
                tracing::error!(reason = err.kind(), origin, error = %err, "access gate failure");
            } else {
                tracing::warn!(reason = err.kind(), origin, "request denied");
            }

            err.into_denial(&gate.inner.config.on_error)
        }
    }
}

/// Header value as UTF-8; anything else counts as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
