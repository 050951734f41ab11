//! Gate error types and their HTTP responses.
//!
//! Every expected failure collapses into the same externally visible denial
//! (401 + configured body) so a caller cannot tell which check failed. The
//! distinct variants exist for logging.

use axum::{
    Json,
    http::{StatusCode, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::token::TokenError;

/// Reasons the gate refuses to forward a request.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Origin header missing, or not in the allowed set (or no set configured).
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Origin not allowed")]
    OriginNotAllowed,

    /// `x-api-key` header missing or different from the configured key.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    ApiKeyMismatch,

    /// Issuing or self-verifying the session token failed.
    ///
    /// Verification failures return HTTP 401 Unauthorized. Signing failures
    /// return HTTP 500 with a generic body.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Issued token could not form a valid `Set-Cookie` header value.
    ///
    /// Returns HTTP 500 with a generic body.
    #[error("Invalid session cookie header")]
    Cookie(#[from] InvalidHeaderValue),
}

impl GateError {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::OriginNotAllowed => "origin_not_allowed",
            GateError::ApiKeyMismatch => "api_key_mismatch",
            GateError::Token(TokenError::Signing(_)) => "token_signing",
            GateError::Token(TokenError::Verification(_)) => "token_verification",
            GateError::Cookie(_) => "cookie_header",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GateError::Token(TokenError::Signing(_)) | GateError::Cookie(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Build the response for this error.
    ///
    /// `denial` is the configured denial body; it is used verbatim for every
    /// 401. Signing and cookie failures are not a caller problem and get the
    /// internal error body instead.
    pub fn into_denial(self, denial: &Value) -> Response {
        match self.status() {
            StatusCode::UNAUTHORIZED => {
                (StatusCode::UNAUTHORIZED, Json(denial.clone())).into_response()
            }
            status => {
                let body = Json(json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                }));
                (status, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_failures_share_status() {
        let errors = [
            GateError::OriginNotAllowed,
            GateError::ApiKeyMismatch,
            GateError::Token(TokenError::Verification("bad".into())),
        ];

        for err in errors {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "{}", err.kind());
        }
    }

    #[test]
    fn signing_failure_is_internal() {
        let err = GateError::Token(TokenError::Signing("boom".into()));
        assert_eq!(err.kind(), "token_signing");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_denial(&json!({ "error": true }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
