//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Attach response headers
//! - Short-circuit requests (reject unauthorized)

/// Origin + API key access gate
pub mod auth;
