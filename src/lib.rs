//! Access gate middleware for axum.
//!
//! Decides per request whether the caller is an allowed origin holding the
//! configured API key. Allowed callers get a short-lived signed session token
//! as an `HttpOnly` cookie and are forwarded; everyone else gets a 401 with a
//! configurable JSON body.
//!
//! ```ignore
//! use access_gate::{GateConfig, access_gate, create_gate};
//!
//! let gate = create_gate(GateConfig::new("K", "S").origins(["https://a.com"]));
//! let app = Router::new()
//!     .route("/api/v1/secure", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(gate, access_gate));
//! ```

pub mod config;
pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session_id;
pub mod token;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, GateConfig, ServerConfig};
pub use cookie::{SameSite, UnknownSameSite};
pub use error::GateError;
pub use middleware::auth::{API_KEY_HEADER, AccessGate, Decision, access_gate, create_gate};
pub use session_id::{IdGenerator, UuidGenerator};
pub use token::{Claims, JwtCodec, TokenCodec, TokenError};

/// Build the demo application router.
///
/// `/health` is public; everything under `/api/v1` sits behind the gate.
pub fn app(gate: AccessGate) -> Router {
    let gated_routes = Router::new()
        .route("/api/v1/secure", get(handlers::secure::whoami))
        .route("/api/v1/echo", post(handlers::secure::echo))
        // Apply the access gate to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(gate, access_gate));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(gated_routes)
        .layer(TraceLayer::new_for_http())
}
