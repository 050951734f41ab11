//! Endpoints reachable only through the access gate.

use axum::Json;
use serde_json::{Value, json};

/// Confirms the caller passed the gate.
///
/// # Response (200 OK)
///
/// ```json
/// { "authorized": true }
/// ```
///
/// The session cookie is added by the gate, not here.
pub async fn whoami() -> Json<Value> {
    Json(json!({ "authorized": true }))
}

/// Echo the JSON request body back to the caller.
pub async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}
