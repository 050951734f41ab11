//! HTTP request handlers for the demo server.

pub mod health;
pub mod secure;
