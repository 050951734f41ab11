//! Session identifier generation.

use uuid::Uuid;

/// Source of fresh, unique session identifiers.
///
/// Injected into the gate so tests can supply deterministic values.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
