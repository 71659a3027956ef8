//! Guid helpers
//!
//! Row identifiers are UUIDv4 values stored as TEXT.

use uuid::Uuid;

/// Generate a new guid in its stored text form
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
