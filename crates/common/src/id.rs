//! Identifier and token generation.

use ulid::Ulid;
use uuid::Uuid;

/// Generate a record identifier.
///
/// Lowercase ULID: lexicographically sortable, so newest-first index scans
/// on `id` line up with creation order.
#[must_use]
pub fn generate_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

/// Generate an opaque bearer token for a new account.
///
/// Random UUID v4, hyphens stripped. Carries no time component.
#[must_use]
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
