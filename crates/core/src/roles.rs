//! Well-known user role names.
//!
//! These must match the `CHECK` constraint on `users.role`.

use crate::error::CoreError;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_COACH: &str = "coach";
pub const ROLE_ADMIN: &str = "admin";

pub const VALID_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_COACH, ROLE_ADMIN];

/// Reject role names outside [`VALID_ROLES`].
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown role '{role}', expected one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}
