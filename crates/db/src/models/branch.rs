//! Branch models and DTOs.
//!
//! Branches partition users; package listings and reports filter on them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use gym_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A branch row from the `branches` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub place: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBranch {
    #[validate(length(min = 1, message = "Branch name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Branch email must be a valid address"))]
    pub email: Option<String>,
    pub contact: Option<String>,
    pub place: Option<String>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating a branch (all fields optional).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBranch {
    #[validate(length(min = 1, message = "Branch name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Branch email must be a valid address"))]
    pub email: Option<String>,
    pub contact: Option<String>,
    pub place: Option<String>,
}
