//! Directory projection of users.
//!
//! Only the fields the scheduling and reporting code read are stored here.
//! Credentials and profile editing live outside this service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use gym_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A user row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "userBranch")]
    pub branch_id: Option<DbId>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing)]
    pub payment_customer_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact user shape embedded in package listings.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(rename = "userBranch")]
    pub branch_id: Option<DbId>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            branch_id: user.branch_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    /// Defaults to `client` when omitted.
    pub role: Option<String>,
    #[serde(rename = "userBranch")]
    pub branch_id: Option<DbId>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Subscription price to start for the new customer, if any.
    pub price_id: Option<String>,
}
