//! Row shapes read by the reporting queries.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use gym_core::reporting::ClientProfile;
use gym_core::types::{DbId, Timestamp};

/// One package sale joined with its client, as returned in debug mode.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: DbId,
    pub total: f64,
    pub created_at: Timestamp,
    pub user_name: String,
    pub user_branch: Option<DbId>,
}

/// A package's training type paired with its client's profile.
#[derive(Debug, Clone, FromRow)]
pub struct DemographicRow {
    pub training_type: String,
    pub user_id: DbId,
    pub name: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl DemographicRow {
    pub fn into_pair(self) -> (String, ClientProfile) {
        (
            self.training_type,
            ClientProfile {
                user_id: self.user_id,
                name: self.name,
                gender: self.gender,
                birth_date: self.birth_date,
            },
        )
    }
}
