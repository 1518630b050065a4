//! Training package and session models and DTOs.
//!
//! Rows serialize with the wire names the clients already use (`userId`,
//! `coachID`, `index`, `dateAssigned`, ...). The stored signature is exposed
//! as its URL only; the storage id stays server-side.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use gym_core::error::CoreError;
use gym_core::scheduling::{
    PackageStatus, SessionRecord, SessionStatus, MAX_SESSIONS_PER_PACKAGE,
};
use gym_core::types::{DbId, Timestamp};

use crate::models::user::UserSummary;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A package row from the `training_packages` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPackage {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(rename = "coachID")]
    pub coach_id: Option<DbId>,
    pub sessions: i32,
    pub status: String,
    pub training_type: Option<String>,
    pub total: f64,
    #[serde(rename = "signature")]
    pub signature_url: Option<String>,
    #[serde(skip_serializing)]
    pub signature_public_id: Option<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrainingPackage {
    pub fn package_status(&self) -> Result<PackageStatus, CoreError> {
        PackageStatus::from_name(&self.status)
            .map_err(|_| CoreError::Internal(format!("Unknown package status '{}'", self.status)))
    }
}

/// A session row from the `training_sessions` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub package_id: DbId,
    #[serde(rename = "index")]
    pub session_index: i32,
    pub date_assigned: Option<NaiveDate>,
    pub time_assigned: Option<NaiveTime>,
    pub status: String,
    pub trainings: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrainingSession {
    /// Convert to the scheduling engine's record type.
    pub fn to_record(&self) -> Result<SessionRecord, CoreError> {
        Ok(SessionRecord {
            id: self.id,
            index: self.session_index,
            date_assigned: self.date_assigned,
            time_assigned: self.time_assigned,
            status: SessionStatus::from_name(&self.status)?,
            trainings: self.trainings.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A package together with its schedule ordered by index.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingPackageWithSchedule {
    #[serde(flatten)]
    pub package: TrainingPackage,
    pub schedule: Vec<TrainingSession>,
}

/// An active package with its client and coach resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTraining {
    pub user: UserSummary,
    pub coach: Option<UserSummary>,
    pub training_id: DbId,
    pub sessions: Vec<TrainingSession>,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a package.
///
/// `signature` carries the raw image payload (data URI or remote URL); it is
/// uploaded before the row is written.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingPackage {
    pub user_id: DbId,
    #[serde(rename = "coachID")]
    pub coach_id: Option<DbId>,
    #[validate(range(
        min = 1,
        max = MAX_SESSIONS_PER_PACKAGE,
        message = "Session count must be between 1 and 100"
    ))]
    pub sessions: i32,
    pub training_type: Option<String>,
    #[validate(range(min = 0.0, message = "Total must not be negative"))]
    pub total: Option<f64>,
    pub signature: Option<String>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Generic package patch. Never touches the session count or the schedule.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainingPackage {
    #[serde(rename = "coachID")]
    pub coach_id: Option<DbId>,
    pub training_type: Option<String>,
    #[validate(range(min = 0.0, message = "Total must not be negative"))]
    pub total: Option<f64>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Session DTOs
// ---------------------------------------------------------------------------

/// Body of the assign-schedule request.
#[derive(Debug, Deserialize)]
pub struct AssignSession {
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub trainings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Payment DTO
// ---------------------------------------------------------------------------

/// Body of the payment-intent request for a package purchase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntent {
    pub user_id: DbId,
    pub amount: f64,
}
