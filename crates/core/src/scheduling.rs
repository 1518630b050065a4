//! Training package scheduling: session state machine and status roll-up.
//!
//! A training package owns `N` session records created together with the
//! package. Sessions move through `pending -> waiting -> completed` and the
//! package flips to `inactive` once every session is completed. Everything
//! here is pure; the repository layer loads a package under a row lock,
//! runs [`transition`], and writes back the touched session.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Lifecycle state of one session record.
///
/// The lowercase names are the persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Waiting,
    Completed,
}

impl SessionStatus {
    /// Name stored in the `training_sessions.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Completed => "completed",
        }
    }

    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "pending" => Ok(Self::Pending),
            "waiting" => Ok(Self::Waiting),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Internal(format!(
                "Unknown session status '{other}'"
            ))),
        }
    }
}

/// Lifecycle state of a training package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Active,
    Inactive,
}

impl PackageStatus {
    /// Name stored in the `training_packages.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parse a package status name, rejecting unknown values.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(CoreError::Validation(format!(
                "Invalid package status '{other}'. Must be one of: active, inactive"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Operations that move a session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Assign,
    Cancel,
    Complete,
}

/// Explicit `from x action -> to` transition table for session records.
///
/// Every cell is currently accepted: assigning reschedules any session
/// (completed ones included), cancelling always returns to pending, and
/// completing is unconditional. Rejecting a cell means returning a
/// `CoreError::Validation` from its arm.
pub mod state_machine {
    use super::{SessionAction, SessionStatus};
    use crate::error::CoreError;

    /// Target state for `action` applied to a session in state `from`.
    pub fn next_status(
        from: SessionStatus,
        action: SessionAction,
    ) -> Result<SessionStatus, CoreError> {
        use SessionAction::*;
        use SessionStatus::*;

        let to = match (from, action) {
            (Pending, Assign) => Waiting,
            (Waiting, Assign) => Waiting,
            (Completed, Assign) => Waiting,

            (Pending, Cancel) => Pending,
            (Waiting, Cancel) => Pending,
            (Completed, Cancel) => Pending,

            (Pending, Complete) => Completed,
            (Waiting, Complete) => Completed,
            (Completed, Complete) => Completed,
        };
        Ok(to)
    }

    /// Whether `action` is accepted from `from`.
    pub fn can_apply(from: SessionStatus, action: SessionAction) -> bool {
        next_status(from, action).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Session records
// ---------------------------------------------------------------------------

/// A persisted session record inside a package schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: DbId,
    /// 1-based position in the package, never renumbered.
    pub index: i32,
    pub date_assigned: Option<NaiveDate>,
    pub time_assigned: Option<NaiveTime>,
    pub status: SessionStatus,
    pub trainings: Vec<String>,
}

/// A session record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub index: i32,
    pub status: SessionStatus,
    pub trainings: Vec<String>,
}

/// A requested change to one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Assign {
        date: NaiveDate,
        time: NaiveTime,
        trainings: Vec<String>,
    },
    Cancel,
    Complete,
}

impl SessionChange {
    pub fn action(&self) -> SessionAction {
        match self {
            Self::Assign { .. } => SessionAction::Assign,
            Self::Cancel => SessionAction::Cancel,
            Self::Complete => SessionAction::Complete,
        }
    }
}

/// Result of applying a [`SessionChange`] to a package schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The session after the change.
    pub session: SessionRecord,
    /// Package status after roll-up.
    pub package_status: PackageStatus,
    /// `true` when this change moved the package from active to inactive.
    pub package_closed: bool,
}

// ---------------------------------------------------------------------------
// Package creation
// ---------------------------------------------------------------------------

/// Upper bound on the sessions a single package may hold.
pub const MAX_SESSIONS_PER_PACKAGE: i32 = 100;

/// Validate the declared session count of a new package.
pub fn validate_session_count(session_count: i32) -> Result<(), CoreError> {
    if session_count <= 0 {
        return Err(CoreError::Validation(format!(
            "Session count must be a positive integer, got {session_count}"
        )));
    }
    if session_count > MAX_SESSIONS_PER_PACKAGE {
        return Err(CoreError::Validation(format!(
            "Session count must not exceed {MAX_SESSIONS_PER_PACKAGE}, got {session_count}"
        )));
    }
    Ok(())
}

/// Build the initial schedule for a package with `session_count` sessions.
///
/// Produces indices `1..=session_count`, all pending with no trainings.
pub fn initial_schedule(session_count: i32) -> Result<Vec<NewSession>, CoreError> {
    validate_session_count(session_count)?;
    Ok((1..=session_count)
        .map(|index| NewSession {
            index,
            status: SessionStatus::Pending,
            trainings: Vec::new(),
        })
        .collect())
}

/// Deduplicate training labels, keeping first-seen order.
pub fn normalize_trainings(trainings: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(trainings.len());
    for label in trainings {
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Apply `change` to the session identified by `session_id`.
///
/// Assign sets date, time, and replaces trainings. Cancel clears date and
/// time but leaves trainings as they were. Complete touches only the status.
pub fn apply_change(
    schedule: &mut [SessionRecord],
    session_id: DbId,
    change: SessionChange,
) -> Result<&SessionRecord, CoreError> {
    let session = schedule
        .iter_mut()
        .find(|s| s.id == session_id)
        .ok_or(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        })?;

    let next = state_machine::next_status(session.status, change.action())?;

    match change {
        SessionChange::Assign {
            date,
            time,
            trainings,
        } => {
            session.date_assigned = Some(date);
            session.time_assigned = Some(time);
            session.trainings = normalize_trainings(trainings);
        }
        SessionChange::Cancel => {
            session.date_assigned = None;
            session.time_assigned = None;
        }
        SessionChange::Complete => {}
    }
    session.status = next;

    Ok(&*session)
}

/// Whether every session in the schedule is completed.
pub fn all_completed(schedule: &[SessionRecord]) -> bool {
    schedule
        .iter()
        .all(|s| s.status == SessionStatus::Completed)
}

/// Package status after a completion: inactive once every session is done.
///
/// Never moves an inactive package back to active.
pub fn roll_up(current: PackageStatus, schedule: &[SessionRecord]) -> PackageStatus {
    if all_completed(schedule) {
        PackageStatus::Inactive
    } else {
        current
    }
}

/// Apply a change and, for completions, re-evaluate the package roll-up.
///
/// The roll-up is re-checked on every completion, so completing an already
/// completed session is safe to repeat.
pub fn transition(
    package_status: PackageStatus,
    schedule: &mut [SessionRecord],
    session_id: DbId,
    change: SessionChange,
) -> Result<TransitionOutcome, CoreError> {
    let action = change.action();
    let session = apply_change(schedule, session_id, change)?.clone();

    let next_status = if action == SessionAction::Complete {
        roll_up(package_status, schedule)
    } else {
        package_status
    };

    Ok(TransitionOutcome {
        session,
        package_status: next_status,
        package_closed: package_status == PackageStatus::Active
            && next_status == PackageStatus::Inactive,
    })
}
