//! Training package lifecycle operations.
//!
//! Session transitions lock the package row, apply the pure transition from
//! [`gym_core::scheduling`], and write back only the touched session and the
//! package status, all inside one transaction.

use std::collections::HashMap;

use sqlx::PgPool;
use validator::Validate;

use gym_core::error::CoreError;
use gym_core::scheduling::{self, SessionChange};
use gym_core::storage::{self, DeleteOutcome, SIGNATURE_FOLDER};
use gym_core::types::DbId;
use gym_db::models::training_package::{
    ActiveTraining, CreateTrainingPackage, TrainingPackage, TrainingPackageWithSchedule,
    TrainingSession,
};
use gym_db::models::user::{User, UserSummary};
use gym_db::repositories::{TrainingPackageRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a user exists, reporting it as `entity` when it does not.
pub async fn ensure_user_exists(pool: &PgPool, id: DbId, entity: &'static str) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity, id }))
}

/// Verify that a non-deleted package exists, returning the row.
pub async fn ensure_package_exists(pool: &PgPool, id: DbId) -> AppResult<TrainingPackage> {
    TrainingPackageRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrainingPackage",
            id,
        }))
}

/// Attach each package's schedule, preserving the package order.
pub async fn with_schedules(
    pool: &PgPool,
    packages: Vec<TrainingPackage>,
) -> AppResult<Vec<TrainingPackageWithSchedule>> {
    let ids: Vec<DbId> = packages.iter().map(|p| p.id).collect();
    let mut by_package = group_sessions(
        TrainingPackageRepo::list_sessions_for_packages(pool, &ids).await?,
    );

    Ok(packages
        .into_iter()
        .map(|package| {
            let schedule = by_package.remove(&package.id).unwrap_or_default();
            TrainingPackageWithSchedule { package, schedule }
        })
        .collect())
}

fn group_sessions(sessions: Vec<TrainingSession>) -> HashMap<DbId, Vec<TrainingSession>> {
    let mut grouped: HashMap<DbId, Vec<TrainingSession>> = HashMap::new();
    for session in sessions {
        grouped.entry(session.package_id).or_default().push(session);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create a package with `sessions` pending session records.
///
/// A supplied signature is uploaded before anything is written; an upload
/// failure aborts the whole operation. If the insert then fails, the
/// uploaded signature is removed again on a best-effort basis.
pub async fn create_package(
    state: &AppState,
    input: CreateTrainingPackage,
) -> AppResult<TrainingPackageWithSchedule> {
    input.validate()?;
    let schedule = scheduling::initial_schedule(input.sessions)?;

    ensure_user_exists(&state.pool, input.user_id, "Client").await?;
    if let Some(coach_id) = input.coach_id {
        ensure_user_exists(&state.pool, coach_id, "Coach").await?;
    }

    let signature = match input.signature.as_deref().map(str::trim) {
        Some(payload) if !payload.is_empty() => {
            storage::validate_image_payload(payload)?;
            Some(state.storage.store(payload, SIGNATURE_FOLDER).await?)
        }
        _ => None,
    };

    let created =
        match TrainingPackageRepo::create(&state.pool, &input, signature.as_ref(), &schedule)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                if let Some(stored) = &signature {
                    discard_signature(state, &stored.public_id).await;
                }
                return Err(err.into());
            }
        };

    tracing::info!(
        package_id = created.package.id,
        user_id = created.package.user_id,
        sessions = created.package.sessions,
        has_signature = signature.is_some(),
        "Training package created"
    );

    Ok(created)
}

/// Remove a signature whose package was never written. Failures are logged
/// only; the insert error is what the caller reports.
async fn discard_signature(state: &AppState, public_id: &str) {
    match state.storage.delete(public_id).await {
        Ok(outcome) => {
            tracing::warn!(public_id, ?outcome, "Discarded signature of unsaved package")
        }
        Err(e) => {
            tracing::error!(public_id, error = %e, "Failed to discard orphaned signature")
        }
    }
}

// ---------------------------------------------------------------------------
// Session transitions
// ---------------------------------------------------------------------------

/// Apply `change` to one session of a package.
///
/// Returns the package (with its post-transition status) and full schedule.
pub async fn transition_session(
    pool: &PgPool,
    package_id: DbId,
    session_id: DbId,
    change: SessionChange,
) -> AppResult<TrainingPackageWithSchedule> {
    let action = change.action();
    let mut tx = pool.begin().await?;

    let mut package = TrainingPackageRepo::lock_for_update(&mut *tx, package_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrainingPackage",
            id: package_id,
        }))?;

    let mut rows = TrainingPackageRepo::list_sessions(&mut *tx, package_id).await?;
    let mut schedule = rows
        .iter()
        .map(TrainingSession::to_record)
        .collect::<Result<Vec<_>, CoreError>>()?;

    let current = package.package_status()?;
    let outcome = scheduling::transition(current, &mut schedule, session_id, change)?;

    let updated =
        TrainingPackageRepo::update_session(&mut *tx, package_id, &outcome.session).await?;
    if outcome.package_status != current {
        TrainingPackageRepo::set_status(&mut *tx, package_id, outcome.package_status.as_str())
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        package_id,
        session_id,
        session_index = updated.session_index,
        action = ?action,
        status = %updated.status,
        "Session transitioned"
    );
    if outcome.package_closed {
        tracing::info!(package_id, "All sessions completed, package closed");
    }

    package.status = outcome.package_status.as_str().to_string();
    if let Some(slot) = rows.iter_mut().find(|s| s.id == updated.id) {
        *slot = updated;
    }

    Ok(TrainingPackageWithSchedule {
        package,
        schedule: rows,
    })
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Permanently delete a package and its sessions.
///
/// The stored signature is removed first; the storage side reporting it as
/// already gone is not an error. Soft-deleted packages can be hard-deleted.
pub async fn delete_package(state: &AppState, id: DbId) -> AppResult<()> {
    let package = TrainingPackageRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrainingPackage",
            id,
        }))?;

    if let Some(public_id) = package.signature_public_id.as_deref() {
        match state.storage.delete(public_id).await? {
            DeleteOutcome::Deleted => {
                tracing::debug!(package_id = id, public_id, "Signature deleted")
            }
            DeleteOutcome::NotFound => {
                tracing::warn!(package_id = id, public_id, "Signature already absent")
            }
        }
    }

    TrainingPackageRepo::hard_delete(&state.pool, id).await?;
    tracing::info!(package_id = id, "Training package deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Active trainings
// ---------------------------------------------------------------------------

/// Active packages whose client is in `branch_id`, with client, coach, and
/// schedule resolved. Packages whose client cannot be resolved are dropped.
pub async fn active_trainings(
    pool: &PgPool,
    branch_id: Option<DbId>,
) -> AppResult<Vec<ActiveTraining>> {
    let packages = TrainingPackageRepo::list_with_active_training(pool, branch_id).await?;

    let mut user_ids: Vec<DbId> = packages
        .iter()
        .flat_map(|p| std::iter::once(p.user_id).chain(p.coach_id))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let users: HashMap<DbId, UserSummary> = UserRepo::find_many(pool, &user_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    let ids: Vec<DbId> = packages.iter().map(|p| p.id).collect();
    let mut sessions =
        group_sessions(TrainingPackageRepo::list_sessions_for_packages(pool, &ids).await?);

    Ok(packages
        .into_iter()
        .filter_map(|p| {
            let user = users.get(&p.user_id)?.clone();
            Some(ActiveTraining {
                user,
                coach: p.coach_id.and_then(|c| users.get(&c).cloned()),
                training_id: p.id,
                sessions: sessions.remove(&p.id).unwrap_or_default(),
            })
        })
        .collect())
}
