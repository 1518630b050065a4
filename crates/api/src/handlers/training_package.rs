//! Handlers for training package creation, lookup, listing, update, and
//! deletion. Session transitions live in [`super::schedule`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use gym_core::error::CoreError;
use gym_core::scheduling::PackageStatus;
use gym_core::types::DbId;
use gym_db::models::training_package::{
    CreateTrainingPackage, TrainingPackageWithSchedule, UpdateTrainingPackage,
};
use gym_db::repositories::TrainingPackageRepo;

use crate::engine::scheduling as engine;
use crate::error::{AppError, AppResult};
use crate::query::BranchFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /training-packages
// ---------------------------------------------------------------------------

/// Create a package with its pending schedule.
pub async fn create_package(
    State(state): State<AppState>,
    Json(body): Json<CreateTrainingPackage>,
) -> AppResult<impl IntoResponse> {
    let created = engine::create_package(&state, body).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /training-packages
// ---------------------------------------------------------------------------

/// List non-deleted packages, newest first, optionally by branch.
pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> AppResult<impl IntoResponse> {
    let packages = TrainingPackageRepo::list_active(&state.pool, params.branch_id).await?;
    let data = engine::with_schedules(&state.pool, packages).await?;

    tracing::debug!(
        count = data.len(),
        branch_id = ?params.branch_id,
        "Listed training packages"
    );

    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /training-packages/active
// ---------------------------------------------------------------------------

/// List active packages whose client belongs to the branch.
pub async fn list_active_trainings(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> AppResult<impl IntoResponse> {
    let data = engine::active_trainings(&state.pool, params.branch_id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /training-packages/coach/{coach_id}
// ---------------------------------------------------------------------------

pub async fn list_by_coach(
    State(state): State<AppState>,
    Path(coach_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let packages = TrainingPackageRepo::list_by_coach(&state.pool, coach_id).await?;
    let data = engine::with_schedules(&state.pool, packages).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /training-packages/client/{client_id}
// ---------------------------------------------------------------------------

pub async fn list_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let packages = TrainingPackageRepo::list_by_client(&state.pool, client_id).await?;
    let data = engine::with_schedules(&state.pool, packages).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /training-packages/{id}
// ---------------------------------------------------------------------------

/// Get one package with its schedule ordered by index.
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let package = engine::ensure_package_exists(&state.pool, id).await?;
    let schedule = TrainingPackageRepo::list_sessions(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TrainingPackageWithSchedule { package, schedule },
    }))
}

// ---------------------------------------------------------------------------
// PUT /training-packages/{id}
// ---------------------------------------------------------------------------

/// Patch coach, training type, total, or status. The schedule is untouched.
pub async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateTrainingPackage>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    if let Some(status) = body.status.as_deref() {
        PackageStatus::from_name(status)?;
    }
    if let Some(coach_id) = body.coach_id {
        engine::ensure_user_exists(&state.pool, coach_id, "Coach").await?;
    }

    let package = TrainingPackageRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrainingPackage",
            id,
        }))?;
    let schedule = TrainingPackageRepo::list_sessions(&state.pool, id).await?;

    tracing::info!(package_id = id, status = %package.status, "Training package updated");

    Ok(Json(DataResponse {
        data: TrainingPackageWithSchedule { package, schedule },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /training-packages/{id}
// ---------------------------------------------------------------------------

/// Permanently delete a package, its sessions, and its stored signature.
pub async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    engine::delete_package(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /training-packages/{id}/soft-delete
// ---------------------------------------------------------------------------

/// Mark a package deleted. It stays visible to reports.
pub async fn soft_delete_package(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TrainingPackageRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(package_id = id, "Training package soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "TrainingPackage",
            id,
        }))
    }
}
