//! Handlers for gym branches.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use gym_core::error::CoreError;
use gym_core::types::DbId;
use gym_db::models::branch::{Branch, CreateBranch, UpdateBranch};
use gym_db::repositories::BranchRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a branch exists, returning the full row.
pub async fn ensure_branch_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Branch> {
    BranchRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Branch",
            id,
        })
    })
}

/// GET /branches
pub async fn list_branches(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let branches = BranchRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: branches }))
}

/// POST /branches
pub async fn create_branch(
    State(state): State<AppState>,
    Json(body): Json<CreateBranch>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let branch = BranchRepo::create(&state.pool, &body).await?;

    tracing::info!(branch_id = branch.id, name = %branch.name, "Branch created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: branch })))
}

/// GET /branches/{id}
pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let branch = ensure_branch_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: branch }))
}

/// PUT /branches/{id}
pub async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateBranch>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let branch = BranchRepo::update(&state.pool, id, &body)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Branch",
                id,
            })
        })?;
    Ok(Json(DataResponse { data: branch }))
}

/// DELETE /branches/{id}
pub async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if BranchRepo::delete(&state.pool, id).await? {
        tracing::info!(branch_id = id, "Branch deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Branch",
            id,
        }))
    }
}
