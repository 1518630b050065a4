//! Handlers for the session scheduling transitions.
//!
//! Each returns the package with its full schedule after the change.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use gym_core::scheduling::SessionChange;
use gym_core::types::DbId;
use gym_db::models::training_package::AssignSession;

use crate::engine::scheduling as engine;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /training-packages/{id}/sessions/{session_id}/assign
///
/// Set date, time, and trainings; the session becomes `waiting`.
pub async fn assign_session(
    State(state): State<AppState>,
    Path((package_id, session_id)): Path<(DbId, DbId)>,
    Json(body): Json<AssignSession>,
) -> AppResult<impl IntoResponse> {
    let change = SessionChange::Assign {
        date: body.date,
        time: body.time,
        trainings: body.trainings,
    };
    let data = engine::transition_session(&state.pool, package_id, session_id, change).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /training-packages/{id}/sessions/{session_id}/cancel
///
/// Clear date and time; the session returns to `pending`.
pub async fn cancel_session(
    State(state): State<AppState>,
    Path((package_id, session_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let data =
        engine::transition_session(&state.pool, package_id, session_id, SessionChange::Cancel)
            .await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /training-packages/{id}/sessions/{session_id}/complete
///
/// Mark the session `completed`, closing the package once all are.
pub async fn complete_session(
    State(state): State<AppState>,
    Path((package_id, session_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let data =
        engine::transition_session(&state.pool, package_id, session_id, SessionChange::Complete)
            .await?;
    Ok(Json(DataResponse { data }))
}
