//! Handlers for the read-only reports over training packages.
//!
//! The repositories fetch raw rows and `gym_core::reporting` derives the
//! payloads. Reports include soft-deleted packages.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use gym_core::reporting::{self, SalesWindows};
use gym_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::query::{BranchFilterParams, SalesParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /reports/sales
///
/// Sums package totals for today, this month, and this year, using the
/// server's local calendar. With `debug=true` returns the matched rows.
pub async fn sales_stats(
    State(state): State<AppState>,
    Query(params): Query<SalesParams>,
) -> AppResult<Response> {
    let windows = SalesWindows::starting_from(&chrono::Local::now());
    let rows = ReportRepo::sales_rows(&state.pool, windows.year, params.branch_id).await?;

    tracing::debug!(
        rows = rows.len(),
        branch_id = ?params.branch_id,
        debug = params.debug,
        "Computed sales report"
    );

    if params.debug {
        let data = reporting::sales_buckets(&rows, &windows, |r| r.created_at);
        return Ok(Json(DataResponse { data }).into_response());
    }

    let data = reporting::sales_totals(&rows, &windows, |r| (r.created_at, r.total));
    Ok(Json(DataResponse { data }).into_response())
}

/// GET /reports/training-usage
///
/// Ranks training labels across every session. 404 when nothing is recorded.
pub async fn training_usage_stats(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> AppResult<impl IntoResponse> {
    let labels = ReportRepo::training_labels(&state.pool, params.branch_id).await?;
    let data = reporting::training_usage(labels)?;
    Ok(Json(DataResponse { data }))
}

/// GET /reports/training-types
pub async fn training_type_stats(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> AppResult<impl IntoResponse> {
    let types = ReportRepo::training_types(&state.pool, params.branch_id).await?;
    let data = reporting::training_type_counts(types);
    Ok(Json(DataResponse { data }))
}

/// GET /reports/demographics
///
/// Per-category gender split and age bracket of distinct clients.
pub async fn demographics(
    State(state): State<AppState>,
    Query(params): Query<BranchFilterParams>,
) -> AppResult<impl IntoResponse> {
    let pairs: Vec<_> = ReportRepo::demographic_rows(&state.pool, params.branch_id)
        .await?
        .into_iter()
        .map(|row| row.into_pair())
        .collect();
    let data = reporting::training_demographics(&pairs, chrono::Utc::now());
    Ok(Json(DataResponse { data }))
}
