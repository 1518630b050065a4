//! Route definitions for reports.
//!
//! ```text
//! GET /sales             sales_stats (?branch_id, ?debug)
//! GET /training-usage    training_usage_stats (?branch_id)
//! GET /training-types    training_type_stats (?branch_id)
//! GET /demographics      demographics (?branch_id)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Report routes, mounted at `/reports`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(report::sales_stats))
        .route("/training-usage", get(report::training_usage_stats))
        .route("/training-types", get(report::training_type_stats))
        .route("/demographics", get(report::demographics))
}
