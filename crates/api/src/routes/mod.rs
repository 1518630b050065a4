pub mod branch;
pub mod health;
pub mod report;
pub mod training_package;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /training-packages                               create, list (?branch_id)
/// /training-packages/active                        active trainings (?branch_id)
/// /training-packages/payment-intent                payment intent (POST)
/// /training-packages/coach/{coach_id}              by coach
/// /training-packages/client/{client_id}            by client
/// /training-packages/{id}                          get, update, hard delete
/// /training-packages/{id}/soft-delete              soft delete (POST)
/// /training-packages/{id}/sessions/{sid}/assign    assign schedule (PUT)
/// /training-packages/{id}/sessions/{sid}/cancel    cancel schedule (PUT)
/// /training-packages/{id}/sessions/{sid}/complete  complete session (PUT)
///
/// /reports/sales                                   sales stats (?branch_id, ?debug)
/// /reports/training-usage                          training usage (?branch_id)
/// /reports/training-types                          training types (?branch_id)
/// /reports/demographics                            demographics (?branch_id)
///
/// /branches                                        list, create
/// /branches/{id}                                   get, update, delete
///
/// /users                                           create
/// /users/{id}                                      get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/training-packages", training_package::router())
        .nest("/reports", report::router())
        .nest("/branches", branch::router())
        .nest("/users", user::router())
}
