//! Route definitions for training packages and their sessions.
//!
//! ```text
//! POST   /                                    create_package
//! GET    /                                    list_packages (?branch_id)
//! GET    /active                              list_active_trainings (?branch_id)
//! POST   /payment-intent                      create_payment_intent
//! GET    /coach/{coach_id}                    list_by_coach
//! GET    /client/{client_id}                  list_by_client
//! GET    /{id}                                get_package
//! PUT    /{id}                                update_package
//! DELETE /{id}                                delete_package
//! POST   /{id}/soft-delete                    soft_delete_package
//! PUT    /{id}/sessions/{session_id}/assign   assign_session
//! PUT    /{id}/sessions/{session_id}/cancel   cancel_session
//! PUT    /{id}/sessions/{session_id}/complete complete_session
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{payment, schedule, training_package};
use crate::state::AppState;

/// Training package routes, mounted at `/training-packages`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(training_package::create_package).get(training_package::list_packages),
        )
        // Static segments before `/{id}`.
        .route("/active", get(training_package::list_active_trainings))
        .route("/payment-intent", post(payment::create_payment_intent))
        .route("/coach/{coach_id}", get(training_package::list_by_coach))
        .route("/client/{client_id}", get(training_package::list_by_client))
        .route(
            "/{id}",
            get(training_package::get_package)
                .put(training_package::update_package)
                .delete(training_package::delete_package),
        )
        .route(
            "/{id}/soft-delete",
            post(training_package::soft_delete_package),
        )
        .route(
            "/{id}/sessions/{session_id}/assign",
            put(schedule::assign_session),
        )
        .route(
            "/{id}/sessions/{session_id}/cancel",
            put(schedule::cancel_session),
        )
        .route(
            "/{id}/sessions/{session_id}/complete",
            put(schedule::complete_session),
        )
}
