//! Route definitions for the user directory projection.
//!
//! ```text
//! POST   /      create_user
//! GET    /{id}  get_user
//! DELETE /{id}  delete_user
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// User routes, mounted at `/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::create_user))
        .route("/{id}", get(user::get_user).delete(user::delete_user))
}
