//! Route definitions for branches.
//!
//! ```text
//! GET    /        list_branches
//! POST   /        create_branch
//! GET    /{id}    get_branch
//! PUT    /{id}    update_branch
//! DELETE /{id}    delete_branch
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::branch;
use crate::state::AppState;

/// Branch routes, mounted at `/branches`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(branch::list_branches).post(branch::create_branch))
        .route(
            "/{id}",
            get(branch::get_branch)
                .put(branch::update_branch)
                .delete(branch::delete_branch),
        )
}
