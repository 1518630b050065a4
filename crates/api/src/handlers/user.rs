//! Handlers for seeding, reading, and removing entries of the user directory.
//!
//! Creating a user also registers a payment-gateway customer and, when a
//! price is given, starts a subscription. A gateway failure is reported as
//! an upstream error; the user row already written stays. Deleting a user
//! removes the gateway customer first.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use gym_core::error::CoreError;
use gym_core::payment::Subscription;
use gym_core::roles::{self, ROLE_CLIENT};
use gym_core::types::DbId;
use gym_db::models::user::{CreateUser, User};
use gym_db::repositories::{TrainingPackageRepo, UserRepo};

use crate::engine::scheduling::ensure_user_exists;
use crate::error::{AppError, AppResult};
use crate::handlers::branch::ensure_branch_exists;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: User,
    pub subscription: Option<Subscription>,
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let role = body.role.as_deref().unwrap_or(ROLE_CLIENT);
    roles::validate_role(role)?;
    if let Some(branch_id) = body.branch_id {
        ensure_branch_exists(&state.pool, branch_id).await?;
    }

    let mut user = UserRepo::create(&state.pool, &body, role).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User created");

    let customer = state.payments.create_customer(&user.name, &user.email).await?;
    UserRepo::set_payment_customer_id(&state.pool, user.id, &customer.id).await?;

    let subscription = match body.price_id.as_deref() {
        Some(price_id) => {
            let subscription = state
                .payments
                .create_subscription(&customer.id, price_id)
                .await?;
            tracing::info!(
                user_id = user.id,
                subscription_id = %subscription.id,
                "Subscription started"
            );
            Some(subscription)
        }
        None => None,
    };
    user.payment_customer_id = Some(customer.id);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedUser { user, subscription },
        }),
    ))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = ensure_user_exists(&state.pool, id, "User").await?;
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /users/{id}
///
/// Refused with 409 while the user owns packages, so their stored
/// signatures are never left behind by the cascade.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = ensure_user_exists(&state.pool, id, "User").await?;
    if TrainingPackageRepo::exists_for_client(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "User {id} still owns training packages"
        ))));
    }

    if let Some(customer_id) = user.payment_customer_id.as_deref() {
        if !state.payments.delete_customer(customer_id).await? {
            tracing::warn!(user_id = id, customer_id, "Payment customer already absent");
        }
    }

    UserRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
