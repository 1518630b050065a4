//! Payment intent creation for package purchases.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use gym_core::error::CoreError;
use gym_core::payment;
use gym_db::models::training_package::CreatePaymentIntent;

use crate::engine::scheduling::ensure_user_exists;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// POST /training-packages/payment-intent
///
/// Charges the client's gateway customer `amount` (major units) in the
/// configured currency and returns the client secret.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentIntent>,
) -> AppResult<impl IntoResponse> {
    let amount_minor = payment::to_minor_units(body.amount)?;
    let user = ensure_user_exists(&state.pool, body.user_id, "User").await?;

    let customer_id = user.payment_customer_id.as_deref().ok_or_else(|| {
        CoreError::Validation(format!("User {} has no payment customer", user.id))
    })?;

    let intent = state
        .payments
        .create_payment_intent(amount_minor, &state.config.payment_currency, customer_id)
        .await?;

    tracing::info!(
        user_id = user.id,
        amount_minor,
        currency = %state.config.payment_currency,
        intent_id = %intent.id,
        "Payment intent created"
    );

    Ok(Json(DataResponse {
        data: PaymentIntentResponse {
            client_secret: intent.client_secret,
        },
    }))
}
