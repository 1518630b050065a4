//! Payment gateway collaborator contract and amount handling.
//!
//! Gateway calls are never wrapped in a local transaction: a failure after a
//! local write surfaces as `CoreError::UpstreamPayment` and the local write
//! stays committed.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "php";

/// Minor units per major currency unit.
const MINOR_UNITS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_customer(&self, name: &str, email: &str) -> Result<Customer, CoreError>;

    /// Create a payment intent for `amount_minor` (e.g. centavos).
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        customer_id: &str,
    ) -> Result<PaymentIntent, CoreError>;

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<Subscription, CoreError>;

    /// Delete a customer when its user is removed. Returns `false` if the
    /// gateway no longer knows it.
    async fn delete_customer(&self, customer_id: &str) -> Result<bool, CoreError>;
}

/// Convert a major-unit amount to gateway minor units.
pub fn to_minor_units(amount: f64) -> Result<i64, CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Payment amount must be a positive number, got {amount}"
        )));
    }
    Ok((amount * MINOR_UNITS).round() as i64)
}
