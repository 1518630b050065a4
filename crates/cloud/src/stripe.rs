//! Form-encoded REST client for the Stripe payment API.

use async_trait::async_trait;
use serde::Deserialize;

use gym_core::error::CoreError;
use gym_core::payment::{Customer, PaymentGateway, PaymentIntent, Subscription};

/// Default Stripe REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Stripe error code for an object that does not exist.
const RESOURCE_MISSING: &str = "resource_missing";

/// Stripe credentials and endpoint.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default                  |
    /// |-------------------|--------------------------|
    /// | `STRIPE_SECRET`   | (required)               |
    /// | `STRIPE_API_BASE` | `https://api.stripe.com` |
    ///
    /// # Panics
    ///
    /// Panics if `STRIPE_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret_key =
            std::env::var("STRIPE_SECRET").expect("STRIPE_SECRET must be set in the environment");
        assert!(!secret_key.is_empty(), "STRIPE_SECRET must not be empty");

        Self {
            secret_key,
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        }
    }
}

/// Errors from the Stripe REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Stripe returned a non-2xx status code.
    #[error("Stripe API error ({status}): {message}")]
    ApiError {
        status: u16,
        /// Stripe's machine-readable error code, when present.
        code: Option<String>,
        message: String,
    },
}

impl StripeError {
    /// Whether Stripe reported the target object as missing.
    pub fn is_resource_missing(&self) -> bool {
        matches!(
            self,
            Self::ApiError { status, code, .. }
                if *status == 404 || code.as_deref() == Some(RESOURCE_MISSING)
        )
    }
}

impl From<StripeError> for CoreError {
    fn from(err: StripeError) -> Self {
        CoreError::UpstreamPayment(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    id: String,
    status: String,
}

/// [`PaymentGateway`] backed by Stripe.
pub struct StripeGateway {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.api_base.trim_end_matches('/'))
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, StripeError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn remove_customer(&self, customer_id: &str) -> Result<(), StripeError> {
        let response = self
            .client
            .delete(self.url(&format!("customers/{customer_id}")))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;
        let _: serde_json::Value = parse_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, name: &str, email: &str) -> Result<Customer, CoreError> {
        let body: CustomerResponse = self
            .post_form(
                "customers",
                &[("name", name.to_string()), ("email", email.to_string())],
            )
            .await?;
        tracing::info!(customer_id = %body.id, "Payment customer created");
        Ok(Customer { id: body.id })
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        customer_id: &str,
    ) -> Result<PaymentIntent, CoreError> {
        let body: PaymentIntentResponse = self
            .post_form(
                "payment_intents",
                &[
                    ("amount", amount_minor.to_string()),
                    ("currency", currency.to_string()),
                    ("customer", customer_id.to_string()),
                    ("automatic_payment_methods[enabled]", "true".to_string()),
                ],
            )
            .await?;
        Ok(PaymentIntent {
            id: body.id,
            client_secret: body.client_secret,
        })
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<Subscription, CoreError> {
        let body: SubscriptionResponse = self
            .post_form(
                "subscriptions",
                &[
                    ("customer", customer_id.to_string()),
                    ("items[0][price]", price_id.to_string()),
                ],
            )
            .await?;
        Ok(Subscription {
            id: body.id,
            status: body.status,
        })
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<bool, CoreError> {
        match self.remove_customer(customer_id).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_resource_missing() => {
                tracing::warn!(customer_id, "Payment customer already absent");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StripeError> {
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(api_error(status.as_u16(), &text));
    }
    Ok(response.json::<T>().await?)
}

/// Build an [`StripeError::ApiError`] from a raw error body.
fn api_error(status: u16, text: &str) -> StripeError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => StripeError::ApiError {
            status,
            code: envelope.error.code,
            message: envelope.error.message.unwrap_or_else(|| text.to_string()),
        },
        Err(_) => StripeError::ApiError {
            status,
            code: None,
            message: text.to_string(),
        },
    }
}
