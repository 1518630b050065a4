#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use gym_api::config::ServerConfig;
use gym_api::router::build_app_router;
use gym_api::state::AppState;
use gym_core::error::CoreError;
use gym_core::payment::{Customer, PaymentGateway, PaymentIntent, Subscription};
use gym_core::storage::{DeleteOutcome, ObjectStorage, StoredObject};
use gym_db::models::user::CreateUser;
use gym_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// In-memory object storage recording every call.
#[derive(Default)]
pub struct FakeStorage {
    pub fail_uploads: bool,
    pub fail_deletes: bool,
    /// Public ids reported as already gone on delete.
    pub missing: Vec<String>,
    pub stored: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn store(&self, payload: &str, folder: &str) -> Result<StoredObject, CoreError> {
        if self.fail_uploads {
            return Err(CoreError::UpstreamStorage("upload refused".to_string()));
        }
        let mut stored = self.stored.lock().unwrap();
        stored.push((payload.to_string(), folder.to_string()));
        let public_id = format!("{folder}/img{}", stored.len());
        Ok(StoredObject {
            url: format!("https://cdn.test/{public_id}.png"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome, CoreError> {
        if self.fail_deletes {
            return Err(CoreError::UpstreamStorage("destroy refused".to_string()));
        }
        self.deleted.lock().unwrap().push(public_id.to_string());
        if self.missing.iter().any(|m| m == public_id) {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}

/// In-memory payment gateway recording every intent.
#[derive(Default)]
pub struct FakePayments {
    pub fail: bool,
    pub counter: AtomicUsize,
    /// `(amount_minor, currency, customer_id)` per created intent.
    pub intents: Mutex<Vec<(i64, String, String)>>,
    pub deleted_customers: Mutex<Vec<String>>,
}

impl FakePayments {
    fn check(&self) -> Result<usize, CoreError> {
        if self.fail {
            return Err(CoreError::UpstreamPayment("gateway unavailable".to_string()));
        }
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_customer(&self, _name: &str, _email: &str) -> Result<Customer, CoreError> {
        let n = self.check()?;
        Ok(Customer {
            id: format!("cus_{n}"),
        })
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        customer_id: &str,
    ) -> Result<PaymentIntent, CoreError> {
        let n = self.check()?;
        self.intents.lock().unwrap().push((
            amount_minor,
            currency.to_string(),
            customer_id.to_string(),
        ));
        Ok(PaymentIntent {
            id: format!("pi_{n}"),
            client_secret: format!("pi_{n}_secret"),
        })
    }

    async fn create_subscription(
        &self,
        _customer_id: &str,
        _price_id: &str,
    ) -> Result<Subscription, CoreError> {
        let n = self.check()?;
        Ok(Subscription {
            id: format!("sub_{n}"),
            status: "incomplete".to_string(),
        })
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<bool, CoreError> {
        self.check()?;
        self.deleted_customers
            .lock()
            .unwrap()
            .push(customer_id.to_string());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        payment_currency: "php".to_string(),
    }
}

/// Build the full application router with default fakes.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(
        pool,
        Arc::new(FakeStorage::default()),
        Arc::new(FakePayments::default()),
    )
}

/// Build the full application router around the given collaborators.
///
/// Uses the same middleware stack as `main.rs`.
pub fn build_test_app_with(
    pool: PgPool,
    storage: Arc<FakeStorage>,
    payments: Arc<FakePayments>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        payments,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert a user directly, bypassing the gateway.
pub async fn seed_user(pool: &PgPool, name: &str, role: &str, branch_id: Option<i64>) -> i64 {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: Some(role.to_string()),
        branch_id,
        gender: None,
        birth_date: None,
        price_id: None,
    };
    UserRepo::create(pool, &input, role).await.unwrap().id
}

pub async fn seed_branch(pool: &PgPool, name: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO branches (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn put(app: Router, uri: &str) -> Response {
    send(app, Method::PUT, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}
