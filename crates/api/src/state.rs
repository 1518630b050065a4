use std::sync::Arc;

use gym_core::payment::PaymentGateway;
use gym_core::storage::ObjectStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gym_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Image storage for package signatures.
    pub storage: Arc<dyn ObjectStorage>,
    /// Payment gateway for customers, intents, and subscriptions.
    pub payments: Arc<dyn PaymentGateway>,
}
