use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A query matched nothing it could aggregate over.
    #[error("No data: {0}")]
    NoData(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Reserved for compare-and-swap style updates; no current operation
    /// produces it.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Object storage error: {0}")]
    UpstreamStorage(String),

    #[error("Payment gateway error: {0}")]
    UpstreamPayment(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
