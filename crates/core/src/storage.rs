//! Object storage collaborator contract.
//!
//! Signature images are persisted through an external object store before the
//! owning package is written. Implementations live in the cloud crate; the
//! API layer only sees `Arc<dyn ObjectStorage>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Folder that package signatures are stored under.
pub const SIGNATURE_FOLDER: &str = "signatures";

/// Accepted payload prefixes: inline data URIs or remote URLs.
const VALID_PAYLOAD_PREFIXES: &[&str] = &["data:image/", "https://", "http://"];

/// Reference to an object held by the storage provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Provider identifier, used for deletion.
    pub public_id: String,
    /// Publicly reachable URL.
    pub url: String,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `payload` (data URI or URL) under `folder`.
    ///
    /// Any provider failure is a `CoreError::UpstreamStorage`.
    async fn store(&self, payload: &str, folder: &str) -> Result<StoredObject, CoreError>;

    /// Delete a stored object by its provider id.
    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome, CoreError>;
}

/// Validate an image payload before it is sent to the provider.
pub fn validate_image_payload(payload: &str) -> Result<(), CoreError> {
    if payload.trim().is_empty() {
        return Err(CoreError::Validation(
            "Image payload must not be empty".to_string(),
        ));
    }
    if !VALID_PAYLOAD_PREFIXES.iter().any(|p| payload.starts_with(p)) {
        return Err(CoreError::Validation(
            "Image payload must be an image data URI or an http(s) URL".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_accepted() {
        assert!(validate_image_payload("data:image/png;base64,iVBORw0KGgo=").is_ok());
    }

    #[test]
    fn remote_url_accepted() {
        assert!(validate_image_payload("https://cdn.example.com/sig.png").is_ok());
    }

    #[test]
    fn blank_payload_rejected() {
        assert!(validate_image_payload("   ").is_err());
    }

    #[test]
    fn raw_base64_rejected() {
        assert!(validate_image_payload("iVBORw0KGgo=").is_err());
    }
}
