//! Signed-upload client for Cloudinary image storage.
//!
//! Uploads go to `POST {api_base}/{cloud}/image/upload` and deletions to
//! `POST {api_base}/{cloud}/image/destroy`. Requests are signed with a
//! SHA-256 digest of the sorted signed parameters followed by the API secret.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use gym_core::error::CoreError;
use gym_core::storage::{DeleteOutcome, ObjectStorage, StoredObject};

/// Default Cloudinary REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Stored signatures are scaled down to this width.
const SIGNATURE_TRANSFORMATION: &str = "c_scale,w_150";

/// Cloudinary credentials and endpoint.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder prefix prepended to every upload folder (may be empty).
    pub folder_prefix: String,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default                             |
    /// |-------------------------|-------------------------------------|
    /// | `CLOUDINARY_CLOUD_NAME` | (required)                          |
    /// | `CLOUDINARY_API_KEY`    | (required)                          |
    /// | `CLOUDINARY_API_SECRET` | (required)                          |
    /// | `CLOUDINARY_FOLDER`     | empty                               |
    /// | `CLOUDINARY_API_BASE`   | `https://api.cloudinary.com/v1_1`   |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };

        Self {
            cloud_name: required("CLOUDINARY_CLOUD_NAME"),
            api_key: required("CLOUDINARY_API_KEY"),
            api_secret: required("CLOUDINARY_API_SECRET"),
            folder_prefix: std::env::var("CLOUDINARY_FOLDER").unwrap_or_default(),
            api_base: std::env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        }
    }
}

/// Errors from the Cloudinary REST layer.
#[derive(Debug, thiserror::Error)]
pub enum CloudinaryError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Cloudinary returned a non-2xx status code.
    #[error("Cloudinary API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx response whose `result` field was not understood.
    #[error("Unexpected Cloudinary result: {0}")]
    UnexpectedResult(String),
}

impl From<CloudinaryError> for CoreError {
    fn from(err: CloudinaryError) -> Self {
        CoreError::UpstreamStorage(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// [`ObjectStorage`] backed by Cloudinary.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{action}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn full_folder(&self, folder: &str) -> String {
        let prefix = self.config.folder_prefix.trim_matches('/');
        if prefix.is_empty() {
            folder.to_string()
        } else {
            format!("{prefix}/{folder}")
        }
    }

    /// Attach timestamp, key, and signature to the signed parameters.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = sign(&params, &self.config.api_secret);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn upload(&self, payload: &str, folder: &str) -> Result<StoredObject, CloudinaryError> {
        let mut form = self.signed_form(vec![
            ("folder", self.full_folder(folder)),
            ("transformation", SIGNATURE_TRANSFORMATION.to_string()),
        ]);
        form.push(("file", payload.to_string()));

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&form)
            .send()
            .await?;
        let body: UploadResponse = parse_response(response).await?;

        tracing::debug!(public_id = %body.public_id, "Image uploaded");
        Ok(StoredObject {
            public_id: body.public_id,
            url: body.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<DeleteOutcome, CloudinaryError> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;
        let body: DestroyResponse = parse_response(response).await?;

        destroy_outcome(&body.result)
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn store(&self, payload: &str, folder: &str) -> Result<StoredObject, CoreError> {
        Ok(self.upload(payload, folder).await?)
    }

    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome, CoreError> {
        Ok(self.destroy(public_id).await?)
    }
}

// ---- private helpers ----

/// Sign `params`: sort by key, join as `k=v&k=v`, append the secret, hash.
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

fn destroy_outcome(result: &str) -> Result<DeleteOutcome, CloudinaryError> {
    match result {
        "ok" => Ok(DeleteOutcome::Deleted),
        "not found" => Ok(DeleteOutcome::NotFound),
        other => Err(CloudinaryError::UnexpectedResult(other.to_string())),
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CloudinaryError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(CloudinaryError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(prefix: &str) -> CloudinaryStorage {
        CloudinaryStorage::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder_prefix: prefix.to_string(),
            api_base: "https://api.example.com/v1_1/".to_string(),
        })
    }

    #[test]
    fn signature_is_order_independent() {
        let a = sign(
            &[("timestamp", "1".to_string()), ("folder", "x".to_string())],
            "secret",
        );
        let b = sign(
            &[("folder", "x".to_string()), ("timestamp", "1".to_string())],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn signature_matches_known_digest() {
        // sha256("folder=x&timestamp=1secret")
        let expected = format!("{:x}", Sha256::digest(b"folder=x&timestamp=1secret"));
        let actual = sign(
            &[("timestamp", "1".to_string()), ("folder", "x".to_string())],
            "secret",
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn signature_depends_on_secret() {
        let params = [("public_id", "signatures/a".to_string())];
        assert_ne!(sign(&params, "one"), sign(&params, "two"));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            storage("").endpoint("upload"),
            "https://api.example.com/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn folder_prefix_is_applied() {
        assert_eq!(storage("").full_folder("signatures"), "signatures");
        assert_eq!(storage("/gym/").full_folder("signatures"), "gym/signatures");
    }

    #[test]
    fn signed_form_excludes_key_from_digest() {
        let form = storage("").signed_form(vec![("public_id", "p".to_string())]);
        let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["public_id", "timestamp", "api_key", "signature", "signature_algorithm"]
        );
    }

    #[test]
    fn destroy_result_mapping() {
        assert!(matches!(destroy_outcome("ok"), Ok(DeleteOutcome::Deleted)));
        assert!(matches!(destroy_outcome("not found"), Ok(DeleteOutcome::NotFound)));
        assert!(matches!(
            destroy_outcome("error"),
            Err(CloudinaryError::UnexpectedResult(_))
        ));
    }

    #[test]
    fn errors_map_to_upstream_storage() {
        let err: CoreError = CloudinaryError::UnexpectedResult("boom".to_string()).into();
        assert!(matches!(err, CoreError::UpstreamStorage(msg) if msg.contains("boom")));
    }
}
