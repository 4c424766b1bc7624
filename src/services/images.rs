use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::ImageStoreConfig;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host rejected upload: {0}")]
    Rejected(String),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// An image ready to be handed to the image host.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Stores an image and returns the public URL it is served from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError>;
}

pub fn image_store_from_config(config: &ImageStoreConfig) -> Arc<dyn ImageStore> {
    match config {
        ImageStoreConfig::Cloudinary {
            cloud_name,
            api_key,
            api_secret,
            folder,
        } => Arc::new(CloudinaryStore::new(
            cloud_name.clone(),
            api_key.clone(),
            api_secret.clone(),
            folder.clone(),
        )),
        ImageStoreConfig::Local {
            upload_dir,
            public_base_url,
        } => Arc::new(LocalImageStore::new(upload_dir.clone(), public_base_url.clone())),
    }
}

/// Signed uploads to the Cloudinary REST API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: Option<String>,
    error: Option<CloudinaryErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String, folder: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
            folder,
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name)
    }
}

/// Hex sha256 over the alphabetically sorted `key=value` parameters
/// followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        let body: CloudinaryResponse = response.json().await?;

        match (body.secure_url, body.error) {
            (Some(url), _) if status.is_success() => Ok(url),
            (_, Some(err)) => Err(ImageStoreError::Rejected(err.message)),
            _ => Err(ImageStoreError::Rejected(format!("unexpected status {}", status))),
        }
    }
}

/// Writes images under a local directory that the router serves at `/uploads`.
pub struct LocalImageStore {
    upload_dir: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(upload_dir: PathBuf, public_base_url: String) -> Self {
        Self {
            upload_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let name = stored_file_name(&image.file_name, Utc::now().timestamp_millis());
        tokio::fs::write(self.upload_dir.join(&name), &image.bytes).await?;
        tracing::debug!(file = %name, "stored image locally");
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}

/// `{millis}-{name}` with anything outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn stored_file_name(original: &str, millis: i64) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let mut clean: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    if clean.trim_matches('.').is_empty() {
        clean = "upload".to_string();
    }
    format!("{}-{}", millis, clean)
}
