use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{check_upload, FileStorage, StorageError};
use crate::utils::multipart::UploadedFile;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const UPLOAD_FOLDER: &str = "user-uploads";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Signed uploads to a Cloudinary account. Everything lands in `user-uploads`.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(Self {
            client,
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", CLOUDINARY_API_BASE, self.cloud_name)
    }
}

/// Signature over the alphabetically sorted parameters followed by the secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
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
    hex::encode(hasher.finalize())
}

#[async_trait]
impl FileStorage for CloudinaryStorage {
    async fn store(&self, folder: &str, file: &UploadedFile) -> Result<String, StorageError> {
        let ext = check_upload(file)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)], &self.api_secret);

        let mime = file.content_type.clone().unwrap_or_else(|| match ext {
            "pdf" => "application/pdf".to_string(),
            "png" => "image/png".to_string(),
            _ => "image/jpeg".to_string(),
        });
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&mime)
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        log::info!("☁️  Uploading {} ({} bytes) for {}", file.file_name, file.bytes.len(), folder);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upload(format!("request failed: {}", e)))?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Upload(format!("invalid response: {}", e)))?;

        if !status.is_success() {
            let reason = body.error.map(|e| e.message).unwrap_or_else(|| status.to_string());
            log::error!("❌ Cloudinary rejected upload: {}", reason);
            return Err(StorageError::Upload(reason));
        }

        body.secure_url
            .ok_or_else(|| StorageError::Upload("response had no secure_url".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_parameters_before_hashing() {
        let a = sign(&[("timestamp", "1700000000"), ("folder", "user-uploads")], "secret");
        let b = sign(&[("folder", "user-uploads"), ("timestamp", "1700000000")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut hasher = Sha256::new();
        hasher.update(b"folder=user-uploads&timestamp=1700000000secret");
        assert_eq!(a, hex::encode(hasher.finalize()));
    }

    #[test]
    fn upload_url_targets_the_cloud() {
        let storage = CloudinaryStorage::new("demo", "key", "secret").unwrap();
        assert_eq!(storage.upload_url(), "https://api.cloudinary.com/v1_1/demo/auto/upload");
    }
}
