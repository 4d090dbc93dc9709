use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use super::{check_upload, FileStorage, StorageError};
use crate::utils::multipart::UploadedFile;

/// Writes uploads under a directory served at `base_url`.
#[derive(Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }
}

/// Keeps folder names to a single safe path segment.
fn sanitize_folder(folder: &str) -> String {
    let cleaned: String = folder
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "misc".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, folder: &str, file: &UploadedFile) -> Result<String, StorageError> {
        let ext = check_upload(file)?;
        let folder = sanitize_folder(folder);
        let name = format!("{}.{}", uuid::Uuid::new_v4(), ext);

        let dir = self.base_dir.join(&folder);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&name), &file.bytes).await?;

        log::info!("📁 Stored {} ({} bytes) in {}/", name, file.bytes.len(), folder);
        Ok(format!("{}/{}/{}", self.base_url, folder, name))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sample_file;

    #[tokio::test]
    async fn stores_bytes_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/uploads/");

        let file = sample_file("photo.JPG", Some("image/jpeg"), b"\xff\xd8\xff");
        let reference = storage.store("profile-photos", &file).await.unwrap();

        assert!(reference.starts_with("/uploads/profile-photos/"));
        assert!(reference.ends_with(".jpg"));

        let name = reference.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join("profile-photos").join(name)).unwrap();
        assert_eq!(written, b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn folder_cannot_escape_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/uploads");

        let file = sample_file("a.png", None, b"png");
        let reference = storage.store("../../etc", &file).await.unwrap();
        assert!(reference.starts_with("/uploads/etc/"));
        assert!(dir.path().join("etc").is_dir());
    }

    #[tokio::test]
    async fn rejected_files_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/uploads");

        let file = sample_file("notes.txt", Some("text/plain"), b"hello");
        assert!(storage.store("docs", &file).await.is_err());
        assert!(!dir.path().join("docs").exists());
    }
}
