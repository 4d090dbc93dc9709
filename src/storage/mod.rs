//! Binary file storage for uploaded documents and images.
//!
//! Handlers only deal with [`FileStorage`]; the backend is chosen at startup
//! from configuration. Every backend returns a public reference (URL or path)
//! that gets recorded on the owning document.

mod cloudinary;
mod local;

pub use cloudinary::CloudinaryStorage;
pub use local::LocalFileStorage;

use async_trait::async_trait;
use thiserror::Error;

use crate::utils::multipart::{UploadedFile, MAX_FILE_BYTES};

pub const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File type '{0}' is not allowed. Allowed formats: jpg, jpeg, png, pdf")]
    InvalidFileType(String),

    #[error("File exceeds maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persists `file` under `folder` and returns its public reference.
    async fn store(&self, folder: &str, file: &UploadedFile) -> Result<String, StorageError>;

    fn backend_name(&self) -> &'static str;
}

/// Resolves the file extension from the name, falling back to the content type.
pub fn detect_format(file: &UploadedFile) -> Result<&'static str, StorageError> {
    let from_name = file
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    let from_type = file.content_type.as_deref().and_then(|ct| match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "application/pdf" => Some("pdf"),
        _ => None,
    });

    if let Some(ext) = from_name.as_deref() {
        if let Some(allowed) = ALLOWED_FORMATS.iter().find(|a| **a == ext) {
            return Ok(allowed);
        }
    }
    if let Some(ext) = from_type {
        return Ok(ext);
    }

    let received = from_name
        .or_else(|| file.content_type.clone())
        .unwrap_or_else(|| "unknown".to_string());
    Err(StorageError::InvalidFileType(received))
}

/// Size and format checks shared by every backend.
pub fn check_upload(file: &UploadedFile) -> Result<&'static str, StorageError> {
    if file.bytes.len() > MAX_FILE_BYTES {
        return Err(StorageError::FileTooLarge { max_bytes: MAX_FILE_BYTES });
    }
    detect_format(file)
}

#[cfg(test)]
pub(crate) fn sample_file(name: &str, content_type: Option<&str>, bytes: &[u8]) -> UploadedFile {
    UploadedFile {
        field: "file".to_string(),
        file_name: name.to_string(),
        content_type: content_type.map(str::to_string),
        bytes: bytes.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_taken_from_extension_case_insensitively() {
        let file = sample_file("Scan.PDF", None, b"%PDF");
        assert_eq!(detect_format(&file).unwrap(), "pdf");
    }

    #[test]
    fn content_type_is_the_fallback() {
        let file = sample_file("blob", Some("image/png"), b"png");
        assert_eq!(detect_format(&file).unwrap(), "png");
    }

    #[test]
    fn other_formats_are_rejected() {
        let file = sample_file("run.exe", Some("application/octet-stream"), b"MZ");
        assert!(matches!(detect_format(&file), Err(StorageError::InvalidFileType(ref t)) if t == "exe"));
    }

    #[test]
    fn oversized_files_are_rejected() {
        let file = sample_file("big.png", None, &vec![0u8; MAX_FILE_BYTES + 1]);
        assert!(matches!(check_upload(&file), Err(StorageError::FileTooLarge { .. })));
    }
}
