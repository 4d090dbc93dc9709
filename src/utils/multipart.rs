use actix_multipart::Multipart;
use futures::TryStreamExt;
use std::collections::HashMap;

use super::error::{AppError, AppResult};

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// A file field read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and file fields of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

/// Drains the payload. Only the first file per field name is kept.
pub async fn read_form(mut payload: Multipart) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = match field.name() {
            Some(n) => n.to_string(),
            None => continue,
        };
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let limit = if file_name.is_some() { MAX_FILE_BYTES } else { MAX_TEXT_BYTES };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::BadRequest(format!(
                    "Field '{}' exceeds the maximum size of {} bytes",
                    name, limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) => {
                // empty file inputs are sent by browsers when nothing is picked
                if bytes.is_empty() || form.files.contains_key(&name) {
                    continue;
                }
                form.files.insert(
                    name.clone(),
                    UploadedFile { field: name, file_name, content_type, bytes },
                );
            }
            None => {
                let value = String::from_utf8(bytes).map_err(|_| {
                    AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::PayloadError;
    use actix_web::http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use actix_web::web::Bytes;

    const BOUNDARY: &str = "edu-admin-boundary";

    /// (field name, file name, content)
    fn encode(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn parse(parts: &[(&str, Option<&str>, &[u8])]) -> AppResult<MultipartForm> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
        );
        let body = Bytes::from(encode(parts));
        let stream = futures::stream::iter(vec![Ok::<Bytes, PayloadError>(body)]);
        read_form(Multipart::new(&headers, stream)).await
    }

    #[actix_web::test]
    async fn reads_text_and_file_fields() {
        let form = parse(&[("name", None, b"  Physics  "), ("image", Some("cover.png"), b"\x89PNG")])
            .await
            .unwrap();
        assert_eq!(form.text("name").as_deref(), Some("Physics"));
        let file = form.file("image").unwrap();
        assert_eq!(file.file_name, "cover.png");
        assert_eq!(file.bytes, b"\x89PNG");
    }

    #[actix_web::test]
    async fn empty_file_inputs_are_skipped() {
        let form = parse(&[("photo", Some("blank.png"), b"")]).await.unwrap();
        assert!(form.file("photo").is_none());
    }

    #[actix_web::test]
    async fn oversize_fields_are_rejected() {
        let big_file = vec![0u8; MAX_FILE_BYTES + 1];
        let err = parse(&[("photo", Some("huge.png"), &big_file)]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("exceeds the maximum size")));

        let big_text = vec![b'a'; MAX_TEXT_BYTES + 1];
        let err = parse(&[("about", None, &big_text)]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn text_fields_must_be_utf8() {
        let err = parse(&[("name", None, &[0xff, 0xfe])]).await.unwrap_err();
        assert_eq!(err.to_string(), "Field 'name' is not valid UTF-8");
    }
}
