use actix_web::{error::JsonPayloadError, web, HttpRequest};
use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::error::{AppError, AppResult};

/// Runs the `validator` rules of a request body.
pub fn validate<T: Validate>(body: &T) -> AppResult<()> {
    body.validate().map_err(AppError::from)
}

/// Document ids are ObjectId hex strings; anything else is rejected before hitting the store.
pub fn parse_id(raw: &str, entity: &str) -> AppResult<String> {
    ObjectId::parse_str(raw)
        .map(|oid| oid.to_hex())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity.to_lowercase())))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn parse_date(raw: &str, field: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a valid date", field)))
}

/// Empty strings count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Serde hook for optional fields whose checks must not see blank strings.
pub fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(non_empty)
}

pub fn required(value: Option<String>, label: &str) -> AppResult<String> {
    non_empty(value).ok_or_else(|| AppError::BadRequest(format!("{} is required", label)))
}

/// Overwrites `target` only when the patch carries a non-empty value.
pub fn merge_text(target: &mut Option<String>, patch: Option<String>) {
    if let Some(value) = non_empty(patch) {
        *target = Some(value);
    }
}

pub fn merge_value<T>(target: &mut Option<T>, patch: Option<T>) {
    if let Some(value) = patch {
        *target = Some(value);
    }
}

/// JSON extractor config that reports body errors through `AppError`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let message = match &err {
                JsonPayloadError::ContentType => {
                    "Missing 'Content-Type: application/json' header".to_string()
                }
                JsonPayloadError::Deserialize(e) if e.is_data() => {
                    format!("Invalid request body: {}", e)
                }
                _ => "Invalid request body".to_string(),
            };
            AppError::BadRequest(message).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_object_ids_only() {
        let oid = ObjectId::new().to_hex();
        assert_eq!(parse_id(&oid, "User").unwrap(), oid);
        assert!(matches!(parse_id("not-an-id", "User"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn parse_date_supports_both_formats() {
        let d = parse_date("2001-04-12", "dob").unwrap();
        assert_eq!(d.to_rfc3339(), "2001-04-12T00:00:00+00:00");
        let t = parse_date("2024-01-01T10:30:00Z", "deadline").unwrap();
        assert_eq!(t.timestamp(), 1704105000);
        assert!(parse_date("yesterday", "dob").is_err());
    }

    #[test]
    fn merge_text_skips_empty_values() {
        let mut field = Some("kept".to_string());
        merge_text(&mut field, Some("   ".into()));
        assert_eq!(field.as_deref(), Some("kept"));
        merge_text(&mut field, None);
        assert_eq!(field.as_deref(), Some("kept"));
        merge_text(&mut field, Some("new".into()));
        assert_eq!(field.as_deref(), Some("new"));
    }
}
