use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use super::user::{BatchRef, CourseRef};
use crate::database::Entity;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Batch,
    Course,
}

impl FromStr for TestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(TestType::Batch),
            "course" => Ok(TestType::Course),
            _ => Err(AppError::BadRequest("Invalid test type".to_string())),
        }
    }
}

impl TestType {
    pub fn describe(&self) -> &'static str {
        match self {
            TestType::Batch => "batch test",
            TestType::Course => "course test",
        }
    }
}

/// A student's score in one test.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    pub test_type: TestType,
    #[serde(with = "crate::utils::time")]
    pub date: DateTime<Utc>,
    pub marks: f64,
    pub total_marks: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for TestRecord {
    const COLLECTION: &'static str = "tests";
    const LABEL: &'static str = "Test record";

    fn id(&self) -> &str {
        &self.id
    }
}

impl TestRecord {
    pub fn new(request: CreateTestRequest, test_type: TestType) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            user_id: request.user_id,
            batch_id: request.batch_id,
            course_id: request.course_id,
            test_type,
            date: Utc::now(),
            marks: request.marks,
            total_marks: request.total_marks,
            description: request.description,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTestRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    pub batch_id: Option<String>,
    pub course_id: Option<String>,
    pub test_type: String,
    #[validate(range(min = 0.0, message = "marks cannot be negative"))]
    pub marks: f64,
    #[validate(range(exclusive_min = 0.0, message = "totalMarks must be greater than zero"))]
    pub total_marks: f64,
    pub description: Option<String>,
}

/// Test record with its batch and course resolved.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestRecordView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub batch_id: Option<BatchRef>,
    pub course_id: Option<CourseRef>,
    pub test_type: TestType,
    #[serde(with = "crate::utils::time")]
    pub date: DateTime<Utc>,
    pub marks: f64,
    pub total_marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
