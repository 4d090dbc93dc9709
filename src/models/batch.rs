use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::{BatchRef, User};
use crate::database::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Human facing code, unique across batches.
    pub batch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User ids
    #[serde(default)]
    pub students: Vec<String>,
}

impl Entity for Batch {
    const COLLECTION: &'static str = "batches";
    const LABEL: &'static str = "Batch";
    const UNIQUE_KEYS: &'static [&'static str] = &["batchId"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Batch {
    pub fn new(name: String, batch_id: String, description: Option<String>) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            name,
            batch_id,
            description,
            students: Vec::new(),
        }
    }

    pub fn has_student(&self, user_id: &str) -> bool {
        self.students.iter().any(|s| s == user_id)
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBatchRequest {
    #[validate(length(min = 1, message = "Batch name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Batch ID is required"))]
    pub batch_id: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBatchRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddStudentRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

/// Student as shown inside a batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl From<&User> for StudentRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            photo: user.profile.as_ref().and_then(|p| p.photo.clone()),
        }
    }
}

impl From<&Batch> for BatchRef {
    fn from(batch: &Batch) -> Self {
        Self { id: batch.id.clone(), name: batch.name.clone(), batch_id: batch.batch_id.clone() }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub batch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub students: Vec<StudentRef>,
}
