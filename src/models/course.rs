use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::CourseRef;
use crate::database::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Entity for Course {
    const COLLECTION: &'static str = "courses";
    const LABEL: &'static str = "Course";
    const UNIQUE_KEYS: &'static [&'static str] = &["courseId"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Course {
    pub fn new(name: String, course_id: String, description: Option<String>, image: Option<String>) -> Self {
        Self { id: ObjectId::new().to_hex(), name, course_id, description, image }
    }
}

impl From<&Course> for CourseRef {
    fn from(course: &Course) -> Self {
        Self { id: course.id.clone(), name: course.name.clone(), course_id: course.course_id.clone() }
    }
}

/// A unit of content inside a course.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// `_id` of the owning course
    pub course_id: String,
}

impl Entity for CourseItem {
    const COLLECTION: &'static str = "courseitems";
    const LABEL: &'static str = "Course item";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CourseItem {
    pub fn new(course_id: &str, name: String, description: Option<String>, image: Option<String>) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            name,
            description,
            image,
            course_id: course_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub course: Course,
    pub course_items: Vec<CourseItem>,
}
