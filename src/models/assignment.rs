use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::{BatchRef, CourseRef};
use crate::database::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub user_id: String,
    #[serde(with = "crate::utils::time")]
    pub submission_date: DateTime<Utc>,
    #[serde(default)]
    pub submission_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Entity for Assignment {
    const COLLECTION: &'static str = "assignments";
    const LABEL: &'static str = "Assignment";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Assignment {
    pub fn new(
        title: String,
        description: Option<String>,
        deadline: DateTime<Utc>,
        batch_id: Option<String>,
        course_id: Option<String>,
    ) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            title,
            description,
            deadline,
            batch_id,
            course_id,
            submissions: Vec::new(),
        }
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    pub fn submission_of(&self, user_id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.user_id == user_id)
    }

    pub fn submission_of_mut(&mut self, user_id: &str) -> Option<&mut Submission> {
        self.submissions.iter_mut().find(|s| s.user_id == user_id)
    }

    /// Records a (re)submission. A resubmission without a file keeps the previous
    /// file; marks and feedback are always carried over.
    pub fn submit(&mut self, user_id: &str, file: Option<String>, now: DateTime<Utc>) {
        match self.submission_of_mut(user_id) {
            Some(existing) => {
                existing.submission_date = now;
                if file.is_some() {
                    existing.submission_file = file;
                }
            }
            None => self.submissions.push(Submission {
                user_id: user_id.to_string(),
                submission_date: now,
                submission_file: file,
                marks: None,
                feedback: None,
            }),
        }
    }

    pub fn status_for(&self, user_id: &str) -> SubmissionStatus {
        match self.submission_of(user_id) {
            Some(s) => SubmissionStatus { submitted: true, date: Some(s.submission_date), marks: s.marks },
            None => SubmissionStatus { submitted: false, date: None, marks: None },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionStatus {
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::utils::time::option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
}

/// Assignment as listed for a student.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub deadline: DateTime<Utc>,
    pub batch_id: Option<BatchRef>,
    pub course_id: Option<CourseRef>,
    pub submissions: Vec<Submission>,
    pub submission_status: SubmissionStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[validate(length(min = 1, message = "Deadline is required"))]
    pub deadline: String,
    pub batch_id: Option<String>,
    pub course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GradeSubmissionRequest {
    #[validate(range(min = 0.0, message = "marks cannot be negative"))]
    pub marks: Option<f64>,
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment() -> Assignment {
        Assignment::new("Essay".into(), None, Utc::now() + Duration::days(1), Some("b1".into()), None)
    }

    #[test]
    fn resubmission_keeps_file_marks_and_feedback() {
        let mut a = assignment();
        let first = Utc::now();
        a.submit("u1", Some("/uploads/essay.pdf".into()), first);
        {
            let s = a.submission_of_mut("u1").unwrap();
            s.marks = Some(8.0);
            s.feedback = Some("good".into());
        }

        let later = first + Duration::minutes(5);
        a.submit("u1", None, later);

        assert_eq!(a.submissions.len(), 1);
        let s = a.submission_of("u1").unwrap();
        assert_eq!(s.submission_file.as_deref(), Some("/uploads/essay.pdf"));
        assert_eq!(s.marks, Some(8.0));
        assert_eq!(s.feedback.as_deref(), Some("good"));
        assert_eq!(s.submission_date, later);
    }

    #[test]
    fn status_reflects_submission() {
        let mut a = assignment();
        assert!(!a.status_for("u1").submitted);
        a.submit("u1", None, Utc::now());
        assert!(a.status_for("u1").submitted);
        assert!(!a.status_for("u2").submitted);
    }

    #[test]
    fn deadline_check() {
        let a = assignment();
        assert!(!a.is_past_deadline(Utc::now()));
        assert!(a.is_past_deadline(Utc::now() + Duration::days(2)));
    }
}
