//! Standalone content collections served through the same CRUD surface:
//! notes, videos, resources, job listings, leaderboard, books and quiz tests.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::database::{Entity, SortOrder};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{blank_as_none, merge_text, merge_value, non_empty, required};

/// An entity exposed as a searchable catalog.
pub trait CatalogItem: Entity + Clone {
    /// Request body for both create and update; every field optional.
    type Input: DeserializeOwned + Validate + Send + 'static;

    /// Fields matched by `?query=`.
    const SEARCH_FIELDS: &'static [&'static str];
    const SORT: (&'static str, SortOrder);

    fn from_input(input: Self::Input) -> AppResult<Self>;

    fn apply(&mut self, input: Self::Input) -> AppResult<()>;
}

fn new_id() -> String {
    ObjectId::new().to_hex()
}

// ==================== NOTES ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct NoteInput {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "fileUrl must be a valid URL"))]
    #[serde(deserialize_with = "blank_as_none")]
    pub file_url: Option<String>,
}

impl Entity for Note {
    const COLLECTION: &'static str = "notes";
    const LABEL: &'static str = "Note";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for Note {
    type Input = NoteInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "subject", "description"];
    const SORT: (&'static str, SortOrder) = ("createdAt", SortOrder::Descending);

    fn from_input(input: NoteInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            title: required(input.title, "Title")?,
            subject: non_empty(input.subject),
            description: non_empty(input.description),
            file_url: non_empty(input.file_url),
            created_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: NoteInput) -> AppResult<()> {
        if let Some(title) = non_empty(input.title) {
            self.title = title;
        }
        merge_text(&mut self.subject, input.subject);
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.file_url, input.file_url);
        Ok(())
    }
}

// ==================== VIDEOS ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "url must be a valid URL"))]
    #[serde(deserialize_with = "blank_as_none")]
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub duration_minutes: Option<u32>,
}

impl Entity for Video {
    const COLLECTION: &'static str = "videos";
    const LABEL: &'static str = "Video";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for Video {
    type Input = VideoInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description"];
    const SORT: (&'static str, SortOrder) = ("createdAt", SortOrder::Descending);

    fn from_input(input: VideoInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            title: required(input.title, "Title")?,
            description: non_empty(input.description),
            url: required(input.url, "URL")?,
            thumbnail: non_empty(input.thumbnail),
            duration_minutes: input.duration_minutes,
            created_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: VideoInput) -> AppResult<()> {
        if let Some(title) = non_empty(input.title) {
            self.title = title;
        }
        if let Some(url) = non_empty(input.url) {
            self.url = url;
        }
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.thumbnail, input.thumbnail);
        merge_value(&mut self.duration_minutes, input.duration_minutes);
        Ok(())
    }
}

// ==================== RESOURCES ("sources") ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ResourceInput {
    pub name: Option<String>,
    #[validate(url(message = "url must be a valid URL"))]
    #[serde(deserialize_with = "blank_as_none")]
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl Entity for Resource {
    const COLLECTION: &'static str = "sources";
    const LABEL: &'static str = "Source";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for Resource {
    type Input = ResourceInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description", "category"];
    const SORT: (&'static str, SortOrder) = ("createdAt", SortOrder::Descending);

    fn from_input(input: ResourceInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            name: required(input.name, "Name")?,
            url: required(input.url, "URL")?,
            description: non_empty(input.description),
            category: non_empty(input.category),
            created_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: ResourceInput) -> AppResult<()> {
        if let Some(name) = non_empty(input.name) {
            self.name = name;
        }
        if let Some(url) = non_empty(input.url) {
            self.url = url;
        }
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.category, input.category);
        Ok(())
    }
}

// ==================== JOB LISTINGS ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub apply_link: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct JobListingInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    #[validate(url(message = "applyLink must be a valid URL"))]
    #[serde(deserialize_with = "blank_as_none")]
    pub apply_link: Option<String>,
}

impl Entity for JobListing {
    const COLLECTION: &'static str = "joblistings";
    const LABEL: &'static str = "Job listing";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for JobListing {
    type Input = JobListingInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "company", "location"];
    const SORT: (&'static str, SortOrder) = ("postedAt", SortOrder::Descending);

    fn from_input(input: JobListingInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            title: required(input.title, "Title")?,
            company: required(input.company, "Company")?,
            location: non_empty(input.location),
            description: non_empty(input.description),
            salary: non_empty(input.salary),
            apply_link: non_empty(input.apply_link),
            posted_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: JobListingInput) -> AppResult<()> {
        if let Some(title) = non_empty(input.title) {
            self.title = title;
        }
        if let Some(company) = non_empty(input.company) {
            self.company = company;
        }
        merge_text(&mut self.location, input.location);
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.salary, input.salary);
        merge_text(&mut self.apply_link, input.apply_link);
        Ok(())
    }
}

// ==================== LEADERBOARD ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub score: f64,
    #[serde(with = "crate::utils::time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaderboardInput {
    pub name: Option<String>,
    pub user_id: Option<String>,
    #[validate(range(min = 0.0, message = "score cannot be negative"))]
    pub score: Option<f64>,
}

impl Entity for LeaderboardEntry {
    const COLLECTION: &'static str = "leaderboard";
    const LABEL: &'static str = "Leaderboard entry";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for LeaderboardEntry {
    type Input = LeaderboardInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["name"];
    const SORT: (&'static str, SortOrder) = ("score", SortOrder::Descending);

    fn from_input(input: LeaderboardInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            name: required(input.name, "Name")?,
            user_id: non_empty(input.user_id),
            score: input
                .score
                .ok_or_else(|| AppError::BadRequest("Score is required".to_string()))?,
            updated_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: LeaderboardInput) -> AppResult<()> {
        if let Some(name) = non_empty(input.name) {
            self.name = name;
        }
        merge_text(&mut self.user_id, input.user_id);
        if let Some(score) = input.score {
            self.score = score;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ==================== BOOKS ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[validate(url(message = "fileUrl must be a valid URL"))]
    #[serde(deserialize_with = "blank_as_none")]
    pub file_url: Option<String>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";
    const LABEL: &'static str = "Book";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for Book {
    type Input = BookInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "author", "description"];
    const SORT: (&'static str, SortOrder) = ("createdAt", SortOrder::Descending);

    fn from_input(input: BookInput) -> AppResult<Self> {
        Ok(Self {
            id: new_id(),
            title: required(input.title, "Title")?,
            author: non_empty(input.author),
            description: non_empty(input.description),
            cover_image: non_empty(input.cover_image),
            file_url: non_empty(input.file_url),
            created_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: BookInput) -> AppResult<()> {
        if let Some(title) = non_empty(input.title) {
            self.title = title;
        }
        merge_text(&mut self.author, input.author);
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.cover_image, input.cover_image);
        merge_text(&mut self.file_url, input.file_url);
        Ok(())
    }
}

// ==================== QUIZ TESTS ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_option: usize,
    #[serde(default = "default_marks")]
    pub marks: f64,
}

fn default_marks() -> f64 {
    1.0
}

impl QuizQuestion {
    fn check(&self, index: usize) -> AppResult<()> {
        if self.question.trim().is_empty() {
            return Err(AppError::BadRequest(format!("Question {} has no text", index + 1)));
        }
        if self.options.len() < 2 {
            return Err(AppError::BadRequest(format!(
                "Question {} needs at least two options",
                index + 1
            )));
        }
        if self.correct_option >= self.options.len() {
            return Err(AppError::BadRequest(format!(
                "Question {} has an out of range correctOption",
                index + 1
            )));
        }
        Ok(())
    }
}

fn check_questions(questions: &[QuizQuestion]) -> AppResult<()> {
    questions.iter().enumerate().try_for_each(|(i, q)| q.check(i))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizTest {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(with = "crate::utils::time")]
    pub created_at: DateTime<Utc>,
}

impl QuizTest {
    pub fn total_marks(&self) -> f64 {
        self.questions.iter().map(|q| q.marks).sum()
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizTestInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    #[validate(range(min = 1, message = "durationMinutes must be at least 1"))]
    pub duration_minutes: Option<u32>,
    pub questions: Option<Vec<QuizQuestion>>,
}

impl Entity for QuizTest {
    const COLLECTION: &'static str = "quiztests";
    const LABEL: &'static str = "Quiz test";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CatalogItem for QuizTest {
    type Input = QuizTestInput;
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "subject", "description"];
    const SORT: (&'static str, SortOrder) = ("createdAt", SortOrder::Descending);

    fn from_input(input: QuizTestInput) -> AppResult<Self> {
        let questions = input.questions.unwrap_or_default();
        check_questions(&questions)?;
        Ok(Self {
            id: new_id(),
            title: required(input.title, "Title")?,
            description: non_empty(input.description),
            subject: non_empty(input.subject),
            duration_minutes: input.duration_minutes,
            questions,
            created_at: Utc::now(),
        })
    }

    fn apply(&mut self, input: QuizTestInput) -> AppResult<()> {
        if let Some(title) = non_empty(input.title) {
            self.title = title;
        }
        merge_text(&mut self.description, input.description);
        merge_text(&mut self.subject, input.subject);
        merge_value(&mut self.duration_minutes, input.duration_minutes);
        if let Some(questions) = input.questions {
            check_questions(&questions)?;
            self.questions = questions;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_are_enforced() {
        let err = Video::from_input(VideoInput { title: Some("Intro".into()), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.to_string(), "URL is required");
    }

    #[test]
    fn apply_merges_without_clearing() {
        let mut book = Book::from_input(BookInput {
            title: Some("Algebra".into()),
            author: Some("R. Sharma".into()),
            ..Default::default()
        })
        .unwrap();
        book.apply(BookInput { title: Some(" ".into()), description: Some("Class 10".into()), ..Default::default() })
            .unwrap();
        assert_eq!(book.title, "Algebra");
        assert_eq!(book.author.as_deref(), Some("R. Sharma"));
        assert_eq!(book.description.as_deref(), Some("Class 10"));
    }

    #[test]
    fn quiz_questions_are_checked() {
        let input = QuizTestInput {
            title: Some("Physics 1".into()),
            questions: Some(vec![QuizQuestion {
                question: "g on earth?".into(),
                options: vec!["9.8".into(), "1.6".into()],
                correct_option: 2,
                marks: 2.0,
            }]),
            ..Default::default()
        };
        assert!(matches!(QuizTest::from_input(input), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn quiz_total_marks_sums_questions() {
        let quiz = QuizTest::from_input(QuizTestInput {
            title: Some("Math".into()),
            questions: Some(vec![
                QuizQuestion { question: "1+1".into(), options: vec!["2".into(), "3".into()], correct_option: 0, marks: 2.0 },
                QuizQuestion { question: "2+2".into(), options: vec!["4".into(), "5".into()], correct_option: 0, marks: 3.0 },
            ]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(quiz.total_marks(), 5.0);
    }

    #[test]
    fn leaderboard_requires_score() {
        let err = LeaderboardEntry::from_input(LeaderboardInput { name: Some("Riya".into()), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.to_string(), "Score is required");
    }

    #[test]
    fn blank_urls_count_as_absent() {
        let input: BookInput = serde_json::from_value(serde_json::json!({ "fileUrl": "" })).unwrap();
        assert!(input.file_url.is_none());
        assert!(input.validate().is_ok());

        let input: JobListingInput =
            serde_json::from_value(serde_json::json!({ "applyLink": "not a link" })).unwrap();
        assert!(input.validate().is_err());
    }
}
