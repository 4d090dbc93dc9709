//! Document store access.
//!
//! Handlers never talk to a driver directly: they go through a typed
//! [`Repository`] which sits on top of a [`DocumentStore`] backend. Two
//! backends exist, [`MongoDB`] for production and [`InMemoryStore`] for
//! development and tests. Both honour the same unique keys.

mod memory;
mod mongo;
mod repository;

pub use memory::InMemoryStore;
pub use mongo::MongoDB;
pub use repository::{Entity, Repository};

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field '{field}' in {collection}")]
    Duplicate { collection: String, field: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Query predicate understood by every backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equals value. Array fields match when any element equals.
    Eq(String, Bson),
    /// Field equals one of the values.
    In(String, Vec<Bson>),
    /// Case-insensitive literal substring match on a text field.
    Text(String, String),
    Or(Vec<Filter>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Bson>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn id(id: &str) -> Self {
        Filter::eq("_id", id)
    }

    pub fn is_in<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn text(field: &str, needle: &str) -> Self {
        Filter::Text(field.to_string(), needle.to_string())
    }

    /// Text match against any of `fields`.
    pub fn search(fields: &[&str], needle: &str) -> Self {
        Filter::Or(fields.iter().map(|f| Filter::text(f, needle)).collect())
    }

    /// Mongo query document equivalent of this filter.
    pub fn to_document(&self) -> Document {
        match self {
            Filter::All => Document::new(),
            Filter::Eq(field, value) => single(field, value.clone()),
            Filter::In(field, values) => single(field, doc! { "$in": values.clone() }),
            Filter::Text(field, needle) => single(
                field,
                doc! { "$regex": regex::escape(needle), "$options": "i" },
            ),
            Filter::Or(filters) if filters.is_empty() => doc! { "_id": { "$exists": false } },
            Filter::Or(filters) => doc! {
                "$or": filters.iter().map(|f| Bson::Document(f.to_document())).collect::<Vec<_>>()
            },
            Filter::And(filters) if filters.is_empty() => Document::new(),
            Filter::And(filters) => doc! {
                "$and": filters.iter().map(|f| Bson::Document(f.to_document())).collect::<Vec<_>>()
            },
        }
    }
}

fn single(field: &str, value: impl Into<Bson>) -> Document {
    let mut d = Document::new();
    d.insert(field, value.into());
    d
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn sorted(field: &str, order: SortOrder) -> Self {
        Self { sort: Some((field.to_string(), order)), limit: None }
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Raw document operations against named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Registers a unique key on `collection.field`.
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, filter: &Filter)
        -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Replaces the document with the given `_id`. Returns false when nothing matched.
    async fn replace_one(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<bool, StoreError>;

    /// Removes the first matching document and returns it.
    async fn delete_one(&self, collection: &str, filter: &Filter)
        -> Result<Option<Document>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_filter_escapes_regex_metacharacters() {
        let filter = Filter::text("name", "a.b+");
        let d = filter.to_document();
        let inner = d.get_document("name").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), "a\\.b\\+");
        assert_eq!(inner.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn or_filter_builds_dollar_or() {
        let filter = Filter::search(&["name", "email"], "amit");
        let d = filter.to_document();
        assert_eq!(d.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn in_filter_builds_dollar_in() {
        let d = Filter::is_in("batchId", vec!["a", "b"]).to_document();
        assert_eq!(d.get_document("batchId").unwrap().get_array("$in").unwrap().len(), 2);
    }
}
