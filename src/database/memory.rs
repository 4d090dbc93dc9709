use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentStore, Filter, FindOptions, SortOrder, StoreError};

#[derive(Default)]
struct Collections {
    documents: HashMap<String, Vec<Document>>,
    unique: HashMap<String, Vec<String>>,
}

/// Process-local store. Documents live in insertion order per collection.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves a dotted path such as `profile.photo`.
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(d) => d.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn field_equals(field: Option<&Bson>, expected: &Bson) -> bool {
    match field {
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
        None => matches!(expected, Bson::Null),
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq(field, expected) => field_equals(lookup(document, field), expected),
        Filter::In(field, candidates) => {
            let value = lookup(document, field);
            candidates.iter().any(|c| field_equals(value, c))
        }
        Filter::Text(field, needle) => {
            let pattern = match RegexBuilder::new(&regex::escape(needle))
                .case_insensitive(true)
                .build()
            {
                Ok(p) => p,
                Err(_) => return false,
            };
            match lookup(document, field) {
                Some(Bson::String(s)) => pattern.is_match(s),
                _ => false,
            }
        }
        Filter::Or(filters) => filters.iter().any(|f| matches(document, f)),
        Filter::And(filters) => filters.iter().all(|f| matches(document, f)),
    }
}

/// Missing values sort first, like Mongo's null ordering.
fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => match (x, y) {
                (Bson::String(l), Bson::String(r)) => l.cmp(r),
                (Bson::Boolean(l), Bson::Boolean(r)) => l.cmp(r),
                (Bson::DateTime(l), Bson::DateTime(r)) => l.cmp(r),
                _ => Ordering::Equal,
            },
        },
    }
}

fn violated_unique(
    existing: &[Document],
    keys: &[String],
    candidate: &Document,
    skip_id: Option<&Bson>,
) -> Option<String> {
    keys.iter()
        .find(|key| {
            let value = match candidate.get(key.as_str()) {
                Some(Bson::Null) | None => return false,
                Some(v) => v,
            };
            existing.iter().any(|doc| {
                if skip_id.is_some() && doc.get("_id") == skip_id {
                    return false;
                }
                doc.get(key.as_str()).map(|v| values_equal(v, value)).unwrap_or(false)
            })
        })
        .cloned()
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let keys = inner.unique.entry(collection.to_string()).or_default();
        if !keys.iter().any(|k| k == field) {
            keys.push(field.to_string());
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let mut keys = inner.unique.get(collection).cloned().unwrap_or_default();
        keys.push("_id".to_string());

        let docs = inner.documents.entry(collection.to_string()).or_default();
        if let Some(field) = violated_unique(docs, &keys, &document, None) {
            return Err(StoreError::Duplicate { collection: collection.to_string(), field });
        }
        docs.push(document);
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<Document> = inner
            .documents
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default();

        if let Some((field, order)) = &options.sort {
            // stable sort keeps insertion order for ties
            found.sort_by(|a, b| {
                let ord = compare(lookup(a, field), lookup(b, field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<bool, StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let keys = inner.unique.get(collection).cloned().unwrap_or_default();
        let Some(docs) = inner.documents.get_mut(collection) else {
            return Ok(false);
        };

        let id_value = Bson::String(id.to_string());
        let Some(position) = docs.iter().position(|d| d.get("_id") == Some(&id_value)) else {
            return Ok(false);
        };
        if let Some(field) = violated_unique(docs, &keys, &document, Some(&id_value)) {
            return Err(StoreError::Duplicate { collection: collection.to_string(), field });
        }

        document.insert("_id", id_value);
        docs[position] = document;
        Ok(true)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(docs) = inner.documents.get_mut(collection) else {
            return Ok(None);
        };
        let position = docs.iter().position(|d| matches(d, filter));
        Ok(position.map(|i| docs.remove(i)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.ensure_unique("users", "email").await.unwrap();
        store
            .insert_one("users", doc! { "_id": "1", "name": "Amit Kumar", "email": "amit@x.io", "courses": ["c1", "c2"], "score": 10 })
            .await
            .unwrap();
        store
            .insert_one("users", doc! { "_id": "2", "name": "Riya", "email": "riya@x.io", "courses": ["c2"], "score": 30.5 })
            .await
            .unwrap();
        store
            .insert_one("users", doc! { "_id": "3", "name": "Sam", "email": "sam@x.io", "courses": [], "score": 20 })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn unique_key_rejects_second_insert() {
        let store = seeded().await;
        let err = store
            .insert_one("users", doc! { "_id": "4", "email": "amit@x.io" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_without_registration() {
        let store = seeded().await;
        let err = store.insert_one("users", doc! { "_id": "1" }).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field, .. } if field == "_id"));
    }

    #[tokio::test]
    async fn eq_matches_array_elements() {
        let store = seeded().await;
        let found = store
            .find("users", &Filter::eq("courses", "c2"), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn text_search_is_case_insensitive_and_literal() {
        let store = seeded().await;
        let found = store
            .find("users", &Filter::search(&["name", "email"], "AMIT"), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = store
            .find("users", &Filter::text("name", ".*"), &FindOptions::default())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn sort_mixes_int_and_double_numerically() {
        let store = seeded().await;
        let found = store
            .find("users", &Filter::All, &FindOptions::sorted("score", SortOrder::Descending).limit(2))
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn replace_keeps_unique_constraint() {
        let store = seeded().await;
        let err = store
            .replace_one("users", "2", doc! { "name": "Riya", "email": "amit@x.io" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // same email on the same document is fine
        assert!(store
            .replace_one("users", "2", doc! { "name": "Riya S", "email": "riya@x.io" })
            .await
            .unwrap());
        assert!(!store.replace_one("users", "nope", doc! {}).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_removed_document() {
        let store = seeded().await;
        let removed = store.delete_one("users", &Filter::id("3")).await.unwrap();
        assert_eq!(removed.unwrap().get_str("name").unwrap(), "Sam");
        assert!(store.delete_one("users", &Filter::id("3")).await.unwrap().is_none());
        assert_eq!(store.count("users", &Filter::All).await.unwrap(), 2);
    }
}
