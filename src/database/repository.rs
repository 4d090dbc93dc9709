use mongodb::bson::{self, Document};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DocumentStore, Filter, FindOptions, StoreError};
use crate::utils::error::{AppError, AppResult};

/// A document type persisted in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Human readable name used in error messages ("User not found").
    const LABEL: &'static str;
    /// Natural keys that must be unique across the collection.
    const UNIQUE_KEYS: &'static [&'static str] = &[];

    fn id(&self) -> &str;
}

/// Typed accessor over one collection.
pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _entity: PhantomData }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _entity: PhantomData }
    }

    /// Registers the entity's unique keys with the backend.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for key in T::UNIQUE_KEYS {
            self.store.ensure_unique(T::COLLECTION, key).await?;
        }
        Ok(())
    }

    fn encode(entity: &T) -> Result<Document, StoreError> {
        Ok(bson::to_document(entity)?)
    }

    fn decode(document: Document) -> Result<T, StoreError> {
        Ok(bson::from_document(document)?)
    }

    pub async fn create(&self, entity: &T) -> AppResult<()> {
        self.store.insert_one(T::COLLECTION, Self::encode(entity)?).await?;
        log::debug!("➕ {} created: {}", T::LABEL, entity.id());
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        self.find_one(&Filter::id(id)).await
    }

    /// Like `find_by_id` but absence is an error.
    pub async fn get(&self, id: &str) -> AppResult<T> {
        self.find_by_id(id).await?.ok_or_else(|| AppError::not_found(T::LABEL))
    }

    pub async fn find_one(&self, filter: &Filter) -> AppResult<Option<T>> {
        match self.store.find_one(T::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(Self::decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find(&self, filter: &Filter, options: &FindOptions) -> AppResult<Vec<T>> {
        let docs = self.store.find(T::COLLECTION, filter, options).await?;
        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            items.push(Self::decode(doc)?);
        }
        Ok(items)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find(&Filter::is_in("_id", ids.iter().map(String::as_str)), &FindOptions::default())
            .await
    }

    pub async fn count(&self, filter: &Filter) -> AppResult<u64> {
        Ok(self.store.count(T::COLLECTION, filter).await?)
    }

    /// Persists the whole document, replacing the stored version.
    pub async fn save(&self, entity: &T) -> AppResult<()> {
        let replaced = self
            .store
            .replace_one(T::COLLECTION, entity.id(), Self::encode(entity)?)
            .await?;
        if !replaced {
            return Err(AppError::not_found(T::LABEL));
        }
        Ok(())
    }

    /// Loads, mutates and saves a document. The closure may reject the change.
    pub async fn update<F>(&self, id: &str, mutate: F) -> AppResult<T>
    where
        F: FnOnce(&mut T) -> AppResult<()>,
    {
        let mut entity = self.get(id).await?;
        mutate(&mut entity)?;
        self.save(&entity).await?;
        Ok(entity)
    }

    pub async fn delete(&self, id: &str) -> AppResult<T> {
        self.delete_where(&Filter::id(id)).await?.ok_or_else(|| AppError::not_found(T::LABEL))
    }

    pub async fn delete_where(&self, filter: &Filter) -> AppResult<Option<T>> {
        match self.store.delete_one(T::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(Self::decode(doc)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Widget {
        #[serde(rename = "_id")]
        id: String,
        code: String,
        size: i32,
    }

    impl Entity for Widget {
        const COLLECTION: &'static str = "widgets";
        const LABEL: &'static str = "Widget";
        const UNIQUE_KEYS: &'static [&'static str] = &["code"];

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str, code: &str) -> Widget {
        Widget { id: id.into(), code: code.into(), size: 1 }
    }

    async fn repo() -> Repository<Widget> {
        let repo = Repository::<Widget>::new(Arc::new(InMemoryStore::new()));
        repo.ensure_indexes().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = repo().await;
        repo.create(&widget("a", "W-1")).await.unwrap();
        assert_eq!(repo.get("a").await.unwrap(), widget("a", "W-1"));
    }

    #[tokio::test]
    async fn duplicate_natural_key_is_reported() {
        let repo = repo().await;
        repo.create(&widget("a", "W-1")).await.unwrap();
        let err = repo.create(&widget("b", "W-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_applies_mutation_and_persists() {
        let repo = repo().await;
        repo.create(&widget("a", "W-1")).await.unwrap();
        let updated = repo
            .update("a", |w| {
                w.size = 5;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated.size, 5);
        assert_eq!(repo.get("a").await.unwrap().size, 5);
    }

    #[tokio::test]
    async fn rejected_mutation_is_not_saved() {
        let repo = repo().await;
        repo.create(&widget("a", "W-1")).await.unwrap();
        let result = repo
            .update("a", |w| {
                w.size = 9;
                Err(AppError::BadRequest("nope".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(repo.get("a").await.unwrap().size, 1);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = repo().await;
        assert!(matches!(repo.get("zzz").await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.delete("zzz").await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.save(&widget("zzz", "W-9")).await, Err(AppError::NotFound(_))));
    }
}
