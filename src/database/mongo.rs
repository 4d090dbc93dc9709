use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use super::{DocumentStore, Filter, FindOptions, SortOrder, StoreError};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, database_name: Option<&str>) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(uri).await.map_err(backend)?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("edu-admin-service".to_string());

        // Explicit name wins, then the URI path, then the driver default
        let db_name = database_name
            .map(str::to_string)
            .or_else(|| client_options.default_database.clone())
            .unwrap_or_else(|| "test".to_string());

        let client = Client::with_options(client_options).map_err(backend)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await.map_err(backend)?;
        log::info!("✅ MongoDB connected (database: {})", db_name);

        Ok(Self { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

fn backend(e: mongodb::error::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Maps E11000 to `Duplicate`, naming the field from the driver message when possible.
fn write_error(collection: &str, e: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(ref we)) = *e.kind {
        if we.code == DUPLICATE_KEY {
            let field = duplicate_field(&we.message).unwrap_or_else(|| "key".to_string());
            return StoreError::Duplicate { collection: collection.to_string(), field };
        }
    }
    backend(e)
}

// "E11000 duplicate key error collection: db.users index: email_1 dup key: { email: ... }"
fn duplicate_field(message: &str) -> Option<String> {
    let index = message.split("index: ").nth(1)?.split_whitespace().next()?;
    index.rsplit_once('_').map(|(field, _)| field.to_string())
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut keys = Document::new();
        keys.insert(field, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match self.collection(collection).create_index(index).await {
            Ok(_) => log::info!("   ✅ Unique index ready: {}({})", collection, field),
            Err(e) => {
                log::warn!("   ⚠️  Could not create unique index {}({}): {}", collection, field, e);
                return Err(backend(e));
            }
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collection(collection)
            .insert_one(document)
            .await
            .map(|_| ())
            .map_err(|e| write_error(collection, e))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one(filter.to_document())
            .await
            .map_err(backend)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter.to_document());
        if let Some((field, order)) = &options.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            let mut sort = Document::new();
            sort.insert(field.as_str(), direction);
            action = action.sort(sort);
        }
        if let Some(limit) = options.limit {
            action = action.limit(limit);
        }

        let cursor = action.await.map_err(backend)?;
        cursor.try_collect().await.map_err(backend)
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<bool, StoreError> {
        let result = self
            .collection(collection)
            .replace_one(doc! { "_id": id }, document)
            .await
            .map_err(|e| write_error(collection, e))?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one_and_delete(filter.to_document())
            .await
            .map_err(backend)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.collection(collection)
            .count_documents(filter.to_document())
            .await
            .map_err(backend)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await.map(|_| ()).map_err(backend)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_is_read_from_index_name() {
        let msg = "E11000 duplicate key error collection: edu.users index: email_1 dup key: { email: \"a@b.c\" }";
        assert_eq!(duplicate_field(msg).as_deref(), Some("email"));

        let msg = "E11000 duplicate key error collection: edu.batches index: batchId_1 dup key: { batchId: \"B1\" }";
        assert_eq!(duplicate_field(msg).as_deref(), Some("batchId"));

        assert_eq!(duplicate_field("something else"), None);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/edu_admin_test".to_string());
        let db = MongoDB::new(&uri, None).await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await.is_ok());
    }
}
