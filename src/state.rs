use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DocumentStore, Entity, InMemoryStore, MongoDB, Repository, StoreError};
use crate::models::{Batch, Course, User};
use crate::services::auth_service::JwtKeys;
use crate::storage::{CloudinaryStorage, FileStorage, LocalFileStorage, StorageError};
use crate::utils::error::AppResult;
use crate::utils::multipart::UploadedFile;

/// Shared handles given to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub files: Arc<dyn FileStorage>,
    pub jwt: JwtKeys,
    pub bcrypt_cost: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database: {0}")]
    Store(#[from] StoreError),

    #[error("file storage: {0}")]
    Storage(#[from] StorageError),
}

impl AppState {
    /// Connects the configured backends: MongoDB when `DATABASE_URL` is set,
    /// Cloudinary when its credentials are present.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => Arc::new(MongoDB::new(url, config.database_name.as_deref()).await?),
            None => {
                log::warn!("⚠️  DATABASE_URL not set, using the in-memory store (data is lost on restart)");
                Arc::new(InMemoryStore::new())
            }
        };

        let files: Arc<dyn FileStorage> = match &config.cloudinary {
            Some(c) => Arc::new(CloudinaryStorage::new(&c.cloud_name, &c.api_key, &c.api_secret)?),
            None => Arc::new(LocalFileStorage::new(&config.upload_dir, &config.public_upload_base)),
        };

        log::info!("🗄️  Store backend: {}", store.backend_name());
        log::info!("📦 File storage backend: {}", files.backend_name());

        Ok(Self::with_backends(store, files, config))
    }

    /// In-memory store and local uploads with the unique keys registered; used by tests.
    pub async fn in_memory(config: &AppConfig) -> Self {
        let state = Self::with_backends(
            Arc::new(InMemoryStore::new()),
            Arc::new(LocalFileStorage::new(&config.upload_dir, &config.public_upload_base)),
            config,
        );
        if let Err(e) = state.ensure_indexes().await {
            log::warn!("⚠️  Could not register unique keys: {}", e);
        }
        state
    }

    fn with_backends(store: Arc<dyn DocumentStore>, files: Arc<dyn FileStorage>, config: &AppConfig) -> Self {
        Self {
            store,
            files,
            jwt: JwtKeys::new(&config.jwt_secret, config.jwt_expiry_hours),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    /// Creates the unique indexes. Only these collections have natural keys.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.repo::<User>().ensure_indexes().await?;
        self.repo::<Batch>().ensure_indexes().await?;
        self.repo::<Course>().ensure_indexes().await?;
        Ok(())
    }

    /// Validates and persists an upload, returning its public reference.
    pub async fn upload(&self, folder: &str, file: &UploadedFile) -> AppResult<String> {
        Ok(self.files.store(folder, file).await?)
    }
}
