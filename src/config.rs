use std::env;

/// Runtime configuration read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Unset means the in-memory store is used.
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    pub upload_dir: String,
    pub public_upload_base: String,
    pub cloudinary: Option<CloudinaryConfig>,
    pub cors_origins: Vec<String>,
    pub seed_catalogs: bool,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match var(name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("⚠️  Ignoring invalid {}={}", name, raw);
            default
        }),
        None => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️  JWT_SECRET not set, using an insecure development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                Some(CloudinaryConfig { cloud_name, api_key, api_secret })
            }
            _ => None,
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 5000),
            database_url: var("DATABASE_URL"),
            database_name: var("DATABASE_NAME"),
            jwt_secret,
            jwt_expiry_hours: parsed("JWT_EXPIRY_HOURS", 24),
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST),
            upload_dir: var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            public_upload_base: var("PUBLIC_UPLOAD_BASE").unwrap_or_else(|| "/uploads".to_string()),
            cloudinary,
            cors_origins,
            seed_catalogs: parsed("SEED_CATALOGS", true),
        }
    }

    /// Settings for tests and local experiments: in-memory store, cheap hashing.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: None,
            database_name: None,
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            bcrypt_cost: 4,
            upload_dir: std::env::temp_dir().join("edu-admin-uploads").to_string_lossy().into_owned(),
            public_upload_base: "/uploads".to_string(),
            cloudinary: None,
            cors_origins: Vec::new(),
            seed_catalogs: false,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_uses_memory_store_and_low_cost() {
        let config = AppConfig::for_tests();
        assert!(config.database_url.is_none());
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.bind_address(), "127.0.0.1:0");
    }
}
