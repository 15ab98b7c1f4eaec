//! Server configuration from environment variables (after loading `.env`).
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:3000` |
//! | `STORAGE` | `file` (`memory`, `file`, `postgres`) |
//! | `DATA_DIR` | `data` |
//! | `DATABASE_URL` | required when `STORAGE=postgres` |
//! | `RECORDS_SCHEMA` | `records` |

use crate::error::{ConfigError, StoreError};
use crate::store::{DocumentStore, JsonFileStore, MemoryStore, PgStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" | "json" => Ok(StorageBackend::File),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::Invalid {
                key: "STORAGE",
                message: format!("unknown backend '{}'", other),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub schema: String,
}

impl ServerConfig {
    /// Loads `.env` (if present) into the process environment, then reads the config.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "could not load .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".into())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?;
        let storage = match lookup("STORAGE") {
            Some(s) => s.parse()?,
            None => StorageBackend::File,
        };
        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(Self {
            bind_addr,
            storage,
            data_dir: lookup("DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            database_url,
            schema: lookup("RECORDS_SCHEMA").unwrap_or_else(|| crate::store::DEFAULT_SCHEMA.into()),
        })
    }

    /// Opens the configured storage backend.
    pub async fn open_store(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let store: Arc<dyn DocumentStore> = match self.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(JsonFileStore::open(&self.data_dir).await?),
            StorageBackend::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or_else(|| StoreError::InvalidUrl("DATABASE_URL not set".into()))?;
                Arc::new(PgStore::connect(url, &self.schema).await?)
            }
        };
        Ok(store)
    }
}
