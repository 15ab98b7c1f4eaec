//! School records: teachers, courses, students and tests behind a REST API,
//! with referential integrity enforced over a pluggable document store.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{ServerConfig, StorageBackend};
pub use error::{AppError, ConfigError, RecordsError, StoreError};
pub use model::{Course, Entity, EntityKind, Student, Teacher, Test};
pub use routes::{app, common_routes_with_ready, records_routes};
pub use service::RecordsStore;
pub use state::AppState;
pub use store::{DocumentStore, JsonFileStore, MemoryStore, PgStore};
