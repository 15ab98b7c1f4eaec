//! Storage abstraction over the record collections, plus in-memory, JSON file and
//! PostgreSQL backends. Backends store plain JSON documents and own the `id` key.

mod file;
mod memory;
mod postgres;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use postgres::{ensure_collection_tables, ensure_database_exists, PgStore, DEFAULT_SCHEMA};

use crate::error::StoreError;
use crate::model::EntityKind;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A stored record: a JSON object of camelCase fields.
pub type Document = Map<String, Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of the collection, ordered by id.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError>;

    /// Stores `fields` under a freshly assigned id and returns the stored document.
    async fn insert(&self, kind: EntityKind, fields: Document) -> Result<Document, StoreError>;

    /// Replaces all fields of an existing document. `None` if the id is unknown.
    async fn replace(
        &self,
        kind: EntityKind,
        id: i64,
        fields: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Removes a document and returns it. `None` if the id is unknown.
    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError>;

    /// Cheap availability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Releases backend resources at shutdown.
    async fn close(&self) {}
}

/// Returns `fields` with `id` set. Any `id` already in `fields` is overwritten.
pub fn with_id(id: i64, mut fields: Document) -> Document {
    fields.insert("id".to_string(), Value::Number(id.into()));
    fields
}

/// One collection held in memory: documents keyed by id, without the `id` field.
#[derive(Clone, Debug, Default)]
pub(crate) struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Document>,
}

impl Table {
    /// Builds a table from persisted documents; each must carry an integer `id`.
    pub(crate) fn from_documents(kind: EntityKind, docs: Vec<Value>) -> Result<Self, StoreError> {
        let mut table = Table::default();
        for doc in docs {
            let mut fields = match doc {
                Value::Object(m) => m,
                other => {
                    return Err(StoreError::Corrupt {
                        collection: kind.collection(),
                        message: format!("expected object, found {}", other),
                    })
                }
            };
            let id = fields
                .remove("id")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| StoreError::Corrupt {
                    collection: kind.collection(),
                    message: "record without integer id".into(),
                })?;
            table.last_id = table.last_id.max(id);
            table.rows.insert(id, fields);
        }
        Ok(table)
    }

    pub(crate) fn to_documents(&self) -> Vec<Document> {
        self.rows
            .iter()
            .map(|(id, fields)| with_id(*id, fields.clone()))
            .collect()
    }

    pub(crate) fn get(&self, id: i64) -> Option<Document> {
        self.rows.get(&id).map(|fields| with_id(id, fields.clone()))
    }

    pub(crate) fn insert(&mut self, mut fields: Document) -> Document {
        fields.remove("id");
        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(id, fields.clone());
        with_id(id, fields)
    }

    pub(crate) fn replace(&mut self, id: i64, mut fields: Document) -> Option<Document> {
        let slot = self.rows.get_mut(&id)?;
        fields.remove("id");
        *slot = fields.clone();
        Some(with_id(id, fields))
    }

    pub(crate) fn delete(&mut self, id: i64) -> Option<Document> {
        self.rows.remove(&id).map(|fields| with_id(id, fields))
    }
}
