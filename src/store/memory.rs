//! Volatile backend: every collection lives in a map guarded by an async lock.

use super::{Document, DocumentStore, Table};
use crate::error::StoreError;
use crate::model::EntityKind;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityKind, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).map(Table::to_documents).unwrap_or_default())
    }

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).and_then(|t| t.get(id)))
    }

    async fn insert(&self, kind: EntityKind, fields: Document) -> Result<Document, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.entry(kind).or_default().insert(fields))
    }

    async fn replace(
        &self,
        kind: EntityKind,
        id: i64,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.get_mut(&kind).and_then(|t| t.replace(id, fields)))
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.get_mut(&kind).and_then(|t| t.delete(id)))
    }
}
