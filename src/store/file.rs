//! Flat-file backend: one pretty-printed JSON array per collection, rewritten in full
//! on every mutation. Writes go to a sibling temp file which is then renamed over
//! the collection file.

use super::{Document, DocumentStore, Table};
use crate::error::StoreError;
use crate::model::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct JsonFileStore {
    dir: PathBuf,
    tables: RwLock<HashMap<EntityKind, Table>>,
}

impl JsonFileStore {
    /// Opens (creating if needed) the data directory and loads every collection file.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let mut tables = HashMap::new();
        for kind in EntityKind::ALL {
            let table = load_table(&collection_path(&dir, kind), kind).await?;
            tracing::debug!(collection = kind.collection(), "loaded collection file");
            tables.insert(kind, table);
        }
        tracing::info!(dir = %dir.display(), "json file store opened");
        Ok(Self {
            dir,
            tables: RwLock::new(tables),
        })
    }

    /// Applies `change` to a copy of the collection, persists the copy, then swaps it in.
    /// A failed write leaves the in-memory collection untouched.
    async fn mutate<T>(
        &self,
        kind: EntityKind,
        change: impl FnOnce(&mut Table) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        let mut tables = self.tables.write().await;
        let mut next = tables.get(&kind).cloned().unwrap_or_default();
        let Some(out) = change(&mut next) else {
            return Ok(None);
        };
        write_table(&collection_path(&self.dir, kind), &next).await?;
        tables.insert(kind, next);
        Ok(Some(out))
    }
}

fn collection_path(dir: &Path, kind: EntityKind) -> PathBuf {
    dir.join(format!("{}.json", kind.collection()))
}

/// Loads one collection file. A file that cannot be read as a collection (bad JSON,
/// a non-object entry, a record without an integer id) is moved aside to
/// `<name>.corrupt-<timestamp>` and the collection starts empty, so a later
/// rewrite never overwrites the only copy of the data.
async fn load_table(path: &Path, kind: EntityKind) -> Result<Table, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Table::default()),
        Err(e) => return Err(e.into()),
    };
    let loaded = serde_json::from_str::<Vec<Value>>(&raw)
        .map_err(StoreError::from)
        .and_then(|docs| Table::from_documents(kind, docs));
    match loaded {
        Ok(table) => Ok(table),
        Err(e) => {
            let quarantine = quarantine_path(path);
            tokio::fs::rename(path, &quarantine).await?;
            tracing::warn!(
                path = %path.display(),
                moved_to = %quarantine.display(),
                error = %e,
                "corrupt collection file moved aside, starting empty"
            );
            Ok(Table::default())
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f");
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".corrupt-{}", stamp));
    path.with_file_name(name)
}

async fn write_table(path: &Path, table: &Table) -> Result<(), StoreError> {
    let docs: Vec<Value> = table.to_documents().into_iter().map(Value::Object).collect();
    let body = serde_json::to_string_pretty(&docs)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), records = docs.len(), "collection file rewritten");
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).map(Table::to_documents).unwrap_or_default())
    }

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).and_then(|t| t.get(id)))
    }

    async fn insert(&self, kind: EntityKind, fields: Document) -> Result<Document, StoreError> {
        let created = self.mutate(kind, |t| Some(t.insert(fields))).await?;
        created.ok_or_else(|| StoreError::Corrupt {
            collection: kind.collection(),
            message: "insert produced no record".into(),
        })
    }

    async fn replace(
        &self,
        kind: EntityKind,
        id: i64,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.mutate(kind, |t| t.replace(id, fields)).await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        self.mutate(kind, |t| t.delete(id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::fs::metadata(&self.dir).await?;
        Ok(())
    }
}
