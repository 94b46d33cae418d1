//! Key-value collection store
//!
//! The leaf of the data-access stack: named collections, each a JSON array
//! of independently serializable records. No schema validation and no
//! business logic happen here.
//!
//! Reading a collection that was never written yields an empty sequence.
//! Writing replaces the whole collection. A [`WriteBatch`] groups writes to
//! several collections so they land together or not at all.

use std::cell::RefCell;
use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};

/// Whole-collection writes to apply atomically
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    writes: Vec<(String, Vec<Value>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the full contents of a collection
    ///
    /// Staging the same collection twice keeps only the last contents.
    pub fn put(&mut self, collection: impl Into<String>, records: Vec<Value>) {
        let collection = collection.into();
        match self.writes.iter_mut().find(|(name, _)| *name == collection) {
            Some((_, existing)) => *existing = records,
            None => self.writes.push((collection, records)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Names of the staged collections, in staging order
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, Vec<Value>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Value>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// Persistent store of named JSON collections
pub trait KeyValueStore {
    /// Read every record of a collection, in stored order
    fn read(&self, collection: &str) -> StorageResult<Vec<Value>>;

    /// Whether the collection has ever been written
    fn contains(&self, collection: &str) -> StorageResult<bool>;

    /// Apply all staged writes as one unit
    fn commit(&self, batch: WriteBatch) -> StorageResult<()>;

    /// Replace a single collection
    fn write(&self, collection: &str, records: Vec<Value>) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(collection, records);
        self.commit(batch)
    }
}

/// SQLite-backed collection store
///
/// One row per collection in the `collections` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database under the configured data directory
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.database_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        debug!("Opened collection store at {:?}", path);
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of all stored collections
    pub fn collection_names(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, collection: &str) -> StorageResult<Vec<Value>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM collections WHERE name = ?",
                params![collection],
                |row| row.get(0),
            )
            .optional()?;

        let Some(data) = data else {
            return Ok(Vec::new());
        };

        let value: Value = serde_json::from_str(&data)
            .map_err(|e| StorageError::serialization(collection, e))?;

        match value {
            Value::Array(records) => {
                debug!("Read {} record(s) from '{}'", records.len(), collection);
                Ok(records)
            }
            other => Err(StorageError::CorruptCollection {
                collection: collection.to_string(),
                details: format!("expected a JSON array, found {}", json_kind(&other)),
            }),
        }
    }

    fn contains(&self, collection: &str) -> StorageResult<bool> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM collections WHERE name = ?")?
            .exists(params![collection])?;
        Ok(exists)
    }

    fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp_millis();
        let tx = self.conn.unchecked_transaction()?;

        for (collection, records) in batch {
            let count = records.len();
            let data = serde_json::to_string(&records)
                .map_err(|e| StorageError::serialization(&collection, e))?;

            tx.execute(
                r#"
                INSERT INTO collections (name, data, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
                "#,
                params![collection, data, now],
            )?;
            debug!("Wrote {} record(s) to '{}'", count, collection);
        }

        tx.commit()?;
        Ok(())
    }
}

/// In-memory collection store
///
/// Same semantics as [`SqliteStore`] without touching disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<BTreeMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, collection: &str) -> StorageResult<Vec<Value>> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    fn contains(&self, collection: &str) -> StorageResult<bool> {
        Ok(self.collections.borrow().contains_key(collection))
    }

    fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        let mut collections = self.collections.borrow_mut();
        for (collection, records) in batch {
            collections.insert(collection, records);
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
