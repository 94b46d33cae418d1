//! Typed repository over one named collection
//!
//! A [`Repository`] turns a [`KeyValueStore`] collection of JSON values into
//! a small relational table: synthetic id assignment, lookup by key,
//! shallow-merge updates, deletes and linear-scan filtering.
//!
//! ## Keys
//!
//! Records declare their key explicitly. Synthetic-id collections (books,
//! transactions, users, logs) use [`RecordKey::Id`]; natural-key collections
//! (courses by code, students by generated id) use [`RecordKey::Code`].
//! Lookups compare keys of the same kind only.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::storage::{KeyValueStore, StorageError, StorageResult, WriteBatch};

/// Primary key of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Synthetic integer id assigned by [`Repository::add`]
    Id(u64),
    /// Caller-supplied natural key
    Code(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{}", id),
            RecordKey::Code(code) => write!(f, "{}", code),
        }
    }
}

impl From<u64> for RecordKey {
    fn from(id: u64) -> Self {
        RecordKey::Id(id)
    }
}

impl From<&str> for RecordKey {
    fn from(code: &str) -> Self {
        RecordKey::Code(code.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(code: String) -> Self {
        RecordKey::Code(code)
    }
}

/// A record stored in a named collection
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection name in the key-value store
    const COLLECTION: &'static str;
    /// Human-readable entity name for messages
    const ENTITY: &'static str;

    fn key(&self) -> RecordKey;
}

/// A record whose key is an integer assigned on insertion
pub trait SyntheticId: Record {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

/// A record that can be matched by free-text search
pub trait Searchable {
    /// Text fields checked by [`Repository::search`]
    fn search_fields(&self) -> Vec<&str>;
}

/// Case-insensitive substring match over any of the given fields
///
/// An empty (or all-whitespace) query matches everything.
pub fn matches_query(fields: &[&str], query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Generic CRUD over one collection
pub struct Repository<'a, T> {
    store: &'a dyn KeyValueStore,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record> Repository<'a, T> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Every record, in insertion order
    pub fn get_all(&self) -> StorageResult<Vec<T>> {
        self.store
            .read(T::COLLECTION)?
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| StorageError::serialization(T::COLLECTION, e))
            })
            .collect()
    }

    /// Find a record by key
    pub fn get(&self, key: &RecordKey) -> StorageResult<Option<T>> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|record| record.key() == *key))
    }

    /// Append a record that carries its own natural key
    ///
    /// Returns `false` without writing when the key is already taken.
    pub fn insert(&self, record: T) -> StorageResult<bool> {
        let mut records = self.get_all()?;
        let key = record.key();
        if records.iter().any(|existing| existing.key() == key) {
            return Ok(false);
        }
        records.push(record);
        self.replace_all(&records)?;
        Ok(true)
    }

    /// Shallow-merge the present fields of `patch` over the stored record
    ///
    /// Fields absent from the patch are preserved. The merged record must
    /// still decode as `T`. Returns `false` when the key is not found.
    pub fn update<P: Serialize>(&self, key: &RecordKey, patch: &P) -> StorageResult<bool> {
        let mut records = self.get_all()?;
        let Some(index) = records.iter().position(|record| record.key() == *key) else {
            return Ok(false);
        };

        records[index] = merge(&records[index], patch)?;
        self.replace_all(&records)?;
        Ok(true)
    }

    /// Remove every record with this key
    ///
    /// Returns how many were removed; deleting a missing key is a no-op.
    pub fn delete(&self, key: &RecordKey) -> StorageResult<usize> {
        let records = self.get_all()?;
        let before = records.len();
        let kept: Vec<T> = records
            .into_iter()
            .filter(|record| record.key() != *key)
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.replace_all(&kept)?;
        }
        Ok(removed)
    }

    /// Records matching a predicate, in insertion order
    pub fn filter<F>(&self, predicate: F) -> StorageResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// Number of records matching a predicate
    pub fn count_where<F>(&self, predicate: F) -> StorageResult<usize>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.get_all()?.iter().filter(|record| predicate(record)).count())
    }

    /// Overwrite the whole collection
    pub fn replace_all(&self, records: &[T]) -> StorageResult<()> {
        self.store.write(T::COLLECTION, encode(records)?)
    }

    /// Stage the whole collection into a batch instead of writing it now
    pub fn stage(batch: &mut WriteBatch, records: &[T]) -> StorageResult<()> {
        batch.put(T::COLLECTION, encode(records)?);
        Ok(())
    }
}

impl<'a, T: Record + Searchable> Repository<'a, T> {
    /// Case-insensitive substring search over the record's text fields
    pub fn search(&self, query: &str) -> StorageResult<Vec<T>> {
        self.filter(|record| matches_query(&record.search_fields(), query))
    }
}

impl<'a, T: SyntheticId> Repository<'a, T> {
    /// Assign the next id, append, persist; returns the new id
    pub fn add(&self, mut record: T) -> StorageResult<u64> {
        let mut records = self.get_all()?;
        let id = next_id(&records);
        record.set_id(id);
        records.push(record);
        self.replace_all(&records)?;
        Ok(id)
    }
}

/// `max(existing ids) + 1`, or 1 for an empty collection
pub fn next_id<T: SyntheticId>(records: &[T]) -> u64 {
    records.iter().map(SyntheticId::id).max().unwrap_or(0) + 1
}

fn encode<T: Record>(records: &[T]) -> StorageResult<Vec<Value>> {
    records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|e| StorageError::serialization(T::COLLECTION, e))
        })
        .collect()
}

fn merge<T: Record, P: Serialize>(record: &T, patch: &P) -> StorageResult<T> {
    let to_value = |value: Result<Value, serde_json::Error>| {
        value.map_err(|e| StorageError::serialization(T::COLLECTION, e))
    };

    let mut merged = to_value(serde_json::to_value(record))?;
    let patch = to_value(serde_json::to_value(patch))?;

    match (merged.as_object_mut(), patch) {
        (Some(target), Value::Object(fields)) => {
            for (field, value) in fields {
                target.insert(field, value);
            }
        }
        _ => {
            return Err(StorageError::serialization(
                T::COLLECTION,
                serde::ser::Error::custom("records and patches must be JSON objects"),
            ))
        }
    }

    serde_json::from_value(merged).map_err(|e| StorageError::serialization(T::COLLECTION, e))
}
