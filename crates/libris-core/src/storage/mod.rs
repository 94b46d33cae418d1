//! Storage layer
//!
//! Persists named collections of JSON records.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: read/write whole collections, atomic multi-collection batches
//! - **SQLite**: default backend, one row per collection
//! - **Memory**: same contract without disk, for tests and embedding

pub mod error;
pub mod kv;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore, WriteBatch};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
