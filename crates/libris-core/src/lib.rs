//! Libris Core Library
//!
//! This crate provides the core functionality for Libris, a small
//! single-site library administration system: a book catalogue with copy
//! counts, registered students, checkout/checkin circulation, a course
//! catalogue, administrator accounts and an audit log.
//!
//! # Architecture
//!
//! - **KeyValueStore**: named collections of JSON values, persisted in SQLite
//! - **Repository**: typed CRUD over one collection (ids, lookup, merge, search)
//! - **Library**: the domain service that enforces the invariants
//!
//! # Quick Start
//!
//! ```text
//! let mut library = Library::open()?;
//! let session = library.login("admin", "admin123")?.context("bad credentials")?;
//!
//! // Add a book
//! let id = library.add_book(&session, new_book)?;
//!
//! // Lend it out
//! let txn = library.checkout(&session, id, "BCA2024001")?;
//! ```
//!
//! # Modules
//!
//! - `library`: Domain service (main entry point)
//! - `models`: Books, students, transactions, courses, users, logs
//! - `repository`: Generic collection repository
//! - `storage`: Key-value store contract and SQLite backend
//! - `session`: Authenticated session passed to mutating operations
//! - `error`: Domain errors
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{LibraryError, LibraryResult, Violation};
pub use library::{actions, CourseStats, Dashboard, Library, LibraryStats};
pub use models::{
    Book, BookPatch, Course, CoursePatch, NewBook, NewStudent, Student, StudentPatch, SystemLog,
    Transaction, TransactionStatus, User,
};
pub use repository::{RecordKey, Repository};
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError, WriteBatch};
