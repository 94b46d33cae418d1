//! Library service
//!
//! `Library` is the domain layer. It owns the collection store and enforces
//! the invariants that the repositories know nothing about:
//!
//! - copy-count arithmetic (`0 <= availableCopies <= totalCopies`)
//! - student id generation
//! - checkout/checkin state transitions
//! - referential checks before deletes
//! - statistics
//!
//! Mutating operations take `&mut self` and a [`Session`](crate::Session);
//! each successful mutation is recorded in the audit log.
//!
//! ## Usage
//!
//! ```ignore
//! let mut library = Library::open()?;
//! let session = library.login("admin", "admin123")?.context("bad credentials")?;
//!
//! let book_id = library.add_book(&session, new_book)?;
//! let txn = library.checkout(&session, book_id, "BCA2024001")?;
//! library.checkin(&session, txn.id)?;
//! ```

mod accounts;
mod books;
mod circulation;
mod courses;
mod seed;
mod stats;
mod students;

pub use accounts::actions;
pub use seed::{default_courses, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
pub use stats::{CourseStats, Dashboard, LibraryStats};

use anyhow::Context;
use chrono::{NaiveDate, Utc};

use crate::config::Config;
use crate::error::LibraryResult;
use crate::models::{Book, Course, Student, SystemLog, Transaction, User};
use crate::repository::Repository;
use crate::storage::{KeyValueStore, SqliteStore};

/// Domain service over a collection store
pub struct Library<S = SqliteStore> {
    store: S,
    config: Config,
}

impl Library<SqliteStore> {
    /// Open the library using the default configuration
    ///
    /// On first run the store is created and seeded with the default
    /// courses and the admin account.
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the library with a specific configuration
    pub fn open_with_config(config: Config) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config).context("Failed to open collection store")?;
        Self::with_store_and_config(store, config).context("Failed to initialize library data")
    }
}

impl<S: KeyValueStore> Library<S> {
    /// Wrap an existing store with default configuration
    pub fn with_store(store: S) -> LibraryResult<Self> {
        Self::with_store_and_config(store, Config::default())
    }

    /// Wrap an existing store, seeding any collections it lacks
    pub fn with_store_and_config(store: S, config: Config) -> LibraryResult<Self> {
        let library = Self { store, config };
        library.seed_defaults()?;
        Ok(library)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn books_repo(&self) -> Repository<'_, Book> {
        Repository::new(&self.store)
    }

    pub(crate) fn students_repo(&self) -> Repository<'_, Student> {
        Repository::new(&self.store)
    }

    pub(crate) fn transactions_repo(&self) -> Repository<'_, Transaction> {
        Repository::new(&self.store)
    }

    pub(crate) fn courses_repo(&self) -> Repository<'_, Course> {
        Repository::new(&self.store)
    }

    pub(crate) fn users_repo(&self) -> Repository<'_, User> {
        Repository::new(&self.store)
    }

    pub(crate) fn logs_repo(&self) -> Repository<'_, SystemLog> {
        Repository::new(&self.store)
    }
}

/// Today's date, as recorded on transactions
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
