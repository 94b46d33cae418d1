//! Domain errors
//!
//! Three outcomes besides success:
//! - `NotFound`: a lookup by id, code or username found nothing
//! - `Violation`: the operation would break an invariant and was refused
//! - `Storage`: the store could not serve the request (surfaced, not retried)

use thiserror::Error;

use crate::storage::StorageError;

/// A refused operation, with a human-readable reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("No copies of book {book_id} are available for checkout")]
    NoCopiesAvailable { book_id: u64 },

    #[error("Cannot remove the last copy of book {book_id}. Delete the book instead.")]
    LastCopy { book_id: u64 },

    #[error("Cannot delete book {book_id}: {open} copy/copies are currently checked out")]
    BookOnLoan { book_id: u64, open: usize },

    #[error("Cannot delete student {student_id}: {open} book(s) are currently checked out")]
    StudentHasLoans { student_id: String, open: usize },

    #[error("Cannot delete course {code}: it is used by {books} book(s) and {students} student(s)")]
    CourseInUse {
        code: String,
        books: usize,
        students: usize,
    },

    #[error("Transaction {transaction_id} has already been returned")]
    AlreadyReturned { transaction_id: u64 },

    #[error("{entity} '{key}' already exists")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors returned by [`crate::Library`] operations
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Violation(#[from] Violation),

    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),
}

impl LibraryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        LibraryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether this is a refusal the caller can act on
    pub fn is_violation(&self) -> bool {
        matches!(self, LibraryError::Violation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LibraryError::NotFound { .. })
    }

    /// The refusal, if this error is one
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            LibraryError::Violation(v) => Some(v),
            _ => None,
        }
    }
}

/// Result type for domain operations
pub type LibraryResult<T> = Result<T, LibraryError>;
