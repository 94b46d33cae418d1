//! Book catalogue and copy management

use tracing::info;

use crate::error::{LibraryError, LibraryResult, Violation};
use crate::models::{Book, BookPatch, CopyCounts, NewBook};
use crate::repository::{Record, RecordKey};
use crate::session::Session;
use crate::storage::KeyValueStore;

use super::accounts::actions;
use super::Library;

impl<S: KeyValueStore> Library<S> {
    /// Add a book with all of its copies available; returns the new id
    pub fn add_book(&mut self, session: &Session, book: NewBook) -> LibraryResult<u64> {
        if book.title.trim().is_empty() {
            return Err(Violation::InvalidInput("book title must not be empty".to_string()).into());
        }
        if book.copies == 0 {
            return Err(Violation::InvalidInput("a book needs at least one copy".to_string()).into());
        }

        let details = format!("Added book: {} by {}", book.title, book.author);
        let id = self.books_repo().add(book.into_book())?;

        info!("Added book {}", id);
        self.audit(session, actions::BOOK_ADDED, &details);
        Ok(id)
    }

    /// Find a book by id
    pub fn book(&self, id: u64) -> LibraryResult<Option<Book>> {
        Ok(self.books_repo().get(&RecordKey::Id(id))?)
    }

    /// Find a book by id, failing with `NotFound` when absent
    pub fn require_book(&self, id: u64) -> LibraryResult<Book> {
        self.book(id)?
            .ok_or_else(|| LibraryError::not_found(Book::ENTITY, id))
    }

    /// All books, in the order they were added
    pub fn books(&self) -> LibraryResult<Vec<Book>> {
        Ok(self.books_repo().get_all()?)
    }

    /// Books belonging to a course
    pub fn books_by_course(&self, course: &str) -> LibraryResult<Vec<Book>> {
        Ok(self.books_repo().filter(|book| book.course == course)?)
    }

    /// Books whose title, author, ISBN or course contains `query`
    pub fn search_books(&self, query: &str) -> LibraryResult<Vec<Book>> {
        Ok(self.books_repo().search(query)?)
    }

    /// Change descriptive fields; returns `false` if the book does not exist
    pub fn update_book(&mut self, session: &Session, id: u64, patch: BookPatch) -> LibraryResult<bool> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Violation::InvalidInput("book title must not be empty".to_string()).into());
        }
        if patch.is_empty() {
            return Ok(self.book(id)?.is_some());
        }

        if !self.books_repo().update(&RecordKey::Id(id), &patch)? {
            return Ok(false);
        }

        let details = match self.book(id)? {
            Some(book) => format!("Updated book: {} by {}", book.title, book.author),
            None => format!("Updated book {}", id),
        };
        self.audit(session, actions::BOOK_UPDATED, &details);
        Ok(true)
    }

    /// Add one copy; it is immediately available
    pub fn increase_copies(&mut self, session: &Session, id: u64) -> LibraryResult<Book> {
        let book = self.require_book(id)?;
        let total = book.total_copies.checked_add(1).ok_or_else(|| {
            Violation::InvalidInput(format!("book {} already has the maximum number of copies", id))
        })?;
        let counts = CopyCounts {
            total_copies: Some(total),
            available_copies: Some((book.available_copies + 1).min(total)),
        };

        let book = self.apply_copy_counts(book, counts)?;
        self.audit(
            session,
            actions::COPIES_INCREASED,
            &format!("Added a copy of: {} ({} total)", book.title, book.total_copies),
        );
        Ok(book)
    }

    /// Remove one copy
    ///
    /// Refuses when only one copy is left. The available count drops in
    /// lockstep only while it is positive, and never exceeds the total.
    pub fn decrease_copies(&mut self, session: &Session, id: u64) -> LibraryResult<Book> {
        let book = self.require_book(id)?;
        if book.total_copies <= 1 {
            return Err(Violation::LastCopy { book_id: id }.into());
        }

        let total = book.total_copies - 1;
        let available = book.available_copies.saturating_sub(1).min(total);
        let counts = CopyCounts {
            total_copies: Some(total),
            available_copies: Some(available),
        };

        let book = self.apply_copy_counts(book, counts)?;
        self.audit(
            session,
            actions::COPIES_DECREASED,
            &format!("Removed a copy of: {} ({} total)", book.title, book.total_copies),
        );
        Ok(book)
    }

    /// Delete a book that has no copies checked out
    pub fn delete_book(&mut self, session: &Session, id: u64) -> LibraryResult<()> {
        let book = self.require_book(id)?;

        let open = self
            .transactions_repo()
            .count_where(|t| t.book_id == id && t.is_open())?;
        if open > 0 {
            return Err(Violation::BookOnLoan { book_id: id, open }.into());
        }

        self.books_repo().delete(&RecordKey::Id(id))?;

        info!("Deleted book {}", id);
        self.audit(
            session,
            actions::BOOK_DELETED,
            &format!("Deleted book: {} by {}", book.title, book.author),
        );
        Ok(())
    }

    fn apply_copy_counts(&self, mut book: Book, counts: CopyCounts) -> LibraryResult<Book> {
        if !self.books_repo().update(&RecordKey::Id(book.id), &counts)? {
            return Err(LibraryError::not_found(Book::ENTITY, book.id));
        }
        if let Some(total) = counts.total_copies {
            book.total_copies = total;
        }
        if let Some(available) = counts.available_copies {
            book.available_copies = available;
        }
        Ok(book)
    }
}
