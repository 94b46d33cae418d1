//! Book command handlers

use anyhow::{Context, Result};

use libris_core::{BookPatch, KeyValueStore, Library, NewBook, Session};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Add a new book
pub fn add<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    book: NewBook,
    output: &Output,
) -> Result<()> {
    let id = library
        .add_book(session, book)
        .context("Failed to add book")?;
    let book = library.require_book(id)?;

    output.success(&format!("Added book: {}", book.id));
    output.print_book(&book);
    Ok(())
}

/// List all books, optionally filtered by course
pub fn list<S: KeyValueStore>(library: &Library<S>, course: Option<String>, output: &Output) -> Result<()> {
    let books = match course {
        Some(ref code) => library.books_by_course(code)?,
        None => library.books()?,
    };

    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show<S: KeyValueStore>(library: &Library<S>, id: u64, output: &Output) -> Result<()> {
    let book = library.require_book(id)?;
    output.print_book(&book);
    Ok(())
}

/// Search books
pub fn search<S: KeyValueStore>(library: &Library<S>, query: String, output: &Output) -> Result<()> {
    let books = library.search_books(&query)?;
    output.print_books(&books);
    Ok(())
}

/// Edit a book's descriptive fields
///
/// Without any field flags, prompts for each field in turn.
pub fn edit<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: u64,
    mut patch: BookPatch,
    output: &Output,
) -> Result<()> {
    let book = library.require_book(id)?;

    if patch.is_empty() && output.should_prompt() {
        println!("Editing book: {}", book.id);
        println!("Press Enter to keep current value, or type new value.\n");

        patch.title = prompt_with_default("Title", &book.title)?;
        patch.author = prompt_with_default("Author", &book.author)?;
        patch.isbn = prompt_with_default("ISBN", &book.isbn)?;
        patch.edition = prompt_with_default("Edition", &book.edition)?;
        patch.course = prompt_with_default("Course", &book.course)?;
    }

    if patch.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }

    library
        .update_book(session, id, patch)
        .context("Failed to update book")?;

    output.success("Book updated");
    output.print_book(&library.require_book(id)?);
    Ok(())
}

/// Add one copy of a book
pub fn add_copy<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: u64,
    output: &Output,
) -> Result<()> {
    let book = library.increase_copies(session, id)?;
    output.success(&format!(
        "{} now has {} copies ({} available)",
        book.title, book.total_copies, book.available_copies
    ));
    Ok(())
}

/// Remove one copy of a book
pub fn remove_copy<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: u64,
    output: &Output,
) -> Result<()> {
    let book = library.decrease_copies(session, id)?;
    output.success(&format!(
        "{} now has {} copies ({} available)",
        book.title, book.total_copies, book.available_copies
    ));
    Ok(())
}

/// Delete a book
pub fn delete<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    id: u64,
    output: &Output,
) -> Result<()> {
    let book = library.require_book(id)?;

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete book: {} - {} by {}", book.id, book.title, book.author);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library.delete_book(session, id)?;

    output.success(&format!("Deleted book: {}", id));
    Ok(())
}
