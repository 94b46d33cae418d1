//! Checkout, checkin and transaction record handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;

use libris_core::{actions, KeyValueStore, Library, Session};

use crate::export::{default_file_name, records_csv};
use crate::output::Output;

/// Lend a book to a student
pub fn checkout<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    book_id: u64,
    student_id: String,
    output: &Output,
) -> Result<()> {
    let transaction = library
        .checkout(session, book_id, &student_id)
        .context("Checkout refused")?;

    output.success(&format!(
        "Checked out '{}' to {}",
        transaction.book_title, transaction.student_name
    ));
    output.print_transaction(&transaction);
    Ok(())
}

/// Return a book
pub fn checkin<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    transaction_id: u64,
    output: &Output,
) -> Result<()> {
    let transaction = library
        .checkin(session, transaction_id)
        .context("Checkin refused")?;

    output.success(&format!(
        "Checked in '{}' from {}",
        transaction.book_title, transaction.student_name
    ));
    output.print_transaction(&transaction);
    Ok(())
}

/// Books currently out
pub fn loans<S: KeyValueStore>(library: &Library<S>, search: Option<String>, output: &Output) -> Result<()> {
    let transactions = library.search_open(search.as_deref().unwrap_or(""))?;
    output.print_transactions(&transactions);
    Ok(())
}

/// Full transaction history
pub fn records<S: KeyValueStore>(
    library: &Library<S>,
    search: Option<String>,
    course: Option<String>,
    output: &Output,
) -> Result<()> {
    let transactions =
        library.search_records(search.as_deref().unwrap_or(""), course.as_deref())?;
    output.print_transactions(&transactions);
    Ok(())
}

/// Write the matching transaction history to a CSV file
pub fn export<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    search: Option<String>,
    course: Option<String>,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let transactions =
        library.search_records(search.as_deref().unwrap_or(""), course.as_deref())?;
    if transactions.is_empty() {
        bail!("No records to export");
    }

    let path =
        path.unwrap_or_else(|| PathBuf::from(default_file_name(Local::now().date_naive())));
    std::fs::write(&path, records_csv(&transactions))
        .with_context(|| format!("Failed to write {:?}", path))?;

    library.audit(
        session,
        actions::EXPORT_RECORDS,
        "Exported transaction records to Excel/CSV",
    );

    output.success(&format!(
        "Exported {} record(s) to {}",
        transactions.len(),
        path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use libris_core::{MemoryStore, NewBook, NewStudent};

    fn library_with_loan() -> (Library<MemoryStore>, Session) {
        let mut library = Library::with_store(MemoryStore::new()).unwrap();
        let session = library.login("admin", "admin123").unwrap().unwrap();
        let book = library
            .add_book(
                &session,
                NewBook {
                    title: "Networks".to_string(),
                    author: "Tanenbaum".to_string(),
                    isbn: "978-0132126953".to_string(),
                    edition: "5th".to_string(),
                    course: "BCA".to_string(),
                    copies: 1,
                },
            )
            .unwrap();
        let student = library
            .add_student(
                &session,
                NewStudent {
                    full_name: "Sita Sharma".to_string(),
                    contact_no: "9800000000".to_string(),
                    course: "BCA".to_string(),
                    enrolled_year: 2024,
                },
            )
            .unwrap();
        library.checkout(&session, book, &student).unwrap();
        (library, session)
    }

    #[test]
    fn test_export_writes_file_and_audits() {
        let (mut library, session) = library_with_loan();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.csv");
        let output = Output::new(OutputFormat::Quiet);

        export(&mut library, &session, None, None, Some(path.clone()), &output).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Networks"));
        assert!(content.contains("Sita Sharma"));

        let last = library.logs().unwrap().pop().unwrap();
        assert_eq!(last.action, actions::EXPORT_RECORDS);
        assert_eq!(last.details, "Exported transaction records to Excel/CSV");
    }

    #[test]
    fn test_export_without_matches_fails() {
        let (mut library, session) = library_with_loan();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.csv");
        let output = Output::new(OutputFormat::Quiet);

        let result = export(
            &mut library,
            &session,
            Some("nobody".to_string()),
            None,
            Some(path.clone()),
            &output,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
