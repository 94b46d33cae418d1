//! Libris CLI
//!
//! Command-line interface for Libris - library administration.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use libris_core::{
    BookPatch, Config, Course, CoursePatch, Library, NewBook, NewStudent, Session, StorageError,
    StudentPatch,
};

mod commands;
mod export;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "libris")]
#[command(about = "Libris - Library administration from the command line")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, env = "LIBRIS_CONFIG")]
    config: Option<PathBuf>,

    /// Username for commands that change data
    #[arg(long, global = true, env = "LIBRIS_USER", default_value = "admin")]
    user: String,

    /// Password for commands that change data (prompted if absent)
    #[arg(long, global = true, env = "LIBRIS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage students
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },
    /// Lend a book to a student
    Checkout {
        /// Book ID
        book_id: u64,
        /// Student ID (e.g. BCA2024001)
        student_id: String,
    },
    /// Return a book
    Checkin {
        /// Transaction ID
        transaction_id: u64,
    },
    /// List books currently checked out
    Loans {
        /// Filter by book title, student name or student ID
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the transaction history
    Records {
        /// Filter by book title, student name or student ID
        #[arg(short, long)]
        search: Option<String>,
        /// Only students of this course
        #[arg(short, long)]
        course: Option<String>,
        /// Export to a CSV file instead of printing
        #[arg(long)]
        csv: bool,
        /// CSV file path (defaults to library_records_<date>.csv)
        #[arg(short, long, requires = "csv")]
        output: Option<PathBuf>,
    },
    /// Manage courses
    Course {
        #[command(subcommand)]
        command: CourseCommands,
    },
    /// Show the audit log (newest first)
    Logs {
        /// Filter by user, action or details
        #[arg(short, long)]
        search: Option<String>,
        /// Maximum number of entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show library statistics
    Stats,
    /// Change your password
    Passwd {
        /// New password (prompted if absent)
        #[arg(long)]
        new: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a new book
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long, default_value = "")]
        isbn: String,
        #[arg(short, long, default_value = "")]
        edition: String,
        /// Course code
        #[arg(short, long)]
        course: String,
        /// Number of copies
        #[arg(long, default_value_t = 1)]
        copies: u32,
    },
    /// List books
    #[command(alias = "ls")]
    List {
        /// Filter by course code
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Show book details
    Show { id: u64 },
    /// Search books by title, author, ISBN or course
    Search { query: String },
    /// Edit a book (prompts when no fields are given)
    Edit {
        id: u64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        isbn: Option<String>,
        #[arg(short, long)]
        edition: Option<String>,
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Add one copy
    CopiesAdd { id: u64 },
    /// Remove one copy
    CopiesRemove { id: u64 },
    /// Delete a book
    #[command(alias = "rm")]
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum StudentCommands {
    /// Register a student
    Add {
        #[arg(short, long)]
        name: String,
        /// Contact number
        #[arg(long, default_value = "")]
        contact: String,
        /// Course code
        #[arg(short, long)]
        course: String,
        /// Enrolment year (defaults to this year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// List students
    #[command(alias = "ls")]
    List {
        /// Filter by course code
        #[arg(short, long)]
        course: Option<String>,
    },
    /// Show student details
    Show { id: String },
    /// Search students by ID, name, contact or course
    Search { query: String },
    /// Edit a student (prompts when no fields are given)
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
    /// Delete a student
    #[command(alias = "rm")]
    Delete { id: String },
    /// Show the ID the next student would get
    NextId {
        #[arg(short, long)]
        course: String,
        /// Enrolment year (defaults to this year)
        #[arg(short, long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// Add a course
    Add {
        /// Course code (e.g. BCA)
        code: String,
        /// Full course name
        name: String,
        /// Length in years
        #[arg(short, long, default_value_t = 3)]
        duration: u32,
        #[arg(long, default_value_t = 120)]
        credits: u32,
    },
    /// List courses
    #[command(alias = "ls")]
    List,
    /// Show course details
    Show { code: String },
    /// Rename a course, optionally changing duration or credits
    Rename {
        code: String,
        name: String,
        #[arg(short, long)]
        duration: Option<u32>,
        #[arg(long)]
        credits: Option<u32>,
    },
    /// Delete a course that no book or student uses
    #[command(alias = "rm")]
    Delete { code: String },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, library_name, recent_log_limit, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Credentials used to open a session for mutating commands
struct Credentials {
    user: String,
    password: Option<String>,
}

fn main() -> Result<()> {
    let result = run(Cli::parse());

    if let Err(ref e) = result {
        if let Some(hint) = recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let mut library = Library::open_with_config(config)?;
    let credentials = Credentials {
        user: cli.user,
        password: cli.password,
    };

    match cli.command {
        Commands::Book { command } => {
            handle_book_command(command, &mut library, &credentials, &output)
        }
        Commands::Student { command } => {
            handle_student_command(command, &mut library, &credentials, &output)
        }
        Commands::Checkout {
            book_id,
            student_id,
        } => with_session(&mut library, &credentials, |library, session| {
            commands::circulation::checkout(library, session, book_id, student_id, &output)
        }),
        Commands::Checkin { transaction_id } => {
            with_session(&mut library, &credentials, |library, session| {
                commands::circulation::checkin(library, session, transaction_id, &output)
            })
        }
        Commands::Loans { search } => commands::circulation::loans(&library, search, &output),
        Commands::Records {
            search,
            course,
            csv,
            output: path,
        } => {
            if csv {
                with_session(&mut library, &credentials, |library, session| {
                    commands::circulation::export(library, session, search, course, path, &output)
                })
            } else {
                commands::circulation::records(&library, search, course, &output)
            }
        }
        Commands::Course { command } => {
            handle_course_command(command, &mut library, &credentials, &output)
        }
        Commands::Logs { search, limit } => commands::logs::show(&library, search, limit, &output),
        Commands::Stats => commands::stats::show(&library, &output),
        Commands::Passwd { new } => with_session(&mut library, &credentials, |library, session| {
            commands::account::passwd(library, session, new, &output)
        }),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_book_command(
    command: BookCommands,
    library: &mut Library,
    credentials: &Credentials,
    output: &Output,
) -> Result<()> {
    match command {
        BookCommands::Add {
            title,
            author,
            isbn,
            edition,
            course,
            copies,
        } => {
            let book = NewBook {
                title,
                author,
                isbn,
                edition,
                course,
                copies,
            };
            with_session(library, credentials, |library, session| {
                commands::book::add(library, session, book, output)
            })
        }
        BookCommands::List { course } => commands::book::list(library, course, output),
        BookCommands::Show { id } => commands::book::show(library, id, output),
        BookCommands::Search { query } => commands::book::search(library, query, output),
        BookCommands::Edit {
            id,
            title,
            author,
            isbn,
            edition,
            course,
        } => {
            let patch = BookPatch {
                title,
                author,
                isbn,
                edition,
                course,
            };
            with_session(library, credentials, |library, session| {
                commands::book::edit(library, session, id, patch, output)
            })
        }
        BookCommands::CopiesAdd { id } => with_session(library, credentials, |library, session| {
            commands::book::add_copy(library, session, id, output)
        }),
        BookCommands::CopiesRemove { id } => {
            with_session(library, credentials, |library, session| {
                commands::book::remove_copy(library, session, id, output)
            })
        }
        BookCommands::Delete { id } => with_session(library, credentials, |library, session| {
            commands::book::delete(library, session, id, output)
        }),
    }
}

fn handle_student_command(
    command: StudentCommands,
    library: &mut Library,
    credentials: &Credentials,
    output: &Output,
) -> Result<()> {
    match command {
        StudentCommands::Add {
            name,
            contact,
            course,
            year,
        } => {
            let student = NewStudent {
                full_name: name,
                contact_no: contact,
                course,
                enrolled_year: year.unwrap_or_else(current_year),
            };
            with_session(library, credentials, |library, session| {
                commands::student::add(library, session, student, output)
            })
        }
        StudentCommands::List { course } => commands::student::list(library, course, output),
        StudentCommands::Show { id } => commands::student::show(library, id, output),
        StudentCommands::Search { query } => commands::student::search(library, query, output),
        StudentCommands::Edit { id, name, contact } => {
            let patch = StudentPatch {
                full_name: name,
                contact_no: contact,
            };
            with_session(library, credentials, |library, session| {
                commands::student::edit(library, session, id, patch, output)
            })
        }
        StudentCommands::Delete { id } => with_session(library, credentials, |library, session| {
            commands::student::delete(library, session, id, output)
        }),
        StudentCommands::NextId { course, year } => {
            commands::student::next_id(library, course, year.unwrap_or_else(current_year), output)
        }
    }
}

fn handle_course_command(
    command: CourseCommands,
    library: &mut Library,
    credentials: &Credentials,
    output: &Output,
) -> Result<()> {
    match command {
        CourseCommands::Add {
            code,
            name,
            duration,
            credits,
        } => {
            let course = Course::new(code, name, duration, credits);
            with_session(library, credentials, |library, session| {
                commands::course::add(library, session, course, output)
            })
        }
        CourseCommands::List => commands::course::list(library, output),
        CourseCommands::Show { code } => commands::course::show(library, code, output),
        CourseCommands::Rename {
            code,
            name,
            duration,
            credits,
        } => {
            let patch = CoursePatch {
                name: Some(name),
                duration,
                credits,
            };
            with_session(library, credentials, |library, session| {
                commands::course::rename(library, session, code, patch, output)
            })
        }
        CourseCommands::Delete { code } => with_session(library, credentials, |library, session| {
            commands::course::delete(library, session, code, output)
        }),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Run a mutating command inside a login/logout pair
fn with_session<F>(library: &mut Library, credentials: &Credentials, f: F) -> Result<()>
where
    F: FnOnce(&mut Library, &Session) -> Result<()>,
{
    let session =
        commands::account::login(library, &credentials.user, credentials.password.clone())?;
    let result = f(library, &session);
    library.logout(session);
    result
}

/// Suggestion for the first storage failure in the error chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        cause
            .downcast_ref::<StorageError>()
            .and_then(StorageError::recovery_suggestion)
    })
}

fn current_year() -> i32 {
    Local::now().year()
}

/// Initialize logging
///
/// Only initializes if LIBRIS_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/libris.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LIBRIS_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "libris_core={},libris_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use libris_core::LibraryError;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_book_add() {
        let cli = Cli::try_parse_from([
            "libris", "book", "add", "--title", "Compilers", "--author", "Aho", "--course", "BCA",
            "--copies", "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Book {
                command: BookCommands::Add { title, copies, isbn, .. },
            } => {
                assert_eq!(title, "Compilers");
                assert_eq!(copies, 3);
                assert_eq!(isbn, "");
            }
            _ => panic!("expected book add"),
        }
    }

    #[test]
    fn test_records_output_requires_csv() {
        assert!(Cli::try_parse_from(["libris", "records", "--output", "out.csv"]).is_err());
        assert!(Cli::try_parse_from(["libris", "records", "--csv", "--output", "out.csv"]).is_ok());
    }

    #[test]
    fn test_recovery_hint_finds_storage_error() {
        let storage = StorageError::CorruptCollection {
            collection: "books".to_string(),
            details: "expected a JSON array".to_string(),
        };
        let error = anyhow::Error::from(LibraryError::from(storage)).context("Failed to list books");
        assert!(recovery_hint(&error).is_some());

        let error = anyhow::anyhow!("Invalid username or password");
        assert!(recovery_hint(&error).is_none());
    }
}
