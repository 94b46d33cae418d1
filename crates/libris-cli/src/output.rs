//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use libris_core::{Book, Course, Dashboard, Student, SystemLog, Transaction};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", book.id);
                println!("Title:     {}", book.title);
                println!("Author:    {}", book.author);
                println!("ISBN:      {}", book.isbn);
                println!("Edition:   {}", book.edition);
                println!("Course:    {}", book.course);
                println!(
                    "Copies:    {} available of {}",
                    book.available_copies, book.total_copies
                );
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => println!("{}", book.id),
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    println!(
                        "{:>4} | {} | {} | {} | {}/{}",
                        book.id,
                        truncate(&book.title, 35),
                        truncate(&book.author, 20),
                        book.course,
                        book.available_copies,
                        book.total_copies
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a single student
    pub fn print_student(&self, student: &Student) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", student.id);
                println!("Name:     {}", student.full_name);
                println!("Contact:  {}", student.contact_no);
                println!("Course:   {}", student.course);
                println!("Enrolled: {}", student.enrolled_year);
            }
            OutputFormat::Json => print_json(student),
            OutputFormat::Quiet => println!("{}", student.id),
        }
    }

    /// Print a list of students
    pub fn print_students(&self, students: &[Student]) {
        match self.format {
            OutputFormat::Human => {
                if students.is_empty() {
                    println!("No students found.");
                    return;
                }
                for student in students {
                    println!(
                        "{} | {} | {} | {} | {}",
                        student.id,
                        truncate(&student.full_name, 30),
                        student.contact_no,
                        student.course,
                        student.enrolled_year
                    );
                }
                println!("\n{} student(s)", students.len());
            }
            OutputFormat::Json => print_json(students),
            OutputFormat::Quiet => {
                for student in students {
                    println!("{}", student.id);
                }
            }
        }
    }

    /// Print a single transaction
    pub fn print_transaction(&self, transaction: &Transaction) {
        match self.format {
            OutputFormat::Human => {
                println!("Transaction: {}", transaction.id);
                println!("Book:        {} ({})", transaction.book_title, transaction.book_id);
                println!(
                    "Student:     {} ({}, {})",
                    transaction.student_name, transaction.student_id, transaction.student_course
                );
                println!("Checked out: {}", transaction.checkout_date);
                if let Some(date) = transaction.checkin_date {
                    println!("Checked in:  {}", date);
                }
                println!("Status:      {}", transaction.status.label());
            }
            OutputFormat::Json => print_json(transaction),
            OutputFormat::Quiet => println!("{}", transaction.id),
        }
    }

    /// Print a list of transactions
    pub fn print_transactions(&self, transactions: &[Transaction]) {
        match self.format {
            OutputFormat::Human => {
                if transactions.is_empty() {
                    println!("No records found.");
                    return;
                }
                for t in transactions {
                    let checkin = t
                        .checkin_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>4} | {} | {} ({}) | {} | {} | {} | {}",
                        t.id,
                        truncate(&t.book_title, 30),
                        truncate(&t.student_name, 20),
                        t.student_id,
                        t.student_course,
                        t.checkout_date,
                        checkin,
                        t.status.label()
                    );
                }
                println!("\n{} record(s)", transactions.len());
            }
            OutputFormat::Json => print_json(transactions),
            OutputFormat::Quiet => {
                for t in transactions {
                    println!("{}", t.id);
                }
            }
        }
    }

    /// Print a single course
    pub fn print_course(&self, course: &Course) {
        match self.format {
            OutputFormat::Human => {
                println!("Code:     {}", course.code);
                println!("Name:     {}", course.name);
                println!("Duration: {} year(s)", course.duration);
                println!("Credits:  {}", course.credits);
            }
            OutputFormat::Json => print_json(course),
            OutputFormat::Quiet => println!("{}", course.code),
        }
    }

    /// Print a list of courses
    pub fn print_courses(&self, courses: &[Course]) {
        match self.format {
            OutputFormat::Human => {
                if courses.is_empty() {
                    println!("No courses found.");
                    return;
                }
                for course in courses {
                    println!(
                        "{} | {} | {}y | {} credits",
                        course.code,
                        truncate(&course.name, 50),
                        course.duration,
                        course.credits
                    );
                }
                println!("\n{} course(s)", courses.len());
            }
            OutputFormat::Json => print_json(courses),
            OutputFormat::Quiet => {
                for course in courses {
                    println!("{}", course.code);
                }
            }
        }
    }

    /// Print audit log entries
    pub fn print_logs(&self, logs: &[SystemLog]) {
        match self.format {
            OutputFormat::Human => {
                if logs.is_empty() {
                    println!("No log entries found.");
                    return;
                }
                for log in logs {
                    println!(
                        "{} | {} | {} | {}",
                        log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        log.user,
                        log.action,
                        log.details
                    );
                }
                println!("\n{} entry/entries", logs.len());
            }
            OutputFormat::Json => print_json(logs),
            OutputFormat::Quiet => {
                for log in logs {
                    println!("{}", log.id);
                }
            }
        }
    }

    /// Print the dashboard: totals, per-course figures and recent activity
    pub fn print_dashboard(&self, dashboard: &Dashboard) {
        let stats = &dashboard.library;
        match self.format {
            OutputFormat::Human => {
                println!("{}", dashboard.library_name);
                println!("{}", "=".repeat(dashboard.library_name.chars().count()));
                println!();
                println!("Books:            {}", stats.total_books);
                println!("Total copies:     {}", stats.total_copies);
                println!("Available copies: {}", stats.available_copies);
                println!("Checked out:      {}", stats.checked_out_books);
                println!("Students:         {}", stats.total_students);
                println!("Transactions:     {}", stats.total_transactions);

                if !dashboard.courses.is_empty() {
                    println!();
                    println!("── By course ──");
                    for course in &dashboard.courses {
                        println!(
                            "{} | {} book(s) | {}/{} copies | {} student(s)",
                            course.course_code,
                            course.total_books,
                            course.available_copies,
                            course.total_copies,
                            course.total_students
                        );
                    }
                }

                println!();
                println!("── Recent activity ──");
                if dashboard.recent_activity.is_empty() {
                    println!("No recent activity");
                }
                for transaction in &dashboard.recent_activity {
                    println!(
                        "{} | {} | {} | {}",
                        transaction.checkout_date,
                        truncate(&transaction.book_title, 40),
                        transaction.student_name,
                        transaction.status.label()
                    );
                }
            }
            OutputFormat::Json => print_json(dashboard),
            OutputFormat::Quiet => {
                println!(
                    "{} {} {}",
                    stats.total_books, stats.available_copies, stats.checked_out_books
                );
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output as JSON: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
