//! Data models for Libris
//!
//! Defines the records stored in each collection, the inputs used to create
//! them, and the patches used for partial updates. Field names are persisted
//! in camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{Record, RecordKey, Searchable, SyntheticId};

/// Collection names
pub mod collections {
    pub const BOOKS: &str = "books";
    pub const STUDENTS: &str = "students";
    pub const TRANSACTIONS: &str = "transactions";
    pub const COURSES: &str = "courses";
    pub const USERS: &str = "users";
    pub const SYSTEM_LOGS: &str = "systemLogs";
}

/// A book title and its copy counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Synthetic identifier assigned on add
    pub id: u64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub edition: String,
    /// Course code this book belongs to
    pub course: String,
    /// Physical copies owned
    pub total_copies: u32,
    /// Copies not currently checked out
    pub available_copies: u32,
}

/// Fields for a new book; all copies start available
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub edition: String,
    pub course: String,
    pub copies: u32,
}

impl NewBook {
    pub(crate) fn into_book(self) -> Book {
        Book {
            id: 0,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            edition: self.edition,
            course: self.course,
            total_copies: self.copies,
            available_copies: self.copies,
        }
    }
}

/// Partial update of a book's descriptive fields
///
/// Copy counts change only through the copy operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Copy-count update used by circulation and copy management
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CopyCounts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<u32>,
}

/// A registered student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Generated `{course}{enrolledYear}{seq:03}` identifier
    pub id: String,
    pub full_name: String,
    pub contact_no: String,
    pub course: String,
    pub enrolled_year: i32,
}

/// Fields for a new student; the id is generated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub full_name: String,
    pub contact_no: String,
    pub course: String,
    pub enrolled_year: i32,
}

/// Partial update of a student
///
/// Course and enrolment year are part of the id and stay fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Lifecycle state of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    CheckedOut,
    Returned,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::CheckedOut => "Checked Out",
            TransactionStatus::Returned => "Returned",
        }
    }
}

/// One checkout-to-return record
///
/// Book title and student name/course are snapshots taken at checkout and
/// are never refreshed from later edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub book_id: u64,
    pub book_title: String,
    pub student_id: String,
    pub student_name: String,
    pub student_course: String,
    pub checkout_date: NaiveDate,
    pub checkin_date: Option<NaiveDate>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Whether the copy is still out
    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::CheckedOut
    }
}

/// A course offered by the institution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Natural primary key, e.g. "BCA"
    pub code: String,
    pub name: String,
    /// Length in years
    pub duration: u32,
    pub credits: u32,
}

impl Course {
    pub fn new(code: impl Into<String>, name: impl Into<String>, duration: u32, credits: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            duration,
            credits,
        }
    }
}

/// Partial update of a course
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// An administrator account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Stored and compared as plain text
    pub password: String,
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// One audit entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: u64,
    /// Username of the actor
    pub user: String,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl Record for Book {
    const COLLECTION: &'static str = collections::BOOKS;
    const ENTITY: &'static str = "Book";

    fn key(&self) -> RecordKey {
        RecordKey::Id(self.id)
    }
}

impl SyntheticId for Book {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Searchable for Book {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.author.as_str(), self.isbn.as_str(), self.course.as_str()]
    }
}

impl Record for Student {
    const COLLECTION: &'static str = collections::STUDENTS;
    const ENTITY: &'static str = "Student";

    fn key(&self) -> RecordKey {
        RecordKey::Code(self.id.clone())
    }
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.full_name.as_str(), self.contact_no.as_str(), self.course.as_str()]
    }
}

impl Record for Transaction {
    const COLLECTION: &'static str = collections::TRANSACTIONS;
    const ENTITY: &'static str = "Transaction";

    fn key(&self) -> RecordKey {
        RecordKey::Id(self.id)
    }
}

impl SyntheticId for Transaction {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.book_title.as_str(), self.student_name.as_str(), self.student_id.as_str()]
    }
}

impl Record for Course {
    const COLLECTION: &'static str = collections::COURSES;
    const ENTITY: &'static str = "Course";

    fn key(&self) -> RecordKey {
        RecordKey::Code(self.code.clone())
    }
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.code.as_str(), self.name.as_str()]
    }
}

impl Record for User {
    const COLLECTION: &'static str = collections::USERS;
    const ENTITY: &'static str = "User";

    fn key(&self) -> RecordKey {
        RecordKey::Id(self.id)
    }
}

impl SyntheticId for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Record for SystemLog {
    const COLLECTION: &'static str = collections::SYSTEM_LOGS;
    const ENTITY: &'static str = "Log entry";

    fn key(&self) -> RecordKey {
        RecordKey::Id(self.id)
    }
}

impl SyntheticId for SystemLog {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Searchable for SystemLog {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.user.as_str(), self.action.as_str(), self.details.as_str()]
    }
}
