//! Dashboard and per-course statistics
//!
//! Always recomputed from the stored collections; nothing is cached.

use std::cmp::Reverse;

use serde::Serialize;

use crate::error::LibraryResult;
use crate::models::Transaction;
use crate::storage::KeyValueStore;

use super::Library;

/// Library-wide totals
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    /// Number of titles
    pub total_books: usize,
    pub total_copies: u64,
    pub available_copies: u64,
    /// Copies currently out (open transactions)
    pub checked_out_books: usize,
    pub total_students: usize,
    pub total_transactions: usize,
}

/// Totals for one course
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub course_code: String,
    pub course_name: String,
    pub total_books: usize,
    pub total_copies: u64,
    pub available_copies: u64,
    pub total_students: usize,
}

/// Transactions shown as recent activity on the dashboard
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Everything the dashboard shows, in one snapshot
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub library_name: String,
    pub library: LibraryStats,
    pub courses: Vec<CourseStats>,
    pub recent_activity: Vec<Transaction>,
}

impl<S: KeyValueStore> Library<S> {
    pub fn dashboard(&self) -> LibraryResult<Dashboard> {
        Ok(Dashboard {
            library_name: self.config().library_name.clone(),
            library: self.library_stats()?,
            courses: self.course_stats()?,
            recent_activity: self.recent_transactions(RECENT_ACTIVITY_LIMIT)?,
        })
    }

    /// The `limit` most recent transactions, newest checkout first
    ///
    /// Same-day checkouts are ordered by id, later ones first.
    pub fn recent_transactions(&self, limit: usize) -> LibraryResult<Vec<Transaction>> {
        let mut transactions = self.transactions()?;
        transactions.sort_by_key(|t| Reverse((t.checkout_date, t.id)));
        transactions.truncate(limit);
        Ok(transactions)
    }

    pub fn library_stats(&self) -> LibraryResult<LibraryStats> {
        let books = self.books()?;
        let transactions = self.transactions()?;

        Ok(LibraryStats {
            total_books: books.len(),
            total_copies: books.iter().map(|b| u64::from(b.total_copies)).sum(),
            available_copies: books.iter().map(|b| u64::from(b.available_copies)).sum(),
            checked_out_books: transactions.iter().filter(|t| t.is_open()).count(),
            total_students: self.students_repo().count_where(|_| true)?,
            total_transactions: transactions.len(),
        })
    }

    /// One entry per course, in catalogue order
    pub fn course_stats(&self) -> LibraryResult<Vec<CourseStats>> {
        let books = self.books()?;
        let students = self.students()?;

        Ok(self
            .courses()?
            .into_iter()
            .map(|course| {
                let course_books: Vec<_> = books.iter().filter(|b| b.course == course.code).collect();
                CourseStats {
                    total_books: course_books.len(),
                    total_copies: course_books.iter().map(|b| u64::from(b.total_copies)).sum(),
                    available_copies: course_books
                        .iter()
                        .map(|b| u64::from(b.available_copies))
                        .sum(),
                    total_students: students.iter().filter(|s| s.course == course.code).count(),
                    course_code: course.code,
                    course_name: course.name,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::{admin, library, new_book};
    use crate::models::NewStudent;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_library_stats() {
        let library = library();
        assert_eq!(library.library_stats().unwrap(), LibraryStats::default());

        let per_course = library.course_stats().unwrap();
        assert_eq!(per_course.len(), 6);
        assert!(per_course.iter().all(|c| c.total_books == 0 && c.total_students == 0));
    }

    #[test]
    fn test_stats_follow_circulation() {
        let mut library = library();
        let session = admin(&mut library);
        let physics = library.add_book(&session, new_book("Physics", "BCA", 3)).unwrap();
        library.add_book(&session, new_book("Finance", "BBA", 2)).unwrap();
        let student = library
            .add_student(
                &session,
                NewStudent {
                    full_name: "Sita".to_string(),
                    contact_no: "9800000000".to_string(),
                    course: "BCA".to_string(),
                    enrolled_year: 2024,
                },
            )
            .unwrap();
        let txn = library.checkout(&session, physics, &student).unwrap();
        library.checkout(&session, physics, &student).unwrap();
        library.checkin(&session, txn.id).unwrap();

        let stats = library.library_stats().unwrap();
        assert_eq!(
            stats,
            LibraryStats {
                total_books: 2,
                total_copies: 5,
                available_copies: 4,
                checked_out_books: 1,
                total_students: 1,
                total_transactions: 2,
            }
        );

        let per_course = library.course_stats().unwrap();
        let bca = &per_course[0];
        assert_eq!(bca.course_code, "BCA");
        assert_eq!(bca.course_name, "Bachelor of Computer Applications");
        assert_eq!(bca.total_books, 1);
        assert_eq!(bca.total_copies, 3);
        assert_eq!(bca.available_copies, 2);
        assert_eq!(bca.total_students, 1);

        let bba = &per_course[1];
        assert_eq!(bba.total_books, 1);
        assert_eq!(bba.available_copies, 2);
        assert_eq!(bba.total_students, 0);
    }

    #[test]
    fn test_recent_transactions_newest_first() {
        let mut library = library();
        let session = admin(&mut library);
        let book = library.add_book(&session, new_book("Physics", "BCA", 10)).unwrap();
        let student = library
            .add_student(
                &session,
                NewStudent {
                    full_name: "Sita".to_string(),
                    contact_no: "9800000000".to_string(),
                    course: "BCA".to_string(),
                    enrolled_year: 2024,
                },
            )
            .unwrap();
        for _ in 0..7 {
            library.checkout(&session, book, &student).unwrap();
        }

        // Backdate the first loan so date ordering wins over id ordering
        let mut transactions = library.transactions().unwrap();
        transactions[0].checkout_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        library.transactions_repo().replace_all(&transactions).unwrap();

        let recent = library.recent_transactions(RECENT_ACTIVITY_LIMIT).unwrap();
        let ids: Vec<u64> = recent.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 7, 6, 5, 4]);

        assert_eq!(library.recent_transactions(100).unwrap().len(), 7);
        assert!(library.recent_transactions(0).unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_carries_library_name() {
        let library = library();
        let dashboard = library.dashboard().unwrap();

        assert_eq!(dashboard.library_name, library.config().library_name);
        assert_eq!(dashboard.courses.len(), 6);
        assert!(dashboard.recent_activity.is_empty());

        let value = serde_json::to_value(&dashboard).unwrap();
        assert!(value.get("recentActivity").is_some());
        assert!(value.get("libraryName").is_some());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let value = serde_json::to_value(LibraryStats::default()).unwrap();
        assert!(value.get("checkedOutBooks").is_some());
        assert!(value.get("totalTransactions").is_some());
    }
}
