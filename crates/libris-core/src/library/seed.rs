//! First-run seeding
//!
//! Collections that have never been written are created: the default
//! course catalogue, a single admin account, and empty books, students,
//! transactions and logs. Collections that already exist are left alone,
//! even when empty.

use chrono::Utc;
use tracing::info;

use crate::error::LibraryResult;
use crate::models::{collections, Course, User};
use crate::repository::Repository;
use crate::storage::KeyValueStore;

use super::Library;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// The course catalogue installed on first run
pub fn default_courses() -> Vec<Course> {
    vec![
        Course::new("BCA", "Bachelor of Computer Applications", 3, 120),
        Course::new("BBA", "Bachelor of Business Administration", 3, 120),
        Course::new(
            "BALLB",
            "Bachelor of Arts and Bachelor of Legislative Law",
            5,
            200,
        ),
        Course::new("MBA", "Master of Business Administration", 2, 60),
        Course::new(
            "BSc CSIT",
            "Bachelor of Science in Computer Science and Information Technology",
            4,
            160,
        ),
        Course::new("BDBM", "Bachelor of Digital Business Management", 3, 120),
    ]
}

fn default_admin() -> User {
    User {
        id: 1,
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password: DEFAULT_ADMIN_PASSWORD.to_string(),
        full_name: "System Administrator".to_string(),
        role: "admin".to_string(),
        email: "admin@rju.edu.np".to_string(),
        last_login: None,
        is_active: true,
        created_at: Some(Utc::now()),
    }
}

impl<S: KeyValueStore> Library<S> {
    /// Create any collection that does not exist yet
    ///
    /// Returns the names of the collections that were created.
    pub(crate) fn seed_defaults(&self) -> LibraryResult<Vec<&'static str>> {
        let mut seeded = Vec::new();

        for name in [
            collections::BOOKS,
            collections::STUDENTS,
            collections::TRANSACTIONS,
            collections::SYSTEM_LOGS,
        ] {
            if !self.store.contains(name)? {
                self.store.write(name, Vec::new())?;
                seeded.push(name);
            }
        }

        if !self.store.contains(collections::COURSES)? {
            Repository::<Course>::new(&self.store).replace_all(&default_courses())?;
            seeded.push(collections::COURSES);
        }

        if !self.store.contains(collections::USERS)? {
            Repository::<User>::new(&self.store).replace_all(&[default_admin()])?;
            seeded.push(collections::USERS);
        }

        if !seeded.is_empty() {
            info!("Seeded collections: {}", seeded.join(", "));
        }
        Ok(seeded)
    }
}
