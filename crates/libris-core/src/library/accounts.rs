//! Users, sessions and the audit log

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{LibraryError, LibraryResult, Violation};
use crate::models::{SystemLog, User, UserPatch};
use crate::repository::{Record, RecordKey};
use crate::session::Session;
use crate::storage::KeyValueStore;

use super::Library;

/// Audit action names
pub mod actions {
    pub const LOGIN: &str = "Login";
    pub const LOGOUT: &str = "Logout";
    pub const PASSWORD_CHANGE: &str = "Password Change";
    pub const BOOK_ADDED: &str = "Book Added";
    pub const BOOK_UPDATED: &str = "Book Updated";
    pub const BOOK_DELETED: &str = "Book Deleted";
    pub const COPIES_INCREASED: &str = "Copies Increased";
    pub const COPIES_DECREASED: &str = "Copies Decreased";
    pub const STUDENT_ADDED: &str = "Student Added";
    pub const STUDENT_UPDATED: &str = "Student Updated";
    pub const STUDENT_DELETED: &str = "Student Deleted";
    pub const BOOK_CHECKOUT: &str = "Book Checkout";
    pub const BOOK_CHECKIN: &str = "Book Checkin";
    pub const COURSE_CREATION: &str = "Course Creation";
    pub const COURSE_EDIT: &str = "Course Edit";
    pub const COURSE_DELETION: &str = "Course Deletion";
    pub const EXPORT_RECORDS: &str = "Export Records";
}

impl<S: KeyValueStore> Library<S> {
    /// Check credentials against the stored accounts
    ///
    /// Passwords are compared as plain text and the account must be active.
    /// On success `lastLogin` is set to now; on failure nothing is written.
    pub fn authenticate(&mut self, username: &str, password: &str) -> LibraryResult<Option<User>> {
        let Some(mut user) = self.user_by_username(username)? else {
            return Ok(None);
        };

        if user.password != password || !user.is_active {
            return Ok(None);
        }

        let now = Utc::now();
        self.users_repo().update(
            &RecordKey::Id(user.id),
            &UserPatch {
                last_login: Some(now),
                ..UserPatch::default()
            },
        )?;
        user.last_login = Some(now);

        Ok(Some(user))
    }

    /// Authenticate and open a session, recording the login
    pub fn login(&mut self, username: &str, password: &str) -> LibraryResult<Option<Session>> {
        let Some(user) = self.authenticate(username, password)? else {
            info!("Rejected login for '{}'", username);
            return Ok(None);
        };

        let session = Session::new(user);
        self.audit(&session, actions::LOGIN, "Admin logged into the system");
        Ok(Some(session))
    }

    /// Close a session, recording the logout
    pub fn logout(&mut self, session: Session) {
        self.audit(&session, actions::LOGOUT, "Admin logged out of the system");
    }

    /// All accounts
    pub fn users(&self) -> LibraryResult<Vec<User>> {
        Ok(self.users_repo().get_all()?)
    }

    /// Find an account by exact username
    pub fn user_by_username(&self, username: &str) -> LibraryResult<Option<User>> {
        Ok(self
            .users_repo()
            .get_all()?
            .into_iter()
            .find(|user| user.username == username))
    }

    /// Replace the session user's password
    pub fn change_password(&mut self, session: &Session, new_password: &str) -> LibraryResult<()> {
        if new_password.is_empty() {
            return Err(Violation::InvalidInput("password must not be empty".to_string()).into());
        }

        let key = RecordKey::Id(session.user().id);
        let updated = self.users_repo().update(
            &key,
            &UserPatch {
                password: Some(new_password.to_string()),
                ..UserPatch::default()
            },
        )?;
        if !updated {
            return Err(LibraryError::not_found(User::ENTITY, session.username()));
        }

        self.audit(session, actions::PASSWORD_CHANGE, "Admin changed their password");
        Ok(())
    }

    /// Append an entry to the audit log
    pub fn append_log(&mut self, user: &str, action: &str, details: &str) -> LibraryResult<u64> {
        let entry = SystemLog {
            id: 0,
            user: user.to_string(),
            action: action.to_string(),
            details: details.to_string(),
            timestamp: Utc::now(),
        };
        Ok(self.logs_repo().add(entry)?)
    }

    /// Record an action for the session user
    ///
    /// Never fails the caller: a log write that cannot be stored is reported
    /// through `tracing` and dropped.
    pub fn audit(&mut self, session: &Session, action: &str, details: &str) {
        if let Err(e) = self.append_log(session.username(), action, details) {
            warn!("Failed to record '{}' in the audit log: {}", action, e);
        }
    }

    /// Every audit entry, oldest first
    pub fn logs(&self) -> LibraryResult<Vec<SystemLog>> {
        Ok(self.logs_repo().get_all()?)
    }

    /// Audit entries whose user, action or details contain `query`
    pub fn search_logs(&self, query: &str) -> LibraryResult<Vec<SystemLog>> {
        Ok(self.logs_repo().search(query)?)
    }

    /// The newest `limit` entries, newest first
    pub fn recent_logs(&self, limit: usize) -> LibraryResult<Vec<SystemLog>> {
        let logs = self.logs()?;
        Ok(newest_first(logs, limit))
    }
}

/// Keep the last `limit` entries and reverse them
pub(crate) fn newest_first(logs: Vec<SystemLog>, limit: usize) -> Vec<SystemLog> {
    let skip = logs.len().saturating_sub(limit);
    logs.into_iter().skip(skip).rev().collect()
}
