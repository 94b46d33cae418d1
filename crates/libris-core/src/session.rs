//! Authenticated session
//!
//! A `Session` names the user on whose behalf mutating operations run. It is
//! obtained from [`crate::Library::login`] and passed explicitly to every
//! call that writes, so audit entries always carry the acting username.

use crate::models::User;

/// The logged-in user
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}
