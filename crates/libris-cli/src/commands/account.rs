//! Login and password handlers

use anyhow::{anyhow, bail, Context, Result};

use libris_core::{KeyValueStore, Library, Session};

use crate::output::Output;
use crate::prompt::prompt_required;

/// Open a session for a mutating command
///
/// The password is read from the terminal when it was not given.
pub fn login<S: KeyValueStore>(
    library: &mut Library<S>,
    username: &str,
    password: Option<String>,
) -> Result<Session> {
    let password = match password {
        Some(password) => password,
        None => prompt_required("Password")?,
    };

    library
        .login(username, &password)
        .context("Failed to check credentials")?
        .ok_or_else(|| anyhow!("Invalid username or password"))
}

/// Change the logged-in user's password
pub fn passwd<S: KeyValueStore>(
    library: &mut Library<S>,
    session: &Session,
    new_password: Option<String>,
    output: &Output,
) -> Result<()> {
    let new_password = match new_password {
        Some(password) => password,
        None => {
            let first = prompt_required("New password")?;
            let second = prompt_required("Confirm new password")?;
            if first != second {
                bail!("Passwords do not match");
            }
            first
        }
    };

    library
        .change_password(session, &new_password)
        .context("Failed to change password")?;

    output.success(&format!("Password changed for {}", session.username()));
    Ok(())
}
