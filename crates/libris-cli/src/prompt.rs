//! Interactive prompts
//!
//! Used for confirmations, credentials and field-by-field editing when the
//! values were not given as flags.

use anyhow::{bail, Result};
use std::io::{self, Write};

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    Ok(is_yes(&read_line()?))
}

/// Prompt with a default value, returns None if user keeps default
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    let input = read_line()?;
    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input))
    }
}

/// Prompt for a value that must be given
pub fn prompt_required(prompt: &str) -> Result<String> {
    if !is_interactive() {
        bail!("{} is required", prompt);
    }

    print!("{}: ", prompt);
    io::stdout().flush()?;

    let input = read_line()?;
    if input.is_empty() {
        bail!("{} is required", prompt);
    }
    Ok(input)
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
