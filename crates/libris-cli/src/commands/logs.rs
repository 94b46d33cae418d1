//! Audit log handler

use anyhow::Result;

use libris_core::{KeyValueStore, Library};

use crate::output::Output;

/// Show audit entries, newest first
///
/// Without a search the configured recent-log limit applies; a search shows
/// every match unless `--limit` is given.
pub fn show<S: KeyValueStore>(
    library: &Library<S>,
    search: Option<String>,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let logs = match search {
        Some(ref query) => {
            let mut logs = library.search_logs(query)?;
            logs.reverse();
            if let Some(limit) = limit {
                logs.truncate(limit);
            }
            logs
        }
        None => library.recent_logs(limit.unwrap_or(library.config().recent_log_limit))?,
    };

    output.print_logs(&logs);
    Ok(())
}
