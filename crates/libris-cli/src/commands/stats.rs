//! Dashboard handler

use anyhow::Result;

use libris_core::{KeyValueStore, Library};

use crate::output::Output;

pub fn show<S: KeyValueStore>(library: &Library<S>, output: &Output) -> Result<()> {
    let dashboard = library.dashboard()?;

    output.print_dashboard(&dashboard);
    Ok(())
}
