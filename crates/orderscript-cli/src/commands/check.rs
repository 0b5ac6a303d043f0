use orderscript_core::catalog::load_catalog;
use orderscript_core::error::ImportError;
use std::path::Path;

use crate::commands::{read_script, settings_or_default};
use crate::output;

pub fn run(
    script: &Path,
    catalog_file: &Path,
    settings_file: Option<&Path>,
    highest: u64,
    output_format: &str,
    verbose: bool,
) -> Result<(), ImportError> {
    let catalog = load_catalog(catalog_file)?;
    let settings = settings_or_default(settings_file)?;
    let raw = read_script(script)?;

    let preview = orderscript_core::preview_script(&raw, highest, &catalog, &settings)?;

    match output_format {
        "json" => output::json::print(&preview)?,
        _ => output::table::print_preview(&preview, verbose),
    }

    Ok(())
}
