use orderscript_core::catalog::load_catalog;
use orderscript_core::commit::{commit_batch, JsonFileSink};
use orderscript_core::error::ImportError;
use orderscript_core::reconcile::OverrideSet;
use std::path::Path;
use tracing::debug;

use crate::commands::{read_script, settings_or_default};

pub fn run(
    script: &Path,
    catalog_file: &Path,
    settings_file: Option<&Path>,
    highest: u64,
    confirm: Vec<u64>,
    confirm_all: bool,
    out: &Path,
) -> Result<(), ImportError> {
    let catalog = load_catalog(catalog_file)?;
    let settings = settings_or_default(settings_file)?;
    let raw = read_script(script)?;

    let preview = orderscript_core::preview_script(&raw, highest, &catalog, &settings)?;

    let overrides = if confirm_all {
        OverrideSet::confirm_all()
    } else {
        confirm.into_iter().collect()
    };

    debug!(out = %out.display(), "committing to file sink");
    let mut sink = JsonFileSink::new(out);
    let receipt = commit_batch(&preview.orders, &catalog, &settings, overrides, &mut sink)?;

    eprintln!(
        "Committed {} order(s), written to {}",
        receipt.sequence_numbers.len(),
        sink.path().display()
    );
    if !receipt.confirmed_with_warnings.is_empty() {
        let list: Vec<String> = receipt
            .confirmed_with_warnings
            .iter()
            .map(|s| format!("#{s}"))
            .collect();
        eprintln!("  accepted with warnings: {}", list.join(", "));
    }

    Ok(())
}
