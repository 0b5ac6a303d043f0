use orderscript_core::error::ImportError;
use std::path::Path;

use crate::commands::{read_script, settings_or_default};
use crate::output;

pub fn run(
    script: &Path,
    settings_file: Option<&Path>,
    highest: u64,
    output_format: &str,
) -> Result<(), ImportError> {
    let settings = settings_or_default(settings_file)?;
    let raw = read_script(script)?;
    let parsed = orderscript_core::parse_script(&raw, highest, &settings)?;

    match output_format {
        "json" => output::json::print(&parsed.orders)?,
        _ => output::table::print_parsed(&parsed.orders),
    }

    if let Some(preamble) = &parsed.preamble {
        eprintln!("  warning: ignored text before the first order: {preamble}");
    }
    if parsed.empty_spans > 0 {
        eprintln!(
            "  warning: {} name label(s) had no order text",
            parsed.empty_spans
        );
    }

    Ok(())
}
