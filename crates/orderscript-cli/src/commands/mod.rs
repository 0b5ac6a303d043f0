pub mod check;
pub mod commit;
pub mod parse;
pub mod settings;

use orderscript_core::error::ImportError;
use orderscript_core::settings::load_settings;
use orderscript_core::settings::schema::ImportSettings;
use std::io::Read;
use std::path::Path;

/// Read the script from a file, or from stdin when the path is "-".
pub fn read_script(path: &Path) -> Result<String, ImportError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn settings_or_default(path: Option<&Path>) -> Result<ImportSettings, ImportError> {
    match path {
        Some(p) => load_settings(p),
        None => Ok(ImportSettings::default()),
    }
}
