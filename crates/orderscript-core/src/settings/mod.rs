pub mod schema;

use crate::error::ImportError;
use crate::parsing::fields::ExtractOptions;
use rust_decimal::Decimal;
use schema::{AdjustmentKind, ImportSettings};
use std::path::Path;

/// Load import settings from a JSON file.
pub fn load_settings(path: &Path) -> Result<ImportSettings, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|e| ImportError::SettingsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let settings: ImportSettings =
        serde_json::from_str(&content).map_err(|e| ImportError::SettingsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Parse import settings from a JSON string (no file path context).
pub fn parse_settings_str(json: &str) -> Result<ImportSettings, ImportError> {
    let settings: ImportSettings = serde_json::from_str(json)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Check value ranges that serde cannot express.
pub fn validate_settings(settings: &ImportSettings) -> Result<(), ImportError> {
    let rates = &settings.rates;
    check_rate("discount", rates.discount_type, rates.discount_value)?;
    check_rate("tax", rates.tax_type, rates.tax_value)?;

    if settings.price_fields.is_empty() {
        return Err(ImportError::SettingsInvalid(
            "price_fields must not be empty".into(),
        ));
    }
    if let Some(blank) = settings.price_fields.iter().find(|f| f.trim().is_empty()) {
        return Err(ImportError::SettingsInvalid(format!(
            "price_fields contains a blank key '{blank}'"
        )));
    }
    if settings.name_line_max_chars == 0 {
        return Err(ImportError::SettingsInvalid(
            "name_line_max_chars must be at least 1".into(),
        ));
    }
    Ok(())
}

fn check_rate(what: &str, kind: AdjustmentKind, value: Decimal) -> Result<(), ImportError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ImportError::SettingsInvalid(format!(
            "{what} value {value} must not be negative"
        )));
    }
    if kind == AdjustmentKind::Percent && value > Decimal::ONE_HUNDRED {
        return Err(ImportError::SettingsInvalid(format!(
            "{what} percent {value} exceeds 100"
        )));
    }
    Ok(())
}

impl ImportSettings {
    /// Field-extraction knobs derived from these settings.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            name_line_max_chars: self.name_line_max_chars,
        }
    }
}
