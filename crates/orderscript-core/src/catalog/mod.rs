pub mod matcher;
pub mod schema;

use crate::error::ImportError;
use schema::Catalog;
use std::collections::HashSet;
use std::path::Path;

/// Load a catalog snapshot (a JSON array of entries) from a file.
pub fn load_catalog(path: &Path) -> Result<Catalog, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|e| ImportError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let catalog: Catalog = serde_json::from_str(&content).map_err(|e| ImportError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Parse a catalog snapshot from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<Catalog, ImportError> {
    let catalog: Catalog = serde_json::from_str(json)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Validate that ids are present and unique and that every entry has a name.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ImportError> {
    let mut seen = HashSet::new();
    for (i, entry) in catalog.entries.iter().enumerate() {
        if entry.id.is_empty() {
            return Err(ImportError::CatalogInvalid(format!(
                "entry {} has an empty id",
                i + 1
            )));
        }
        if entry.name.is_empty() {
            return Err(ImportError::CatalogInvalid(format!(
                "entry '{}' has an empty name",
                entry.id
            )));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(ImportError::CatalogInvalid(format!(
                "duplicate id '{}'",
                entry.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_valid_catalog() {
        let json = r#"[
            { "id": 7, "name": "قميص", "color": "ازرق", "size": "L", "sale_price": "120", "stock": 4 },
            { "id": "p-2", "name": "شنطة", "price": 300 }
        ]"#;
        let catalog = parse_catalog_str(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = &catalog.entries[0];
        assert_eq!(first.id, "7");
        assert_eq!(first.size, "L");
        assert_eq!(first.fields.get("sale_price"), Some(&json!("120")));
        assert_eq!(
            first.fields.keys().collect::<Vec<_>>(),
            vec!["sale_price", "stock"]
        );

        let second = catalog.get("p-2").unwrap();
        assert_eq!(second.color, "");
        assert_eq!(second.fields.get("price"), Some(&json!(300)));
    }

    #[test]
    fn test_null_color_is_empty() {
        let catalog = parse_catalog_str(r#"[{ "id": "1", "name": "x", "color": null }]"#).unwrap();
        assert_eq!(catalog.entries[0].color, "");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[{ "id": "1", "name": "a" }, { "id": "1", "name": "b" }]"#;
        assert!(matches!(
            parse_catalog_str(json),
            Err(ImportError::CatalogInvalid(_))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(parse_catalog_str(r#"[{ "id": "1", "name": "  " }]"#).is_err());
    }

    #[test]
    fn test_missing_id_rejected() {
        assert!(matches!(
            parse_catalog_str(r#"[{ "name": "a" }]"#),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        assert!(parse_catalog_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "id": "a1", "name": "جاكيت", "price": "900" }}]"#).unwrap();
        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.entries[0].name, "جاكيت");
    }

    #[test]
    fn test_load_malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::CatalogLoad { .. }));
    }
}
