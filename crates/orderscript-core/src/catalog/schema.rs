use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One product variant in a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(deserialize_with = "deserialize_text")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub color: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub size: String,
    /// Every other key, in document order. Price-bearing fields live here.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(id: &str, name: &str, color: &str, size: &str) -> Self {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            size: size.to_string(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper for attaching a field.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

/// Read-only snapshot of the product catalog, in the collaborator's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accept strings, numbers or null for text columns; ids often arrive as integers.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected text, found {other}"
        ))),
    }
}
