use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub mod builtin;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a field is rendered. Anything the schema does not declare as `bool`
/// falls back to a text control; coercion is the only validation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Text,
}

impl FieldType {
    pub fn from_name(name: &str) -> Self {
        if name == "bool" {
            FieldType::Bool
        } else {
            FieldType::Text
        }
    }
}

/// A field value as it travels between store, form and preview endpoint.
/// Numbers only appear as schema defaults; edited values are bool or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as a text-control seed.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Text(value) => value.clone(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// One input of a connector or sub. Field names are NOT namespaced per
/// connector; every schema that reuses a name shares its stored value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl FieldSchema {
    pub fn new(name: &str, type_name: &str, default: Option<FieldValue>) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default,
        }
    }

    pub fn text(name: &str, default: &str) -> Self {
        Self::new(name, "str", Some(FieldValue::Text(default.to_string())))
    }

    pub fn flag(name: &str, default: bool) -> Self {
        Self::new(name, "bool", Some(FieldValue::Bool(default)))
    }

    pub fn field_type(&self) -> FieldType {
        FieldType::from_name(&self.type_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubSchema {
    pub key: String,
    #[serde(default)]
    pub extras: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectorSchema {
    #[serde(default)]
    pub globals: Vec<FieldSchema>,
    #[serde(default)]
    pub subs: Vec<SubSchema>,
}

impl ConnectorSchema {
    pub fn sub(&self, key: &str) -> Option<&SubSchema> {
        self.subs.iter().find(|sub| sub.key == key)
    }
}

/// Read-only map of connector name to schema, fully built before the engine
/// starts. Wire shape: `{ [name]: { globals: [...], subs: [...] } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, ConnectorSchema>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, schema: ConnectorSchema) {
        self.connectors.insert(name.to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&ConnectorSchema> {
        self.connectors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConnectorSchema)> {
        self.connectors.iter()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Globals of the named connector; a lookup miss is an empty list, never
    /// an error.
    pub fn globals_of(&self, name: Option<&str>) -> &[FieldSchema] {
        name.and_then(|name| self.get(name))
            .map(|connector| connector.globals.as_slice())
            .unwrap_or(&[])
    }

    /// Extras of the named sub; either half missing resolves to an empty list.
    pub fn extras_of(&self, name: Option<&str>, sub: Option<&str>) -> &[FieldSchema] {
        self.sub_of(name, sub)
            .map(|sub| sub.extras.as_slice())
            .unwrap_or(&[])
    }

    pub fn sub_of(&self, name: Option<&str>, sub: Option<&str>) -> Option<&SubSchema> {
        let connector = self.get(name?)?;
        connector.sub(sub?)
    }

    pub fn doc_of(&self, name: Option<&str>, sub: Option<&str>) -> Option<&str> {
        self.sub_of(name, sub)?.doc.as_deref()
    }

    /// Overlays `other` on top of this registry; same-named connectors are
    /// replaced wholesale.
    pub fn merge(&mut self, other: ConnectorRegistry) {
        self.connectors.extend(other.connectors);
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchemaError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let data = fs::read(path)?;
        let registry = serde_json::from_slice(&data)?;
        Ok(registry)
    }

    /// Merges every readable `*.json` registry file under `dir`. Files that
    /// fail to read or parse are skipped with a warning, matching the
    /// tolerant startup scan of the original loader.
    pub fn load_dir(dir: &Path) -> Self {
        let mut registry = ConnectorRegistry::new();
        let Ok(entries) = fs::read_dir(dir) else {
            return registry;
        };
        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        paths.sort();
        for path in paths {
            match Self::load_from_file(&path) {
                Ok(overlay) => registry.merge(overlay),
                Err(err) => {
                    log::warn!("skipping connector file {}: {err}", path.display());
                }
            }
        }
        registry
    }
}
