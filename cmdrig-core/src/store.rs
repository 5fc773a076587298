//! Durable field value store. One flat JSON object file of string key to
//! JSON value: `field_<name>` entries hold the last edited value of each
//! field, `lastSelectedSub` holds the last selection record. Field keys carry
//! no connector or sub qualifier; connectors that reuse a field name share
//! its stored value.

use crate::form::FormSnapshot;
use schema::{FieldSchema, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const FIELD_KEY_PREFIX: &str = "field_";
pub const LAST_SELECTION_KEY: &str = "lastSelectedSub";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionRecord {
    pub name: String,
    pub sub: String,
}

/// Last-write-wins, synchronous, no eviction. Entries are never deleted when
/// the selection moves away; they stay until a field of the same name is
/// rendered again.
#[derive(Debug)]
pub struct FieldStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FieldStore {
    /// Opens the store file, starting empty when it is missing. A malformed
    /// file fails closed: the store starts empty instead of surfacing a parse
    /// error.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read(&path) {
            Ok(data) => match serde_json::from_slice::<BTreeMap<String, Value>>(&data) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!(
                        "field store {} is malformed, starting empty: {err}",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    fn field_key(name: &str) -> String {
        format!("{FIELD_KEY_PREFIX}{name}")
    }

    /// Stored values for the given active field set. Fields with no stored
    /// value (or an unusable one) are omitted; the caller applies schema
    /// defaults.
    pub fn load_fields(&self, active: &[FieldSchema]) -> BTreeMap<String, FieldValue> {
        let mut saved = BTreeMap::new();
        for field in active {
            let Some(value) = self.entries.get(&Self::field_key(&field.name)) else {
                continue;
            };
            match coerce(value) {
                Some(value) => {
                    saved.insert(field.name.clone(), value);
                }
                None => log::warn!(
                    "stored value for field '{}' has an unsupported shape, ignoring",
                    field.name
                ),
            }
        }
        saved
    }

    /// Persists every field entry of the snapshot. The reserved selection
    /// markers live outside the snapshot's field map and are never written
    /// under a `field_` key.
    pub fn save_snapshot(&mut self, snapshot: &FormSnapshot) -> Result<(), StoreError> {
        for (name, value) in &snapshot.fields {
            self.entries
                .insert(Self::field_key(name), serde_json::to_value(value)?);
        }
        self.persist()
    }

    pub fn save_selection(&mut self, record: &SelectionRecord) -> Result<(), StoreError> {
        self.entries
            .insert(LAST_SELECTION_KEY.to_string(), serde_json::to_value(record)?);
        self.persist()
    }

    /// The last selection record, or `None` when absent or unreadable.
    pub fn load_selection(&self) -> Option<SelectionRecord> {
        let value = self.entries.get(LAST_SELECTION_KEY)?;
        match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("stored selection record is malformed, ignoring: {err}");
                None
            }
        }
    }

    /// Removes every stored field value, keeping the selection record.
    /// Returns how many entries were removed.
    pub fn clear_fields(&mut self) -> Result<usize, StoreError> {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !key.starts_with(FIELD_KEY_PREFIX));
        let removed = before - self.entries.len();
        self.persist()?;
        Ok(removed)
    }

    pub fn stored_field_names(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter_map(|key| key.strip_prefix(FIELD_KEY_PREFIX))
            .map(str::to_string)
            .collect()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let data = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn coerce(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Bool(value) => Some(FieldValue::Bool(*value)),
        Value::String(value) => Some(FieldValue::Text(value.clone())),
        Value::Number(value) => value.as_f64().map(FieldValue::Number),
        _ => None,
    }
}
