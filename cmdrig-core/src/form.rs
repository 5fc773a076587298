//! Form control model. Controls are structured state owned by the session;
//! the rendering surface draws them and mutates their values in place, so
//! field names and values are never spliced into markup.

use schema::{FieldSchema, FieldType, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Toggle(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub name: String,
    /// Declared type name, shown next to text controls.
    pub type_name: String,
    pub kind: ControlKind,
}

/// Seeds one control per field: the stored value wins, then the schema
/// default, then false / empty text.
pub fn render_fields(
    fields: &[FieldSchema],
    saved: &BTreeMap<String, FieldValue>,
) -> Vec<Control> {
    fields
        .iter()
        .map(|field| {
            let saved_value = saved.get(&field.name);
            let kind = match field.field_type() {
                FieldType::Bool => {
                    let on = saved_value
                        .and_then(FieldValue::as_bool)
                        .or_else(|| field.default.as_ref().and_then(FieldValue::as_bool))
                        .unwrap_or(false);
                    ControlKind::Toggle(on)
                }
                FieldType::Text => {
                    let text = saved_value
                        .map(FieldValue::display_text)
                        .or_else(|| field.default.as_ref().map(FieldValue::display_text))
                        .unwrap_or_default();
                    ControlKind::Text(text)
                }
            };
            Control {
                name: field.name.clone(),
                type_name: field.type_name.clone(),
                kind,
            }
        })
        .collect()
}

/// The full current field state plus the selection markers, in exactly the
/// flat JSON shape the preview endpoint takes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    #[serde(rename = "__connector")]
    pub connector: Option<String>,
    #[serde(rename = "__sub")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

/// Reads live control values. Toggles always contribute; a text control with
/// an empty value is omitted (empty means unset, not stored as "").
pub fn collect_snapshot<'a>(
    connector: Option<&str>,
    sub: Option<&str>,
    controls: impl IntoIterator<Item = &'a Control>,
) -> FormSnapshot {
    let mut fields = BTreeMap::new();
    for control in controls {
        match &control.kind {
            ControlKind::Toggle(on) => {
                fields.insert(control.name.clone(), FieldValue::Bool(*on));
            }
            ControlKind::Text(text) => {
                if !text.is_empty() {
                    fields.insert(control.name.clone(), FieldValue::Text(text.clone()));
                }
            }
        }
    }
    FormSnapshot {
        connector: connector.map(str::to_string),
        sub: sub.map(str::to_string),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn stored_value_beats_schema_default() {
        let fields = vec![
            FieldSchema::text("threads", "4"),
            FieldSchema::flag("verbose", true),
        ];
        let controls = render_fields(
            &fields,
            &saved(&[
                ("threads", FieldValue::Text("8".to_string())),
                ("verbose", FieldValue::Bool(false)),
            ]),
        );
        assert_eq!(controls[0].kind, ControlKind::Text("8".to_string()));
        assert_eq!(controls[1].kind, ControlKind::Toggle(false));
    }

    #[test]
    fn default_applies_when_nothing_stored() {
        let fields = vec![
            FieldSchema::text("threads", "4"),
            FieldSchema::flag("verbose", true),
            FieldSchema::new("width", "str", None),
            FieldSchema::new("force", "bool", None),
        ];
        let controls = render_fields(&fields, &BTreeMap::new());
        assert_eq!(controls[0].kind, ControlKind::Text("4".to_string()));
        assert_eq!(controls[1].kind, ControlKind::Toggle(true));
        assert_eq!(controls[2].kind, ControlKind::Text(String::new()));
        assert_eq!(controls[3].kind, ControlKind::Toggle(false));
    }

    #[test]
    fn numeric_default_seeds_text_control() {
        let fields = vec![FieldSchema::new(
            "a",
            "int",
            Some(FieldValue::Number(1.0)),
        )];
        let controls = render_fields(&fields, &BTreeMap::new());
        assert_eq!(controls[0].kind, ControlKind::Text("1".to_string()));
    }

    #[test]
    fn mistyped_stored_value_falls_back_to_default() {
        let fields = vec![FieldSchema::flag("verbose", true)];
        let controls = render_fields(
            &fields,
            &saved(&[("verbose", FieldValue::Text("yes".to_string()))]),
        );
        assert_eq!(controls[0].kind, ControlKind::Toggle(true));
    }

    #[test]
    fn empty_text_is_omitted_from_snapshot() {
        let controls = vec![
            Control {
                name: "width".to_string(),
                type_name: "str".to_string(),
                kind: ControlKind::Text(String::new()),
            },
            Control {
                name: "verbose".to_string(),
                type_name: "bool".to_string(),
                kind: ControlKind::Toggle(false),
            },
        ];
        let snapshot = collect_snapshot(Some("ffmpeg"), Some("scale"), &controls);
        assert!(!snapshot.fields.contains_key("width"));
        assert_eq!(
            snapshot.fields.get("verbose"),
            Some(&FieldValue::Bool(false))
        );
    }

    #[test]
    fn snapshot_serializes_to_flat_wire_object() {
        let controls = vec![
            Control {
                name: "threads".to_string(),
                type_name: "str".to_string(),
                kind: ControlKind::Text("4".to_string()),
            },
            Control {
                name: "kerberos".to_string(),
                type_name: "bool".to_string(),
                kind: ControlKind::Toggle(true),
            },
        ];
        let snapshot = collect_snapshot(Some("ffmpeg"), Some("scale"), &controls);
        let json = serde_json::to_value(&snapshot).expect("serialize snapshot");
        assert_eq!(
            json,
            serde_json::json!({
                "__connector": "ffmpeg",
                "__sub": "scale",
                "threads": "4",
                "kerberos": true,
            })
        );
    }

    #[test]
    fn snapshot_without_selection_serializes_nulls() {
        let snapshot = collect_snapshot(None, None, &[]);
        let json = serde_json::to_value(&snapshot).expect("serialize snapshot");
        assert_eq!(
            json,
            serde_json::json!({"__connector": null, "__sub": null})
        );
    }
}
