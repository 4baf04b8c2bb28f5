//! Field-level differences between two documents
//!
//! A fixed, ordered table of tracked fields is compared. Each field has a
//! label, a key path into the nested document and a formatter. Only fields
//! whose formatted values differ are reported, in table order.

use concursim_core::is_truthy;
use concursim_core::normalize::number_to_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for an empty formatted value
pub const NOT_AVAILABLE: &str = "N/A";

/// Result of resolving a key path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Present(&'a Value),
    Absent,
}

impl<'a> FieldValue<'a> {
    /// Resolve `path` in `doc`
    ///
    /// Absent when a segment is missing or the current value is not a mapping.
    pub fn lookup<S: AsRef<str>>(doc: &'a Value, path: &[S]) -> Self {
        let mut current = doc;
        for key in path {
            match current.as_object().and_then(|map| map.get(key.as_ref())) {
                Some(next) => current = next,
                None => return FieldValue::Absent,
            }
        }
        FieldValue::Present(current)
    }

    pub fn value(self) -> Option<&'a Value> {
        match self {
            FieldValue::Present(v) => Some(v),
            FieldValue::Absent => None,
        }
    }
}

/// How a tracked value is rendered before comparison
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Plain string form, absent and null render empty
    #[default]
    Text,
    /// "Sí" when truthy, "No" otherwise
    YesNo,
}

impl ValueFormat {
    pub fn format(self, value: FieldValue<'_>) -> String {
        match self {
            ValueFormat::Text => value.value().map(stringify).unwrap_or_default(),
            ValueFormat::YesNo => {
                let yes = is_truthy(value.value());
                (if yes { "Sí" } else { "No" }).to_string()
            }
        }
    }
}

/// Plain string form of a JSON value
///
/// Arrays join their elements with commas and objects render as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// One entry of the diff table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedField {
    pub label: String,
    pub path: Vec<String>,
    #[serde(default)]
    pub format: ValueFormat,
}

impl TrackedField {
    pub fn text(label: &str, path: &[&str]) -> Self {
        Self::new(label, path, ValueFormat::Text)
    }

    pub fn yes_no(label: &str, path: &[&str]) -> Self {
        Self::new(label, path, ValueFormat::YesNo)
    }

    fn new(label: &str, path: &[&str], format: ValueFormat) -> Self {
        Self {
            label: label.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
            format,
        }
    }

    /// Formatted value of this field in `doc`
    pub fn render(&self, doc: &Value) -> String {
        self.format.format(FieldValue::lookup(doc, &self.path))
    }
}

/// A tracked field whose value changed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifferenceDetail {
    pub label: String,
    pub previous_value: String,
    pub current_value: String,
}

/// Ordered table of tracked fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSchema {
    pub fields: Vec<TrackedField>,
}

impl Default for DiffSchema {
    fn default() -> Self {
        Self {
            fields: vec![
                TrackedField::text("Especialidad", &["especialidad"]),
                TrackedField::yes_no("Tasas", &["bloques_detectados", "pide_tasas"]),
                TrackedField::yes_no(
                    "Adaptación discapacidad",
                    &["bloques_detectados", "solicita_adaptacion_discapacidad"],
                ),
                TrackedField::yes_no("Carnet Bombero", &["bloques_detectados", "especialidad_carnet_bombero"]),
                TrackedField::yes_no("Carnet Medicina", &["bloques_detectados", "especialidad_medicina"]),
                TrackedField::text("Comentarios", &["comentarios"]),
            ],
        }
    }
}

impl DiffSchema {
    pub fn new(fields: Vec<TrackedField>) -> Self {
        Self { fields }
    }

    /// Differences between `new_doc` and `old_doc`, in table order
    pub fn diff(&self, new_doc: &Value, old_doc: &Value) -> Vec<DifferenceDetail> {
        self.fields
            .iter()
            .filter_map(|field| {
                let previous = field.render(old_doc);
                let current = field.render(new_doc);
                (previous != current).then(|| DifferenceDetail {
                    label: field.label.clone(),
                    previous_value: or_not_available(previous),
                    current_value: or_not_available(current),
                })
            })
            .collect()
    }
}

fn or_not_available(value: String) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}

/// Diff two documents with the default tracked-field table
pub fn diff_documents(new_doc: &Value, old_doc: &Value) -> Vec<DifferenceDetail> {
    DiffSchema::default().diff(new_doc, old_doc)
}
