use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::normalize::{flatten_json, normalize_text};

/// Attribute holding the specialty of the notice
pub const SPECIALTY_FIELD: &str = "especialidad";
/// Attribute holding the free-text description of the notice
pub const DESCRIPTION_FIELD: &str = "descripcion_convocatoria";
/// Sub-object with the boolean blocks detected during extraction
pub const DETECTED_BLOCKS_FIELD: &str = "bloques_detectados";

/// A record extracted from a scanned form
///
/// Owned by the record store. The engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "nombre_archivo")]
    pub filename: String,
    #[serde(default, alias = "json_datos")]
    pub attributes: Value,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new(id: Option<i64>, filename: impl Into<String>, attributes: Value) -> Self {
        Self {
            id,
            filename: filename.into(),
            attributes,
        }
    }

    /// Specialty label of the record, see [`extract_specialty`]
    pub fn specialty(&self) -> String {
        extract_specialty(&self.attributes)
    }

    /// Flattened, normalized text of all attributes
    pub fn full_text(&self) -> String {
        flatten_json(&self.attributes)
    }

    /// Text used to vectorize the record for clustering
    ///
    /// Specialty first, then the filename, and only when both are empty the
    /// flattened attributes.
    pub fn cluster_text(&self) -> String {
        let specialty = self.specialty();
        let text = if specialty.is_empty() { self.filename.trim() } else { specialty.as_str() };
        if text.is_empty() {
            self.full_text()
        } else {
            normalize_text(text)
        }
    }
}

/// Resolve the identifying label of a document.
///
/// First non-empty string of the specialty or description field, trimmed.
/// Empty string when neither is present.
pub fn extract_specialty(attributes: &Value) -> String {
    [SPECIALTY_FIELD, DESCRIPTION_FIELD]
        .iter()
        .filter_map(|field| attributes.get(field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Boolean coercion of a loosely typed value.
///
/// `null`, `false`, `0`, `NaN` and the empty string are false. Everything
/// else, including empty arrays and objects, is true.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_specialty_prefers_especialidad() {
        let attrs = json!({"especialidad": " Bombero ", "descripcion_convocatoria": "Otra"});
        assert_eq!(extract_specialty(&attrs), "Bombero");
    }

    #[test]
    fn test_specialty_falls_back_to_description() {
        let attrs = json!({"especialidad": "", "descripcion_convocatoria": "Plaza de medicina"});
        assert_eq!(extract_specialty(&attrs), "Plaza de medicina");
        assert_eq!(extract_specialty(&json!({"otro": 1})), "");
        assert_eq!(extract_specialty(&json!({"especialidad": 5})), "");
    }

    #[test]
    fn test_cluster_text_fallbacks() {
        let with_specialty = Record::new(Some(1), "a.pdf", json!({"especialidad": "Bombero  Municipal"}));
        assert_eq!(with_specialty.cluster_text(), "bombero municipal");

        let with_filename = Record::new(Some(2), "Convocatoria_2024.pdf", json!({"x": "y"}));
        assert_eq!(with_filename.cluster_text(), "convocatoria_2024.pdf");

        let flattened = Record::new(None, "", json!({"x": "Texto Libre"}));
        assert_eq!(flattened.cluster_text(), "texto libre");
    }

    #[test]
    fn test_record_accepts_store_aliases() {
        let record: Record = serde_json::from_value(json!({
            "id": 7,
            "nombre_archivo": "doc.pdf",
            "json_datos": {"especialidad": "Medicina"}
        }))
        .unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.filename, "doc.pdf");
        assert_eq!(record.specialty(), "Medicina");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(is_truthy(Some(&json!("no"))));
        assert!(is_truthy(Some(&json!(1.5))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!(true))));
    }
}
