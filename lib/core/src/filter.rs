// Record filters: tri-state boolean flags and free-text search
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::record::{is_truthy, Record, DETECTED_BLOCKS_FIELD};
use crate::normalize::flatten_json;

pub trait Filter {
    fn matches(&self, record: &Record) -> bool;
}

/// Flags detected during extraction that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    PideTasas,
    SolicitaAdaptacionDiscapacidad,
    EspecialidadCarnetBombero,
    EspecialidadMedicina,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::PideTasas,
        FilterKey::SolicitaAdaptacionDiscapacidad,
        FilterKey::EspecialidadCarnetBombero,
        FilterKey::EspecialidadMedicina,
    ];

    /// Field name inside the detected-blocks object
    pub fn field_name(self) -> &'static str {
        match self {
            FilterKey::PideTasas => "pide_tasas",
            FilterKey::SolicitaAdaptacionDiscapacidad => "solicita_adaptacion_discapacidad",
            FilterKey::EspecialidadCarnetBombero => "especialidad_carnet_bombero",
            FilterKey::EspecialidadMedicina => "especialidad_medicina",
        }
    }
}

/// Tri-state boolean filters over the detected blocks of a record
///
/// `None` means "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanFilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pide_tasas: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solicita_adaptacion_discapacidad: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad_carnet_bombero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad_medicina: Option<bool>,
}

impl BooleanFilterSet {
    pub fn get(&self, key: FilterKey) -> Option<bool> {
        match key {
            FilterKey::PideTasas => self.pide_tasas,
            FilterKey::SolicitaAdaptacionDiscapacidad => self.solicita_adaptacion_discapacidad,
            FilterKey::EspecialidadCarnetBombero => self.especialidad_carnet_bombero,
            FilterKey::EspecialidadMedicina => self.especialidad_medicina,
        }
    }

    #[must_use]
    pub fn with(mut self, key: FilterKey, value: Option<bool>) -> Self {
        let slot = match key {
            FilterKey::PideTasas => &mut self.pide_tasas,
            FilterKey::SolicitaAdaptacionDiscapacidad => &mut self.solicita_adaptacion_discapacidad,
            FilterKey::EspecialidadCarnetBombero => &mut self.especialidad_carnet_bombero,
            FilterKey::EspecialidadMedicina => &mut self.especialidad_medicina,
        };
        *slot = value;
        self
    }

    /// True when every key is "don't care"
    pub fn is_unconstrained(&self) -> bool {
        FilterKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Evaluate the filters against a record's attributes
    ///
    /// A missing detected-blocks object reads as every flag `false`.
    pub fn matches_attributes(&self, attributes: &Value) -> bool {
        let blocks = attributes.get(DETECTED_BLOCKS_FIELD);
        for key in FilterKey::ALL {
            let Some(required) = self.get(key) else { continue };
            let actual = is_truthy(blocks.and_then(|b| b.get(key.field_name())));
            if actual != required {
                return false;
            }
        }
        true
    }
}

impl Filter for BooleanFilterSet {
    fn matches(&self, record: &Record) -> bool {
        self.matches_attributes(&record.attributes)
    }
}

/// Case-insensitive substring search over the flattened attributes and filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    needle: String,
}

impl TextSearch {
    pub fn new(query: &str) -> Self {
        Self { needle: query.to_lowercase() }
    }
}

impl Filter for TextSearch {
    fn matches(&self, record: &Record) -> bool {
        self.needle.is_empty()
            || flatten_json(&record.attributes).contains(&self.needle)
            || record.filename.to_lowercase().contains(&self.needle)
    }
}

/// Search text and boolean flags combined; both must match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: BooleanFilterSet,
}

impl RecordQuery {
    /// Records that pass the query, in input order
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

impl Filter for RecordQuery {
    fn matches(&self, record: &Record) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map(|q| TextSearch::new(q).matches(record))
            .unwrap_or(true);
        search_ok && self.filters.matches(record)
    }
}
