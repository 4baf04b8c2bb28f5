//! Text normalization
//!
//! Flattens an arbitrary JSON value into a single lowercase string with
//! whitespace runs collapsed. Mapping keys are ignored, only values contribute.

use serde_json::Value;
use tracing::warn;

/// Bounds on recursive flattening.
///
/// Extracted documents come from an automated pipeline and may be deeply
/// nested or very large. Anything past these limits is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerLimits {
    /// Maximum nesting depth that is descended into
    pub max_depth: usize,
    /// Maximum number of values visited in total
    pub max_nodes: usize,
}

impl Default for NormalizerLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 100_000,
        }
    }
}

/// Flatten `value` into normalized text using the default limits.
#[inline]
pub fn flatten_json(value: &Value) -> String {
    flatten_json_with(value, NormalizerLimits::default())
}

/// Flatten `value` into normalized text.
///
/// Strings are lowercased, numbers and booleans use their canonical form,
/// sequences and mappings are joined with single spaces in their natural
/// order, and `null` contributes nothing.
pub fn flatten_json_with(value: &Value, limits: NormalizerLimits) -> String {
    let mut walker = Walker {
        limits,
        visited: 0,
        truncated: false,
        parts: Vec::new(),
    };
    walker.visit(value, 0);

    if walker.truncated {
        warn!(
            max_depth = limits.max_depth,
            max_nodes = limits.max_nodes,
            "document exceeded normalizer limits, flattened text truncated"
        );
    }

    collapse_whitespace(&walker.parts.join(" "))
}

/// Lowercase and collapse every whitespace run into a single space.
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical string form of a JSON number.
///
/// Integral floats print without a fractional part (`3.0` -> `"3"`).
pub fn number_to_string(number: &serde_json::Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

struct Walker {
    limits: NormalizerLimits,
    visited: usize,
    truncated: bool,
    parts: Vec<String>,
}

impl Walker {
    fn visit(&mut self, value: &Value, depth: usize) {
        if depth > self.limits.max_depth || self.visited >= self.limits.max_nodes {
            self.truncated = true;
            return;
        }
        self.visited += 1;

        match value {
            Value::Null => {}
            Value::Bool(b) => self.parts.push(b.to_string()),
            Value::Number(n) => self.parts.push(number_to_string(n)),
            Value::String(s) => self.parts.push(s.to_lowercase()),
            Value::Array(items) => {
                for item in items {
                    self.visit(item, depth + 1);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    self.visit(item, depth + 1);
                }
            }
        }
    }
}
