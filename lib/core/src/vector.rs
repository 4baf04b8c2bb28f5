use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::normalize::flatten_json;

/// Split text into lowercase tokens.
///
/// Any maximal run of characters other than ASCII letters, decimal digits and
/// the Spanish accented letters (á é í ó ú ñ) separates tokens.
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[inline]
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ñ')
}

/// Bag-of-words term-frequency vector
///
/// Terms keep the order in which they were first seen. That order breaks ties
/// when picking the top terms of a vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "TermVectorData", into = "TermVectorData")]
pub struct TermVector {
    summary: String,
    terms: Vec<(String, f64)>,
    index: AHashMap<String, usize>,
}

impl TermVector {
    /// Build a vector from already normalized text
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut vector = Self {
            summary: text.to_string(),
            ..Self::default()
        };
        for token in tokenize(text) {
            vector.add(token, 1.0);
        }
        vector
    }

    /// Normalize a JSON value and vectorize the resulting text
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self::from_text(&flatten_json(value))
    }

    /// Token-wise arithmetic mean of `vectors`
    ///
    /// The result has an empty summary. An empty input yields an empty vector.
    #[must_use]
    pub fn mean<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a TermVector>,
    {
        let mut acc = Self::default();
        let mut count = 0usize;
        for vector in vectors {
            count += 1;
            for (term, weight) in &vector.terms {
                acc.add(term.clone(), *weight);
            }
        }
        if count > 0 {
            let n = count as f64;
            for (_, weight) in &mut acc.terms {
                *weight /= n;
            }
        }
        acc
    }

    fn add(&mut self, term: String, weight: f64) {
        match self.index.get(&term) {
            Some(&pos) => self.terms[pos].1 += weight,
            None => {
                self.index.insert(term.clone(), self.terms.len());
                self.terms.push((term, weight));
            }
        }
    }

    /// The text this vector was built from
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[inline]
    #[must_use]
    pub fn get(&self, term: &str) -> f64 {
        self.index.get(term).map(|&pos| self.terms[pos].1).unwrap_or(0.0)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms with their frequencies, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Euclidean norm of the frequency vector
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.squared_magnitude().sqrt()
    }

    #[inline]
    fn squared_magnitude(&self) -> f64 {
        self.terms.iter().map(|(_, w)| w * w).sum()
    }

    /// Compute cosine similarity with another vector
    ///
    /// Returns exactly 0.0 when either vector is empty.
    #[inline]
    pub fn cosine_similarity(&self, other: &TermVector) -> f64 {
        cosine_similarity(self, other)
    }

    /// The `n` most frequent terms, ties kept in first-seen order
    pub fn top_terms(&self, n: usize) -> Vec<&str> {
        let mut ranked: Vec<&(String, f64)> = self.terms.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().take(n).map(|(t, _)| t.as_str()).collect()
    }

    /// Cluster label: top four terms joined by spaces, else `fallback`
    pub fn label_or(&self, fallback: &str) -> String {
        let top = self.top_terms(4);
        if top.is_empty() {
            fallback.to_string()
        } else {
            top.join(" ")
        }
    }
}

impl PartialEq for TermVector {
    fn eq(&self, other: &Self) -> bool {
        self.summary == other.summary
            && self.len() == other.len()
            && self.iter().all(|(t, w)| other.index.contains_key(t) && other.get(t) == w)
    }
}

/// Cosine similarity between two term-frequency vectors
///
/// Symmetric, in `[0, 1]`, and exactly 0.0 (never NaN) when either vector has
/// zero magnitude.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let dot: f64 = small.iter().map(|(term, w)| w * large.get(term)).sum();
    let mag_a = a.squared_magnitude();
    let mag_b = b.squared_magnitude();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b).sqrt()).clamp(0.0, 1.0)
}

#[derive(Serialize, Deserialize)]
struct TermVectorData {
    summary: String,
    frequencies: Vec<(String, f64)>,
}

impl From<TermVectorData> for TermVector {
    fn from(data: TermVectorData) -> Self {
        let mut vector = TermVector {
            summary: data.summary,
            ..TermVector::default()
        };
        for (term, weight) in data.frequencies {
            vector.add(term, weight);
        }
        vector
    }
}

impl From<TermVector> for TermVectorData {
    fn from(vector: TermVector) -> Self {
        TermVectorData {
            summary: vector.summary,
            frequencies: vector.terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokenize_keeps_accents_and_digits() {
        assert_eq!(
            tokenize("Técnico-Auxiliar, año 2024 (ÑANDÚ)"),
            vec!["técnico", "auxiliar", "año", "2024", "ñandú"]
        );
    }

    #[test]
    fn test_tokenize_splits_other_letters() {
        // ü and ç are not token characters
        assert_eq!(tokenize("pingüino façade"), vec!["ping", "ino", "fa", "ade"]);
        assert!(tokenize(" -- ;; ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_from_text_counts_frequencies() {
        let v = TermVector::from_text("bombero bombero municipal");
        assert_eq!(v.len(), 2);
        assert_eq!(v.get("bombero"), 2.0);
        assert_eq!(v.get("municipal"), 1.0);
        assert_eq!(v.get("medicina"), 0.0);
        assert_eq!(v.summary(), "bombero bombero municipal");
    }

    #[test]
    fn test_from_value_flattens() {
        let v = TermVector::from_value(&json!({"a": "Medicina Interna", "b": [2024]}));
        assert_eq!(v.iter().map(|(t, _)| t).collect::<Vec<_>>(), vec!["medicina", "interna", "2024"]);
    }

    #[test]
    fn test_self_similarity_is_one() {
        for text in ["bombero", "a b c a a", "médico de guardia 24h"] {
            let v = TermVector::from_text(text);
            assert_eq!(cosine_similarity(&v, &v), 1.0);
        }
    }

    #[test]
    fn test_similarity_symmetric_and_bounded() {
        let a = TermVector::from_text("bombero municipal bombero");
        let b = TermVector::from_text("bombero forestal");
        let ab = cosine_similarity(&a, &b);
        assert_eq!(ab, cosine_similarity(&b, &a));
        assert!(ab > 0.0 && ab < 1.0);
    }

    #[test]
    fn test_similarity_with_empty_is_zero() {
        let a = TermVector::from_text("bombero");
        let empty = TermVector::from_text("");
        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn test_disjoint_vectors_are_orthogonal() {
        let a = TermVector::from_text("bombero municipal");
        let b = TermVector::from_text("medicina interna");
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    #[test]
    fn test_known_cosine_value() {
        let a = TermVector::from_text("bombero");
        let b = TermVector::from_text("bombero municipal");
        assert!((a.cosine_similarity(&b) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mean_vector() {
        let a = TermVector::from_text("x y");
        let b = TermVector::from_text("y y z");
        let m = TermVector::mean([&a, &b]);
        assert_eq!(m.get("x"), 0.5);
        assert_eq!(m.get("y"), 1.5);
        assert_eq!(m.get("z"), 0.5);
        assert_eq!(m.summary(), "");
        assert!(TermVector::mean(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_label_uses_top_terms_with_stable_ties() {
        let v = TermVector::from_text("c a b a d e b");
        assert_eq!(v.top_terms(4), vec!["a", "b", "c", "d"]);
        assert_eq!(v.label_or("fallback"), "a b c d");
        assert_eq!(TermVector::from_text("").label_or("Sin clasificar"), "Sin clasificar");
    }

    #[test]
    fn test_serde_keeps_term_order() {
        let v = TermVector::from_text("uno dos uno");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, json!({"summary": "uno dos uno", "frequencies": [["uno", 2.0], ["dos", 1.0]]}));
        let back: TermVector = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }
}
