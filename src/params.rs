/// BM25F scoring parameters: per-field weights and length boosts, the
/// saturation constant k1, and the "main" field that expands a query term to
/// every registered field.
///
/// Built once per query through `add_field`, then treated as read-only by the
/// scoring pipeline. `clone()` yields a fully independent copy, so one query
/// can never mutate another's in-flight parameters.
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Bm25fError, Result};

/// Default saturation constant.
pub const DEFAULT_K1: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25fParams {
    k1: f32,
    main_field: Option<String>,
    /// Field names in registration order. Duplicate registrations append a
    /// duplicate entry here while the maps below simply overwrite; callers
    /// are responsible for registering each field once.
    fields: Vec<String>,
    weights: HashMap<String, f32>,
    length_boosts: HashMap<String, f32>,
}

impl Default for Bm25fParams {
    fn default() -> Self {
        Bm25fParams {
            k1: DEFAULT_K1,
            main_field: None,
            fields: Vec::new(),
            weights: HashMap::new(),
            length_boosts: HashMap::new(),
        }
    }
}

impl Bm25fParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field with its length boost and weight. Appends to the
    /// field order; registering the same field twice leaves a duplicate in
    /// the order list and overwrites both map entries.
    pub fn add_field(&mut self, field: &str, length_boost: f32, weight: f32) -> &mut Self {
        self.length_boosts.insert(field.to_string(), length_boost);
        self.weights.insert(field.to_string(), weight);
        self.fields.push(field.to_string());
        self
    }

    /// Weight (boost) for a registered field.
    pub fn boost(&self, field: &str) -> Result<f32> {
        self.weights
            .get(field)
            .copied()
            .ok_or_else(|| Bm25fError::NotConfigured(field.to_string()))
    }

    /// Length-normalization strength for a registered field.
    pub fn length_boost(&self, field: &str) -> Result<f32> {
        self.length_boosts
            .get(field)
            .copied()
            .ok_or_else(|| Bm25fError::NotConfigured(field.to_string()))
    }

    /// Field names in registration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Overwrite all weights, positionally over the registered field order.
    pub fn set_field_weights(&mut self, weights: &[f32]) {
        self.weights = self
            .fields
            .iter()
            .cloned()
            .zip(weights.iter().copied())
            .collect();
    }

    /// Overwrite all length boosts, positionally over the registered field
    /// order.
    pub fn set_field_length_boosts(&mut self, length_boosts: &[f32]) {
        self.length_boosts = self
            .fields
            .iter()
            .cloned()
            .zip(length_boosts.iter().copied())
            .collect();
    }

    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Set the saturation constant. `k1 = 0` is accepted but degenerate: any
    /// non-zero field evidence then scores the full term idf.
    pub fn set_k1(&mut self, k1: f32) -> &mut Self {
        self.k1 = k1;
        self
    }

    pub fn main_field(&self) -> Option<&str> {
        self.main_field.as_deref()
    }

    /// Set the field that expands a query term to all registered fields. It
    /// need not itself be registered.
    pub fn set_main_field(&mut self, field: &str) -> &mut Self {
        self.main_field = Some(field.to_string());
        self
    }
}

impl PartialEq for Bm25fParams {
    fn eq(&self, other: &Self) -> bool {
        // k1 compared by bit pattern: exact binary equality, not tolerance.
        self.k1.to_bits() == other.k1.to_bits()
            && self.fields == other.fields
            && self.weights == other.weights
            && self.length_boosts == other.length_boosts
    }
}

impl Eq for Bm25fParams {}

impl Hash for Bm25fParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.k1.to_bits().hash(state);
        for field in &self.fields {
            field.hash(state);
            if let Some(w) = self.weights.get(field) {
                w.to_bits().hash(state);
            }
            if let Some(lb) = self.length_boosts.get(field) {
                lb.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Bm25fParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bm25fParams [k1={}, fields=[", self.k1)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}(w={}, lb={})",
                field,
                self.weights.get(field).copied().unwrap_or(1.0),
                self.length_boosts.get(field).copied().unwrap_or(1.0),
            )?;
        }
        write!(f, "]")?;
        if let Some(main) = &self.main_field {
            write!(f, ", main={}", main)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(params: &Bm25fParams) -> u64 {
        let mut hasher = DefaultHasher::new();
        params.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_add_field_and_lookup() {
        let mut params = Bm25fParams::new();
        params.add_field("title", 0.75, 2.0).add_field("body", 1.0, 1.0);

        assert_eq!(params.fields(), &["title", "body"]);
        assert_eq!(params.boost("title").unwrap(), 2.0);
        assert_eq!(params.length_boost("title").unwrap(), 0.75);
        assert_eq!(params.boost("body").unwrap(), 1.0);
    }

    #[test]
    fn test_unregistered_field_is_not_configured() {
        let params = Bm25fParams::new();
        assert!(matches!(
            params.boost("missing"),
            Err(Bm25fError::NotConfigured(_))
        ));
        assert!(matches!(
            params.length_boost("missing"),
            Err(Bm25fError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_appends() {
        let mut params = Bm25fParams::new();
        params.add_field("title", 1.0, 1.0);
        params.add_field("title", 0.5, 3.0);

        // Order list keeps the duplicate, maps keep the last registration.
        assert_eq!(params.fields(), &["title", "title"]);
        assert_eq!(params.boost("title").unwrap(), 3.0);
        assert_eq!(params.length_boost("title").unwrap(), 0.5);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut params = Bm25fParams::new();
        params.add_field("title", 1.0, 1.0);

        let mut copy = params.clone();
        copy.add_field("author", 1.0, 2.0);
        copy.set_k1(2.0);

        assert_eq!(params.fields(), &["title"]);
        assert_eq!(params.k1(), DEFAULT_K1);
        assert_eq!(copy.fields(), &["title", "author"]);
        assert!(params.boost("author").is_err());
    }

    #[test]
    fn test_bulk_setters_follow_field_order() {
        let mut params = Bm25fParams::new();
        params.add_field("title", 1.0, 1.0).add_field("body", 1.0, 1.0);
        params.set_field_weights(&[5.0, 0.5]);
        params.set_field_length_boosts(&[0.0, 0.9]);

        assert_eq!(params.boost("title").unwrap(), 5.0);
        assert_eq!(params.boost("body").unwrap(), 0.5);
        assert_eq!(params.length_boost("title").unwrap(), 0.0);
        assert_eq!(params.length_boost("body").unwrap(), 0.9);
    }

    #[test]
    fn test_eq_and_hash_are_structural() {
        let mut a = Bm25fParams::new();
        a.add_field("title", 0.75, 2.0);
        let mut b = Bm25fParams::new();
        b.add_field("title", 0.75, 2.0);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        b.set_k1(1.2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_k1_compared_by_bits() {
        let mut a = Bm25fParams::new();
        let mut b = Bm25fParams::new();
        a.set_k1(0.1 + 0.2);
        b.set_k1(0.3);
        // 0.1 + 0.2 != 0.3 in f32 bit patterns only if rounding differs;
        // either way the comparison must agree with to_bits equality.
        assert_eq!(a == b, a.k1().to_bits() == b.k1().to_bits());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut params = Bm25fParams::new();
        params
            .add_field("title", 0.75, 2.0)
            .add_field("body", 1.0, 1.0)
            .set_main_field("title")
            .set_k1(1.2);

        let json = serde_json::to_string(&params).unwrap();
        let back: Bm25fParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
        assert_eq!(back.main_field(), Some("title"));
    }

    #[test]
    fn test_display() {
        let mut params = Bm25fParams::new();
        params.add_field("title", 0.5, 2.0).set_main_field("title");
        let s = params.to_string();
        assert!(s.contains("title"));
        assert!(s.contains("k1=1"));
        assert!(s.contains("main=title"));
    }
}
