/// Per-field statistics resolution for BM25F scoring.
///
/// `idf(q) = ln(1 + (N - n(q) + 0.5) / (n(q) + 0.5))`
///
/// The same idf formula serves two roles: one idf per expanded field (kept on
/// the field's `FieldStats` for bookkeeping) and a single term-level idf
/// computed from the field the query originally targeted, which is the only
/// idf that feeds the combined score.
use crate::error::{Bm25fError, Result};
use crate::params::Bm25fParams;

/// Corpus-wide statistics for one field, supplied by the external index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of documents in the collection.
    pub doc_count: u64,
    /// Sum of the field's lengths (term occurrences) across the collection.
    pub sum_field_lengths: u64,
}

/// Term statistics for one (field, term) pair, supplied by the external index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermStats {
    /// Number of documents containing the term in the field.
    pub doc_freq: u64,
}

/// Inverse document frequency. Non-negative for `doc_freq <= doc_count` and
/// strictly decreasing in `doc_freq`.
pub fn idf(doc_freq: u64, doc_count: u64) -> f32 {
    let n = doc_count as f64;
    let nq = doc_freq as f64;
    (1.0 + (n - nq + 0.5) / (nq + 0.5)).ln() as f32
}

/// Resolved, immutable statistics for one (query term, expanded field) pair.
/// Shared read-only across every document and segment scored for the query.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStats {
    pub field: String,
    pub idf: f32,
    pub boost: f32,
    pub length_boost: f32,
    pub avg_field_length: f32,
    pub k1: f32,
}

impl FieldStats {
    /// Resolve a field's scoring statistics from external collection/term
    /// statistics and the parameter store. Boost and length boost default to
    /// 1.0 for fields the store does not know about.
    pub fn resolve(
        field: &str,
        collection: &CollectionStats,
        term: &TermStats,
        params: &Bm25fParams,
    ) -> Result<Self> {
        if collection.doc_count == 0 {
            return Err(Bm25fError::EmptyCorpus(field.to_string()));
        }
        let avg_field_length = collection.sum_field_lengths as f32 / collection.doc_count as f32;

        Ok(FieldStats {
            field: field.to_string(),
            idf: idf(term.doc_freq, collection.doc_count),
            boost: params.boost(field).unwrap_or(1.0),
            length_boost: params.length_boost(field).unwrap_or(1.0),
            avg_field_length,
            k1: params.k1(),
        })
    }
}
