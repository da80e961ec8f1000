/// Per-query weight and per-segment scorer for a single term.
///
/// `TermWeight` is the one-time setup: it expands the queried field (the main
/// field expands to every registered field), resolves one `FieldStats` per
/// expanded field and the term-level idf, and fixes the scoring strategy.
/// It is read-only afterwards and can be shared across segment scorers.
///
/// `TermScorer` union-merges one postings cursor per expanded field,
/// ascending by doc id. A document is scoreable if it appears in any field's
/// stream; fields without the term contribute nothing.
use std::sync::Arc;

use log::{debug, trace};

use crate::error::{Bm25fError, Result};
use crate::explain::Explain;
use crate::index::{CorpusReader, DocId, PostingsCursor, SegmentReader, NO_MORE_DOCS};
use crate::norm::decode_field_length;
use crate::params::Bm25fParams;
use crate::similarity::{Bm25fSimilarity, Similarity};
use crate::stats::{idf, FieldStats};

pub struct TermWeight {
    term: String,
    /// Expanded field set, one entry per consulted postings stream.
    stats: Vec<FieldStats>,
    /// Idf of the term in the field the query originally targeted.
    term_idf: f32,
    k1: f32,
    sim: Arc<dyn Similarity>,
}

impl TermWeight {
    /// Build the per-query weight with the default BM25F strategy.
    pub fn new(
        corpus: &dyn CorpusReader,
        params: &Bm25fParams,
        field: &str,
        term: &str,
    ) -> Result<Self> {
        Self::with_similarity(corpus, params, field, term, Arc::new(Bm25fSimilarity))
    }

    /// Build the per-query weight with an explicit scoring strategy. The
    /// strategy is fixed here, once, for the lifetime of the query.
    pub fn with_similarity(
        corpus: &dyn CorpusReader,
        params: &Bm25fParams,
        field: &str,
        term: &str,
        sim: Arc<dyn Similarity>,
    ) -> Result<Self> {
        let expanded: Vec<String> = if params.main_field() == Some(field) {
            params.fields().to_vec()
        } else {
            vec![field.to_string()]
        };

        let mut stats = Vec::with_capacity(expanded.len());
        for f in &expanded {
            let collection = corpus
                .collection_stats(f)
                .ok_or_else(|| Bm25fError::MissingStatistics(f.clone()))?;
            let term_stats = corpus
                .term_stats(f, term)
                .ok_or_else(|| Bm25fError::MissingStatistics(f.clone()))?;
            stats.push(FieldStats::resolve(f, &collection, &term_stats, params)?);
        }

        // Term-level idf: document frequency of the term in the field as
        // originally written, before expansion.
        let orig_collection = corpus
            .collection_stats(field)
            .ok_or_else(|| Bm25fError::MissingStatistics(field.to_string()))?;
        let orig_term = corpus
            .term_stats(field, term)
            .ok_or_else(|| Bm25fError::MissingStatistics(field.to_string()))?;
        let term_idf = idf(orig_term.doc_freq, orig_collection.doc_count);

        debug!(
            "TermWeight({}:{}): sim={}, fields={:?}, term_idf={:.4}, k1={}",
            field,
            term,
            sim.name(),
            expanded,
            term_idf,
            params.k1()
        );

        Ok(TermWeight {
            term: term.to_string(),
            stats,
            term_idf,
            k1: params.k1(),
            sim,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Expanded field names, in parameter registration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.stats.iter().map(|s| s.field.as_str())
    }

    pub fn term_idf(&self) -> f32 {
        self.term_idf
    }

    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Open a fresh scorer over one segment. A field whose postings cannot
    /// be opened fails the whole segment; a field simply missing the term
    /// contributes an empty stream.
    pub fn scorer<'a>(&'a self, segment: &'a dyn SegmentReader) -> Result<TermScorer<'a>> {
        let mut legs = Vec::with_capacity(self.stats.len());
        for stats in &self.stats {
            if let Some(cursor) = segment.postings(&stats.field, &self.term)? {
                legs.push(Leg { stats, cursor });
            }
        }
        debug!(
            "TermScorer({}): {} of {} fields have postings",
            self.term,
            legs.len(),
            self.stats.len()
        );
        Ok(TermScorer::new(self, segment, legs))
    }

    /// Structured decomposition of `score(doc)`, numerically identical to
    /// the fast path. A document with no matches in any field explains to 0
    /// with all-zero frequency leaves.
    pub fn explain(&self, segment: &dyn SegmentReader, doc: DocId) -> Result<Explain> {
        let mut scorer = self.scorer(segment)?;
        scorer.seek(doc);

        let (field_sum, subs) = if scorer.doc() == doc {
            scorer.explain_fields()
        } else {
            let zeroes = self
                .stats
                .iter()
                .map(|s| Explain::leaf(0.0, format!("tf in {}", s.field)))
                .collect();
            (0.0, zeroes)
        };

        let scores = Explain::node(field_sum, "field scores, sum of:", subs);
        let denominator = Explain::node(
            self.k1 + field_sum,
            "sum of:",
            vec![Explain::leaf(self.k1, "k1"), scores.clone()],
        );
        let ratio = if field_sum == 0.0 {
            0.0
        } else {
            field_sum / (self.k1 + field_sum)
        };
        let saturation = Explain::node(
            ratio,
            "saturation, division of:",
            vec![scores, denominator],
        );
        let value = self.sim.combine(self.term_idf, self.k1, field_sum);
        Ok(Explain::node(
            value,
            format!("[doc {}] product of:", doc),
            vec![Explain::leaf(self.term_idf, "idf"), saturation],
        ))
    }
}

struct Leg<'a> {
    stats: &'a FieldStats,
    cursor: Box<dyn PostingsCursor + 'a>,
}

pub struct TermScorer<'a> {
    weight: &'a TermWeight,
    segment: &'a dyn SegmentReader,
    legs: Vec<Leg<'a>>,
    doc: DocId,
}

impl<'a> TermScorer<'a> {
    fn new(weight: &'a TermWeight, segment: &'a dyn SegmentReader, legs: Vec<Leg<'a>>) -> Self {
        let mut scorer = TermScorer {
            weight,
            segment,
            legs,
            doc: NO_MORE_DOCS,
        };
        scorer.update_doc();
        scorer
    }

    fn update_doc(&mut self) {
        self.doc = self
            .legs
            .iter()
            .map(|leg| leg.cursor.doc())
            .min()
            .unwrap_or(NO_MORE_DOCS);
    }

    /// Current document id, `NO_MORE_DOCS` when all field streams are
    /// exhausted.
    pub fn doc(&self) -> DocId {
        self.doc
    }

    pub fn is_exhausted(&self) -> bool {
        self.doc == NO_MORE_DOCS
    }

    /// Move to the next document in the union of the field streams.
    pub fn advance(&mut self) -> DocId {
        if self.doc == NO_MORE_DOCS {
            return NO_MORE_DOCS;
        }
        let current = self.doc;
        for leg in &mut self.legs {
            if leg.cursor.doc() == current {
                leg.cursor.advance();
            }
        }
        self.update_doc();
        self.doc
    }

    /// Move to the first document >= `target` in the union.
    pub fn seek(&mut self, target: DocId) -> DocId {
        for leg in &mut self.legs {
            if leg.cursor.doc() < target {
                leg.cursor.seek(target);
            }
        }
        self.update_doc();
        self.doc
    }

    /// Summed weighted term frequency across fields matching the current
    /// document.
    fn field_sum(&self) -> f32 {
        let mut sum = 0.0;
        for leg in &self.legs {
            if leg.cursor.doc() == self.doc {
                let decoded =
                    decode_field_length(self.segment.norm(&leg.stats.field, self.doc));
                sum += self.weight.sim.field_weight(
                    leg.cursor.freq() as f32,
                    decoded,
                    leg.stats,
                );
            }
        }
        sum
    }

    /// BM25F score of the current document.
    pub fn score(&self) -> f32 {
        if self.doc == NO_MORE_DOCS {
            return 0.0;
        }
        let sum = self.field_sum();
        let score = self
            .weight
            .sim
            .combine(self.weight.term_idf, self.weight.k1, sum);
        trace!("doc {}: field_sum={:.4}, score={:.4}", self.doc, sum, score);
        score
    }

    /// Per-field explanations for the current document, with their sum.
    /// Fields without an occurrence are skipped, matching the fast path.
    fn explain_fields(&self) -> (f32, Vec<Explain>) {
        let mut sum = 0.0;
        let mut subs = Vec::new();
        for leg in &self.legs {
            if leg.cursor.doc() == self.doc {
                let decoded =
                    decode_field_length(self.segment.norm(&leg.stats.field, self.doc));
                let expl = self.weight.sim.explain_field(
                    leg.cursor.freq() as f32,
                    decoded,
                    leg.stats,
                );
                sum += expl.value();
                subs.push(expl);
            }
        }
        (sum, subs)
    }
}
