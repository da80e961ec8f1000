/// Read-only boundary to the external index/search engine.
///
/// The scoring core never owns postings storage; it consumes corpus
/// statistics, per-segment postings cursors and stored length bytes through
/// these traits. `MemoryIndex` is the in-memory reference implementation used
/// by the test suites: a single segment, pre-tokenized input (tokenization is
/// the caller's concern).
use std::collections::HashMap;

use crate::error::Result;
use crate::norm::encode_field_length;
use crate::stats::{CollectionStats, TermStats};

pub type DocId = u32;

/// Sentinel doc id for an exhausted cursor.
pub const NO_MORE_DOCS: DocId = DocId::MAX;

/// Cursor over a sorted, deduplicated `(doc_id, freq)` stream for one
/// (field, term) pair. Positioned on its first document at creation;
/// `NO_MORE_DOCS` once exhausted.
pub trait PostingsCursor {
    /// Current document id, `NO_MORE_DOCS` if exhausted.
    fn doc(&self) -> DocId;

    /// Raw term frequency at the current document.
    fn freq(&self) -> u32;

    /// Advance to the next document, returning the new doc id.
    fn advance(&mut self) -> DocId;

    /// Advance to the first document >= `target`.
    fn seek(&mut self, target: DocId) -> DocId {
        while self.doc() < target {
            self.advance();
        }
        self.doc()
    }

    fn is_exhausted(&self) -> bool {
        self.doc() == NO_MORE_DOCS
    }
}

/// Corpus-level statistics, consulted once per query at weight construction.
pub trait CorpusReader {
    fn collection_stats(&self, field: &str) -> Option<CollectionStats>;
    fn term_stats(&self, field: &str, term: &str) -> Option<TermStats>;
}

/// One index segment: postings and stored field lengths.
pub trait SegmentReader {
    /// Open a fresh cursor for `(field, term)`. `Ok(None)` means the term
    /// does not occur in the field (an empty contribution, not an error);
    /// `Err` means the segment cannot serve the field at all.
    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingsCursor + '_>>>;

    /// Stored one-byte field length for a document; 0 when nothing is stored.
    fn norm(&self, field: &str, doc: DocId) -> u8;
}

/// Per-field in-memory postings: term -> sorted (doc_id, freq) pairs, plus
/// the stored length byte per document.
#[derive(Debug, Default)]
struct MemoryField {
    postings: HashMap<String, Vec<(DocId, u32)>>,
    norms: HashMap<DocId, u8>,
    doc_count: u64,
    sum_lengths: u64,
}

/// In-memory single-segment index over pre-tokenized documents.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    fields: HashMap<String, MemoryField>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one field of one document from its token stream. Documents must
    /// be added in ascending doc id order, each (doc, field) at most once.
    pub fn add_field(&mut self, doc: DocId, field: &str, tokens: &[&str]) {
        let entry = self.fields.entry(field.to_string()).or_default();

        let mut freqs: HashMap<&str, u32> = HashMap::new();
        for token in tokens {
            *freqs.entry(token).or_insert(0) += 1;
        }
        for (token, freq) in freqs {
            entry.postings.entry(token.to_string()).or_default().push((doc, freq));
        }

        entry
            .norms
            .insert(doc, encode_field_length(1.0, tokens.len() as u32));
        entry.doc_count += 1;
        entry.sum_lengths += tokens.len() as u64;
    }

    /// Index a whole document as (field, tokens) pairs.
    pub fn add_document(&mut self, doc: DocId, fields: &[(&str, &[&str])]) {
        for (field, tokens) in fields {
            self.add_field(doc, field, tokens);
        }
    }
}

impl CorpusReader for MemoryIndex {
    fn collection_stats(&self, field: &str) -> Option<CollectionStats> {
        self.fields.get(field).map(|f| CollectionStats {
            doc_count: f.doc_count,
            sum_field_lengths: f.sum_lengths,
        })
    }

    fn term_stats(&self, field: &str, term: &str) -> Option<TermStats> {
        let f = self.fields.get(field)?;
        Some(TermStats {
            doc_freq: f.postings.get(term).map(|p| p.len() as u64).unwrap_or(0),
        })
    }
}

impl SegmentReader for MemoryIndex {
    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingsCursor + '_>>> {
        let cursor = self
            .fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .map(|p| Box::new(MemoryCursor::new(p)) as Box<dyn PostingsCursor + '_>);
        Ok(cursor)
    }

    fn norm(&self, field: &str, doc: DocId) -> u8 {
        self.fields
            .get(field)
            .and_then(|f| f.norms.get(&doc))
            .copied()
            .unwrap_or(0)
    }
}

/// Cursor over a borrowed sorted postings slice.
pub struct MemoryCursor<'a> {
    postings: &'a [(DocId, u32)],
    pos: usize,
}

impl<'a> MemoryCursor<'a> {
    pub fn new(postings: &'a [(DocId, u32)]) -> Self {
        MemoryCursor { postings, pos: 0 }
    }
}

impl PostingsCursor for MemoryCursor<'_> {
    fn doc(&self) -> DocId {
        self.postings
            .get(self.pos)
            .map(|&(doc, _)| doc)
            .unwrap_or(NO_MORE_DOCS)
    }

    fn freq(&self) -> u32 {
        self.postings.get(self.pos).map(|&(_, freq)| freq).unwrap_or(0)
    }

    fn advance(&mut self) -> DocId {
        if self.pos < self.postings.len() {
            self.pos += 1;
        }
        self.doc()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        // Binary search over the remaining postings.
        let rest = &self.postings[self.pos..];
        self.pos += rest.partition_point(|&(doc, _)| doc < target);
        self.doc()
    }
}
