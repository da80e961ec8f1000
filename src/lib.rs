//! bm25f: BM25F relevance scoring for field-structured documents
//!
//! Scores one query term against a document whose text is split across named
//! fields (title, author, ...), each with its own weight and
//! length-normalization strength:
//! - Per-field weighted term frequency with soft length normalization
//! - Saturating combination across fields (`idf * S / (k1 + S)`)
//! - A verbose explain path numerically identical to the fast score path
//! - One-byte lossy field-length codec with a process-wide decode table
//!
//! The inverted index itself is external: the crate consumes statistics and
//! postings through the read-only traits in [`index`] and returns scores and
//! explanation trees. `MemoryIndex` is a single-segment reference
//! implementation of those traits.

pub mod error;
pub mod explain;
pub mod index;
pub mod norm;
pub mod params;
pub mod scorer;
pub mod similarity;
pub mod stats;

pub use error::{Bm25fError, Result};
pub use explain::Explain;
pub use index::{CorpusReader, DocId, MemoryIndex, PostingsCursor, SegmentReader, NO_MORE_DOCS};
pub use params::Bm25fParams;
pub use scorer::{TermScorer, TermWeight};
pub use similarity::{Bm25fSimilarity, Similarity};
pub use stats::{idf, CollectionStats, FieldStats, TermStats};
