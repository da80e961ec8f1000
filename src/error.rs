use thiserror::Error;

#[derive(Error, Debug)]
pub enum Bm25fError {
    /// A boost or length boost was requested for a field that was never
    /// registered. Recovered internally by defaulting to 1.0; callers of the
    /// public API should never see this variant.
    #[error("field not configured: {0}")]
    NotConfigured(String),

    /// Collection statistics imply an empty corpus (zero documents), so the
    /// average field length is undefined.
    #[error("empty corpus: cannot compute average length for field '{0}'")]
    EmptyCorpus(String),

    /// Collection or term statistics for a required field could not be
    /// obtained at query setup.
    #[error("missing statistics for field '{0}'")]
    MissingStatistics(String),

    /// Postings for a required field could not be opened in a segment.
    #[error("segment unavailable for field '{field}': {reason}")]
    SegmentUnavailable { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Bm25fError>;
