/// Error types for the review core.
///
/// The rendering pipeline itself is total: a bad clause is logged and skipped,
/// never returned. These errors cover the places where a caller hands us
/// something we cannot interpret (a risk level string, a zero probe length) and
/// the per-clause pattern failure that the injector constructs before dropping.

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("invalid risk level: {0} (expected low, medium or high)")]
    InvalidRiskLevel(String),

    #[error("clause pattern rejected ({clause_len} chars): {source}")]
    ClausePattern {
        clause_len: usize,
        #[source]
        source: regex::Error,
    },

    #[error("invalid render option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

pub type ReviewResult<T> = Result<T, ReviewError>;
