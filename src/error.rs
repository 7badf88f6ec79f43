//! Error types for LottoMind.
//!
//! Storage and application plumbing use `anyhow`; the typed errors here are the
//! ones callers are expected to match on.

use thiserror::Error;

/// A single feed entry that could not be turned into a draw record.
/// Callers skip the entry; it never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Timestamp not in `YYYY-MM-DD HH:MM:SS` (or `YYYY-MM-DD`) form
    #[error("invalid draw timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Not enough numeric tokens for six main numbers
    #[error("combination '{combination}' has only {found} numbers")]
    TooFewNumbers { combination: String, found: usize },

    /// A token too large to be a ball or digit
    #[error("number '{0}' out of range")]
    Overflow(String),

    /// Main number outside 1..=49
    #[error("main number {0} outside 1..=49")]
    BallOutOfRange(u32),

    /// Same main number twice in one draw
    #[error("main number {0} repeated")]
    DuplicateBall(u8),

    /// Reintegro outside 0..=9
    #[error("reintegro {0} outside 0..=9")]
    ReintegroOutOfRange(u32),
}

/// Failure fetching one year from the draw feed.
/// The repository logs it and counts the year as empty.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport level failure (DNS, TLS, timeout...)
    #[error("request for {year} failed: {source}")]
    Http {
        year: i32,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("feed answered HTTP {status} for {year}")]
    Status { year: i32, status: u16 },

    /// Body was not a JSON array
    #[error("could not decode feed body for {year}: {source}")]
    Decode {
        year: i32,
        #[source]
        source: serde_json::Error,
    },
}

impl FeedError {
    pub fn year(&self) -> i32 {
        match self {
            FeedError::Http { year, .. }
            | FeedError::Status { year, .. }
            | FeedError::Decode { year, .. } => *year,
        }
    }
}

/// Strategy level failures. These propagate to the caller, which must make
/// sure enough history exists before asking for a recommendation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{strategy} needs at least {required} draws, dataset has {available}")]
    InsufficientHistory {
        strategy: &'static str,
        required: usize,
        available: usize,
    },

    #[error("consensus needs six distinct numbers across the votes, got {0}")]
    NotEnoughVotes(usize),
}
