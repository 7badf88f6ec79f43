//! Draw feed: the public results search endpoint and its record format
//!
//! One request per calendar year; every entry carries a timestamp and a
//! loosely formatted combination string that `parser` turns into a `DrawRecord`.

mod client;
pub mod parser;

pub use client::HttpFeedClient;
pub use parser::{parse_combination, parse_entry, ParsedCombination};

use crate::error::FeedError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trait for sources of raw draw entries
#[async_trait]
pub trait DrawFeed: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Fetch every draw celebrated between Jan 1 and Dec 31 of `year`
    async fn fetch_year(&self, year: i32) -> Result<Vec<RawDrawEntry>, FeedError>;
}

/// One entry of the feed's JSON array. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDrawEntry {
    /// "YYYY-MM-DD HH:MM:SS"
    #[serde(rename = "fecha_sorteo")]
    pub timestamp: String,
    /// e.g. "05 - 12 - 23 - 31 - 40 - 47 C(15) R(3)"
    #[serde(rename = "combinacion")]
    pub combination: String,
}

impl RawDrawEntry {
    pub fn new(timestamp: impl Into<String>, combination: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            combination: combination.into(),
        }
    }
}

/// Decode a year's response body.
///
/// The body must be a JSON array; entries missing the expected fields are
/// dropped individually so one bad row does not cost the whole year.
pub fn decode_entries(year: i32, body: &[u8]) -> Result<Vec<RawDrawEntry>, FeedError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|source| FeedError::Decode { year, source })?;

    let total = values.len();
    let entries: Vec<RawDrawEntry> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if entries.len() < total {
        debug!(
            year,
            dropped = total - entries.len(),
            "Dropped feed entries without timestamp/combination"
        );
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entries_skips_incomplete_rows() {
        let body = br#"[
            {"fecha_sorteo": "2024-01-06 21:40:00", "combinacion": "03 - 12 - 19 - 27 - 34 - 41 C(08) R(5)", "id_sorteo": "123"},
            {"fecha_sorteo": "2024-01-08 21:40:00"},
            {"combinacion": "01 - 02 - 03 - 04 - 05 - 06 C(07) R(8)"}
        ]"#;

        let entries = decode_entries(2024, body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, "2024-01-06 21:40:00");
    }

    #[test]
    fn test_decode_entries_empty_array() {
        let entries = decode_entries(2030, b"[]").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_decode_entries_rejects_non_array() {
        let err = decode_entries(2024, b"<html>blocked</html>").unwrap_err();
        assert!(matches!(err, FeedError::Decode { year: 2024, .. }));
    }
}
