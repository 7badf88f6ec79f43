//! Record parser for feed entries
//!
//! The feed encodes a draw as a single string. Two dialects show up:
//!
//! - bracketed: `"05 - 12 - 23 - 31 - 40 - 47 C(15) R(3)"`
//! - plain: `"05 12 23 31 40 47 15 3"` (spaces and/or dashes)
//!
//! The bracketed rule is tried first; when it yields fewer than eight parts the
//! permissive whitespace scan takes over.

use crate::error::ParseError;
use crate::feed::RawDrawEntry;
use crate::types::{DrawRecord, BALL_COUNT, MAX_REINTEGRO, PICK_COUNT};
use chrono::{NaiveDate, NaiveDateTime};

/// Parts expected from a complete bracketed combination (6 + C + R)
const FULL_COMBINATION_PARTS: usize = 8;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Numbers recovered from a combination string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCombination {
    pub numbers: [u8; PICK_COUNT],
    pub complementary: u8,
    pub reintegro: u8,
}

/// Parse a full feed entry into a draw record
pub fn parse_entry(entry: &RawDrawEntry) -> Result<DrawRecord, ParseError> {
    let date = parse_draw_date(&entry.timestamp)?;
    let combination = parse_combination(&entry.combination)?;

    Ok(DrawRecord {
        date,
        numbers: combination.numbers,
        complementary: combination.complementary,
        reintegro: combination.reintegro,
    })
}

/// Calendar date of a feed timestamp
pub fn parse_draw_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DATE_FORMAT))
        .map_err(|_| ParseError::InvalidTimestamp(raw.to_string()))
}

/// Parse a combination string.
///
/// Main numbers are the first six tokens, the complementary the seventh and
/// the reintegro the eighth; missing supplementary values default to 0.
/// The complementary is kept as published, only a value that does not fit a
/// byte falls back to 0.
pub fn parse_combination(raw: &str) -> Result<ParsedCombination, ParseError> {
    let tokens = numeric_tokens(raw);
    if tokens.len() < PICK_COUNT {
        return Err(ParseError::TooFewNumbers {
            combination: raw.to_string(),
            found: tokens.len(),
        });
    }

    let values = tokens
        .iter()
        .map(|t| t.parse::<u32>().map_err(|_| ParseError::Overflow(t.clone())))
        .collect::<Result<Vec<u32>, _>>()?;

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, &value) in numbers.iter_mut().zip(&values) {
        *slot = ball(value)?;
    }
    for (i, n) in numbers.iter().enumerate() {
        if numbers[..i].contains(n) {
            return Err(ParseError::DuplicateBall(*n));
        }
    }

    let complementary = match values.get(PICK_COUNT) {
        Some(&value) => u8::try_from(value).unwrap_or(0),
        None => 0,
    };

    let reintegro = match values.get(PICK_COUNT + 1) {
        Some(&value) if value <= MAX_REINTEGRO as u32 => value as u8,
        Some(&value) => return Err(ParseError::ReintegroOutOfRange(value)),
        None => 0,
    };

    Ok(ParsedCombination {
        numbers,
        complementary,
        reintegro,
    })
}

fn ball(value: u32) -> Result<u8, ParseError> {
    if (1..=BALL_COUNT as u32).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ParseError::BallOutOfRange(value))
    }
}

/// Numeric tokens in feed order
fn numeric_tokens(raw: &str) -> Vec<String> {
    // "... 47 C(15) R(3)" -> "... 47 -15-3"
    let normalized = raw
        .replace("C(", "-")
        .replace(") R(", "-")
        .replace(')', "");

    let parts: Vec<&str> = normalized.split('-').collect();
    let candidates: Vec<&str> = if parts.len() >= FULL_COMBINATION_PARTS {
        parts
    } else {
        normalized.split(|c: char| c == '-' || c.is_whitespace()).collect()
    };

    candidates
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_combination() {
        let parsed = parse_combination("05 - 12 - 23 - 31 - 40 - 47 C(15) R(3)").unwrap();
        assert_eq!(parsed.numbers, [5, 12, 23, 31, 40, 47]);
        assert_eq!(parsed.complementary, 15);
        assert_eq!(parsed.reintegro, 3);
    }

    #[test]
    fn test_bracketed_and_plain_dialects_agree() {
        let bracketed = RawDrawEntry::new(
            "2024-01-06 21:40:00",
            "03 - 12 - 19 - 27 - 34 - 41 C(08) R(5)",
        );
        let plain = RawDrawEntry::new("2024-01-06 21:40:00", "03 12 19 27 34 41 08 5");
        let dashed = RawDrawEntry::new("2024-01-06 21:40:00", "03-12-19-27-34-41-08-5");

        let a = parse_entry(&bracketed).unwrap();
        let b = parse_entry(&plain).unwrap();
        let c = parse_entry(&dashed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.complementary, 8);
        assert_eq!(a.reintegro, 5);
    }

    #[test]
    fn test_spaced_brackets_fall_back_to_token_scan() {
        // Too few dash parts for the bracketed rule
        let parsed = parse_combination("1 2 3 4 5 6 C(7) R(8)").unwrap();
        assert_eq!(parsed.numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(parsed.complementary, 7);
        assert_eq!(parsed.reintegro, 8);
    }

    #[test]
    fn test_missing_supplementary_defaults_to_zero() {
        let parsed = parse_combination("10 20 30 40 45 49").unwrap();
        assert_eq!(parsed.complementary, 0);
        assert_eq!(parsed.reintegro, 0);

        let parsed = parse_combination("10 20 30 40 45 49 11").unwrap();
        assert_eq!(parsed.complementary, 11);
        assert_eq!(parsed.reintegro, 0);
    }

    #[test]
    fn test_complementary_outside_ball_range_is_kept() {
        let parsed = parse_combination("03 12 19 27 34 41 0 5").unwrap();
        assert_eq!(parsed.numbers, [3, 12, 19, 27, 34, 41]);
        assert_eq!(parsed.complementary, 0);
        assert_eq!(parsed.reintegro, 5);

        let parsed = parse_combination("03 - 12 - 19 - 27 - 34 - 41 C(50) R(5)").unwrap();
        assert_eq!(parsed.complementary, 50);
        assert_eq!(parsed.reintegro, 5);

        let parsed = parse_combination("03 12 19 27 34 41 300 5").unwrap();
        assert_eq!(parsed.complementary, 0);
    }

    #[test]
    fn test_too_few_numbers() {
        let err = parse_combination("01 - 02 - 03 C(04)").unwrap_err();
        assert!(matches!(err, ParseError::TooFewNumbers { found: 4, .. }));

        let err = parse_combination("").unwrap_err();
        assert!(matches!(err, ParseError::TooFewNumbers { found: 0, .. }));
    }

    #[test]
    fn test_out_of_range_and_duplicates_rejected() {
        assert_eq!(
            parse_combination("0 12 19 27 34 41").unwrap_err(),
            ParseError::BallOutOfRange(0)
        );
        assert_eq!(
            parse_combination("50 12 19 27 34 41").unwrap_err(),
            ParseError::BallOutOfRange(50)
        );
        assert_eq!(
            parse_combination("12 12 19 27 34 41").unwrap_err(),
            ParseError::DuplicateBall(12)
        );
        assert_eq!(
            parse_combination("03 - 12 - 19 - 27 - 34 - 41 C(08) R(12)").unwrap_err(),
            ParseError::ReintegroOutOfRange(12)
        );
    }

    #[test]
    fn test_overflowing_token() {
        let err = parse_combination("99999999999 1 2 3 4 5").unwrap_err();
        assert!(matches!(err, ParseError::Overflow(_)));
    }

    #[test]
    fn test_parse_draw_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(parse_draw_date("2024-01-06 21:40:00").unwrap(), expected);
        assert_eq!(parse_draw_date("2024-01-06").unwrap(), expected);
        assert!(matches!(
            parse_draw_date("06/01/2024"),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_parsed_main_numbers_always_valid() {
        let inputs = [
            "05 - 12 - 23 - 31 - 40 - 47 C(15) R(3)",
            "1 2 3 4 5 6",
            "49-48-47-46-45-44-1-0",
            "7 7 8 9 10 11",
            "abc 1 2",
        ];
        for input in inputs {
            if let Ok(parsed) = parse_combination(input) {
                let mut sorted = parsed.numbers;
                sorted.sort_unstable();
                assert!(sorted.windows(2).all(|w| w[0] < w[1]), "{}", input);
                assert!(sorted.iter().all(|&n| (1..=49).contains(&n)), "{}", input);
            }
        }
    }
}
