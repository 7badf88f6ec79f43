//! In-memory draw history

use crate::types::DrawRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Draws sorted ascending by date, at most one per date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalDataset {
    draws: Vec<DrawRecord>,
}

impl HistoricalDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records in fetch order.
    /// For a repeated date the record seen last wins.
    pub fn from_records(records: impl IntoIterator<Item = DrawRecord>) -> Self {
        let by_date: BTreeMap<NaiveDate, DrawRecord> =
            records.into_iter().map(|r| (r.date, r)).collect();
        Self {
            draws: by_date.into_values().collect(),
        }
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn first(&self) -> Option<&DrawRecord> {
        self.draws.first()
    }

    pub fn last(&self) -> Option<&DrawRecord> {
        self.draws.last()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last().map(|d| d.date)
    }

    /// The trailing `n` draws (fewer when the history is shorter)
    pub fn tail(&self, n: usize) -> &[DrawRecord] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    /// Merge records dated strictly after the current last draw.
    /// Returns how many new dates were added.
    pub fn merge_newer(&mut self, records: impl IntoIterator<Item = DrawRecord>) -> usize {
        let cutoff = self.last_date();
        let fresh: BTreeMap<NaiveDate, DrawRecord> = records
            .into_iter()
            .filter(|r| cutoff.map_or(true, |last| r.date > last))
            .map(|r| (r.date, r))
            .collect();

        let added = fresh.len();
        // Every fresh date sorts after the existing tail
        self.draws.extend(fresh.into_values());
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(y: i32, m: u32, d: u32, first: u8) -> DrawRecord {
        DrawRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            numbers: [first, 10, 20, 30, 40, 49],
            complementary: 7,
            reintegro: 3,
        }
    }

    #[test]
    fn test_from_records_sorts_and_dedups() {
        let dataset = HistoricalDataset::from_records(vec![
            draw(2024, 1, 8, 1),
            draw(2024, 1, 6, 2),
            draw(2024, 1, 8, 3),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.draws()[0].date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        // later value wins
        assert_eq!(dataset.draws()[1].numbers[0], 3);
    }

    #[test]
    fn test_merge_newer_ignores_known_dates() {
        let mut dataset =
            HistoricalDataset::from_records(vec![draw(2024, 1, 4, 1), draw(2024, 1, 6, 1)]);

        let added = dataset.merge_newer(vec![
            draw(2024, 1, 4, 9),
            draw(2024, 1, 6, 9),
            draw(2024, 1, 11, 1),
            draw(2024, 1, 8, 1),
        ]);

        assert_eq!(added, 2);
        assert_eq!(dataset.len(), 4);
        assert!(dataset.draws().windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(dataset.draws()[0].numbers[0], 1);

        assert_eq!(dataset.merge_newer(vec![draw(2024, 1, 11, 5)]), 0);
    }

    #[test]
    fn test_tail() {
        let dataset = HistoricalDataset::from_records(vec![
            draw(2024, 1, 1, 1),
            draw(2024, 1, 2, 2),
            draw(2024, 1, 3, 3),
        ]);
        assert_eq!(dataset.tail(2).len(), 2);
        assert_eq!(dataset.tail(2)[0].numbers[0], 2);
        assert_eq!(dataset.tail(10).len(), 3);
        assert!(HistoricalDataset::new().tail(5).is_empty());
    }
}
