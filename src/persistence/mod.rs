//! CSV Persistence Module
//!
//! The draw history lives in one CSV file with columns
//! `date,n1,n2,n3,n4,n5,n6,r,c`, rewritten wholesale on every successful sync.

use crate::repository::HistoricalDataset;
use crate::types::DrawRecord;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column set of the history file
pub const DRAW_COLUMNS: [&str; 9] = ["date", "n1", "n2", "n3", "n4", "n5", "n6", "r", "c"];

/// One row of the history file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRow {
    #[serde(alias = "fecha", deserialize_with = "deserialize_draw_date")]
    pub date: NaiveDate,
    pub n1: u8,
    pub n2: u8,
    pub n3: u8,
    pub n4: u8,
    pub n5: u8,
    pub n6: u8,
    /// Reintegro
    pub r: u8,
    /// Complementary
    pub c: u8,
}

impl From<&DrawRecord> for DrawRow {
    fn from(draw: &DrawRecord) -> Self {
        let [n1, n2, n3, n4, n5, n6] = draw.numbers;
        Self {
            date: draw.date,
            n1,
            n2,
            n3,
            n4,
            n5,
            n6,
            r: draw.reintegro,
            c: draw.complementary,
        }
    }
}

impl From<DrawRow> for DrawRecord {
    fn from(row: DrawRow) -> Self {
        Self {
            date: row.date,
            numbers: [row.n1, row.n2, row.n3, row.n4, row.n5, row.n6],
            complementary: row.c,
            reintegro: row.r,
        }
    }
}

/// Older files stored the full draw timestamp ("2024-01-06 21:40:00")
fn deserialize_draw_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

/// File backed store for the draw history
#[derive(Debug, Clone)]
pub struct CsvDrawStore {
    path: PathBuf,
}

impl CsvDrawStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored history.
    /// A missing file is created empty (header only) first.
    pub fn load(&self) -> Result<HistoricalDataset> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No history file yet, creating an empty one");
            self.save(&HistoricalDataset::new())?;
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open history file {}", self.path.display()))?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut draws = Vec::new();
        for result in reader.deserialize() {
            let row: DrawRow = result.context("Failed to deserialize draw row")?;
            draws.push(DrawRecord::from(row));
        }

        debug!(path = %self.path.display(), rows = draws.len(), "Loaded draw history");
        Ok(HistoricalDataset::from_records(draws))
    }

    /// Overwrite the history file with `dataset`.
    /// Writes to a sibling temp file and renames it into place.
    pub fn save(&self, dataset: &HistoricalDataset) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create data directory")?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

            writer
                .write_record(DRAW_COLUMNS)
                .context("Failed to write history header")?;
            for draw in dataset.draws() {
                writer
                    .serialize(DrawRow::from(draw))
                    .context("Failed to write draw row")?;
            }
            writer.flush().context("Failed to flush history writer")?;
        }

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), rows = dataset.len(), "Saved draw history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_history_path(test_name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("lottomind_persistence_{}_{}", test_name, uuid::Uuid::new_v4()))
            .join("historico.csv")
    }

    fn draw(date: &str, numbers: [u8; 6], c: u8, r: u8) -> DrawRecord {
        DrawRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            numbers,
            complementary: c,
            reintegro: r,
        }
    }

    #[test]
    fn load_creates_empty_file_with_header() {
        let path = temp_history_path("create_empty");
        let store = CsvDrawStore::new(&path);

        let dataset = store.load().unwrap();
        assert!(dataset.is_empty());
        assert!(path.exists());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "date,n1,n2,n3,n4,n5,n6,r,c");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_then_load_keeps_rows_and_order() {
        let path = temp_history_path("save_load");
        let store = CsvDrawStore::new(&path);

        let dataset = HistoricalDataset::from_records(vec![
            draw("2024-01-08", [1, 2, 3, 4, 5, 6], 7, 8),
            draw("2024-01-06", [3, 12, 19, 27, 34, 41], 8, 5),
        ]);
        store.save(&dataset).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("date,n1,n2,n3,n4,n5,n6,r,c"));
        assert_eq!(lines.next(), Some("2024-01-06,3,12,19,27,34,41,5,8"));

        let loaded = store.load().unwrap();
        assert_eq!(loaded, dataset);
        assert!(!path.with_extension("csv.tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn legacy_timestamp_rows_load_as_dates() {
        let legacy = "date,n1,n2,n3,n4,n5,n6,r,c\n2024-01-06 21:40:00,3,12,19,27,34,41,5,8\n";
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(legacy.as_bytes());
        let row: DrawRow = reader
            .deserialize()
            .next()
            .expect("expected one row")
            .expect("legacy row should deserialize");

        let record = DrawRecord::from(row);
        assert_eq!(record, draw("2024-01-06", [3, 12, 19, 27, 34, 41], 8, 5));
    }

    #[test]
    fn legacy_fecha_header_loads() {
        let path = temp_history_path("fecha_header");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "fecha,n1,n2,n3,n4,n5,n6,r,c\n2024-01-06 21:40:00,3,12,19,27,34,41,5,8\n",
        )
        .unwrap();

        let loaded = CsvDrawStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded.last(),
            Some(&draw("2024-01-06", [3, 12, 19, 27, 34, 41], 8, 5))
        );

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_row_is_an_error() {
        let path = temp_history_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "date,n1,n2,n3,n4,n5,n6,r,c\nnot-a-date,1,2,3,4,5,6,0,0\n").unwrap();

        let store = CsvDrawStore::new(&path);
        assert!(store.load().is_err());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
