//! Draw repository
//!
//! Owns the persisted history and the feed it is refreshed from. Sync
//! operations are read-modify-write over one file, so they run one at a time.
//!
//! Feed and parse failures never surface as `Err`: a year that cannot be
//! fetched counts as zero records and the caller gets a `SyncOutcome`. Only
//! local storage faults are returned as errors.

mod dataset;

pub use dataset::HistoricalDataset;

use crate::config::AppConfig;
use crate::feed::{parse_entry, DrawFeed, HttpFeedClient};
use crate::persistence::CsvDrawStore;
use crate::types::DrawRecord;
use anyhow::Result;
use chrono::{Datelike, Local};
use serde::Serialize;
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncMode {
    FullBackfill,
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    /// New draws were written to the store
    Updated,
    /// Nothing newer than the last stored draw
    UpToDate,
    /// No data could be downloaded; the store was left as it was
    Failed,
}

/// Result of a backfill or incremental sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub mode: SyncMode,
    pub status: SyncStatus,
    /// Draws added by this run (all written draws for a backfill)
    pub added: usize,
    /// Draws in the history after this run
    pub total: usize,
    /// Years whose fetch failed
    pub failed_years: Vec<i32>,
}

impl SyncOutcome {
    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::Failed
    }

    /// Status line for the user
    pub fn message(&self) -> String {
        match (self.status, self.mode) {
            (SyncStatus::Failed, _) => {
                "Could not download data from the results service".to_string()
            }
            (SyncStatus::UpToDate, _) => format!("Already up to date ({} draws)", self.total),
            (SyncStatus::Updated, SyncMode::FullBackfill) => {
                format!("Backfill complete: {} draws written", self.total)
            }
            (SyncStatus::Updated, SyncMode::Incremental) => format!(
                "{} new draws added ({} total)",
                self.added, self.total
            ),
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())?;
        if !self.failed_years.is_empty() && !self.is_failed() {
            write!(f, " [{} years failed]", self.failed_years.len())?;
        }
        Ok(())
    }
}

/// Records fetched for one year, or `None` if the fetch failed
type YearFetch = Option<Vec<DrawRecord>>;

pub struct DrawRepository {
    store: CsvDrawStore,
    feed: Box<dyn DrawFeed>,
    first_year: i32,
    current_year: Option<i32>,
    sync_lock: Mutex<()>,
}

impl DrawRepository {
    pub fn new(store: CsvDrawStore, feed: Box<dyn DrawFeed>, first_year: i32) -> Self {
        Self {
            store,
            feed,
            first_year,
            current_year: None,
            sync_lock: Mutex::new(()),
        }
    }

    /// Repository over the configured store and the HTTP feed
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            CsvDrawStore::new(config.storage.history_path()),
            Box::new(HttpFeedClient::new(&config.feed)?),
            config.feed.first_year,
        ))
    }

    /// Pin the last year synced instead of the clock's year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn store(&self) -> &CsvDrawStore {
        &self.store
    }

    fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Local::now().year())
    }

    /// Persisted history (an empty store is created when missing)
    pub fn load(&self) -> Result<HistoricalDataset> {
        self.store.load()
    }

    /// Rebuild the whole history from `first_year` through the current year.
    /// `progress` is called after each year with the completed fraction.
    pub async fn full_backfill<F>(&self, progress: F) -> Result<SyncOutcome>
    where
        F: FnMut(f64, &str) + Send,
    {
        let _guard = self.sync_lock.lock().await;
        self.backfill_locked(progress).await
    }

    /// Fetch draws newer than the last stored one.
    /// An empty store triggers a full backfill.
    pub async fn incremental_sync(&self) -> Result<SyncOutcome> {
        let _guard = self.sync_lock.lock().await;

        let mut dataset = self.store.load()?;
        let Some(last_date) = dataset.last_date() else {
            info!("History is empty, running full backfill");
            return self.backfill_locked(|_, _| {}).await;
        };

        let current_year = self.current_year();
        let years: Vec<i32> = (last_date.year()..=current_year).collect();
        info!(
            feed = self.feed.name(),
            %last_date,
            from = last_date.year(),
            to = current_year,
            "🔄 Incremental sync"
        );

        let mut fetched = Vec::new();
        let mut failed_years = Vec::new();
        for &year in &years {
            match self.fetch_year_records(year).await {
                Some(records) => fetched.extend(records),
                None => failed_years.push(year),
            }
        }

        if !years.is_empty() && failed_years.len() == years.len() {
            warn!(years = years.len(), "Every year failed, history unchanged");
            return Ok(SyncOutcome {
                mode: SyncMode::Incremental,
                status: SyncStatus::Failed,
                added: 0,
                total: dataset.len(),
                failed_years,
            });
        }

        let added = dataset.merge_newer(fetched);
        let status = if added > 0 {
            self.store.save(&dataset)?;
            info!(added, total = dataset.len(), "✅ History updated");
            SyncStatus::Updated
        } else {
            info!(total = dataset.len(), "History already up to date");
            SyncStatus::UpToDate
        };

        Ok(SyncOutcome {
            mode: SyncMode::Incremental,
            status,
            added,
            total: dataset.len(),
            failed_years,
        })
    }

    async fn backfill_locked<F>(&self, mut progress: F) -> Result<SyncOutcome>
    where
        F: FnMut(f64, &str) + Send,
    {
        let current_year = self.current_year();
        let years: Vec<i32> = (self.first_year..=current_year).collect();
        info!(
            feed = self.feed.name(),
            from = self.first_year,
            to = current_year,
            "📥 Starting full backfill"
        );

        let mut records = Vec::new();
        let mut failed_years = Vec::new();
        for (i, &year) in years.iter().enumerate() {
            let label = match self.fetch_year_records(year).await {
                Some(batch) => {
                    let label = format!("{}: {} draws", year, batch.len());
                    records.extend(batch);
                    label
                }
                None => {
                    failed_years.push(year);
                    format!("{}: download failed", year)
                }
            };
            progress((i + 1) as f64 / years.len() as f64, &label);
        }

        let dataset = HistoricalDataset::from_records(records);
        if dataset.is_empty() {
            warn!(
                failed = failed_years.len(),
                "Backfill produced no draws, store left untouched"
            );
            let total = if self.store.exists() {
                self.store.load()?.len()
            } else {
                0
            };
            return Ok(SyncOutcome {
                mode: SyncMode::FullBackfill,
                status: SyncStatus::Failed,
                added: 0,
                total,
                failed_years,
            });
        }

        self.store.save(&dataset)?;
        info!(
            draws = dataset.len(),
            failed_years = failed_years.len(),
            "✅ Backfill written"
        );

        Ok(SyncOutcome {
            mode: SyncMode::FullBackfill,
            status: SyncStatus::Updated,
            added: dataset.len(),
            total: dataset.len(),
            failed_years,
        })
    }

    /// Parsed draws of one year; malformed entries are skipped
    async fn fetch_year_records(&self, year: i32) -> YearFetch {
        let entries = match self.feed.fetch_year(year).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(year = e.year(), error = %e, "Year fetch failed, counting as empty");
                return None;
            }
        };

        let records: Vec<DrawRecord> = entries
            .iter()
            .filter_map(|entry| match parse_entry(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(year, error = %e, combination = %entry.combination, "Skipping entry");
                    None
                }
            })
            .collect();

        debug!(year, entries = entries.len(), draws = records.len(), "Parsed year");
        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(mode: SyncMode, status: SyncStatus, added: usize, total: usize) -> SyncOutcome {
        SyncOutcome {
            mode,
            status,
            added,
            total,
            failed_years: Vec::new(),
        }
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            outcome(SyncMode::FullBackfill, SyncStatus::Updated, 10, 10).message(),
            "Backfill complete: 10 draws written"
        );
        assert_eq!(
            outcome(SyncMode::Incremental, SyncStatus::Updated, 2, 12).message(),
            "2 new draws added (12 total)"
        );
        assert_eq!(
            outcome(SyncMode::Incremental, SyncStatus::UpToDate, 0, 12).message(),
            "Already up to date (12 draws)"
        );
        assert!(outcome(SyncMode::Incremental, SyncStatus::Failed, 0, 0)
            .message()
            .starts_with("Could not download"));
    }

    #[test]
    fn test_display_mentions_failed_years() {
        let mut partial = outcome(SyncMode::FullBackfill, SyncStatus::Updated, 5, 5);
        partial.failed_years = vec![1990, 1991];
        assert!(partial.to_string().ends_with("[2 years failed]"));
    }
}
