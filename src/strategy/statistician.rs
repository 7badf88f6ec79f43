//! Statistician - overdue balls weighted by overall popularity
//!
//! score = 0.7 · lag / max_lag + 0.3 · freq / max_freq
//!
//! `lag` counts records since a ball's last appearance: a ball in the most
//! recent draw has lag 1, a ball never drawn has lag = total draws.

use crate::error::EngineError;
use crate::repository::HistoricalDataset;
use crate::strategy::{DrawStrategy, StrategyKind};
use crate::types::{DrawRecord, StrategyResult, BALL_COUNT, MAX_REINTEGRO};
use rand::rngs::StdRng;
use serde::Serialize;

const LAG_WEIGHT: f64 = 0.7;
const FREQ_WEIGHT: f64 = 0.3;

/// Per-ball statistics over the history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallStats {
    pub ball: u8,
    /// Appearances as a main number
    pub frequency: usize,
    /// Records since the last appearance
    pub lag: usize,
    pub score: f64,
}

/// Stats for balls 1..=49 in ball order
pub fn ball_stats(draws: &[DrawRecord]) -> Vec<BallStats> {
    let total = draws.len();
    let mut frequency = [0usize; BALL_COUNT];
    let mut last_seen: [Option<usize>; BALL_COUNT] = [None; BALL_COUNT];

    for (idx, draw) in draws.iter().enumerate() {
        for &ball in &draw.numbers {
            if let Some(slot) = (ball as usize).checked_sub(1).filter(|&i| i < BALL_COUNT) {
                frequency[slot] += 1;
                last_seen[slot] = Some(idx);
            }
        }
    }

    let lags: Vec<usize> = last_seen
        .iter()
        .map(|seen| seen.map_or(total, |idx| total - idx))
        .collect();

    let max_lag = lags.iter().copied().max().filter(|&m| m > 0).unwrap_or(1) as f64;
    let max_freq = frequency.iter().copied().max().filter(|&m| m > 0).unwrap_or(1) as f64;

    (0..BALL_COUNT)
        .map(|i| BallStats {
            ball: (i + 1) as u8,
            frequency: frequency[i],
            lag: lags[i],
            score: LAG_WEIGHT * lags[i] as f64 / max_lag
                + FREQ_WEIGHT * frequency[i] as f64 / max_freq,
        })
        .collect()
}

/// Balls sorted hottest first (ties by ball number)
pub fn frequency_table(dataset: &HistoricalDataset) -> Vec<BallStats> {
    let mut stats = ball_stats(dataset.draws());
    stats.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    stats
}

/// Most frequent reintegro; ties go to the smaller digit
pub fn reintegro_mode(draws: &[DrawRecord]) -> Option<u8> {
    let mut counts = [0usize; MAX_REINTEGRO as usize + 1];
    for draw in draws {
        if let Some(count) = counts.get_mut(draw.reintegro as usize) {
            *count += 1;
        }
    }

    let (digit, &count) = counts
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, &c)| c)?;
    (count > 0).then_some(digit as u8)
}

/// Frequency/recency scorer
#[derive(Debug, Clone, Default)]
pub struct Statistician;

impl Statistician {
    pub fn new() -> Self {
        Self
    }
}

impl DrawStrategy for Statistician {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Statistician
    }

    fn recommend(
        &self,
        dataset: &HistoricalDataset,
        _rng: &mut StdRng,
    ) -> Result<StrategyResult, EngineError> {
        let insufficient = EngineError::InsufficientHistory {
            strategy: self.name(),
            required: 1,
            available: dataset.len(),
        };
        if dataset.is_empty() {
            return Err(insufficient);
        }

        let mut ranked = ball_stats(dataset.draws());
        // stable: equal scores keep ball order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let reintegro = reintegro_mode(dataset.draws()).unwrap_or(0);
        StrategyResult::from_balls(ranked.iter().map(|s| s.ball), reintegro).ok_or(insufficient)
    }
}
