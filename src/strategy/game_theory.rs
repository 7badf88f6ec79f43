//! Game theory - random tickets shaped unlike the ones most players pick
//!
//! A candidate is accepted when its sum sits in the middle of the range, it has
//! few consecutive runs and it does not look like a calendar date.

use crate::error::EngineError;
use crate::repository::HistoricalDataset;
use crate::strategy::{DrawStrategy, StrategyKind};
use crate::types::{StrategyResult, BALL_COUNT, MAX_REINTEGRO, PICK_COUNT};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

pub const SUM_RANGE: RangeInclusive<u32> = 120..=180;
pub const MAX_CONSECUTIVE_PAIRS: usize = 2;
/// Highest ball that can be a day of the month
pub const CALENDAR_MAX: u8 = 31;
pub const MAX_CALENDAR_BALLS: usize = 4;

/// Whether a sorted ticket passes every shape constraint
pub fn satisfies_constraints(numbers: &[u8; PICK_COUNT]) -> bool {
    let sum: u32 = numbers.iter().map(|&n| n as u32).sum();
    let consecutive = numbers.windows(2).filter(|w| w[1] == w[0] + 1).count();
    let calendar = numbers.iter().filter(|&&n| n <= CALENDAR_MAX).count();

    SUM_RANGE.contains(&sum)
        && consecutive <= MAX_CONSECUTIVE_PAIRS
        && calendar <= MAX_CALENDAR_BALLS
}

/// Six distinct balls, uniform over 1..=49, sorted ascending
fn sample_ticket(rng: &mut StdRng) -> [u8; PICK_COUNT] {
    let mut numbers = [0u8; PICK_COUNT];
    for (slot, idx) in numbers
        .iter_mut()
        .zip(index::sample(rng, BALL_COUNT, PICK_COUNT).into_iter())
    {
        *slot = (idx + 1) as u8;
    }
    numbers.sort_unstable();
    numbers
}

/// Rejection sampler
#[derive(Debug, Clone)]
pub struct GameTheory {
    max_attempts: usize,
}

impl GameTheory {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl DrawStrategy for GameTheory {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GameTheory
    }

    /// Needs no history
    fn recommend(
        &self,
        _dataset: &HistoricalDataset,
        rng: &mut StdRng,
    ) -> Result<StrategyResult, EngineError> {
        let mut candidate = sample_ticket(rng);
        let mut attempts = 1;
        while !satisfies_constraints(&candidate) && attempts < self.max_attempts {
            candidate = sample_ticket(rng);
            attempts += 1;
        }

        if satisfies_constraints(&candidate) {
            debug!(attempts, "Game theory ticket accepted");
        } else {
            warn!(
                attempts,
                "Sampler exhausted its attempts, returning last candidate"
            );
        }

        let reintegro = rng.gen_range(0..=MAX_REINTEGRO);
        Ok(StrategyResult::new(candidate, reintegro))
    }
}
