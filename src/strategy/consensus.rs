//! Consensus - plurality vote over strategy results
//!
//! Every main number counts once per strategy that proposed it. The six most
//! voted numbers win; equal counts keep the order in which numbers were first
//! seen, so the first strategy breaks ties.

use crate::error::EngineError;
use crate::types::{StrategyResult, PICK_COUNT};

/// Vote tally in first-appearance order
fn tally<I>(values: I) -> Vec<(u8, usize)>
where
    I: IntoIterator<Item = u8>,
{
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// Merge strategy results into one
pub fn aggregate(results: &[StrategyResult]) -> Result<StrategyResult, EngineError> {
    let mut votes = tally(results.iter().flat_map(|r| r.numbers));
    if votes.len() < PICK_COUNT {
        return Err(EngineError::NotEnoughVotes(votes.len()));
    }
    votes.sort_by(|a, b| b.1.cmp(&a.1));

    let digits = tally(results.iter().map(|r| r.reintegro));
    let best = digits.iter().map(|&(_, c)| c).max().unwrap_or(0);
    let reintegro = digits
        .iter()
        .find(|&&(_, c)| c == best)
        .map_or(0, |&(d, _)| d);

    StrategyResult::from_balls(votes.iter().map(|&(n, _)| n), reintegro)
        .ok_or(EngineError::NotEnoughVotes(votes.len()))
}
