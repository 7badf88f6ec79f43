//! Strategy Engine - three independent recommenders and their vote
//!
//! - Engineer: sequence model over recent draws
//! - Statistician: overdue/popular balls
//! - Game theory: constrained random tickets
//!
//! `LottoEngines` owns the loaded history and the RNG, runs the strategies and
//! merges their picks through `consensus::aggregate`.

pub mod consensus;
pub mod engineer;
pub mod game_theory;
pub mod statistician;
mod strategy_trait;

pub use consensus::aggregate;
pub use engineer::Engineer;
pub use game_theory::GameTheory;
pub use statistician::{frequency_table, BallStats, Statistician};
pub use strategy_trait::DrawStrategy;

use crate::error::EngineError;
use crate::ml_engine::SequenceModelConfig;
use crate::repository::HistoricalDataset;
use crate::types::StrategyResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// The strategies, in the order `run_all` invokes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Engineer,
    Statistician,
    GameTheory,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Engineer,
        StrategyKind::Statistician,
        StrategyKind::GameTheory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Engineer => "engineer",
            StrategyKind::Statistician => "statistician",
            StrategyKind::GameTheory => "game-theory",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "engineer" => Ok(StrategyKind::Engineer),
            "statistician" => Ok(StrategyKind::Statistician),
            "game-theory" | "gametheory" => Ok(StrategyKind::GameTheory),
            other => Err(format!(
                "unknown strategy '{}' (expected engineer, statistician or game-theory)",
                other
            )),
        }
    }
}

/// Strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Rejection sampler bound for the game theory strategy
    pub max_sampler_attempts: usize,
    pub sequence: SequenceModelConfig,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_sampler_attempts: 10_000,
            sequence: SequenceModelConfig::default(),
            seed: None,
        }
    }
}

/// The three picks and their consensus
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleReport {
    pub results: Vec<(StrategyKind, StrategyResult)>,
    pub consensus: StrategyResult,
}

impl EnsembleReport {
    pub fn result(&self, kind: StrategyKind) -> Option<&StrategyResult> {
        self.results
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r)
    }
}

/// Strategy ensemble over one loaded history
pub struct LottoEngines {
    dataset: HistoricalDataset,
    config: StrategyConfig,
    rng: StdRng,
}

impl LottoEngines {
    pub fn new(dataset: HistoricalDataset, config: StrategyConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dataset,
            config,
            rng,
        }
    }

    pub fn dataset(&self) -> &HistoricalDataset {
        &self.dataset
    }

    fn strategy(&self, kind: StrategyKind) -> Box<dyn DrawStrategy> {
        match kind {
            StrategyKind::Engineer => Box::new(Engineer::new(self.config.sequence.clone())),
            StrategyKind::Statistician => Box::new(Statistician::new()),
            StrategyKind::GameTheory => Box::new(GameTheory::new(self.config.max_sampler_attempts)),
        }
    }

    /// Run one strategy
    pub fn run(&mut self, kind: StrategyKind) -> Result<StrategyResult, EngineError> {
        let strategy = self.strategy(kind);
        let result = strategy.recommend(&self.dataset, &mut self.rng);
        match &result {
            Ok(r) => info!(strategy = %kind, numbers = %r, "Strategy recommendation"),
            Err(e) => warn!(strategy = %kind, error = %e, "Strategy failed"),
        }
        result
    }

    /// Run every strategy, then vote
    pub fn run_all(&mut self) -> Result<EnsembleReport, EngineError> {
        let mut results = Vec::with_capacity(StrategyKind::ALL.len());
        for kind in StrategyKind::ALL {
            results.push((kind, self.run(kind)?));
        }

        let picks: Vec<StrategyResult> = results.iter().map(|(_, r)| *r).collect();
        let consensus = aggregate(&picks)?;
        info!(consensus = %consensus, "🎯 Consensus ready");

        Ok(EnsembleReport { results, consensus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("engineer".parse::<StrategyKind>(), Ok(StrategyKind::Engineer));
        assert_eq!("Game_Theory".parse::<StrategyKind>(), Ok(StrategyKind::GameTheory));
        assert!("oracle".parse::<StrategyKind>().is_err());
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_report_lookup() {
        let pick = StrategyResult::new([1, 2, 3, 4, 5, 6], 0);
        let report = EnsembleReport {
            results: vec![(StrategyKind::Statistician, pick)],
            consensus: pick,
        };
        assert_eq!(report.result(StrategyKind::Statistician), Some(&pick));
        assert!(report.result(StrategyKind::Engineer).is_none());
    }
}
