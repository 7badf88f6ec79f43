//! Strategy Trait - common shape of the three recommendation strategies

use crate::error::EngineError;
use crate::repository::HistoricalDataset;
use crate::strategy::StrategyKind;
use crate::types::StrategyResult;
use rand::rngs::StdRng;

/// A strategy reads the history and proposes six numbers plus a reintegro.
/// Strategies never mutate the dataset.
pub trait DrawStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Produce one recommendation
    fn recommend(
        &self,
        dataset: &HistoricalDataset,
        rng: &mut StdRng,
    ) -> Result<StrategyResult, EngineError>;

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}
