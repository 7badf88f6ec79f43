//! Engineer - bidirectional LSTM over the recent draw sequence

use crate::error::EngineError;
use crate::ml_engine::{SequenceModelConfig, SequencePredictor};
use crate::repository::HistoricalDataset;
use crate::strategy::statistician::reintegro_mode;
use crate::strategy::{DrawStrategy, StrategyKind};
use crate::types::StrategyResult;
use rand::rngs::StdRng;
use tracing::info;

pub struct Engineer {
    predictor: SequencePredictor,
}

impl Engineer {
    pub fn new(config: SequenceModelConfig) -> Self {
        Self {
            predictor: SequencePredictor::new(config),
        }
    }
}

impl DrawStrategy for Engineer {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Engineer
    }

    fn recommend(
        &self,
        dataset: &HistoricalDataset,
        rng: &mut StdRng,
    ) -> Result<StrategyResult, EngineError> {
        let config = self.predictor.config();
        if dataset.len() < config.min_history() {
            return Err(EngineError::InsufficientHistory {
                strategy: self.name(),
                required: config.min_history(),
                available: dataset.len(),
            });
        }

        // the model only ever sees the training window plus one lookback
        let history = dataset.tail(config.train_window + config.lookback);

        let prediction = self.predictor.predict(history, rng)?;
        let reintegro = reintegro_mode(dataset.tail(config.reintegro_window)).unwrap_or(0);

        info!(
            samples = prediction.report.samples,
            loss = prediction.report.final_loss().unwrap_or_default(),
            "🧠 Sequence model prediction ready"
        );
        Ok(StrategyResult::new(prediction.numbers, reintegro))
    }
}
