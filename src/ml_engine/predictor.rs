//! Sequence predictor - fit on the trailing history, score the next draw

use crate::error::EngineError;
use crate::ml_engine::dataset::SequenceDataset;
use crate::ml_engine::training::{Trainer, TrainingReport};
use crate::ml_engine::SequenceModelConfig;
use crate::types::{DrawRecord, PICK_COUNT};
use ndarray::Array1;
use rand::Rng;
use tracing::debug;

/// Output of one fit-and-predict run
#[derive(Debug, Clone)]
pub struct SequencePrediction {
    /// Probability per ball (index = ball - 1)
    pub probabilities: Array1<f64>,
    /// Six most likely balls, ascending
    pub numbers: [u8; PICK_COUNT],
    pub report: TrainingReport,
}

pub struct SequencePredictor {
    config: SequenceModelConfig,
}

impl SequencePredictor {
    pub fn new(config: SequenceModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SequenceModelConfig {
        &self.config
    }

    /// Train a new model on `draws` (oldest first) and predict the next draw
    pub fn predict(
        &self,
        draws: &[DrawRecord],
        rng: &mut impl Rng,
    ) -> Result<SequencePrediction, EngineError> {
        let required = self.config.min_history();
        if draws.len() < required {
            return Err(EngineError::InsufficientHistory {
                strategy: "engineer",
                required,
                available: draws.len(),
            });
        }

        let dataset = SequenceDataset::new(draws, self.config.lookback, self.config.train_window);
        let (model, report) = Trainer::new(self.config.clone()).fit(&dataset, rng);
        debug!(%report, "Sequence model trained");

        let window = dataset
            .latest_window()
            .ok_or(EngineError::InsufficientHistory {
                strategy: "engineer",
                required,
                available: draws.len(),
            })?;
        let probabilities = model.predict(window);
        let numbers = top_balls(&probabilities);

        Ok(SequencePrediction {
            probabilities,
            numbers,
            report,
        })
    }
}

/// The six highest-probability balls, ascending. Ties keep the lower ball.
pub fn top_balls(probabilities: &Array1<f64>) -> [u8; PICK_COUNT] {
    let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, (idx, _)) in numbers.iter_mut().zip(&ranked) {
        *slot = (*idx + 1) as u8;
    }
    numbers.sort_unstable();
    numbers
}
