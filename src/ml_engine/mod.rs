//! ML Engine - sequence model over the draw history
//!
//! - `dataset`: multi-hot encoding and lookback windows
//! - `models`: bidirectional LSTM with a 49-way sigmoid head
//! - `training`: mini-batch Adam on binary cross-entropy
//! - `predictor`: fit-then-predict, one fresh model per call
//!
//! Nothing is persisted between calls; every prediction trains its own model.

pub mod dataset;
pub mod models;
pub mod predictor;
pub mod training;

pub use dataset::{encode_draw, SequenceDataset};
pub use models::BiLstmClassifier;
pub use predictor::{SequencePrediction, SequencePredictor};
pub use training::{Trainer, TrainingReport};

use serde::{Deserialize, Serialize};

/// Sequence model hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceModelConfig {
    /// Draws per input sequence
    pub lookback: usize,
    /// Trailing samples used for training
    pub train_window: usize,
    pub epochs: usize,
    pub batch_size: usize,
    /// LSTM units per direction
    pub hidden_units: usize,
    pub learning_rate: f64,
    /// Trailing draws used for the reintegro mode
    pub reintegro_window: usize,
}

impl Default for SequenceModelConfig {
    fn default() -> Self {
        Self {
            lookback: 10,
            train_window: 200,
            epochs: 10,
            batch_size: 16,
            hidden_units: 64,
            learning_rate: 1e-3,
            reintegro_window: 50,
        }
    }
}

impl SequenceModelConfig {
    /// Smallest history that yields one training sample
    pub fn min_history(&self) -> usize {
        self.lookback + 1
    }
}
