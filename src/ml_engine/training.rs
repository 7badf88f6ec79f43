//! Training loop - mini-batch Adam on binary cross-entropy

use crate::ml_engine::dataset::SequenceDataset;
use crate::ml_engine::models::{BiLstmClassifier, BiLstmGradients};
use crate::ml_engine::SequenceModelConfig;
use crate::types::BALL_COUNT;
use ndarray::Zip;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-7;

/// Adam optimizer state (first and second moments per parameter)
struct Adam {
    lr: f64,
    step: i32,
    m: BiLstmGradients,
    v: BiLstmGradients,
}

impl Adam {
    fn new(model: &BiLstmClassifier, lr: f64) -> Self {
        Self {
            lr,
            step: 0,
            m: model.zeros_like(),
            v: model.zeros_like(),
        }
    }

    fn apply(&mut self, model: &mut BiLstmClassifier, grads: &BiLstmGradients) {
        self.step += 1;
        let lr_t = self.lr * (1.0 - BETA2.powi(self.step)).sqrt() / (1.0 - BETA1.powi(self.step));

        let params = model.tensors_mut();
        let grads = grads.tensors();
        let ms = self.m.tensors_mut();
        let vs = self.v.tensors_mut();

        for (((p, g), m), v) in params.into_iter().zip(grads).zip(ms).zip(vs) {
            Zip::from(p)
                .and(g)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    *m = BETA1 * *m + (1.0 - BETA1) * g;
                    *v = BETA2 * *v + (1.0 - BETA2) * g * g;
                    *p -= lr_t * *m / (v.sqrt() + ADAM_EPS);
                });
        }
    }
}

/// Loss curve of one fit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    pub samples: usize,
    /// Mean sample loss per epoch
    pub epoch_losses: Vec<f64>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.epoch_losses.first(), self.epoch_losses.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "{} samples, {} epochs, loss {:.4} -> {:.4}",
                self.samples,
                self.epoch_losses.len(),
                first,
                last
            ),
            _ => write!(f, "{} samples, not trained", self.samples),
        }
    }
}

pub struct Trainer {
    config: SequenceModelConfig,
}

impl Trainer {
    pub fn new(config: SequenceModelConfig) -> Self {
        Self { config }
    }

    /// Fit a freshly initialised model on `dataset`
    pub fn fit(
        &self,
        dataset: &SequenceDataset,
        rng: &mut impl Rng,
    ) -> (BiLstmClassifier, TrainingReport) {
        let mut model =
            BiLstmClassifier::new(BALL_COUNT, self.config.hidden_units.max(1), BALL_COUNT, rng);
        let mut optimizer = Adam::new(&model, self.config.learning_rate);
        let batch_size = self.config.batch_size.max(1);

        let mut report = TrainingReport {
            samples: dataset.len(),
            epoch_losses: Vec::with_capacity(self.config.epochs),
        };
        if dataset.is_empty() {
            return (model, report);
        }

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        for epoch in 0..self.config.epochs {
            order.shuffle(rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(batch_size) {
                let mut grads = model.zeros_like();
                let scale = 1.0 / batch.len() as f64;
                for &i in batch {
                    let (window, target) = dataset.sample(i);
                    epoch_loss += model.accumulate_gradients(window, &target, scale, &mut grads);
                }
                optimizer.apply(&mut model, &grads);
            }

            let mean_loss = epoch_loss / dataset.len() as f64;
            debug!(epoch = epoch + 1, loss = mean_loss, "Sequence model epoch");
            report.epoch_losses.push(mean_loss);
        }

        (model, report)
    }
}
