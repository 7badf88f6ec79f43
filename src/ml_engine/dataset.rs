//! Draw encoding and lookback windows for the sequence model

use crate::types::{DrawRecord, BALL_COUNT};
use ndarray::{s, Array1, Array2, ArrayView2};

/// 49-dim multi-hot vector, index `ball - 1` set to 1.0
pub fn encode_draw(draw: &DrawRecord) -> Array1<f64> {
    let mut v = Array1::zeros(BALL_COUNT);
    for &b in &draw.numbers {
        if (1..=BALL_COUNT as u8).contains(&b) {
            v[(b - 1) as usize] = 1.0;
        }
    }
    v
}

/// Encoded history: one row per draw, oldest first
pub fn encode_history(draws: &[DrawRecord]) -> Array2<f64> {
    let mut matrix = Array2::zeros((draws.len(), BALL_COUNT));
    for (i, draw) in draws.iter().enumerate() {
        matrix.row_mut(i).assign(&encode_draw(draw));
    }
    matrix
}

/// Sliding windows of `lookback` draws, each labelled with the draw after it
#[derive(Debug, Clone)]
pub struct SequenceDataset {
    encoded: Array2<f64>,
    lookback: usize,
    /// Index of the first target row used for training
    first_target: usize,
}

impl SequenceDataset {
    /// Windows over `draws`, keeping only the last `train_window` samples
    pub fn new(draws: &[DrawRecord], lookback: usize, train_window: usize) -> Self {
        let encoded = encode_history(draws);
        let total_samples = draws.len().saturating_sub(lookback);
        let skipped = total_samples.saturating_sub(train_window);
        Self {
            encoded,
            lookback,
            first_target: lookback + skipped,
        }
    }

    /// Number of training samples
    pub fn len(&self) -> usize {
        self.encoded.nrows().saturating_sub(self.first_target)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Input sequence (lookback x 49) and target (49) of sample `i`
    pub fn sample(&self, i: usize) -> (ArrayView2<'_, f64>, Array1<f64>) {
        let target = self.first_target + i;
        let window = self.encoded.slice(s![target - self.lookback..target, ..]);
        (window, self.encoded.row(target).to_owned())
    }

    /// The most recent `lookback` draws, the inference input.
    /// `None` when the history is shorter than the lookback.
    pub fn latest_window(&self) -> Option<ArrayView2<'_, f64>> {
        let n = self.encoded.nrows();
        (n >= self.lookback && self.lookback > 0)
            .then(|| self.encoded.slice(s![n - self.lookback..n, ..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn history(n: usize) -> Vec<DrawRecord> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let base = (i % 40) as u8 + 1;
                DrawRecord {
                    date: start + Duration::days(i as i64),
                    numbers: [base, base + 1, base + 2, base + 3, base + 4, base + 5],
                    complementary: 49,
                    reintegro: (i % 10) as u8,
                }
            })
            .collect()
    }

    #[test]
    fn test_encode_draw_sets_six_positions() {
        let draws = history(1);
        let v = encode_draw(&draws[0]);
        assert_eq!(v.len(), 49);
        assert!((v.sum() - 6.0).abs() < 1e-12);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[5], 1.0);
        assert_eq!(v[6], 0.0);
    }

    #[test]
    fn test_window_count() {
        let dataset = SequenceDataset::new(&history(25), 10, 200);
        assert_eq!(dataset.len(), 15);

        let capped = SequenceDataset::new(&history(300), 10, 200);
        assert_eq!(capped.len(), 200);

        let short = SequenceDataset::new(&history(10), 10, 200);
        assert!(short.is_empty());
        assert!(short.latest_window().is_some());
    }

    #[test]
    fn test_sample_targets_follow_window() {
        let draws = history(15);
        let dataset = SequenceDataset::new(&draws, 10, 200);

        let (window, target) = dataset.sample(0);
        assert_eq!(window.nrows(), 10);
        assert_eq!(window.row(0), encode_draw(&draws[0]));
        assert_eq!(target, encode_draw(&draws[10]));

        let (_, last_target) = dataset.sample(dataset.len() - 1);
        assert_eq!(last_target, encode_draw(&draws[14]));
    }

    #[test]
    fn test_train_window_keeps_latest_samples() {
        let draws = history(40);
        let dataset = SequenceDataset::new(&draws, 10, 5);
        assert_eq!(dataset.len(), 5);

        let (window, target) = dataset.sample(0);
        assert_eq!(window.row(0), encode_draw(&draws[25]));
        assert_eq!(target, encode_draw(&draws[35]));

        let latest = dataset.latest_window().unwrap();
        assert_eq!(latest.row(9), encode_draw(&draws[39]));
    }
}
