//! Core types used throughout LottoMind
//!
//! Draw records, strategy results and the ball pool constants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest ball number in the main pool (balls are 1..=49)
pub const BALL_COUNT: usize = 49;

/// Main numbers drawn per game
pub const PICK_COUNT: usize = 6;

/// Reintegro digits are 0..=9
pub const MAX_REINTEGRO: u8 = 9;

/// One historical draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Calendar date of the draw (natural key)
    pub date: NaiveDate,
    /// The six main numbers, in the order the feed reported them
    pub numbers: [u8; PICK_COUNT],
    /// Complementary ball (0 when the feed did not report one)
    pub complementary: u8,
    /// Reintegro digit (0 when the feed did not report one)
    pub reintegro: u8,
}

impl DrawRecord {
    pub fn contains(&self, ball: u8) -> bool {
        self.numbers.contains(&ball)
    }

    /// Main numbers sorted ascending
    pub fn sorted_numbers(&self) -> [u8; PICK_COUNT] {
        let mut numbers = self.numbers;
        numbers.sort_unstable();
        numbers
    }
}

impl fmt::Display for DrawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} C:{} R:{}",
            self.date,
            format_numbers(&self.numbers),
            self.complementary,
            self.reintegro
        )
    }
}

/// Six recommended numbers plus a reintegro digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Sorted ascending, distinct, in 1..=49
    pub numbers: [u8; PICK_COUNT],
    /// 0..=9
    pub reintegro: u8,
}

impl StrategyResult {
    /// Build a result, sorting the numbers ascending
    pub fn new(mut numbers: [u8; PICK_COUNT], reintegro: u8) -> Self {
        numbers.sort_unstable();
        Self { numbers, reintegro }
    }

    /// Build from the first six balls yielded by `balls`.
    /// Returns `None` when fewer than six are available.
    pub fn from_balls(balls: impl IntoIterator<Item = u8>, reintegro: u8) -> Option<Self> {
        let mut numbers = [0u8; PICK_COUNT];
        let mut filled = 0;
        for (slot, ball) in numbers.iter_mut().zip(balls) {
            *slot = ball;
            filled += 1;
        }
        (filled == PICK_COUNT).then(|| Self::new(numbers, reintegro))
    }

    /// Sorted, distinct, in range
    pub fn is_valid(&self) -> bool {
        let in_range = self
            .numbers
            .iter()
            .all(|&n| (1..=BALL_COUNT as u8).contains(&n));
        let strictly_sorted = self.numbers.windows(2).all(|w| w[0] < w[1]);
        in_range && strictly_sorted && self.reintegro <= MAX_REINTEGRO
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | R: {}", format_numbers(&self.numbers), self.reintegro)
    }
}

fn format_numbers(numbers: &[u8]) -> String {
    let parts: Vec<String> = numbers.iter().map(|n| format!("{:>2}", n)).collect();
    format!("[{}]", parts.join(" "))
}
