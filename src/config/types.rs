//! Configuration types and re-exports

pub use crate::ml_engine::SequenceModelConfig;
pub use crate::strategy::StrategyConfig;
