//! LottoMind Library
//!
//! La Primitiva draw history with incremental sync, plus a three-strategy
//! recommendation ensemble merged by plurality vote.

pub mod config;
pub mod error;
pub mod feed;
pub mod ml_engine;
pub mod persistence;
pub mod repository;
pub mod strategy;
pub mod types;
