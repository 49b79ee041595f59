//! ForecastLab Core: the prediction pipeline from price bars to a backtested return.
//!
//! This crate contains the pure, synchronous heart of the pipeline:
//! - Domain types (price bars, feature vectors, trade events, portfolio state)
//! - Upstream ingest with ordering and duplicate checks
//! - Indicator engine (SMA, EMA, RSI, stochastic %K) and feature assembly
//! - Per-dimension z-score normalization
//! - Range splitting and sliding windows for sequence models
//! - The injected `Predictor` capability
//! - Long/flat backtest simulator with selectable signal strategies

pub mod backtest;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod indicators;
pub mod model;
pub mod normalize;
pub mod windows;

pub use error::InputError;
