//! Input errors shared by every pipeline stage.

use chrono::NaiveDate;
use thiserror::Error;

/// The caller supplied input the pipeline cannot turn into meaningful output.
///
/// Numeric degeneracies (flat stochastic windows, zero variance, zero RSI
/// losses) are not errors; they have fixed fallback values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("duplicate bar for date {0}")]
    DuplicateDate(NaiveDate),

    #[error("bars are not in ascending date order at {0}")]
    Unordered(NaiveDate),

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid {field} '{value}' on {date}")]
    InvalidNumber {
        date: NaiveDate,
        field: &'static str,
        value: String,
    },

    #[error("bar on {0} has non-finite prices, a non-positive close or negative volume")]
    InvalidBar(NaiveDate),

    #[error("need at least {needed} bars, got {got}")]
    InsufficientBars { needed: usize, got: usize },

    #[error("recurrence must be at least 2, got {0}")]
    InvalidRecurrence(usize),

    #[error("range [{lo}, {hi}] is not an ordered sub-interval of [0, 1]")]
    InvalidRange { lo: f64, hi: f64 },

    #[error("cannot compute statistics of an empty matrix")]
    EmptyMatrix,

    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("statistics cover {got} dimensions, matrix has {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("strategy must be 1, 2 or 3, got {0}")]
    InvalidStrategy(u8),
}
