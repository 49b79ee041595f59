//! Seasonality encoding of a bar date.
//!
//! sin/cos(t_ms * 2π / days), with t_ms the UTC-midnight timestamp in milliseconds.
//! Not part of the standard feature vector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Harmonic {
    Sin,
    Cos,
}

pub fn seasonality(date: NaiveDate, harmonic: Harmonic, days: f64) -> f64 {
    let timestamp_ms = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default() as f64;
    let phase = timestamp_ms * (2.0 * std::f64::consts::PI / days);
    match harmonic {
        Harmonic::Sin => phase.sin(),
        Harmonic::Cos => phase.cos(),
    }
}
