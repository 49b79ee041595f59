//! Feature assembly: bars + indicator series → dated feature rows.
//!
//! Indicator series have different lengths because each drops a different
//! number of leading values. Before joining, every series (and the raw bar
//! columns) is truncated from the front to the common minimum length, so all
//! rows end on the most recent bar and row `j` of every column refers to the
//! same date.

use rayon::prelude::*;

use crate::domain::bar::{check_ascending, closes};
use crate::domain::{FeatureRow, FeatureVector, PriceBar, FEATURE_DIM};
use crate::error::InputError;
use crate::indicators::{feature_indicators, Indicator};

/// Longest indicator period in the feature vector (SMA-100).
pub const MIN_BARS: usize = 100;

/// Build dated feature rows, oldest first.
///
/// Requires a strictly ascending series of at least `MIN_BARS` bars.
pub fn build_feature_rows(bars: &[PriceBar]) -> Result<Vec<FeatureRow>, InputError> {
    if bars.is_empty() {
        return Err(InputError::EmptySeries);
    }
    check_ascending(bars)?;
    if bars.len() < MIN_BARS {
        return Err(InputError::InsufficientBars {
            needed: MIN_BARS,
            got: bars.len(),
        });
    }

    let indicators = feature_indicators();
    let series = compute_all(&indicators, &closes(bars));
    Ok(join_aligned(bars, &series))
}

/// Compute every indicator over the same close series.
///
/// Indicators are independent of each other, so they run in parallel; each
/// series is still computed sequentially through time.
pub fn compute_all(indicators: &[Box<dyn Indicator>], close: &[f64]) -> Vec<Vec<f64>> {
    indicators.par_iter().map(|ind| ind.compute(close)).collect()
}

/// Join bar columns with indicator series, truncating everything from the front
/// to the shortest length.
fn join_aligned(bars: &[PriceBar], series: &[Vec<f64>]) -> Vec<FeatureRow> {
    let len = series
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(bars.len()))
        .min()
        .unwrap_or(0);

    let bar_offset = bars.len() - len;
    let offsets: Vec<usize> = series.iter().map(|s| s.len() - len).collect();

    (0..len)
        .map(|j| {
            let bar = &bars[bar_offset + j];
            let mut values = [0.0; FEATURE_DIM];
            values[0] = bar.close;
            values[1] = bar.open;
            values[2] = bar.high;
            values[3] = bar.low;
            values[4] = bar.volume;
            for (k, (s, offset)) in series.iter().zip(&offsets).enumerate() {
                values[5 + k] = s[offset + j];
            }
            FeatureRow {
                date: bar.date,
                values: FeatureVector(values),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{ema, rsi, sma, stochastic};
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: base + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0 + i as f64,
            })
            .collect()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn row_count_is_governed_by_sma_100() {
        let bars = make_bars(&wave(130));
        let rows = build_feature_rows(&bars).unwrap();
        assert_eq!(rows.len(), 130 - 99);
    }

    #[test]
    fn rows_end_on_most_recent_bar() {
        let bars = make_bars(&wave(120));
        let rows = build_feature_rows(&bars).unwrap();
        let last_row = rows.last().unwrap();
        let last_bar = bars.last().unwrap();
        assert_eq!(last_row.date, last_bar.date);
        assert_eq!(last_row.values.close(), last_bar.close);
        assert_eq!(rows[0].date, bars[99].date);
    }

    #[test]
    fn columns_are_aligned_to_the_same_date() {
        let closes = wave(120);
        let bars = make_bars(&closes);
        let rows = build_feature_rows(&bars).unwrap();

        let last = rows.last().unwrap().values.0;
        assert_eq!(last[1], bars[119].open);
        assert_eq!(last[4], bars[119].volume);
        assert_eq!(last[5], *ema(10, &closes).last().unwrap());
        assert_eq!(last[11], *sma(100, &closes).last().unwrap());
        assert_eq!(last[14], *rsi(28, &closes).last().unwrap());
        assert_eq!(last[16], *stochastic(14, &closes).last().unwrap());

        // First row sits on bar 99: the only SMA-100 value
        let first = rows[0].values.0;
        assert_eq!(first[11], sma(100, &closes)[0]);
        assert_eq!(first[8], sma(10, &closes)[99 - 9]);
        assert_eq!(first[5], ema(10, &closes)[99 - 1]);
        assert_eq!(first[12], rsi(7, &closes)[99 - 7]);
    }

    #[test]
    fn rejects_short_series() {
        let bars = make_bars(&wave(99));
        assert_eq!(
            build_feature_rows(&bars),
            Err(InputError::InsufficientBars {
                needed: 100,
                got: 99
            })
        );
        assert_eq!(build_feature_rows(&[]), Err(InputError::EmptySeries));
    }

    #[test]
    fn rejects_duplicate_and_unordered_dates() {
        let mut bars = make_bars(&wave(110));
        bars[50].date = bars[49].date;
        assert_eq!(
            build_feature_rows(&bars),
            Err(InputError::DuplicateDate(bars[49].date))
        );

        let mut bars = make_bars(&wave(110));
        bars.swap(10, 11);
        assert!(matches!(
            build_feature_rows(&bars),
            Err(InputError::Unordered(_))
        ));
    }
}
