//! Training and validation datasets for the external sequence model.
//!
//! A dataset is built from one chronological partition: stats are computed on
//! exactly that partition, every row is normalized with them and the result is
//! cut into windows. Input `i` is window `i`; its label is the normalized
//! close that ends window `i + 1`, so the last window only serves as a label.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use forecastlab_core::domain::{vectors_of, FeatureRow, FeatureVector, CLOSE_INDEX};
use forecastlab_core::normalize::{compute_stats, normalize_fresh, DimensionStats};
use forecastlab_core::windows::{build_windows, FractionRange};
use forecastlab_core::InputError;

/// Rows shown in a dataset preview.
pub const PREVIEW_ROWS: usize = 5;

/// One supervised example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPair {
    /// Date of the newest row of the input window.
    pub end_date: NaiveDate,
    /// `[W, 17]` normalized input, oldest first.
    pub input: Vec<FeatureVector>,
    /// Normalized close of the following row.
    pub label: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub recurrence: usize,
    pub range: FractionRange,
    pub pairs: Vec<TrainingPair>,
    /// Stats of the partition the pairs were normalized with.
    pub stats: Vec<DimensionStats>,
}

/// Build input/label pairs from the `range` partition of `rows`.
pub fn make_dataset(
    rows: &[FeatureRow],
    range: FractionRange,
    recurrence: usize,
) -> Result<TrainingSet, InputError> {
    range.validate()?;
    let (base, end) = range.bounds(rows.len());
    let partition = &rows[base..end];
    if partition.is_empty() {
        return Err(InputError::EmptyMatrix);
    }

    let (normalized, stats) = normalize_fresh(&vectors_of(partition))?;
    let windows = build_windows(&normalized, recurrence)?;
    if windows.len() < 2 {
        return Err(InputError::InsufficientBars {
            needed: recurrence + 2,
            got: partition.len(),
        });
    }

    let pairs = windows
        .iter()
        .zip(windows.iter().skip(1))
        .enumerate()
        .map(|(i, (input, next))| TrainingPair {
            end_date: partition[i + recurrence - 1].date,
            input: input.to_vec(),
            label: next[next.len() - 1].0[CLOSE_INDEX],
        })
        .collect();

    Ok(TrainingSet {
        recurrence,
        range,
        pairs,
        stats,
    })
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Consecutive batches of `batch_size` pairs (the last may be short),
    /// presented in an order shuffled by `seed`.
    ///
    /// Pairs inside a batch stay chronological. A zero batch size is treated
    /// as one.
    pub fn batches(&self, batch_size: usize, seed: u64) -> Vec<&[TrainingPair]> {
        let mut batches: Vec<&[TrainingPair]> = self.pairs.chunks(batch_size.max(1)).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        batches.shuffle(&mut rng);
        batches
    }

    /// Labels in pair order.
    pub fn labels(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.label).collect()
    }
}

/// What the operator sees before training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPreview {
    /// The most recent raw rows, newest first.
    pub recent: Vec<FeatureRow>,
    /// Stats over every row.
    pub stats: Vec<DimensionStats>,
    pub row_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

pub fn preview(rows: &[FeatureRow]) -> Result<DatasetPreview, InputError> {
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(InputError::EmptyMatrix),
    };
    Ok(DatasetPreview {
        recent: rows.iter().rev().take(PREVIEW_ROWS).cloned().collect(),
        stats: compute_stats(rows)?,
        row_count: rows.len(),
        first_date: first,
        last_date: last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecastlab_core::domain::FEATURE_DIM;

    fn rows(n: usize) -> Vec<FeatureRow> {
        let base = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        (0..n)
            .map(|i| {
                let mut values = [0.0; FEATURE_DIM];
                for (d, v) in values.iter_mut().enumerate() {
                    *v = 10.0 + i as f64 + d as f64 * 0.5;
                }
                FeatureRow {
                    date: base + chrono::Duration::days(i as i64),
                    values: FeatureVector(values),
                }
            })
            .collect()
    }

    #[test]
    fn labels_are_next_window_close() {
        let rows = rows(10);
        let set = make_dataset(&rows, FractionRange::FULL, 3).unwrap();

        // 10 rows → 7 windows → 6 pairs
        assert_eq!(set.len(), 6);
        assert_eq!(set.stats.len(), FEATURE_DIM);
        for (i, pair) in set.pairs.iter().enumerate() {
            assert_eq!(pair.input.len(), 3);
            assert_eq!(pair.end_date, rows[i + 2].date);
            let expected = set.stats[CLOSE_INDEX].scale(rows[i + 3].values.close());
            assert!((pair.label - expected).abs() < 1e-12);
            // the label is the close that follows the input window
            let next_input_last = set.pairs.get(i + 1).map(|p| p.input[2].close());
            if let Some(next) = next_input_last {
                assert!((pair.label - next).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn stats_come_from_the_partition_only() {
        let rows = rows(20);
        let set = make_dataset(&rows, FractionRange { lo: 0.0, hi: 0.5 }, 2).unwrap();
        let (base, end) = FractionRange { lo: 0.0, hi: 0.5 }.bounds(rows.len());
        let expected = compute_stats(&rows[base..end]).unwrap();
        assert_eq!(set.stats, expected);
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let rows = rows(4);
        assert_eq!(
            make_dataset(&rows, FractionRange::FULL, 3),
            Err(InputError::InsufficientBars { needed: 5, got: 4 })
        );
        assert!(matches!(
            make_dataset(&rows, FractionRange { lo: 0.5, hi: 0.2 }, 2),
            Err(InputError::InvalidRange { .. })
        ));
    }

    #[test]
    fn batches_keep_contents_and_shuffle_order() {
        let set = make_dataset(&rows(80), FractionRange::FULL, 4).unwrap();
        let batches = set.batches(32, 42);

        // 76 windows → 75 pairs → 32 + 32 + 11
        assert_eq!(batches.len(), 3);
        let mut sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![11, 32, 32]);

        for batch in &batches {
            assert!(batch.windows(2).all(|w| w[0].end_date < w[1].end_date));
        }
        assert_eq!(batches, set.batches(32, 42));
    }

    #[test]
    fn zero_batch_size_is_one() {
        let set = make_dataset(&rows(6), FractionRange::FULL, 2).unwrap();
        assert_eq!(set.batches(0, 1).len(), set.len());
    }

    #[test]
    fn preview_is_newest_first() {
        let rows = rows(12);
        let p = preview(&rows).unwrap();
        assert_eq!(p.recent.len(), PREVIEW_ROWS);
        assert_eq!(p.recent[0].date, rows[11].date);
        assert_eq!(p.recent[4].date, rows[7].date);
        assert_eq!(p.row_count, 12);
        assert_eq!(p.first_date, rows[0].date);
        assert_eq!(p.stats, compute_stats(&rows).unwrap());
        assert_eq!(preview(&[]), Err(InputError::EmptyMatrix));
    }
}
