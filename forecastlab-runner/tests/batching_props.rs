//! Property tests for dataset batching and config identity.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use forecastlab_core::domain::{FeatureRow, FeatureVector, FEATURE_DIM};
use forecastlab_core::windows::FractionRange;
use forecastlab_runner::{make_dataset, PipelineConfig};

fn rows(n: usize) -> Vec<FeatureRow> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..n)
        .map(|i| FeatureRow {
            date: base + Duration::days(i as i64),
            values: FeatureVector([50.0 + (i as f64 * 0.7).sin() * 3.0; FEATURE_DIM]),
        })
        .collect()
}

proptest! {
    #[test]
    fn batches_partition_every_pair(n in 8usize..150, w in 2usize..6, size in 1usize..40, seed: u64) {
        let set = make_dataset(&rows(n), FractionRange::FULL, w).unwrap();
        prop_assert_eq!(set.len(), n - w - 1);

        let batches = set.batches(size, seed);
        prop_assert_eq!(batches.len(), set.len().div_ceil(size));
        prop_assert!(batches.iter().filter(|b| b.len() < size).count() <= 1);

        let mut dates: Vec<NaiveDate> = batches.iter().flat_map(|b| b.iter().map(|p| p.end_date)).collect();
        dates.sort();
        let expected: Vec<NaiveDate> = set.pairs.iter().map(|p| p.end_date).collect();
        prop_assert_eq!(dates, expected);
    }

    #[test]
    fn same_seed_same_order(n in 8usize..80, seed: u64) {
        let set = make_dataset(&rows(n), FractionRange::FULL, 2).unwrap();
        prop_assert_eq!(set.batches(4, seed), set.batches(4, seed));
    }

    #[test]
    fn run_id_tracks_recurrence(a in 2usize..64, b in 2usize..64) {
        let ca = PipelineConfig { recurrence: a, ..PipelineConfig::default() };
        let cb = PipelineConfig { recurrence: b, ..PipelineConfig::default() };
        prop_assert_eq!(a == b, ca.run_id().unwrap() == cb.run_id().unwrap());
    }
}
