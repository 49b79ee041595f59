//! Range splitting and sliding windows.
//!
//! `select_range` carves contiguous, chronologically ordered partitions out of
//! a series (no shuffling across time). `build_windows` slices a partition into
//! overlapping fixed-length sequences for the model.

use crate::error::InputError;

/// Smallest usable window length.
pub const MIN_RECURRENCE: usize = 2;

/// Window lengths above this are allowed but unusually long for daily data.
pub const PRACTICAL_MAX_RECURRENCE: usize = 32;

/// A fractional interval `[lo, hi]` of an ordered series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FractionRange {
    pub lo: f64,
    pub hi: f64,
}

impl FractionRange {
    pub const FULL: FractionRange = FractionRange { lo: 0.0, hi: 1.0 };

    pub fn new(lo: f64, hi: f64) -> Result<Self, InputError> {
        let range = Self { lo, hi };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if in_unit(self.lo) && in_unit(self.hi) && self.lo <= self.hi {
            Ok(())
        } else {
            Err(InputError::InvalidRange {
                lo: self.lo,
                hi: self.hi,
            })
        }
    }

    /// Index bounds `[base, end)` of this range within a series of length `n`.
    ///
    /// `base = 0` when `lo == 0`, else `ceil(lo * n) - 1`.
    /// `end = n` when `hi == 1`, else `base + 1 + floor((hi - lo) * n)`.
    /// Both bounds are clamped to `n`.
    pub fn bounds(&self, n: usize) -> (usize, usize) {
        let len = n as f64;
        let base = if self.lo == 0.0 {
            0
        } else {
            ((self.lo * len).ceil() as usize).saturating_sub(1)
        }
        .min(n);
        let end = if self.hi == 1.0 {
            n
        } else {
            (base + 1 + ((self.hi - self.lo) * len).floor() as usize).min(n)
        };
        (base, end)
    }
}

/// Select the slice of `series` covered by `[lo, hi]`.
///
/// Adjacent ranges share their boundary fraction, and the rounding rule can
/// place the boundary element(s) in both partitions.
pub fn select_range<T>(series: &[T], lo: f64, hi: f64) -> Result<&[T], InputError> {
    let (base, end) = FractionRange::new(lo, hi)?.bounds(series.len());
    Ok(&series[base..end])
}

/// Reject window lengths below `MIN_RECURRENCE`.
pub fn check_recurrence(recurrence: usize) -> Result<(), InputError> {
    if recurrence < MIN_RECURRENCE {
        Err(InputError::InvalidRecurrence(recurrence))
    } else {
        Ok(())
    }
}

/// Every contiguous run of exactly `recurrence` items, oldest to newest.
///
/// Windows are ordered by their last element. The final item of `items` is
/// reserved as the next-step label and never ends a window, so `n` items yield
/// `max(0, n - recurrence)` windows.
pub fn build_windows<T>(items: &[T], recurrence: usize) -> Result<Vec<&[T]>, InputError> {
    check_recurrence(recurrence)?;
    let count = items.len().saturating_sub(recurrence);
    Ok(items.windows(recurrence).take(count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_is_identity() {
        let series: Vec<u32> = (0..10).collect();
        assert_eq!(select_range(&series, 0.0, 1.0).unwrap(), &series[..]);
    }

    #[test]
    fn default_splits_on_100_items() {
        let series: Vec<u32> = (0..100).collect();
        let train = select_range(&series, 0.0, 0.7).unwrap();
        let val = select_range(&series, 0.7, 0.9).unwrap();
        let test = select_range(&series, 0.9, 1.0).unwrap();

        // train: [0, 1 + 70)
        assert_eq!(train.first(), Some(&0));
        assert_eq!(train.len(), 71);
        // validation: base = ceil(70) - 1 = 69, end = 69 + 1 + floor(0.2 * 100)
        assert_eq!(val.first(), Some(&69));
        assert_eq!(val.len(), 21);
        // test: base = ceil(90) - 1 = 89, open end
        assert_eq!(test.first(), Some(&89));
        assert_eq!(test.last(), Some(&99));
    }

    #[test]
    fn halves_cover_the_series() {
        let series: Vec<u32> = (0..10).collect();
        let first = select_range(&series, 0.0, 0.5).unwrap();
        let second = select_range(&series, 0.5, 1.0).unwrap();
        assert_eq!(first.first(), Some(&0));
        assert_eq!(second.last(), Some(&9));
        // Contiguous: the second half starts at or before the end of the first.
        assert!(second[0] <= *first.last().unwrap() + 1);
    }

    #[test]
    fn empty_series_and_empty_range() {
        let empty: Vec<u32> = Vec::new();
        assert!(select_range(&empty, 0.3, 0.6).unwrap().is_empty());

        let series: Vec<u32> = (0..10).collect();
        let point = select_range(&series, 0.5, 0.5).unwrap();
        assert_eq!(point, &[4]);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let series = [1, 2, 3];
        assert!(select_range(&series, 0.6, 0.4).is_err());
        assert!(select_range(&series, -0.1, 0.4).is_err());
        assert!(select_range(&series, 0.0, 1.5).is_err());
    }

    #[test]
    fn five_items_window_two() {
        let items = [1, 2, 3, 4, 5];
        let windows = build_windows(&items, 2).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], &[1, 2]);
        assert_eq!(windows[1], &[2, 3]);
        assert_eq!(windows[2], &[3, 4]);
    }

    #[test]
    fn short_input_yields_no_windows() {
        let items = [1, 2, 3];
        assert!(build_windows(&items, 3).unwrap().is_empty());
        assert!(build_windows(&items, 5).unwrap().is_empty());
    }

    #[test]
    fn recurrence_below_two_is_rejected() {
        let items = [1, 2, 3];
        assert_eq!(
            build_windows(&items, 1),
            Err(InputError::InvalidRecurrence(1))
        );
        assert_eq!(
            build_windows(&items, 0),
            Err(InputError::InvalidRecurrence(0))
        );
    }
}
