//! Range extraction on the elapsed-seconds axis.

use serde::{Deserialize, Serialize};

use crate::series::{Field, Series, ELAPSED_COLUMN};

/// Inclusive `[start, end]` bounds in elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

/// Keeps the rows with `start <= elapsed_seconds <= end` and shifts them so the
/// earliest kept row sits at zero.
///
/// Returns an empty series when nothing falls in the window, including when
/// `start >= end`; callers are expected to have checked the bounds.
pub fn cut(series: &Series, start: f64, end: f64) -> Series {
    cut_window(series, TimeWindow::new(start, end))
}

pub fn cut_window(series: &Series, window: TimeWindow) -> Series {
    let kept: Vec<_> = series
        .iter()
        .filter(|record| record.elapsed().is_some_and(|t| window.contains(t)))
        .cloned()
        .collect();

    let Some(origin) = kept
        .iter()
        .filter_map(|record| record.elapsed())
        .reduce(f64::min)
    else {
        return Series::new();
    };

    kept.into_iter()
        .map(|mut record| {
            if let Some(t) = record.elapsed() {
                record.insert(ELAPSED_COLUMN, Field::Number(t - origin));
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Record;

    fn series(times: &[f64]) -> Series {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut record = Record::new();
                record.insert(ELAPSED_COLUMN, t);
                record.insert("v", i as f64);
                record
            })
            .collect()
    }

    fn elapsed(series: &Series) -> Vec<f64> {
        series.iter().filter_map(Record::elapsed).collect()
    }

    #[test]
    fn test_cut_is_inclusive_and_rezeroed() {
        let out = cut(&series(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]), 0.5, 2.0);
        assert_eq!(elapsed(&out), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(out.column_values("v"), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_window_between_samples_starts_at_zero() {
        let out = cut(&series(&[0.0, 0.4, 0.8, 1.2]), 0.3, 1.0);
        assert_eq!(out.len(), 2);
        assert_eq!(out.records()[0].elapsed(), Some(0.0));
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let input = series(&(0..=10).map(f64::from).collect::<Vec<_>>());
        assert!(cut(&input, 1000.0, 2000.0).is_empty());
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let input = series(&[0.0, 1.0, 2.0]);
        assert!(cut(&input, 2.0, 1.0).is_empty());
        assert!(!TimeWindow::new(2.0, 1.0).is_valid());
    }

    #[test]
    fn test_degenerate_window_keeps_instant() {
        let out = cut(&series(&[0.0, 1.0, 2.0]), 1.0, 1.0);
        assert_eq!(elapsed(&out), vec![0.0]);
    }

    #[test]
    fn test_rows_without_elapsed_are_skipped() {
        let mut input = series(&[0.0, 1.0]);
        input.push([("v", "orphan")].into_iter().collect());
        assert_eq!(cut(&input, 0.0, 5.0).len(), 2);
    }
}
