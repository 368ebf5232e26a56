use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::resample::elapsed_axis;
use crate::series::{Field, Record, Series, ELAPSED_COLUMN};

/// Largest output a single fixed-rate call will allocate.
pub const MAX_OUTPUT_ROWS: usize = 10_000_000;

/// Resamples onto `t_i = t_0 + i / hz` for `i = 0..=floor((t_last - t_0) * hz)`.
///
/// Each output row carries `elapsed_seconds` followed by the `numeric`
/// columns in source order; other columns are dropped. Rows must be in
/// ascending `elapsed_seconds` order for the bracketing search to be
/// meaningful. A duration and rate that would produce more than
/// [`MAX_OUTPUT_ROWS`] rows is a [`Error::Config`].
pub fn to_fixed_rate(series: &Series, numeric: &BTreeSet<String>, hz: f64) -> Result<Series> {
    let times = elapsed_axis(series)?;
    let (Some(&start), Some(&end), Some(first)) = (times.first(), times.last(), series.first())
    else {
        return Ok(Series::new());
    };

    let columns: Vec<&str> = first
        .columns()
        .filter(|c| *c != ELAPSED_COLUMN && numeric.contains(*c))
        .collect();
    let values: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| {
            series
                .iter()
                .map(|r| r.get(column).and_then(Field::to_number).unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    let count = output_rows(end - start, hz)?;

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let t = start + i as f64 / hz;
        let (before, after) = bracket(&times, t);

        let mut span = times[after] - times[before];
        if span == 0.0 {
            span = 1.0;
        }
        let ratio = (t - times[before]) / span;

        let mut record = Record::with_capacity(columns.len() + 1);
        record.insert(ELAPSED_COLUMN, t);
        for (column, column_values) in columns.iter().zip(&values) {
            let lo = column_values[before];
            let hi = column_values[after];
            record.insert(*column, lo + ratio * (hi - lo));
        }
        out.push(record);
    }
    Ok(Series::from_records(out))
}

/// `floor(duration * hz) + 1`, or 0 for a negative duration.
fn output_rows(duration: f64, hz: f64) -> Result<usize> {
    let frames = (duration * hz).floor();
    if frames < 0.0 {
        return Ok(0);
    }
    let too_many = || {
        Error::config(format!(
            "{hz} Hz over {duration}s exceeds {MAX_OUTPUT_ROWS} output rows"
        ))
    };
    if !frames.is_finite() || frames >= MAX_OUTPUT_ROWS as f64 {
        return Err(too_many());
    }
    (frames as usize).checked_add(1).ok_or_else(too_many)
}

/// Indices of the last sample at or before `t` and the sample after it,
/// both clamped to the ends of `times`. `times` must be non-empty.
fn bracket(times: &[f64], t: f64) -> (usize, usize) {
    let idx = times.partition_point(|&x| x <= t);
    let before = idx.saturating_sub(1);
    let after = idx.min(times.len() - 1);
    (before, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::{coerce_numeric, detect_numeric_columns};

    fn series(times: &[f64], values: &[f64]) -> Series {
        times
            .iter()
            .zip(values)
            .map(|(&t, &v)| {
                let mut record = Record::new();
                record.insert("time", "x");
                record.insert("v", format!("{v}"));
                record.insert(ELAPSED_COLUMN, t);
                record
            })
            .collect()
    }

    fn run(series: &Series, hz: f64) -> Series {
        let numeric = detect_numeric_columns(series);
        let coerced = coerce_numeric(series, &numeric);
        to_fixed_rate(&coerced, &numeric, hz).expect("interpolate")
    }

    fn column(series: &Series, name: &str) -> Vec<f64> {
        series
            .iter()
            .map(|r| r.get(name).and_then(Field::as_number).expect("number"))
            .collect()
    }

    #[test]
    fn test_two_hz_scenario() {
        let out = run(&series(&[0.0, 1.0, 2.0, 3.0], &[0.0, 10.0, 20.0, 30.0]), 2.0);
        assert_eq!(out.len(), 7);
        assert_eq!(column(&out, ELAPSED_COLUMN), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(column(&out, "v"), vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        assert_eq!(out.columns(), vec![ELAPSED_COLUMN, "v"]);
    }

    #[test]
    fn test_exact_sample_is_reproduced() {
        let out = run(&series(&[0.0, 0.3, 0.7, 1.0], &[1.5, -2.25, 7.125, 3.0]), 10.0);
        assert_eq!(out.len(), 11);
        assert_eq!(out.records()[0].get("v"), Some(&Field::Number(1.5)));
        assert_eq!(out.records()[10].get("v"), Some(&Field::Number(3.0)));
    }

    #[test]
    fn test_row_count_follows_duration() {
        let out = run(&series(&[0.0, 0.4, 1.25], &[0.0, 1.0, 2.0]), 30.0);
        assert_eq!(out.len(), (1.25_f64 * 30.0).floor() as usize + 1);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_divide_by_zero() {
        let out = run(&series(&[0.0, 1.0, 1.0, 2.0], &[0.0, 10.0, 12.0, 20.0]), 1.0);
        let values = column(&out, "v");
        assert!(values.iter().all(|v| v.is_finite()));
        assert_eq!(values, vec![0.0, 12.0, 20.0]);
    }

    #[test]
    fn test_single_row() {
        let out = run(&series(&[0.0], &[4.0]), 30.0);
        assert_eq!(out.len(), 1);
        assert_eq!(column(&out, "v"), vec![4.0]);
    }

    #[test]
    fn test_empty() {
        assert!(run(&Series::new(), 30.0).is_empty());
    }

    #[test]
    fn test_huge_rate_is_rejected() {
        let input = series(&[0.0, 10.0], &[1.0, 2.0]);
        let numeric = detect_numeric_columns(&input);
        let coerced = coerce_numeric(&input, &numeric);
        let err = to_fixed_rate(&coerced, &numeric, 1e300).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_output_rows_bounds() {
        assert_eq!(output_rows(3.0, 2.0).unwrap(), 7);
        assert_eq!(output_rows(-1.0, 2.0).unwrap(), 0);
        assert_eq!(output_rows(0.0, 30.0).unwrap(), 1);
        assert!(output_rows(1.0, MAX_OUTPUT_ROWS as f64).is_err());
        assert!(output_rows(1.0, f64::MAX).is_err());
    }

    #[test]
    fn test_bracket_clamps() {
        let times = [0.0, 1.0, 2.0];
        assert_eq!(bracket(&times, -1.0), (0, 0));
        assert_eq!(bracket(&times, 0.0), (0, 1));
        assert_eq!(bracket(&times, 1.5), (1, 2));
        assert_eq!(bracket(&times, 2.0), (2, 2));
        assert_eq!(bracket(&times, 9.0), (2, 2));
    }
}
