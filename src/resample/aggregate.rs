use indexmap::IndexMap;

use crate::error::Result;
use crate::normalize::first_regression;
use crate::resample::elapsed_axis;
use crate::series::{Field, Record, Series, ELAPSED_COLUMN};

/// Collapses every `n` consecutive rows into one; the last block may be
/// shorter.
pub fn by_count(series: &Series, n: usize) -> Series {
    series
        .records()
        .chunks(n.max(1))
        .map(|chunk| collapse(&chunk.iter().collect::<Vec<_>>()))
        .collect()
}

/// Collapses rows sharing the exact same `elapsed_seconds`.
///
/// Output follows the order in which each distinct time first appears. Rows
/// that go back in time are not re-sorted; a regression is logged.
pub fn by_timestamp(series: &Series) -> Result<Series> {
    let times = elapsed_axis(series)?;
    if let Some(row) = first_regression(series) {
        log::warn!("timestamp buckets over non-monotonic input (row {row}); keeping arrival order");
    }

    let mut buckets: IndexMap<u64, Vec<&Record>> = IndexMap::new();
    for (record, t) in series.iter().zip(&times) {
        buckets.entry(bucket_key(*t)).or_default().push(record);
    }

    Ok(buckets
        .into_iter()
        .map(|(key, rows)| {
            let mut record = collapse(&rows);
            // keep the bucket time exact instead of a recomputed mean
            record.insert(ELAPSED_COLUMN, f64::from_bits(key));
            record
        })
        .collect())
}

fn bucket_key(t: f64) -> u64 {
    if t == 0.0 {
        0.0_f64.to_bits()
    } else {
        t.to_bits()
    }
}

/// Mean of every column whose values all parse as finite numbers within
/// `rows`, first value of every other column.
fn collapse(rows: &[&Record]) -> Record {
    let Some(first) = rows.first() else {
        return Record::new();
    };

    let mut out = Record::with_capacity(first.len());
    for (column, value) in first.iter() {
        match mean(rows.iter().map(|r| r.get(column).and_then(Field::to_number))) {
            Some(avg) => out.insert(column, avg),
            None => out.insert(column, value.clone()),
        }
    }
    out
}

fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value?;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rows: &[(f64, &str, &str)]) -> Series {
        rows.iter()
            .map(|&(t, v, label)| {
                let mut record = Record::new();
                record.insert("label", label);
                record.insert("v", v);
                record.insert(ELAPSED_COLUMN, t);
                record
            })
            .collect()
    }

    #[test]
    fn test_by_count_means_numeric_and_keeps_first_text() {
        let input = series(&[
            (0.0, "1", "a"),
            (0.1, "3", "b"),
            (0.2, "5", "c"),
            (0.3, "7", "d"),
            (0.4, "9", "e"),
        ]);
        let out = by_count(&input, 2);
        assert_eq!(out.len(), 3);
        assert_eq!(out.records()[0].get("v"), Some(&Field::Number(2.0)));
        assert_eq!(out.records()[0].get("label"), Some(&Field::text("a")));
        assert_eq!(out.records()[1].get("v"), Some(&Field::Number(6.0)));
        assert_eq!(out.records()[1].get("label"), Some(&Field::text("c")));
        assert_eq!(out.records()[2].get("v"), Some(&Field::Number(9.0)));
        assert_eq!(out.columns(), vec!["label", "v", ELAPSED_COLUMN]);
    }

    #[test]
    fn test_by_count_conserves_mean() {
        let rows: Vec<(f64, String)> = (0..12)
            .map(|i| (i as f64 * 0.01, format!("{}", (i * 7 % 5) as f64 * 1.3)))
            .collect();
        let input: Series = rows
            .iter()
            .map(|(t, v)| {
                let mut record = Record::new();
                record.insert("v", v.as_str());
                record.insert(ELAPSED_COLUMN, *t);
                record
            })
            .collect();
        let out = by_count(&input, 4);

        let raw_mean = input.column_values("v").iter().flatten().sum::<f64>() / 12.0;
        let agg_mean = out.column_values("v").iter().flatten().sum::<f64>() / out.len() as f64;
        assert!((raw_mean - agg_mean).abs() < 1e-9);
    }

    #[test]
    fn test_by_count_larger_than_series() {
        let input = series(&[(0.0, "2", "a"), (0.5, "4", "b")]);
        let out = by_count(&input, 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].get("v"), Some(&Field::Number(3.0)));
    }

    #[test]
    fn test_by_count_decides_numeric_per_chunk() {
        let input = series(&[
            (0.0, "10", "a"),
            (0.1, "20", "b"),
            (0.2, "", "c"),
            (0.3, "40", "d"),
        ]);
        let out = by_count(&input, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out.records()[0].get("v"), Some(&Field::Number(15.0)));
        assert_eq!(out.records()[1].get("v"), Some(&Field::text("")));
        assert_eq!(out.records()[1].get("label"), Some(&Field::text("c")));
        assert_eq!(out.records()[1].elapsed(), Some(0.25));
    }

    #[test]
    fn test_by_count_non_numeric_chunk_keeps_first_value() {
        let input = series(&[(0.0, "n/a", "a"), (0.1, "4", "b"), (0.2, "6", "c")]);
        let out = by_count(&input, 2);
        assert_eq!(out.records()[0].get("v"), Some(&Field::text("n/a")));
        assert_eq!(out.records()[1].get("v"), Some(&Field::Number(6.0)));
    }

    #[test]
    fn test_by_timestamp_groups_duplicates() {
        let input = series(&[
            (0.0, "1", "a"),
            (0.0, "3", "b"),
            (0.1, "10", "c"),
            (0.2, "4", "d"),
            (0.2, "6", "e"),
            (0.2, "8", "f"),
        ]);
        let out = by_timestamp(&input).expect("bucket");
        assert_eq!(out.len(), 3);
        let elapsed: Vec<f64> = out.iter().filter_map(Record::elapsed).collect();
        assert_eq!(elapsed, vec![0.0, 0.1, 0.2]);
        assert_eq!(out.column_values("v"), vec![Some(2.0), Some(10.0), Some(6.0)]);
        assert_eq!(out.records()[2].get("label"), Some(&Field::text("d")));
    }

    #[test]
    fn test_by_timestamp_decides_numeric_per_bucket() {
        let input = series(&[
            (0.0, "1", "a"),
            (0.0, "3", "b"),
            (0.1, "5", "c"),
            (0.1, "", "d"),
            (0.2, "8", "e"),
        ]);
        let out = by_timestamp(&input).expect("bucket");
        assert_eq!(out.len(), 3);
        assert_eq!(out.records()[0].get("v"), Some(&Field::Number(2.0)));
        assert_eq!(out.records()[1].get("v"), Some(&Field::text("5")));
        assert_eq!(out.records()[2].get("v"), Some(&Field::Number(8.0)));
    }

    #[test]
    fn test_by_timestamp_keeps_arrival_order() {
        let input = series(&[(0.5, "1", "a"), (0.2, "2", "b"), (0.5, "3", "c")]);
        let out = by_timestamp(&input).expect("bucket");
        let elapsed: Vec<f64> = out.iter().filter_map(Record::elapsed).collect();
        assert_eq!(elapsed, vec![0.5, 0.2]);
        assert_eq!(out.column_values("v"), vec![Some(2.0), Some(2.0)]);
    }

    #[test]
    fn test_by_timestamp_requires_elapsed() {
        let input: Series = std::iter::once([("v", "1")].into_iter().collect::<Record>()).collect();
        assert!(by_timestamp(&input).is_err());
    }
}
