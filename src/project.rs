use crate::series::Series;

/// Removes the named columns from every record. Names not present in a record
/// are ignored, so a device-agnostic drop list can be applied to any layout.
pub fn drop_columns<S: AsRef<str>>(series: &Series, columns: &[S]) -> Series {
    series
        .iter()
        .map(|record| {
            let mut record = record.clone();
            for column in columns {
                record.remove(column.as_ref());
            }
            record
        })
        .collect()
}
