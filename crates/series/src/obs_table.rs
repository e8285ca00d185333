//! UTC-timestamped observation table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::SeriesError;

/// Raw station observations at arbitrary (usually sub-daily) resolution.
///
/// Timestamps are UTC and non-decreasing; duplicate timestamps are allowed
/// (some providers deliver overlapping archives). Columns are named `f64`
/// vectors with `NaN` for missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsTable {
    times: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl ObsTable {
    /// Creates an empty table over the given timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::UnsortedIndex`] if the timestamps decrease.
    pub fn new(times: Vec<DateTime<Utc>>) -> Result<Self, SeriesError> {
        for (i, pair) in times.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(SeriesError::UnsortedIndex { position: i + 1 });
            }
        }
        Ok(Self {
            times,
            columns: BTreeMap::new(),
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The timestamp index.
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Column names in lexical order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Returns a column by name, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// First and last timestamp, if any rows exist.
    pub fn time_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Inserts a new column.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::LengthMismatch`] or
    /// [`SeriesError::DuplicateColumn`].
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        if values.len() != self.times.len() {
            return Err(SeriesError::LengthMismatch {
                column: name,
                expected: self.times.len(),
                got: values.len(),
            });
        }
        if self.columns.contains_key(&name) {
            return Err(SeriesError::DuplicateColumn { column: name });
        }
        self.columns.insert(name, values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn new_accepts_duplicates_rejects_decrease() {
        assert!(ObsTable::new(vec![ts(0), ts(0), ts(1)]).is_ok());
        let err = ObsTable::new(vec![ts(1), ts(0)]).unwrap_err();
        assert_eq!(err, SeriesError::UnsortedIndex { position: 1 });
    }

    #[test]
    fn push_and_read_column() {
        let mut t = ObsTable::new(vec![ts(0), ts(6), ts(12)]).unwrap();
        t.push_column("tair_2m", vec![12.0, 18.5, 24.1]).unwrap();
        assert_eq!(t.column("tair_2m").unwrap(), &[12.0, 18.5, 24.1]);
    }

    #[test]
    fn time_bounds() {
        let t = ObsTable::new(vec![ts(0), ts(23)]).unwrap();
        assert_eq!(t.time_bounds(), Some((ts(0), ts(23))));
        let empty = ObsTable::new(vec![]).unwrap();
        assert_eq!(empty.time_bounds(), None);
    }
}
