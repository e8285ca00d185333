//! Calendar-date indexed daily table.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::error::SeriesError;

/// A table of named `f64` columns indexed by strictly increasing calendar
/// dates.
///
/// Calendar dates are timezone-agnostic keys: any timezone conversion
/// happens once, at the boundary where timestamped observations are
/// bucketed into days (see `demeter-resample`).
#[derive(Debug, Clone, PartialEq)]
pub struct DayTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl DayTable {
    /// Creates an empty table over the given date index.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::UnsortedIndex`] if the dates are not strictly
    /// increasing.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, SeriesError> {
        for (i, pair) in dates.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(SeriesError::UnsortedIndex { position: i + 1 });
            }
        }
        Ok(Self {
            dates,
            columns: BTreeMap::new(),
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in lexical order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Returns a column by name, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Inserts a new column.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::LengthMismatch`] if the column length differs
    /// from the index, or [`SeriesError::DuplicateColumn`] if the name is
    /// taken.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(SeriesError::LengthMismatch {
                column: name,
                expected: self.dates.len(),
                got: values.len(),
            });
        }
        if self.columns.contains_key(&name) {
            return Err(SeriesError::DuplicateColumn { column: name });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Row position of `date` in the index, if present.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Whether the index is a gap-free daily sequence.
    ///
    /// An empty or single-row table counts as contiguous.
    pub fn is_contiguous_daily(&self) -> bool {
        self.dates
            .windows(2)
            .all(|pair| pair[1] - pair[0] == Duration::days(1))
    }

    /// Copies all columns of `other` into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::IndexMismatch`] if the date indices differ,
    /// or [`SeriesError::DuplicateColumn`] on a name collision.
    pub fn merge(&mut self, other: &DayTable) -> Result<(), SeriesError> {
        if self.dates != other.dates {
            return Err(SeriesError::IndexMismatch {
                reason: format!(
                    "left has {} rows, right has {} rows or different dates",
                    self.dates.len(),
                    other.dates.len()
                ),
            });
        }
        for name in other.columns.keys() {
            if self.columns.contains_key(name) {
                return Err(SeriesError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }
        for (name, values) in &other.columns {
            self.columns.insert(name.clone(), values.clone());
        }
        Ok(())
    }
}

/// Generates the inclusive daily date sequence `[start, end]`.
///
/// Returns an empty vector when `start > end`.
pub fn date_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = start;
    while d <= end {
        dates.push(d);
        d += Duration::days(1);
    }
    dates
}
