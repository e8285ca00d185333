//! # demeter-irrigation
//!
//! Converts a field's discrete irrigation events into a daily-aligned depth
//! series.
//!
//! Events are recorded as calendar dates (timezone-agnostic keys); multiple
//! events on the same day add up, and alignment onto a target calendar never
//! interpolates across gaps, so irrigation mass is preserved.
//!
//! ```
//! use chrono::NaiveDate;
//! use demeter_irrigation::IrrigationSeries;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
//! let series = IrrigationSeries::new(1, vec![d(2), d(2)], vec![10.0, 15.0]).unwrap();
//! let aligned = series.to_series(&[d(1), d(2), d(3)], 0.0);
//! assert_eq!(aligned, vec![0.0, 25.0, 0.0]);
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;

mod error;

pub use error::IrrigationError;

/// All irrigation events of exactly one field, keyed by calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct IrrigationSeries {
    field_id: i64,
    daily: BTreeMap<NaiveDate, f64>,
}

impl IrrigationSeries {
    /// Builds a series from parallel date and amount lists.
    ///
    /// Same-day amounts are summed; NaN amounts count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigationError::LengthMismatch`] when the lists differ in
    /// length.
    pub fn new(
        field_id: i64,
        dates: Vec<NaiveDate>,
        amounts: Vec<f64>,
    ) -> Result<Self, IrrigationError> {
        if dates.len() != amounts.len() {
            return Err(IrrigationError::LengthMismatch {
                dates: dates.len(),
                amounts: amounts.len(),
            });
        }

        let mut daily = BTreeMap::new();
        for (date, amount) in dates.into_iter().zip(amounts) {
            let amount = if amount.is_nan() { 0.0 } else { amount };
            *daily.entry(date).or_insert(0.0) += amount;
        }

        Ok(Self { field_id, daily })
    }

    /// Builds a series from `(field_id, date, amount)` event tuples.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigationError::NoEvents`] for an empty input and
    /// [`IrrigationError::MixedFields`] when events belong to more than one
    /// field.
    pub fn from_events(
        events: impl IntoIterator<Item = (i64, NaiveDate, f64)>,
    ) -> Result<Self, IrrigationError> {
        let events: Vec<(i64, NaiveDate, f64)> = events.into_iter().collect();
        let mut field_ids: Vec<i64> = events.iter().map(|(id, _, _)| *id).collect();
        field_ids.sort_unstable();
        field_ids.dedup();

        match field_ids.len() {
            0 => Err(IrrigationError::NoEvents),
            1 => Self::new(
                field_ids[0],
                events.iter().map(|(_, d, _)| *d).collect(),
                events.iter().map(|(_, _, a)| *a).collect(),
            ),
            _ => Err(IrrigationError::MixedFields { field_ids }),
        }
    }

    /// The field these events belong to.
    pub fn field_id(&self) -> i64 {
        self.field_id
    }

    /// Total irrigation depth across all events, mm.
    pub fn total_mm(&self) -> f64 {
        self.daily.values().sum()
    }

    /// Aligns the events onto `target_dates`.
    ///
    /// Each target day receives the summed amount of its events, or `fill`
    /// when no event fell on that day. Events outside the target calendar
    /// are dropped (the caller chooses the window).
    pub fn to_series(&self, target_dates: &[NaiveDate], fill: f64) -> Vec<f64> {
        target_dates
            .iter()
            .map(|d| self.daily.get(d).copied().unwrap_or(fill))
            .collect()
    }
}
