//! # demeter-series
//!
//! Shared time-indexed tables for the demeter workspace.
//!
//! Two table shapes cover the whole pipeline:
//!
//! | Type | Index | Use |
//! |------|-------|-----|
//! | [`ObsTable`] | `DateTime<Utc>` | raw (sub-daily) station observations |
//! | [`DayTable`] | `NaiveDate` | resampled meteo data, ET series, balances |
//!
//! Columns are named `f64` vectors; `NaN` marks a missing value and is
//! propagated, never raised.

mod day_table;
mod error;
mod obs_table;

pub use day_table::{DayTable, date_span};
pub use error::SeriesError;
pub use obs_table::ObsTable;
