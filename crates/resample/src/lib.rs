//! # demeter-resample
//!
//! Aggregates sub-daily station observations into daily values.
//!
//! Each meteorological variable has its own aggregation rule (temperature is
//! averaged, precipitation summed, wind gusts maximised, wind direction takes
//! the most frequent value). The default rule map covers the recognized
//! station variables; unmapped input columns are dropped unless a fallback
//! aggregation is supplied.
//!
//! Timestamps are bucketed by calendar date in the configured timezone —
//! this is the single point in the pipeline where timestamps turn into
//! calendar dates.
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::UTC;
//! use demeter_resample::Resampler;
//! use demeter_series::ObsTable;
//!
//! let times = (0..4)
//!     .map(|h| chrono::Utc.with_ymd_and_hms(2024, 6, 1, h * 6, 0, 0).unwrap())
//!     .collect();
//! let mut obs = ObsTable::new(times).unwrap();
//! obs.push_column("precipitation", vec![0.0, 1.5, 2.5, 0.0]).unwrap();
//!
//! let daily = Resampler::daily(UTC).resample(&obs, None);
//! assert_eq!(daily.column("precipitation").unwrap(), &[4.0]);
//! ```

mod agg;
mod resampler;

pub use agg::AggFunc;
pub use resampler::{Resampler, default_rules};
