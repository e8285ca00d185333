//! # demeter-kc
//!
//! Crop-coefficient (Kc) correction curves.
//!
//! A [`KcCurve`] is built from an ordered list of [`KcPeriod`]s and exposes
//! a piecewise-constant daily multiplier: each day takes the value of the
//! most recent period whose start is on or before that day. Period end
//! dates are chained (each period ends where its successor starts), so the
//! configured periods cover the season without gaps.
//!
//! ```
//! use chrono::NaiveDate;
//! use demeter_kc::{KcCurve, KcPeriod};
//!
//! let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
//! let curve = KcCurve::new(
//!     vec![
//!         KcPeriod::new("Kc_ini", 0.30, d(4, 1)),
//!         KcPeriod::new("Kc_mid", 1.10, d(6, 1)),
//!         KcPeriod::new("Kc_end", 0.65, d(7, 1)),
//!     ],
//!     Some(d(10, 1)),
//! )
//! .unwrap();
//!
//! let (dates, values) = curve.daily_series(None, None).unwrap();
//! assert_eq!(dates[0], d(4, 1));
//! assert_eq!(values[0], 0.30);
//! ```

mod curve;
mod error;

pub use curve::{KcCurve, KcPeriod, KcTarget};
pub use error::KcError;
