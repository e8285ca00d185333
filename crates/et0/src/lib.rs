//! # demeter-et0
//!
//! Reference evapotranspiration (ET0) calculators.
//!
//! Calculators implement the [`Et0Calculator`] trait and are selected by
//! name through an explicit [`Registry`] populated at startup — the
//! configured method string resolves to a constructor, and an unknown name
//! resolves to `None` for the caller to treat as a configuration error.
//!
//! The shipped variant is [`PenmanFao56`], the standard FAO-56
//! Penman-Monteith daily formulation. When constructed with a
//! [`demeter_kc::KcCurve`] it can also emit the crop-corrected series
//! (`et0_corrected`).

mod error;
mod penman;
mod registry;
mod station;

use demeter_series::DayTable;

pub use error::Et0Error;
pub use penman::PenmanFao56;
pub use registry::Registry;
pub use station::Station;

/// A reference-evapotranspiration calculator.
///
/// `calculate` consumes a daily station table and returns a daily table
/// with an `et0` column (mm/day); with `correct = true` it additionally
/// carries `kc` and `et0_corrected`.
pub trait Et0Calculator: Send + Sync {
    /// Registry name of this calculator.
    fn name(&self) -> &'static str;

    /// Computes the daily ET series for a station.
    ///
    /// # Errors
    ///
    /// Returns [`Et0Error::Validation`] for an unusable station table,
    /// [`Et0Error::MissingColumn`] when a required variable is absent, and
    /// [`Et0Error::CorrectorMissing`] when `correct` is requested but the
    /// calculator was built without a correction curve.
    fn calculate(&self, station: &Station, correct: bool) -> Result<DayTable, Et0Error>;
}
