//! Error types for demeter-kc.

use demeter_series::SeriesError;

/// Error type for crop-coefficient curve construction and alignment.
#[derive(Debug, thiserror::Error)]
pub enum KcError {
    /// Returned when the curve is constructed from an empty period list.
    #[error("at least one Kc period is required")]
    EmptyPeriods,

    /// Returned when aligning to a day-of-year target without an anchor
    /// year to resolve ordinals into dates.
    #[error("day-of-year target requires an anchor year")]
    MissingAnchorYear,

    /// Returned when applying the curve to a column the table lacks.
    #[error("column '{column}' not found in table")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// Wraps an error from the series table layer.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}
