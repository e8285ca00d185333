//! Error types for demeter-et0.

use demeter_kc::KcError;

/// Error type for ET0 calculation.
#[derive(Debug, thiserror::Error)]
pub enum Et0Error {
    /// Returned when the station or its table violates a precondition.
    #[error("validation error: {reason}")]
    Validation {
        /// Description of the violated precondition.
        reason: String,
    },

    /// Returned when a required meteorological variable is absent.
    #[error("required column '{column}' not found in station data")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// Returned when correction is requested but no curve was supplied at
    /// construction.
    #[error("correction requested but no Kc curve was supplied")]
    CorrectorMissing,

    /// Wraps an error from the Kc curve layer.
    #[error(transparent)]
    Kc(#[from] KcError),
}
