//! Error types for demeter-workflow.

use demeter_balance::BalanceError;
use demeter_et0::Et0Error;
use demeter_irrigation::IrrigationError;
use demeter_kc::KcError;
use demeter_series::SeriesError;
use demeter_soil::SoilError;

/// Fatal configuration errors surfaced at orchestrator construction.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The configured ET0 method is not registered.
    #[error("ET0 calculator '{name}' not found; available: {available:?}")]
    UnknownCalculator {
        /// Configured method name.
        name: String,
        /// Registered method names.
        available: Vec<String>,
    },

    /// The Kc correction configuration is invalid.
    #[error(transparent)]
    Kc(#[from] KcError),
}

/// Errors from the persistence repository.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind ("field", "irrigation event").
        entity: &'static str,
        /// Missing id.
        id: i64,
    },

    /// A field payload violates a model invariant.
    #[error("invalid field '{name}': {reason}")]
    InvalidField {
        /// Field name from the payload.
        name: String,
        /// Violated constraint.
        reason: String,
    },

    /// The storage backend failed.
    #[error("storage backend error: {reason}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
    },
}

/// Errors from the station data source.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached or answered with an error.
    #[error("station '{station_id}' unavailable: {reason}")]
    Unavailable {
        /// Requested station.
        station_id: String,
        /// Description of the failure.
        reason: String,
    },

    /// The provider answered but returned no observations for the window.
    #[error("no observations for station '{station_id}' in the requested window")]
    NoData {
        /// Requested station.
        station_id: String,
    },

    /// The provider's payload could not be interpreted.
    #[error("malformed station payload: {reason}")]
    Malformed {
        /// Description of the payload problem.
        reason: String,
    },
}

/// Any failure while computing new balance data for a single field.
///
/// Caught by the orchestrator and converted into the fallback-to-cache
/// response; it never aborts the run for other fields.
#[derive(Debug, thiserror::Error)]
pub enum FieldRunError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Et0(#[from] Et0Error),

    #[error(transparent)]
    Soil(#[from] SoilError),

    #[error(transparent)]
    Irrigation(#[from] IrrigationError),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A local wall-clock instant does not exist in the season timezone.
    #[error("invalid local time: {reason}")]
    Time {
        /// Description of the conversion failure.
        reason: String,
    },
}
