//! Station data-source seam.

use chrono::{DateTime, Utc};
use demeter_series::ObsTable;

use crate::error::ProviderError;

/// Station metadata delivered with an observation query.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMeta {
    /// Provider-scoped station id.
    pub station_id: String,
    /// Elevation above sea level, m.
    pub elevation: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// One station query result: metadata plus the raw observation table.
#[derive(Debug, Clone)]
pub struct StationData {
    /// Station metadata.
    pub meta: StationMeta,
    /// UTC-indexed observations with the recognized variable columns.
    pub table: ObsTable,
}

/// Source of raw meteorological observations.
///
/// The acquisition mechanism (HTTP API, archive files) is an external
/// concern. Implementations are expected to backfill missing solar
/// radiation from a secondary station where their source supports it, and
/// to surface fetch failures as errors rather than empty tables — the
/// orchestrator maps failures onto its fallback path and does not retry.
pub trait StationProvider: Send + Sync {
    /// Fetches observations for `[start, end)` from one station.
    fn fetch(
        &self,
        provider: &str,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<StationData, ProviderError>;
}
