//! Query-scoped station with metadata and daily data.

use demeter_series::DayTable;

use crate::error::Et0Error;

/// A weather station with the daily table fetched for one query window.
///
/// Constructed per orchestrator run and never persisted.
#[derive(Debug, Clone)]
pub struct Station {
    /// Provider-scoped station identifier.
    pub station_id: String,
    /// Station elevation above sea level, m.
    pub elevation: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Daily meteorological table.
    pub data: DayTable,
}

impl Station {
    /// Creates a station, validating the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Et0Error::Validation`] when latitude is outside
    /// [-90, 90] or longitude outside [-180, 180].
    pub fn new(
        station_id: impl Into<String>,
        elevation: f64,
        latitude: f64,
        longitude: f64,
        data: DayTable,
    ) -> Result<Self, Et0Error> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Et0Error::Validation {
                reason: format!("latitude {latitude} outside [-90, 90]"),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Et0Error::Validation {
                reason: format!("longitude {longitude} outside [-180, 180]"),
            });
        }
        Ok(Self {
            station_id: station_id.into(),
            elevation,
            latitude,
            longitude,
            data,
        })
    }
}
