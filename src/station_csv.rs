//! File-based station provider for local archives.
//!
//! The data directory holds one `stations.csv` metadata sidecar
//! (`station_id,elevation,latitude,longitude`) and one `<station_id>.csv`
//! observation archive per station, with a `timestamp` column (RFC 3339)
//! followed by one column per variable. Empty cells read as NaN.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::debug;

use demeter_series::ObsTable;
use demeter_workflow::{ProviderError, StationData, StationMeta, StationProvider};

/// One row of the `stations.csv` sidecar.
#[derive(Debug, Deserialize)]
struct StationRow {
    station_id: String,
    elevation: f64,
    latitude: f64,
    longitude: f64,
}

/// Station provider backed by CSV archives in a local directory.
#[derive(Debug, Clone)]
pub struct CsvStationProvider {
    data_dir: PathBuf,
}

impl CsvStationProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn read_meta(&self, station_id: &str) -> Result<StationMeta, ProviderError> {
        let path = self.data_dir.join("stations.csv");
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| ProviderError::Unavailable {
                station_id: station_id.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;

        for row in reader.deserialize::<StationRow>() {
            let row = row.map_err(|e| ProviderError::Malformed {
                reason: format!("{}: {e}", path.display()),
            })?;
            if row.station_id == station_id {
                return Ok(StationMeta {
                    station_id: row.station_id,
                    elevation: row.elevation,
                    latitude: row.latitude,
                    longitude: row.longitude,
                });
            }
        }
        Err(ProviderError::Unavailable {
            station_id: station_id.to_string(),
            reason: format!("not listed in {}", path.display()),
        })
    }

    fn read_observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ObsTable, ProviderError> {
        let path = self.data_dir.join(format!("{station_id}.csv"));
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| ProviderError::Unavailable {
                station_id: station_id.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;

        let headers = reader
            .headers()
            .map_err(|e| malformed(&path, e))?
            .clone();
        let variables: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        if headers.get(0) != Some("timestamp") {
            return Err(ProviderError::Malformed {
                reason: format!("{}: first column must be 'timestamp'", path.display()),
            });
        }

        let mut times: Vec<DateTime<Utc>> = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); variables.len()];
        for record in reader.records() {
            let record = record.map_err(|e| malformed(&path, e))?;
            let raw_ts = record.get(0).unwrap_or_default();
            let ts = DateTime::parse_from_rfc3339(raw_ts)
                .map_err(|e| ProviderError::Malformed {
                    reason: format!("{}: timestamp {raw_ts:?}: {e}", path.display()),
                })?
                .with_timezone(&Utc);
            if ts < start || ts >= end {
                continue;
            }

            times.push(ts);
            for (i, column) in columns.iter_mut().enumerate() {
                column.push(parse_cell(record.get(i + 1).unwrap_or_default(), &path)?);
            }
        }

        if times.is_empty() {
            return Err(ProviderError::NoData {
                station_id: station_id.to_string(),
            });
        }

        debug!(
            station = station_id,
            rows = times.len(),
            columns = variables.len(),
            "loaded station archive"
        );

        let mut table = ObsTable::new(times).map_err(|e| ProviderError::Malformed {
            reason: format!("{}: {e}", path.display()),
        })?;
        for (name, values) in variables.into_iter().zip(columns) {
            table
                .push_column(name, values)
                .map_err(|e| ProviderError::Malformed {
                    reason: format!("{}: {e}", path.display()),
                })?;
        }
        Ok(table)
    }
}

fn parse_cell(raw: &str, path: &Path) -> Result<f64, ProviderError> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| ProviderError::Malformed {
        reason: format!("{}: non-numeric value {raw:?}", path.display()),
    })
}

fn malformed(path: &Path, e: csv::Error) -> ProviderError {
    ProviderError::Malformed {
        reason: format!("{}: {e}", path.display()),
    }
}

impl StationProvider for CsvStationProvider {
    fn fetch(
        &self,
        _provider: &str,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<StationData, ProviderError> {
        let meta = self.read_meta(station_id)?;
        let table = self.read_observations(station_id, start, end)?;
        Ok(StationData { meta, table })
    }
}
