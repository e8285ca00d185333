//! The per-field water-balance control loop.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use demeter_balance::{BalanceRecord, simulate};
use demeter_et0::{Et0Calculator, Registry, Station};
use demeter_irrigation::IrrigationSeries;
use demeter_kc::{KcCurve, KcPeriod};
use demeter_resample::{AggFunc, Resampler};
use demeter_soil::{SoilTable, estimate};

use crate::error::{FieldRunError, WorkflowError};
use crate::model::{Field, FieldSpec};
use crate::provider::StationProvider;
use crate::store::BalanceStore;

/// Typed orchestrator configuration (built from TOML by the binary).
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Season timezone: defines "today" and day bucketing.
    pub timezone: Tz,
    /// Provider name passed through to the station data source.
    pub provider: String,
    /// Registered ET0 method name.
    pub et0_method: String,
    /// Crop-coefficient periods for the correction curve.
    pub kc_periods: Vec<KcPeriod>,
    /// Optional explicit season end for the last Kc period.
    pub season_end: Option<NaiveDate>,
    /// Per-variable aggregation overrides on top of the default rule map.
    pub resample_rules: Vec<(String, AggFunc)>,
    /// Optional soil lookup overriding the built-in table.
    pub soil_table: Option<SoilTable>,
}

/// Outcome state of one field in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// No irrigation event this season; the field was skipped.
    NoSeasonStart,
    /// The persisted series already covers the window; nothing computed.
    CaughtUp,
    /// New rows were computed and persisted.
    Persisted {
        /// Rows written by the upsert.
        rows: usize,
    },
    /// Computing new data failed; the persisted series was re-emitted.
    FailedFallback {
        /// Human-readable failure description (already logged).
        reason: String,
    },
}

/// Result of one field in one orchestrator run.
///
/// `series` is always the best-available balance for display: freshly
/// persisted rows, the cached history on fallback, or empty for a field
/// without a season.
#[derive(Debug, Clone)]
pub struct FieldRun {
    /// Field id.
    pub field_id: i64,
    /// Field name (for reporting).
    pub field_name: String,
    /// Outcome state.
    pub status: RunStatus,
    /// Best-available season series.
    pub series: Vec<BalanceRecord>,
}

/// Per-field water-balance orchestrator.
///
/// Holds the runtime collaborators built once at startup: the resampler,
/// the ET0 calculator with its correction curve, and the external store and
/// provider seams. `run` is safe to invoke concurrently for different
/// fields; callers wanting single-flight semantics per field serialize on
/// the field id.
pub struct Orchestrator<S, P> {
    store: S,
    provider: P,
    timezone: Tz,
    provider_name: String,
    resampler: Resampler,
    calculator: Box<dyn Et0Calculator>,
    soil_table: Option<SoilTable>,
}

impl<S, P> std::fmt::Debug for Orchestrator<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("timezone", &self.timezone)
            .field("provider_name", &self.provider_name)
            .field("resampler", &self.resampler)
            .field("soil_table", &self.soil_table)
            .finish_non_exhaustive()
    }
}

impl<S: BalanceStore, P: StationProvider> Orchestrator<S, P> {
    /// Builds the orchestrator, resolving the configured ET0 method.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownCalculator`] for an unregistered
    /// method name and [`WorkflowError::Kc`] for an invalid correction
    /// configuration. Both are fatal startup errors.
    pub fn new(store: S, provider: P, config: WorkflowConfig) -> Result<Self, WorkflowError> {
        let curve = KcCurve::new(config.kc_periods, config.season_end)?;
        let registry = Registry::builtin();
        let calculator = registry.build(&config.et0_method, Some(curve)).ok_or_else(|| {
            WorkflowError::UnknownCalculator {
                name: config.et0_method.clone(),
                available: registry.names().iter().map(|s| s.to_string()).collect(),
            }
        })?;

        let mut resampler = Resampler::daily(config.timezone);
        for (column, func) in config.resample_rules {
            resampler = resampler.with_rule(column, func);
        }

        Ok(Self {
            store,
            provider,
            timezone: config.timezone,
            provider_name: config.provider,
            resampler,
            calculator,
            soil_table: config.soil_table,
        })
    }

    /// The underlying repository.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies the configured field list (configuration sync).
    ///
    /// # Errors
    ///
    /// Propagates the first repository error; earlier upserts stay applied.
    pub fn sync_fields(&self, specs: &[FieldSpec]) -> Result<Vec<Field>, FieldRunError> {
        let mut fields = Vec::with_capacity(specs.len());
        for spec in specs {
            let (field, changed) = self.store.upsert_field(spec)?;
            if changed {
                info!(field = %field.name, "field attributes changed; balance cache invalidated");
            }
            fields.push(field);
        }
        Ok(fields)
    }

    /// Runs one refresh cycle over all fields.
    ///
    /// Fields are evaluated independently; a per-field failure degrades
    /// that field to its cached series and never aborts the cycle.
    ///
    /// # Errors
    ///
    /// Only listing the fields themselves can fail here.
    pub fn run(&self, now: DateTime<Utc>) -> Result<Vec<FieldRun>, FieldRunError> {
        let fields = self.store.list_fields()?;
        if fields.is_empty() {
            warn!("no fields configured");
        }
        Ok(fields.iter().map(|f| self.run_field(f, now)).collect())
    }

    /// Runs the state machine for a single field.
    pub fn run_field(&self, field: &Field, now: DateTime<Utc>) -> FieldRun {
        let local_now = now.with_timezone(&self.timezone);
        let year = local_now.year();

        // Season start: the field's first irrigation event of the year.
        let season_start = match self.store.first_irrigation_event(field.id, year) {
            Ok(Some(event)) => event.date,
            Ok(None) => {
                info!(field = %field.name, year, "no irrigation events; skipping field");
                return FieldRun {
                    field_id: field.id,
                    field_name: field.name.clone(),
                    status: RunStatus::NoSeasonStart,
                    series: Vec::new(),
                };
            }
            Err(e) => return self.fall_back(field, None, e.into()),
        };
        let season_end = first_of_next_year(year); // end-exclusive

        // Resume point: the day after the checkpoint, carrying storage.
        let (resume, initial_storage) = match self.store.latest_balance(field.id) {
            Ok(Some(last)) => (
                season_start.max(last.date + Duration::days(1)),
                Some(last.soil_storage),
            ),
            Ok(None) => (season_start, None),
            Err(e) => return self.fall_back(field, Some(season_start), e.into()),
        };

        // The window includes the (partial) current day.
        let window_end = season_end.min(local_now.date_naive() + Duration::days(1));

        if resume >= window_end {
            info!(field = %field.name, "no new data to compute");
            let series = self.season_series(field, season_start, season_end);
            return FieldRun {
                field_id: field.id,
                field_name: field.name.clone(),
                status: RunStatus::CaughtUp,
                series,
            };
        }

        info!(
            field = %field.name,
            from = %resume,
            to = %window_end,
            "computing water balance"
        );
        match self.compute_window(field, year, resume, window_end, initial_storage, now) {
            Ok(rows) => {
                info!(field = %field.name, rows, "water balance updated");
                let series = self.season_series(field, season_start, season_end);
                FieldRun {
                    field_id: field.id,
                    field_name: field.name.clone(),
                    status: RunStatus::Persisted { rows },
                    series,
                }
            }
            Err(e) => self.fall_back(field, Some(season_start), e),
        }
    }

    /// Fetch, resample, compute ET0 and the bucket balance, and persist.
    ///
    /// Returns the number of upserted rows.
    fn compute_window(
        &self,
        field: &Field,
        year: i32,
        resume: NaiveDate,
        window_end: NaiveDate,
        initial_storage: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<usize, FieldRunError> {
        let start_utc = local_midnight_utc(self.timezone, resume)?;
        // The fetch never reaches past the wall clock: an archive may hold
        // rows later than `now` (forecasts), which must not enter today's
        // balance.
        let end_utc = local_midnight_utc(self.timezone, window_end)?.min(now);

        let station_data =
            self.provider
                .fetch(&self.provider_name, &field.reference_station, start_utc, end_utc)?;

        let mut daily = self.resampler.resample(&station_data.table, None);
        let station = Station::new(
            station_data.meta.station_id.clone(),
            station_data.meta.elevation,
            station_data.meta.latitude,
            station_data.meta.longitude,
            daily.clone(),
        )?;

        let et = self.calculator.calculate(&station, true)?;
        daily.merge(&et)?;

        // Capacity always comes from the field's current attributes.
        let capacity = estimate(
            &field.soil_type,
            field.humus_pct,
            field.root_depth_cm,
            self.soil_table.as_ref(),
        )?;

        let events = self.store.list_irrigation_events(field.id, Some(year))?;
        let irrigation = IrrigationSeries::from_events(
            events.iter().map(|e| (e.field_id, e.date, e.amount_mm)),
        )?
        .to_series(daily.dates(), 0.0);

        let table = simulate(
            &daily,
            &irrigation,
            &capacity,
            field.p_allowable,
            initial_storage,
            field.id,
        )?;

        Ok(self.store.upsert_balance(&table)?)
    }

    /// Converts a per-field failure into the fallback-to-cache response.
    fn fall_back(&self, field: &Field, season_start: Option<NaiveDate>, e: FieldRunError) -> FieldRun {
        error!(field = %field.name, error = %e, "calculation failed; falling back to cached balance");
        let series = match season_start {
            Some(start) => {
                self.season_series(field, start, first_of_next_year(start.year()))
            }
            None => Vec::new(),
        };
        FieldRun {
            field_id: field.id,
            field_name: field.name.clone(),
            status: RunStatus::FailedFallback {
                reason: e.to_string(),
            },
            series,
        }
    }

    /// Best-effort read of the persisted season series.
    fn season_series(
        &self,
        field: &Field,
        season_start: NaiveDate,
        season_end: NaiveDate,
    ) -> Vec<BalanceRecord> {
        match self.store.query_balance(
            field.id,
            Some(season_start),
            Some(season_end - Duration::days(1)),
        ) {
            Ok(records) => {
                if records.is_empty() {
                    info!(field = %field.name, "no persisted water balance to emit");
                }
                records
            }
            Err(e) => {
                error!(field = %field.name, error = %e, "failed reading persisted balance");
                Vec::new()
            }
        }
    }
}

/// January 1 of the following year (the end-exclusive season bound).
fn first_of_next_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("Jan 1 exists in every year")
}

/// UTC instant of local midnight on `date` in `tz`.
///
/// A midnight skipped by a DST transition resolves to the earliest valid
/// instant of that day.
fn local_midnight_utc(tz: Tz, date: NaiveDate) -> Result<DateTime<Utc>, FieldRunError> {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    let local = match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
        LocalResult::None => {
            (0..3_i64)
                .filter_map(|h| {
                    tz.from_local_datetime(&(midnight + Duration::hours(h)))
                        .earliest()
                })
                .next()
                .ok_or_else(|| FieldRunError::Time {
                    reason: format!("no valid instant near {date} 00:00 in {tz}"),
                })?
        }
    };
    Ok(local.with_timezone(&Utc))
}
