//! Orchestrator integration tests: resume, idempotence, invalidation, and
//! fallback behavior against an in-memory store and a scripted provider.

use std::sync::Mutex;

use approx::assert_relative_eq;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::UTC;

use demeter_balance::{BalanceRecord, BalanceTable};
use demeter_kc::KcPeriod;
use demeter_series::ObsTable;
use demeter_soil::SoilTable;
use demeter_workflow::{
    BalanceStore, FieldSpec, MemoryStore, Orchestrator, ProviderError, RunStatus, StationData,
    StationMeta, StationProvider, WorkflowConfig, WorkflowError,
};

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn noon(m: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, m, day, 12, 0, 0).unwrap()
}

/// Run clock late enough that the noon observation of the day is archived.
fn evening(m: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, m, day, 18, 0, 0).unwrap()
}

/// Provider replaying one scripted observation table, filtered per query.
struct ScriptedProvider {
    meta: StationMeta,
    table: ObsTable,
    fetches: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl ScriptedProvider {
    fn new(table: ObsTable) -> Self {
        Self {
            meta: StationMeta {
                station_id: "S1".to_string(),
                elevation: 300.0,
                latitude: 46.5,
                longitude: 11.3,
            },
            table,
            fetches: Mutex::new(Vec::new()),
        }
    }

    fn last_fetch(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.fetches.lock().unwrap().last().copied()
    }
}

impl StationProvider for &ScriptedProvider {
    fn fetch(
        &self,
        _provider: &str,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<StationData, ProviderError> {
        self.fetches.lock().unwrap().push((start, end));

        let keep: Vec<usize> = self
            .table
            .times()
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= start && **t < end)
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(ProviderError::NoData {
                station_id: station_id.to_string(),
            });
        }

        let times = keep.iter().map(|&i| self.table.times()[i]).collect();
        let mut table = ObsTable::new(times).unwrap();
        for name in self.table.column_names() {
            let source = self.table.column(name).unwrap();
            table
                .push_column(name, keep.iter().map(|&i| source[i]).collect())
                .unwrap();
        }
        Ok(StationData {
            meta: self.meta.clone(),
            table,
        })
    }
}

/// Provider whose fetches always fail.
struct DownProvider;

impl StationProvider for DownProvider {
    fn fetch(
        &self,
        _provider: &str,
        station_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<StationData, ProviderError> {
        Err(ProviderError::Unavailable {
            station_id: station_id.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// One observation per day at noon UTC for June 1-12.
fn june_observations() -> ObsTable {
    let times: Vec<DateTime<Utc>> = (1..=12).map(|day| noon(6, day)).collect();
    let n = times.len();
    let mut obs = ObsTable::new(times).unwrap();
    obs.push_column("tair_2m", vec![20.0; n]).unwrap();
    obs.push_column("wind_speed", vec![2.0; n]).unwrap();
    obs.push_column("solar_radiation", vec![22.0; n]).unwrap();
    obs.push_column("relative_humidity", vec![60.0; n]).unwrap();
    // 8 mm of rain on June 5, dry otherwise.
    let precip: Vec<f64> = (1..=12).map(|day| if day == 5 { 8.0 } else { 0.0 }).collect();
    obs.push_column("precipitation", precip).unwrap();
    obs
}

fn config() -> WorkflowConfig {
    // Uniform test soil: 20 mm/dm, so 50 cm of roots hold exactly 100 mm.
    let mut soil = SoilTable::empty();
    soil.insert("test", (20.0, 20.0));

    WorkflowConfig {
        timezone: UTC,
        provider: "TEST".to_string(),
        et0_method: "penman-fao56".to_string(),
        kc_periods: vec![KcPeriod::new("season", 1.0, d(1, 1))],
        season_end: None,
        resample_rules: Vec::new(),
        soil_table: Some(soil),
    }
}

fn field_spec() -> FieldSpec {
    FieldSpec {
        name: "north".to_string(),
        reference_station: "S1".to_string(),
        soil_type: "test".to_string(),
        humus_pct: 1.5,
        root_depth_cm: 50.0,
        p_allowable: 0.0,
        area_ha: None,
    }
}

#[test]
fn unknown_calculator_is_a_startup_error() {
    let mut cfg = config();
    cfg.et0_method = "hargreaves".to_string();
    let provider = ScriptedProvider::new(june_observations());
    let err = Orchestrator::new(MemoryStore::new(), &provider, cfg).unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownCalculator { .. }));
}

#[test]
fn field_without_irrigation_is_skipped() {
    let provider = ScriptedProvider::new(june_observations());
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    orch.sync_fields(&[field_spec()]).unwrap();

    let runs = orch.run(evening(6, 10)).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::NoSeasonStart);
    assert!(runs[0].series.is_empty());
    // Nothing was fetched or persisted.
    assert!(provider.last_fetch().is_none());
}

#[test]
fn computes_from_season_start_and_is_idempotent() {
    let provider = ScriptedProvider::new(june_observations());
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    let fields = orch.sync_fields(&[field_spec()]).unwrap();
    orch.store()
        .upsert_irrigation_event(fields[0].id, d(6, 2), "drip", 20.0)
        .unwrap();

    let now = evening(6, 10);
    let runs = orch.run(now).unwrap();
    assert_eq!(runs[0].status, RunStatus::Persisted { rows: 9 });

    let series = &runs[0].series;
    assert_eq!(series.len(), 9);
    assert_eq!(series[0].date, d(6, 2));
    assert_eq!(series.last().unwrap().date, d(6, 10));

    // The bucket never over- or underflows, and the capacity is 100 mm.
    for r in series {
        assert_eq!(r.field_capacity, 100.0);
        assert!(r.soil_storage >= 0.0 && r.soil_storage <= r.field_capacity);
        assert_relative_eq!(r.deficit, r.field_capacity - r.soil_storage);
    }
    // The irrigation event landed on its day.
    assert_eq!(series[0].irrigation, 20.0);
    assert_eq!(series[1].irrigation, 0.0);
    // Rain shows up on June 5.
    assert_eq!(series[3].precipitation, 8.0);

    // Second run with the same clock: caught up, identical series, no new
    // rows persisted.
    let again = orch.run(now).unwrap();
    assert_eq!(again[0].status, RunStatus::CaughtUp);
    assert_eq!(again[0].series, *series);
}

#[test]
fn resumes_from_checkpoint_with_carried_storage() {
    let provider = ScriptedProvider::new(june_observations());
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    let fields = orch.sync_fields(&[field_spec()]).unwrap();
    let field_id = fields[0].id;
    orch.store()
        .upsert_irrigation_event(field_id, d(6, 2), "drip", 20.0)
        .unwrap();

    let runs = orch.run(evening(6, 10)).unwrap();
    let storage_before = runs[0].series.last().unwrap().soil_storage;

    // One day later only June 11 is recomputed.
    let runs = orch.run(evening(6, 11)).unwrap();
    assert_eq!(runs[0].status, RunStatus::Persisted { rows: 1 });
    assert_eq!(runs[0].series.len(), 10);

    // The fetch starts at the checkpoint's next midnight and stops at the
    // clock, never reaching into the rest of the current day.
    let (fetch_start, fetch_end) = provider.last_fetch().unwrap();
    assert_eq!(fetch_start, Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap());
    assert_eq!(fetch_end, evening(6, 11));

    // June 11 was dry, so the carried storage can only have decreased.
    let last = runs[0].series.last().unwrap();
    assert_eq!(last.date, d(6, 11));
    assert!(last.soil_storage < storage_before);
}

#[test]
fn rows_after_the_clock_stay_out_of_the_balance() {
    // A forecast-like row later the same day: 50 mm at 15:00 on June 10.
    let mut times: Vec<DateTime<Utc>> = (1..=12).map(|day| noon(6, day)).collect();
    times.insert(10, Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap());
    let n = times.len();
    let mut obs = ObsTable::new(times).unwrap();
    obs.push_column("tair_2m", vec![20.0; n]).unwrap();
    obs.push_column("wind_speed", vec![2.0; n]).unwrap();
    obs.push_column("solar_radiation", vec![22.0; n]).unwrap();
    obs.push_column("relative_humidity", vec![60.0; n]).unwrap();
    let mut precip = vec![0.0; n];
    precip[10] = 50.0;
    obs.push_column("precipitation", precip).unwrap();

    let provider = ScriptedProvider::new(obs);
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    let fields = orch.sync_fields(&[field_spec()]).unwrap();
    orch.store()
        .upsert_irrigation_event(fields[0].id, d(6, 2), "drip", 20.0)
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
    let runs = orch.run(now).unwrap();
    assert_eq!(runs[0].status, RunStatus::Persisted { rows: 9 });

    // The fetch stops at the clock, so the 15:00 row never arrives.
    let (_, fetch_end) = provider.last_fetch().unwrap();
    assert_eq!(fetch_end, now);

    let last = runs[0].series.last().unwrap();
    assert_eq!(last.date, d(6, 10));
    assert_eq!(last.precipitation, 0.0);
}

#[test]
fn field_update_forces_recompute_from_season_start() {
    let provider = ScriptedProvider::new(june_observations());
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    let fields = orch.sync_fields(&[field_spec()]).unwrap();
    let field_id = fields[0].id;
    orch.store()
        .upsert_irrigation_event(field_id, d(6, 2), "drip", 20.0)
        .unwrap();
    orch.run(evening(6, 10)).unwrap();
    assert_eq!(orch.store().query_balance(field_id, None, None).unwrap().len(), 9);

    // Deeper roots double the capacity; the cache must go.
    let mut spec = field_spec();
    spec.root_depth_cm = 100.0;
    let (_, changed) = orch.store().upsert_field(&spec).unwrap();
    assert!(changed);
    assert!(orch.store().query_balance(field_id, None, None).unwrap().is_empty());

    let runs = orch.run(evening(6, 10)).unwrap();
    assert_eq!(runs[0].status, RunStatus::Persisted { rows: 9 });
    assert_eq!(runs[0].series[0].date, d(6, 2));
    assert_eq!(runs[0].series[0].field_capacity, 200.0);
}

#[test]
fn provider_failure_falls_back_to_cached_series() {
    let store = MemoryStore::new();
    let (field, _) = store.upsert_field(&field_spec()).unwrap();
    store
        .upsert_irrigation_event(field.id, d(6, 2), "drip", 20.0)
        .unwrap();

    // Pre-seed two persisted days.
    let cached: Vec<BalanceRecord> = (2..=3)
        .map(|day| BalanceRecord {
            date: d(6, day),
            precipitation: 0.0,
            irrigation: 0.0,
            evapotranspiration: 4.0,
            incoming: 0.0,
            net: -4.0,
            soil_storage: 100.0 - 4.0 * f64::from(day - 1),
            field_capacity: 100.0,
            deficit: 4.0 * f64::from(day - 1),
            readily_available_water: None,
            below_raw: None,
        })
        .collect();
    store
        .upsert_balance(&BalanceTable::new(field.id, cached.clone()))
        .unwrap();

    let orch = Orchestrator::new(store, DownProvider, config()).unwrap();
    let runs = orch.run(evening(6, 10)).unwrap();

    assert!(matches!(runs[0].status, RunStatus::FailedFallback { .. }));
    assert_eq!(runs[0].series, cached);
    // No rows were added or removed.
    assert_eq!(orch.store().query_balance(field.id, None, None).unwrap(), cached);
}

#[test]
fn trigger_flags_follow_allowable_depletion() {
    let provider = ScriptedProvider::new(june_observations());
    let orch = Orchestrator::new(MemoryStore::new(), &provider, config()).unwrap();
    let mut spec = field_spec();
    spec.p_allowable = 0.1;
    let fields = orch.sync_fields(&[spec]).unwrap();
    orch.store()
        .upsert_irrigation_event(fields[0].id, d(6, 2), "drip", 20.0)
        .unwrap();

    let runs = orch.run(evening(6, 10)).unwrap();
    let series = &runs[0].series;
    for r in series {
        assert_eq!(r.readily_available_water, Some(10.0));
        let below = r.below_raw.unwrap();
        assert_eq!(below, r.soil_storage < 90.0);
    }
}
