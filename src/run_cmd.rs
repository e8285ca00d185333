use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use demeter_balance::BalanceRecord;
use demeter_workflow::{BalanceStore, MemoryStore, Orchestrator, RunStatus};

use crate::cli::RunArgs;
use crate::config::DemeterConfig;
use crate::convert;
use crate::station_csv::CsvStationProvider;

/// Run one water-balance refresh cycle over all configured fields.
pub fn run(args: RunArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config: {}", args.config.display()))?;
    let config: DemeterConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config: {}", args.config.display()))?;

    let workflow_config = convert::build_workflow_config(&config)?;
    let specs = convert::build_field_specs(&config)?;
    let output_dir = args
        .output
        .unwrap_or_else(|| config.general.output_dir.clone());

    let now = match args.as_of {
        Some(ref s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --as-of timestamp {s:?}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let provider = CsvStationProvider::new(config.general.data_dir.clone());
    let orchestrator = Orchestrator::new(MemoryStore::new(), provider, workflow_config)?;

    let fields = orchestrator.sync_fields(&specs)?;
    info!(n_fields = fields.len(), "fields synchronized");

    for event in &config.irrigation {
        let field = fields
            .iter()
            .find(|f| f.name == event.field)
            .ok_or_else(|| anyhow!("irrigation event references unknown field {:?}", event.field))?;
        let date = convert::parse_date(&event.date)
            .with_context(|| format!("irrigation event for field {:?}", event.field))?;
        orchestrator
            .store()
            .upsert_irrigation_event(field.id, date, &event.method, event.amount)?;
    }

    let runs = orchestrator.run(now)?;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    for field_run in &runs {
        match &field_run.status {
            RunStatus::NoSeasonStart => {
                warn!(field = %field_run.field_name, "no irrigation this season; skipped");
            }
            RunStatus::CaughtUp => {
                info!(field = %field_run.field_name, "already up to date");
            }
            RunStatus::Persisted { rows } => {
                info!(field = %field_run.field_name, rows, "balance updated");
            }
            RunStatus::FailedFallback { reason } => {
                warn!(field = %field_run.field_name, %reason, "using cached balance");
            }
        }

        if field_run.series.is_empty() {
            continue;
        }
        let path = output_dir.join(format!("{}.csv", file_stem(&field_run.field_name)));
        write_report(&path, &field_run.series)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(field = %field_run.field_name, path = %path.display(), "report written");
    }

    Ok(())
}

/// Writes the per-field balance series as a CSV report.
fn write_report(path: &Path, series: &[BalanceRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "precipitation",
        "irrigation",
        "evapotranspiration",
        "incoming",
        "net",
        "soil_storage",
        "field_capacity",
        "deficit",
        "readily_available_water",
        "below_raw",
    ])?;
    for r in series {
        writer.write_record([
            r.date.to_string(),
            format!("{:.2}", r.precipitation),
            format!("{:.2}", r.irrigation),
            format!("{:.2}", r.evapotranspiration),
            format!("{:.2}", r.incoming),
            format!("{:.2}", r.net),
            format!("{:.2}", r.soil_storage),
            format!("{:.2}", r.field_capacity),
            format!("{:.2}", r.deficit),
            r.readily_available_water
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default(),
            r.below_raw.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Lowercase file stem with path-unfriendly characters replaced.
fn file_stem(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}
