//! Pure conversion functions: TOML config structs -> workflow config types.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use chrono_tz::Tz;

use demeter_kc::KcPeriod;
use demeter_resample::AggFunc;
use demeter_soil::SoilTable;
use demeter_workflow::{FieldSpec, WorkflowConfig};

use crate::config::*;

/// Parses a day-first `dd-mm-yyyy` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d-%m-%Y")
        .with_context(|| format!("invalid date {s:?}, expected dd-mm-yyyy"))
}

/// Parses an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown timezone: {s:?}"))
}

/// Parses an aggregation function name into the corresponding enum variant.
pub fn parse_aggfunc(s: &str) -> Result<AggFunc> {
    match s.to_lowercase().as_str() {
        "mean" | "avg" => Ok(AggFunc::Mean),
        "sum" => Ok(AggFunc::Sum),
        "max" => Ok(AggFunc::Max),
        "min" => Ok(AggFunc::Min),
        "mode" => Ok(AggFunc::Mode),
        other => bail!("unknown aggregation function: {other:?}"),
    }
}

/// Builds a [`WorkflowConfig`] from the TOML configuration.
pub fn build_workflow_config(config: &DemeterConfig) -> Result<WorkflowConfig> {
    let timezone = parse_timezone(&config.general.timezone)?;

    let kc_periods = config
        .evapotranspiration
        .correction
        .iter()
        .map(|c| {
            let start = parse_date(&c.start)
                .with_context(|| format!("correction period {:?}", c.name))?;
            let mut period = KcPeriod::new(&c.name, c.value, start);
            if let Some(ref end) = c.end {
                period = period.with_end(
                    parse_date(end).with_context(|| format!("correction period {:?}", c.name))?,
                );
            }
            Ok(period)
        })
        .collect::<Result<Vec<_>>>()?;

    let season_end = config
        .evapotranspiration
        .season_end
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("season_end")?;

    let resample_rules = config
        .resampling
        .rules
        .iter()
        .map(|(column, name)| {
            parse_aggfunc(name)
                .with_context(|| format!("resampling rule for {column:?}"))
                .map(|func| (column.clone(), func))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WorkflowConfig {
        timezone,
        provider: config.general.provider.clone(),
        et0_method: config.evapotranspiration.method.clone(),
        kc_periods,
        season_end,
        resample_rules,
        soil_table: build_soil_table(&config.soil_types),
    })
}

/// Built-in soil ranges plus configured overrides.
///
/// Returns `None` when nothing is overridden, leaving the workflow on its
/// built-in table.
pub fn build_soil_table(overrides: &[SoilTypeToml]) -> Option<SoilTable> {
    if overrides.is_empty() {
        return None;
    }
    let mut table = SoilTable::default();
    for soil in overrides {
        table.insert(&soil.name, (soil.nfk_min, soil.nfk_max));
    }
    Some(table)
}

/// Builds validated [`FieldSpec`]s from the TOML field list.
pub fn build_field_specs(config: &DemeterConfig) -> Result<Vec<FieldSpec>> {
    config
        .fields
        .iter()
        .map(|f| {
            let spec = FieldSpec {
                name: f.name.clone(),
                reference_station: f.station.clone(),
                soil_type: f.soil_type.clone(),
                humus_pct: f.humus,
                root_depth_cm: f.root_depth,
                p_allowable: f.p_allowable,
                area_ha: f.area_ha,
            };
            if let Some(reason) = spec.validate() {
                bail!("field {:?}: {reason}", f.name);
            }
            Ok(spec)
        })
        .collect()
}
