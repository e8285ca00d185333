//! Daily resampling of observation tables.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use demeter_series::{DayTable, ObsTable, date_span};

use crate::agg::AggFunc;

/// Default per-variable aggregation rules for the recognized station
/// variables.
pub fn default_rules() -> BTreeMap<String, AggFunc> {
    [
        ("tair_2m", AggFunc::Mean),
        ("tsoil_25cm", AggFunc::Mean),
        ("tdry_60cm", AggFunc::Mean),
        ("twet_60cm", AggFunc::Mean),
        ("relative_humidity", AggFunc::Mean),
        ("wind_speed", AggFunc::Mean),
        ("wind_gust", AggFunc::Max),
        ("wind_direction", AggFunc::Mode),
        ("precipitation", AggFunc::Sum),
        ("irrigation", AggFunc::Max),
        ("leaf_wetness", AggFunc::Mean),
        ("air_pressure", AggFunc::Mean),
        ("sun_duration", AggFunc::Mean),
        ("solar_radiation", AggFunc::Sum),
        ("snow_height", AggFunc::Mean),
        ("water_level", AggFunc::Mean),
        ("discharge", AggFunc::Mean),
    ]
    .into_iter()
    .map(|(name, func)| (name.to_string(), func))
    .collect()
}

/// Aggregates sub-daily observations onto a contiguous daily calendar.
///
/// The resampler buckets UTC timestamps by calendar date in its configured
/// timezone; from there on the pipeline works with timezone-agnostic dates.
#[derive(Debug, Clone)]
pub struct Resampler {
    tz: Tz,
    rules: BTreeMap<String, AggFunc>,
}

impl Resampler {
    /// Creates a daily resampler with the default rule map.
    pub fn daily(tz: Tz) -> Self {
        Self {
            tz,
            rules: default_rules(),
        }
    }

    /// Overrides or adds a single aggregation rule.
    pub fn with_rule(mut self, column: impl Into<String>, func: AggFunc) -> Self {
        self.rules.insert(column.into(), func);
        self
    }

    /// The timezone used for day bucketing.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Resamples an observation table to daily values.
    ///
    /// Every input column with a rule (or the `default_aggfunc` fallback) is
    /// aggregated per local calendar day; columns without a rule are dropped.
    /// The output index is the gap-free daily range from the first to the
    /// last observed day; days without observations carry NaN (zero for
    /// summed variables). Rules for variables absent from the input are
    /// silently skipped.
    pub fn resample(&self, obs: &ObsTable, default_aggfunc: Option<AggFunc>) -> DayTable {
        if obs.is_empty() {
            return DayTable::new(Vec::new()).expect("empty index is trivially sorted");
        }

        // One normalization point: timestamp -> local calendar date.
        let days: Vec<NaiveDate> = obs
            .times()
            .iter()
            .map(|t| t.with_timezone(&self.tz).date_naive())
            .collect();

        let first = *days.iter().min().expect("non-empty");
        let last = *days.iter().max().expect("non-empty");
        let index = date_span(first, last);
        let positions: BTreeMap<NaiveDate, usize> =
            index.iter().enumerate().map(|(i, &d)| (d, i)).collect();

        let mut out = DayTable::new(index.clone()).expect("date_span is strictly increasing");

        let mut dropped: Vec<&str> = Vec::new();
        for name in obs.column_names() {
            let func = match self.rules.get(name).copied().or(default_aggfunc) {
                Some(f) => f,
                None => {
                    dropped.push(name);
                    continue;
                }
            };

            let values = obs.column(name).expect("name from column_names");
            let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); index.len()];
            for (day, &value) in days.iter().zip(values) {
                buckets[positions[day]].push(value);
            }

            let daily: Vec<f64> = buckets.iter().map(|b| func.apply(b)).collect();
            out.insert_column(name, daily)
                .expect("lengths match and obs column names are unique");
        }

        if !dropped.is_empty() {
            debug!(columns = ?dropped, "dropping columns without an aggregation rule");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::{Europe::Berlin, UTC};

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    fn obs_two_days() -> ObsTable {
        let times = vec![ts(1, 0), ts(1, 6), ts(1, 12), ts(2, 0), ts(2, 12)];
        let mut obs = ObsTable::new(times).unwrap();
        obs.push_column("tair_2m", vec![10.0, 14.0, 18.0, 20.0, 22.0])
            .unwrap();
        obs.push_column("precipitation", vec![0.0, 2.0, 1.0, 0.0, 5.0])
            .unwrap();
        obs.push_column("wind_gust", vec![3.0, 9.0, 6.0, 2.0, 4.0])
            .unwrap();
        obs
    }

    #[test]
    fn applies_per_variable_rules() {
        let daily = Resampler::daily(UTC).resample(&obs_two_days(), None);
        assert_eq!(daily.len(), 2);
        assert_relative_eq!(daily.column("tair_2m").unwrap()[0], 14.0);
        assert_relative_eq!(daily.column("precipitation").unwrap()[0], 3.0);
        assert_relative_eq!(daily.column("precipitation").unwrap()[1], 5.0);
        assert_relative_eq!(daily.column("wind_gust").unwrap()[0], 9.0);
    }

    #[test]
    fn unmapped_column_dropped_without_default() {
        let mut obs = obs_two_days();
        obs.push_column("battery_voltage", vec![3.6; 5]).unwrap();

        let daily = Resampler::daily(UTC).resample(&obs, None);
        assert!(!daily.has_column("battery_voltage"));
    }

    #[test]
    fn unmapped_column_kept_with_default() {
        let mut obs = obs_two_days();
        obs.push_column("battery_voltage", vec![3.5, 3.6, 3.7, 3.8, 3.9])
            .unwrap();

        let daily = Resampler::daily(UTC).resample(&obs, Some(AggFunc::Mean));
        assert_relative_eq!(daily.column("battery_voltage").unwrap()[0], 3.6);
    }

    #[test]
    fn gap_day_is_nan_or_zero_sum() {
        let times = vec![ts(1, 12), ts(3, 12)];
        let mut obs = ObsTable::new(times).unwrap();
        obs.push_column("tair_2m", vec![15.0, 19.0]).unwrap();
        obs.push_column("precipitation", vec![1.0, 2.0]).unwrap();

        let daily = Resampler::daily(UTC).resample(&obs, None);
        assert_eq!(daily.len(), 3);
        assert!(daily.column("tair_2m").unwrap()[1].is_nan());
        assert_relative_eq!(daily.column("precipitation").unwrap()[1], 0.0);
    }

    #[test]
    fn buckets_by_local_calendar_date() {
        // 2024-06-01 23:00 UTC is already 2024-06-02 in Berlin (UTC+2).
        let times = vec![ts(1, 10), ts(1, 23)];
        let mut obs = ObsTable::new(times).unwrap();
        obs.push_column("precipitation", vec![1.0, 2.0]).unwrap();

        let utc_daily = Resampler::daily(UTC).resample(&obs, None);
        assert_eq!(utc_daily.len(), 1);
        assert_relative_eq!(utc_daily.column("precipitation").unwrap()[0], 3.0);

        let berlin_daily = Resampler::daily(Berlin).resample(&obs, None);
        assert_eq!(berlin_daily.len(), 2);
        assert_relative_eq!(berlin_daily.column("precipitation").unwrap()[0], 1.0);
        assert_relative_eq!(berlin_daily.column("precipitation").unwrap()[1], 2.0);
    }

    #[test]
    fn wind_direction_mode() {
        let times = vec![ts(1, 0), ts(1, 6), ts(1, 12), ts(1, 18)];
        let mut obs = ObsTable::new(times).unwrap();
        obs.push_column("wind_direction", vec![180.0, 180.0, 90.0, f64::NAN])
            .unwrap();

        let daily = Resampler::daily(UTC).resample(&obs, None);
        assert_relative_eq!(daily.column("wind_direction").unwrap()[0], 180.0);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let obs = ObsTable::new(vec![]).unwrap();
        let daily = Resampler::daily(UTC).resample(&obs, None);
        assert!(daily.is_empty());
    }

    #[test]
    fn rule_override() {
        let times = vec![ts(1, 0), ts(1, 12)];
        let mut obs = ObsTable::new(times).unwrap();
        obs.push_column("sun_duration", vec![30.0, 50.0]).unwrap();

        let daily = Resampler::daily(UTC)
            .with_rule("sun_duration", AggFunc::Sum)
            .resample(&obs, None);
        assert_relative_eq!(daily.column("sun_duration").unwrap()[0], 80.0);
    }
}
