//! Kc curve construction and alignment.

use chrono::{Datelike, Duration, NaiveDate};
use demeter_series::{DayTable, date_span};

use crate::error::KcError;

/// Single crop-coefficient segment as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct KcPeriod {
    /// Stage name (e.g. `Kc_ini`, `Kc_mid`).
    pub name: String,
    /// Multiplier applied to ET0 during this stage.
    pub value: f64,
    /// First day of the stage.
    pub start: NaiveDate,
    /// Optional explicit last day; usually inferred from the successor.
    pub end: Option<NaiveDate>,
}

impl KcPeriod {
    /// Creates a period without an explicit end date.
    pub fn new(name: impl Into<String>, value: f64, start: NaiveDate) -> Self {
        Self {
            name: name.into(),
            value,
            start,
            end: None,
        }
    }

    /// Sets an explicit end date.
    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }
}

/// A period with its end date resolved.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedPeriod {
    name: String,
    value: f64,
    start: NaiveDate,
    end: NaiveDate,
}

/// Target index for [`KcCurve::align_to`].
///
/// Explicit tagged dispatch: the caller states whether its index carries
/// calendar dates or year-agnostic day-of-year ordinals.
#[derive(Debug, Clone, Copy)]
pub enum KcTarget<'a> {
    /// Calendar-dated daily index.
    Dates(&'a [NaiveDate]),
    /// Ordinal day-of-year index (1-based).
    DayOfYear(&'a [u16]),
}

/// Piecewise-constant crop-coefficient curve.
///
/// On a period-start boundary the new period's value applies from that day
/// forward; no day belongs to two periods.
#[derive(Debug, Clone)]
pub struct KcCurve {
    periods: Vec<ResolvedPeriod>,
}

impl KcCurve {
    /// Builds a curve from configured periods and an optional season end.
    ///
    /// Periods are sorted by start date. Each period's end resolves to, in
    /// order of precedence: its explicit end, the next period's start, the
    /// season end, or December 31 of its start year.
    ///
    /// # Errors
    ///
    /// Returns [`KcError::EmptyPeriods`] when `periods` is empty.
    pub fn new(periods: Vec<KcPeriod>, season_end: Option<NaiveDate>) -> Result<Self, KcError> {
        if periods.is_empty() {
            return Err(KcError::EmptyPeriods);
        }

        let mut sorted = periods;
        sorted.sort_by_key(|p| p.start);

        let mut resolved = Vec::with_capacity(sorted.len());
        for idx in 0..sorted.len() {
            let period = &sorted[idx];
            let next_start = sorted.get(idx + 1).map(|p| p.start);
            let end = period
                .end
                .or(next_start)
                .or(season_end)
                .unwrap_or_else(|| end_of_year(period.start));
            resolved.push(ResolvedPeriod {
                name: period.name.clone(),
                value: period.value,
                start: period.start,
                end,
            });
        }

        Ok(Self { periods: resolved })
    }

    /// First period start.
    pub fn first_start(&self) -> NaiveDate {
        self.periods[0].start
    }

    /// Latest resolved period end.
    pub fn last_end(&self) -> NaiveDate {
        self.periods
            .iter()
            .map(|p| p.end)
            .max()
            .expect("curve has at least one period")
    }

    /// Step value for a single day: the value of the most recent period
    /// whose start is on or before `day`, or `NaN` before the first start.
    pub fn value_on(&self, day: NaiveDate) -> f64 {
        let idx = self.periods.partition_point(|p| p.start <= day);
        if idx == 0 {
            f64::NAN
        } else {
            self.periods[idx - 1].value
        }
    }

    /// Daily step series over `[start, end]` (inclusive).
    ///
    /// Bounds default to the first period start and the latest resolved end.
    ///
    /// # Errors
    ///
    /// Infallible today; kept fallible for symmetry with the alignment
    /// operations it backs.
    pub fn daily_series(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(Vec<NaiveDate>, Vec<f64>), KcError> {
        let start = start.unwrap_or_else(|| self.first_start());
        let end = end.unwrap_or_else(|| self.last_end());
        let dates = date_span(start, end);
        let values = dates.iter().map(|&d| self.value_on(d)).collect();
        Ok((dates, values))
    }

    /// Daily step series keyed by day-of-year, anchored to `anchor_year`.
    ///
    /// Ordinals are 1-based; the range is inclusive.
    pub fn day_of_year_series(
        &self,
        start_doy: u16,
        end_doy: u16,
        anchor_year: i32,
    ) -> Result<(Vec<u16>, Vec<f64>), KcError> {
        let start = doy_to_date(anchor_year, start_doy);
        let end = doy_to_date(anchor_year, end_doy);
        let (dates, values) = self.daily_series(Some(start), Some(end))?;
        let doys = dates.iter().map(|d| d.ordinal() as u16).collect();
        Ok((doys, values))
    }

    /// Aligns the curve onto an arbitrary target index.
    ///
    /// Calendar targets are evaluated directly; day-of-year targets are
    /// anchored to `anchor_year` first.
    ///
    /// # Errors
    ///
    /// Returns [`KcError::MissingAnchorYear`] for a day-of-year target
    /// without an anchor year.
    pub fn align_to(
        &self,
        target: KcTarget<'_>,
        anchor_year: Option<i32>,
    ) -> Result<Vec<f64>, KcError> {
        match target {
            KcTarget::Dates(dates) => {
                Ok(dates.iter().map(|&d| self.value_on(d)).collect())
            }
            KcTarget::DayOfYear(doys) => {
                let year = anchor_year.ok_or(KcError::MissingAnchorYear)?;
                Ok(doys
                    .iter()
                    .map(|&doy| self.value_on(doy_to_date(year, doy)))
                    .collect())
            }
        }
    }

    /// Multiplies `table[column]` by the aligned curve.
    ///
    /// Adds the raw multiplier as column `kc` and the product as
    /// `{column}_corrected`.
    ///
    /// # Errors
    ///
    /// Returns [`KcError::MissingColumn`] when `column` is absent, or a
    /// wrapped [`demeter_series::SeriesError`] on a column collision.
    pub fn apply(&self, table: &mut DayTable, column: &str) -> Result<(), KcError> {
        let values = table
            .column(column)
            .ok_or_else(|| KcError::MissingColumn {
                column: column.to_string(),
            })?
            .to_vec();

        let kc = self.align_to(KcTarget::Dates(table.dates()), None)?;
        let corrected: Vec<f64> = values.iter().zip(kc.iter()).map(|(v, k)| v * k).collect();

        table.insert_column("kc", kc)?;
        table.insert_column(format!("{column}_corrected"), corrected)?;
        Ok(())
    }
}

/// December 31 of the date's year.
fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).expect("Dec 31 exists in every year")
}

/// Converts a 1-based day-of-year ordinal into a date of `year`.
///
/// Out-of-range ordinals roll over into adjacent years, matching plain
/// date arithmetic.
fn doy_to_date(year: i32, doy: u16) -> NaiveDate {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists in every year");
    jan1 + Duration::days(i64::from(doy) - 1)
}
