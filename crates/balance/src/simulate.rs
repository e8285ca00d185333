//! The daily bucket recurrence.

use demeter_series::DayTable;
use demeter_soil::FieldCapacity;

use crate::error::BalanceError;
use crate::record::{BalanceRecord, BalanceTable};

/// Runs the daily water-balance simulation for one field.
///
/// `daily` must carry `precipitation` and one of `et0_corrected` / `et0`
/// (the corrected series wins when both exist). `irrigation` is the
/// daily-aligned depth series matching the table's index. `initial_storage`
/// seeds the bucket; a fresh field (no prior record) starts saturated at
/// full capacity. Missing precipitation, irrigation, or ET values count as
/// zero for their day; storage still propagates.
///
/// The trigger series (`readily_available_water`, `below_raw`) is emitted
/// only when `p_allowable > 0`.
///
/// # Errors
///
/// Returns [`BalanceError::EmptyInput`], [`BalanceError::MissingColumn`],
/// [`BalanceError::NonPositiveCapacity`], or
/// [`BalanceError::LengthMismatch`] when a precondition fails.
pub fn simulate(
    daily: &DayTable,
    irrigation: &[f64],
    capacity: &FieldCapacity,
    p_allowable: f64,
    initial_storage: Option<f64>,
    field_id: i64,
) -> Result<BalanceTable, BalanceError> {
    if daily.is_empty() {
        return Err(BalanceError::EmptyInput);
    }

    let cap = capacity.nfk_total_mm;
    if !(cap > 0.0) {
        return Err(BalanceError::NonPositiveCapacity { got: cap });
    }

    let precipitation = daily
        .column("precipitation")
        .ok_or_else(|| BalanceError::MissingColumn {
            column: "precipitation".to_string(),
        })?;
    let et = daily
        .column("et0_corrected")
        .or_else(|| daily.column("et0"))
        .ok_or_else(|| BalanceError::MissingColumn {
            column: "et0_corrected|et0".to_string(),
        })?;

    if irrigation.len() != daily.len() {
        return Err(BalanceError::LengthMismatch {
            expected: daily.len(),
            got: irrigation.len(),
        });
    }

    let raw = (p_allowable > 0.0).then(|| p_allowable * cap);
    let trigger_level = raw.map(|r| cap - r);

    let mut storage = initial_storage.unwrap_or(cap).clamp(0.0, cap);
    let mut records = Vec::with_capacity(daily.len());

    for (i, &date) in daily.dates().iter().enumerate() {
        let precip = zero_if_nan(precipitation[i]);
        let irr = zero_if_nan(irrigation[i]);
        let et_day = zero_if_nan(et[i]);

        let incoming = precip + irr;
        let net = incoming - et_day;
        storage = (storage + net).clamp(0.0, cap);

        records.push(BalanceRecord {
            date,
            precipitation: precip,
            irrigation: irr,
            evapotranspiration: et_day,
            incoming,
            net,
            soil_storage: storage,
            field_capacity: cap,
            deficit: cap - storage,
            readily_available_water: raw,
            below_raw: trigger_level.map(|level| storage < level),
        });
    }

    Ok(BalanceTable::new(field_id, records))
}

fn zero_if_nan(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}
