//! Field-capacity estimation.

use crate::error::SoilError;
use crate::lookup::SoilTable;

/// Humus percentage below which no bonus applies.
const HUMUS_THRESHOLD_PCT: f64 = 1.5;

/// Bonus in mm/dm per percentage point of humus above the threshold.
const HUMUS_BONUS_PER_PCT: f64 = 1.5;

/// Upper cap on the humus bonus, mm/dm.
const HUMUS_BONUS_CAP_MM: f64 = 6.0;

/// Readily usable water-holding capacity of a field's root zone.
///
/// Derived, never persisted: it must be recomputed from the field's current
/// attributes on every run, since caching it across a field edit would let
/// a stale capacity leak into the balance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCapacity {
    /// Soil type the estimate was computed for (as supplied).
    pub soil_type: String,
    /// Rooting depth in cm.
    pub root_depth_cm: f64,
    /// Humus content in percent.
    pub humus_pct: f64,
    /// Usable water per 10 cm of soil, mm.
    pub nfk_mm_per_dm: f64,
    /// Usable water over the full rooting depth, mm.
    pub nfk_total_mm: f64,
}

/// Estimates the field capacity for a soil type, humus content, and rooting
/// depth.
///
/// The base rate is the arithmetic mean of the soil type's usable-water
/// range; humus above 1.5 % adds 1.5 mm/dm per point, capped at 6 mm/dm.
/// When `lookup` is given it replaces the built-in [`SoilTable`].
///
/// # Errors
///
/// Returns [`SoilError::UnknownSoilType`] when the soil type resolves in
/// neither table, and [`SoilError::InvalidInput`] when `root_depth_cm <= 0`
/// or `humus_pct < 0`.
pub fn estimate(
    soil_type: &str,
    humus_pct: f64,
    root_depth_cm: f64,
    lookup: Option<&SoilTable>,
) -> Result<FieldCapacity, SoilError> {
    if !(root_depth_cm > 0.0) {
        return Err(SoilError::InvalidInput {
            reason: format!("root_depth_cm must be > 0, got {root_depth_cm}"),
        });
    }
    if !(humus_pct >= 0.0) {
        return Err(SoilError::InvalidInput {
            reason: format!("humus_pct must be >= 0, got {humus_pct}"),
        });
    }

    let default_table;
    let table = match lookup {
        Some(t) => t,
        None => {
            default_table = SoilTable::default();
            &default_table
        }
    };

    let (min, max) = table
        .get(soil_type)
        .ok_or_else(|| SoilError::UnknownSoilType {
            soil_type: soil_type.trim().to_lowercase(),
        })?;

    let base = (min + max) / 2.0;
    let bonus =
        (((humus_pct - HUMUS_THRESHOLD_PCT).max(0.0)) * HUMUS_BONUS_PER_PCT).min(HUMUS_BONUS_CAP_MM);
    let rate = base + bonus;

    Ok(FieldCapacity {
        soil_type: soil_type.to_string(),
        root_depth_cm,
        humus_pct,
        nfk_mm_per_dm: rate,
        nfk_total_mm: rate * root_depth_cm / 10.0,
    })
}
