//! Domain model shared by the store and the orchestrator.

use chrono::NaiveDate;

/// A managed field as stored in the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Repository id.
    pub id: i64,
    /// Unique field name.
    pub name: String,
    /// Reference weather station id.
    pub reference_station: String,
    /// Soil texture class (resolved against the soil lookup table).
    pub soil_type: String,
    /// Humus content in percent.
    pub humus_pct: f64,
    /// Rooting depth in cm.
    pub root_depth_cm: f64,
    /// Allowable depletion fraction p in [0, 1]; 0 disables the trigger.
    pub p_allowable: f64,
    /// Field area in hectares, if known.
    pub area_ha: Option<f64>,
}

impl Field {
    /// Whether replacing this field's attributes with `spec` changes
    /// anything the persisted balance depends on.
    ///
    /// Soil type, humus, and root depth change the capacity; the depletion
    /// fraction changes the trigger flags; the reference station changes
    /// the meteorology. Any of these invalidates cached rows.
    pub fn balance_affected_by(&self, spec: &FieldSpec) -> bool {
        self.soil_type != spec.soil_type
            || self.humus_pct != spec.humus_pct
            || self.root_depth_cm != spec.root_depth_cm
            || self.p_allowable != spec.p_allowable
            || self.reference_station != spec.reference_station
    }
}

/// Upsert payload for a field (configuration-sync surface).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Unique field name.
    pub name: String,
    /// Reference weather station id.
    pub reference_station: String,
    /// Soil texture class.
    pub soil_type: String,
    /// Humus content in percent.
    pub humus_pct: f64,
    /// Rooting depth in cm.
    pub root_depth_cm: f64,
    /// Allowable depletion fraction p in [0, 1].
    pub p_allowable: f64,
    /// Field area in hectares, if known.
    pub area_ha: Option<f64>,
}

impl FieldSpec {
    /// Checks the model invariants.
    ///
    /// Returns the violated constraint, if any.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("name must not be empty".to_string());
        }
        if !(self.humus_pct >= 0.0) {
            return Some(format!("humus_pct must be >= 0, got {}", self.humus_pct));
        }
        if !(self.root_depth_cm > 0.0) {
            return Some(format!("root_depth_cm must be > 0, got {}", self.root_depth_cm));
        }
        if !(0.0..=1.0).contains(&self.p_allowable) {
            return Some(format!("p_allowable must be in [0, 1], got {}", self.p_allowable));
        }
        None
    }
}

/// A single irrigation application.
///
/// Unique per (field, date): a second event on the same date updates the
/// first instead of duplicating it.
#[derive(Debug, Clone, PartialEq)]
pub struct IrrigationEvent {
    /// Repository id.
    pub id: i64,
    /// Owning field.
    pub field_id: i64,
    /// Calendar date of the application (timezone-agnostic key).
    pub date: NaiveDate,
    /// Application method (drip, sprinkler, ...).
    pub method: String,
    /// Applied depth, mm.
    pub amount_mm: f64,
}
