//! Balance output rows.

use chrono::NaiveDate;

/// One simulated (and persisted) day of a field's water balance.
///
/// Invariant: `0 <= soil_storage <= field_capacity` and
/// `deficit = field_capacity - soil_storage`.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    /// Calendar date of the row.
    pub date: NaiveDate,
    /// Precipitation depth, mm.
    pub precipitation: f64,
    /// Irrigation depth, mm.
    pub irrigation: f64,
    /// Crop evapotranspiration, mm.
    pub evapotranspiration: f64,
    /// Precipitation plus irrigation, mm.
    pub incoming: f64,
    /// Incoming minus evapotranspiration, mm.
    pub net: f64,
    /// Root-zone storage at end of day, mm.
    pub soil_storage: f64,
    /// Field capacity the row was simulated under, mm.
    pub field_capacity: f64,
    /// Capacity minus storage, mm.
    pub deficit: f64,
    /// Readily available water (p x capacity), when the depletion
    /// fraction is configured.
    pub readily_available_water: Option<f64>,
    /// Whether storage fell below the irrigation trigger level.
    pub below_raw: Option<bool>,
}

/// Simulated balance series for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceTable {
    field_id: i64,
    records: Vec<BalanceRecord>,
}

impl BalanceTable {
    /// Creates a table from simulated rows.
    pub fn new(field_id: i64, records: Vec<BalanceRecord>) -> Self {
        Self { field_id, records }
    }

    /// Field the rows belong to.
    pub fn field_id(&self) -> i64 {
        self.field_id
    }

    /// The simulated rows in chronological order.
    pub fn records(&self) -> &[BalanceRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the table into its rows.
    pub fn into_records(self) -> Vec<BalanceRecord> {
        self.records
    }
}
