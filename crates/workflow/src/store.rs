//! Persistence repository seam.

use chrono::NaiveDate;
use demeter_balance::{BalanceRecord, BalanceTable};

use crate::error::StoreError;
use crate::model::{Field, FieldSpec, IrrigationEvent};

/// Repository interface for fields, irrigation events, and balance rows.
///
/// The storage technology behind it is an external concern; the core only
/// relies on the contracts below. Implementations must serialize balance
/// upserts per field (the orchestrator's `run` may be parallelized across
/// fields by callers).
pub trait BalanceStore: Send + Sync {
    /// Field by repository id.
    fn get_field(&self, id: i64) -> Result<Option<Field>, StoreError>;

    /// Field by unique name.
    fn get_field_by_name(&self, name: &str) -> Result<Option<Field>, StoreError>;

    /// All fields, ordered by id.
    fn list_fields(&self) -> Result<Vec<Field>, StoreError>;

    /// Creates or updates a field keyed by name.
    ///
    /// Returns the stored field and whether a balance-affecting attribute
    /// changed; on change the field's persisted balance rows are cleared
    /// synchronously, forcing the next run to recompute from season start.
    fn upsert_field(&self, spec: &FieldSpec) -> Result<(Field, bool), StoreError>;

    /// Deletes a field, cascading its irrigation events and balance rows.
    fn delete_field(&self, id: i64) -> Result<(), StoreError>;

    /// Creates or updates the irrigation event keyed by (field, date).
    fn upsert_irrigation_event(
        &self,
        field_id: i64,
        date: NaiveDate,
        method: &str,
        amount_mm: f64,
    ) -> Result<IrrigationEvent, StoreError>;

    /// Events of a field, optionally restricted to a calendar year,
    /// ordered by date.
    fn list_irrigation_events(
        &self,
        field_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<IrrigationEvent>, StoreError>;

    /// Earliest event of a field within a calendar year (the season start).
    fn first_irrigation_event(
        &self,
        field_id: i64,
        year: i32,
    ) -> Result<Option<IrrigationEvent>, StoreError>;

    /// Deletes a single irrigation event.
    fn delete_irrigation_event(&self, id: i64) -> Result<(), StoreError>;

    /// The most recent persisted balance row of a field (the checkpoint).
    fn latest_balance(&self, field_id: i64) -> Result<Option<BalanceRecord>, StoreError>;

    /// Persisted balance rows of a field within `[start, end]`, ordered by
    /// date; open bounds default to the full history.
    fn query_balance(
        &self,
        field_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<BalanceRecord>, StoreError>;

    /// Upserts balance rows keyed by (field, date); returns the number of
    /// rows written.
    fn upsert_balance(&self, table: &BalanceTable) -> Result<usize, StoreError>;

    /// Clears balance rows for the given fields (all fields when `None`);
    /// returns the number of rows removed.
    fn clear_balance(&self, field_ids: Option<&[i64]>) -> Result<usize, StoreError>;
}
