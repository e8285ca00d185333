//! In-memory repository.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Datelike, NaiveDate};
use demeter_balance::{BalanceRecord, BalanceTable};
use tracing::debug;

use crate::error::StoreError;
use crate::model::{Field, FieldSpec, IrrigationEvent};
use crate::store::BalanceStore;

#[derive(Debug, Default)]
struct Inner {
    next_field_id: i64,
    next_event_id: i64,
    fields: BTreeMap<i64, Field>,
    events: BTreeMap<i64, IrrigationEvent>,
    balances: BTreeMap<(i64, NaiveDate), BalanceRecord>,
}

/// In-memory [`BalanceStore`] for tests and the demo binary.
///
/// A single mutex serializes all access, which also satisfies the per-field
/// upsert-serialization requirement of the trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e: PoisonError<_>| StoreError::Backend {
                reason: format!("store mutex poisoned: {e}"),
            })
    }
}

impl BalanceStore for MemoryStore {
    fn get_field(&self, id: i64) -> Result<Option<Field>, StoreError> {
        Ok(self.lock()?.fields.get(&id).cloned())
    }

    fn get_field_by_name(&self, name: &str) -> Result<Option<Field>, StoreError> {
        Ok(self
            .lock()?
            .fields
            .values()
            .find(|f| f.name == name)
            .cloned())
    }

    fn list_fields(&self) -> Result<Vec<Field>, StoreError> {
        Ok(self.lock()?.fields.values().cloned().collect())
    }

    fn upsert_field(&self, spec: &FieldSpec) -> Result<(Field, bool), StoreError> {
        if let Some(reason) = spec.validate() {
            return Err(StoreError::InvalidField {
                name: spec.name.clone(),
                reason,
            });
        }

        let mut inner = self.lock()?;
        let existing_id = inner
            .fields
            .values()
            .find(|f| f.name == spec.name)
            .map(|f| f.id);

        match existing_id {
            Some(id) => {
                let changed = inner.fields[&id].balance_affected_by(spec);
                let field = Field {
                    id,
                    name: spec.name.clone(),
                    reference_station: spec.reference_station.clone(),
                    soil_type: spec.soil_type.clone(),
                    humus_pct: spec.humus_pct,
                    root_depth_cm: spec.root_depth_cm,
                    p_allowable: spec.p_allowable,
                    area_ha: spec.area_ha,
                };
                inner.fields.insert(id, field.clone());
                if changed {
                    // Stale storage computed under the old attributes must
                    // never seed a resume.
                    let removed = remove_balance(&mut inner, id);
                    debug!(field = %field.name, removed, "field changed; cleared cached balance");
                }
                Ok((field, changed))
            }
            None => {
                inner.next_field_id += 1;
                let field = Field {
                    id: inner.next_field_id,
                    name: spec.name.clone(),
                    reference_station: spec.reference_station.clone(),
                    soil_type: spec.soil_type.clone(),
                    humus_pct: spec.humus_pct,
                    root_depth_cm: spec.root_depth_cm,
                    p_allowable: spec.p_allowable,
                    area_ha: spec.area_ha,
                };
                inner.fields.insert(field.id, field.clone());
                Ok((field, false))
            }
        }
    }

    fn delete_field(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.fields.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "field",
                id,
            });
        }
        inner.events.retain(|_, e| e.field_id != id);
        remove_balance(&mut inner, id);
        Ok(())
    }

    fn upsert_irrigation_event(
        &self,
        field_id: i64,
        date: NaiveDate,
        method: &str,
        amount_mm: f64,
    ) -> Result<IrrigationEvent, StoreError> {
        let mut inner = self.lock()?;
        if !inner.fields.contains_key(&field_id) {
            return Err(StoreError::NotFound {
                entity: "field",
                id: field_id,
            });
        }

        let existing_id = inner
            .events
            .values()
            .find(|e| e.field_id == field_id && e.date == date)
            .map(|e| e.id);

        let id = match existing_id {
            Some(id) => id,
            None => {
                inner.next_event_id += 1;
                inner.next_event_id
            }
        };
        let event = IrrigationEvent {
            id,
            field_id,
            date,
            method: method.to_string(),
            amount_mm,
        };
        inner.events.insert(id, event.clone());
        Ok(event)
    }

    fn list_irrigation_events(
        &self,
        field_id: i64,
        year: Option<i32>,
    ) -> Result<Vec<IrrigationEvent>, StoreError> {
        let inner = self.lock()?;
        let mut events: Vec<IrrigationEvent> = inner
            .events
            .values()
            .filter(|e| e.field_id == field_id)
            .filter(|e| year.map_or(true, |y| e.date.year() == y))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    fn first_irrigation_event(
        &self,
        field_id: i64,
        year: i32,
    ) -> Result<Option<IrrigationEvent>, StoreError> {
        Ok(self
            .list_irrigation_events(field_id, Some(year))?
            .into_iter()
            .next())
    }

    fn delete_irrigation_event(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.events.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "irrigation event",
                id,
            });
        }
        Ok(())
    }

    fn latest_balance(&self, field_id: i64) -> Result<Option<BalanceRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .balances
            .range((field_id, NaiveDate::MIN)..=(field_id, NaiveDate::MAX))
            .next_back()
            .map(|(_, r)| r.clone()))
    }

    fn query_balance(
        &self,
        field_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<BalanceRecord>, StoreError> {
        let inner = self.lock()?;
        let start = start.unwrap_or(NaiveDate::MIN);
        let end = end.unwrap_or(NaiveDate::MAX);
        Ok(inner
            .balances
            .range((field_id, start)..=(field_id, end))
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn upsert_balance(&self, table: &BalanceTable) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let field_id = table.field_id();
        if !inner.fields.contains_key(&field_id) {
            return Err(StoreError::NotFound {
                entity: "field",
                id: field_id,
            });
        }
        let mut written = 0;
        for record in table.records() {
            inner.balances.insert((field_id, record.date), record.clone());
            written += 1;
        }
        Ok(written)
    }

    fn clear_balance(&self, field_ids: Option<&[i64]>) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.balances.len();
        match field_ids {
            None => inner.balances.clear(),
            Some(ids) => inner.balances.retain(|(fid, _), _| !ids.contains(fid)),
        }
        Ok(before - inner.balances.len())
    }
}

fn remove_balance(inner: &mut Inner, field_id: i64) -> usize {
    let before = inner.balances.len();
    inner.balances.retain(|(fid, _), _| *fid != field_id);
    before - inner.balances.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            reference_station: "S1".to_string(),
            soil_type: "sand".to_string(),
            humus_pct: 2.0,
            root_depth_cm: 30.0,
            p_allowable: 0.0,
            area_ha: None,
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn record(date: NaiveDate, storage: f64) -> BalanceRecord {
        BalanceRecord {
            date,
            precipitation: 0.0,
            irrigation: 0.0,
            evapotranspiration: 0.0,
            incoming: 0.0,
            net: 0.0,
            soil_storage: storage,
            field_capacity: 100.0,
            deficit: 100.0 - storage,
            readily_available_water: None,
            below_raw: None,
        }
    }

    #[test]
    fn upsert_field_creates_then_updates() {
        let store = MemoryStore::new();
        let (field, changed) = store.upsert_field(&spec("north")).unwrap();
        assert!(!changed);
        assert_eq!(field.id, 1);

        // Same attributes: no change.
        let (_, changed) = store.upsert_field(&spec("north")).unwrap();
        assert!(!changed);

        // Capacity-affecting change.
        let mut s = spec("north");
        s.humus_pct = 4.0;
        let (updated, changed) = store.upsert_field(&s).unwrap();
        assert!(changed);
        assert_eq!(updated.id, 1);
        assert_eq!(updated.humus_pct, 4.0);
    }

    #[test]
    fn field_change_clears_balance() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();
        let table = BalanceTable::new(field.id, vec![record(d(6, 1), 80.0)]);
        store.upsert_balance(&table).unwrap();
        assert_eq!(store.query_balance(field.id, None, None).unwrap().len(), 1);

        let mut s = spec("north");
        s.root_depth_cm = 60.0;
        store.upsert_field(&s).unwrap();
        assert!(store.query_balance(field.id, None, None).unwrap().is_empty());
    }

    #[test]
    fn invalid_spec_rejected() {
        let store = MemoryStore::new();
        let mut s = spec("bad");
        s.p_allowable = 2.0;
        assert!(matches!(
            store.upsert_field(&s).unwrap_err(),
            StoreError::InvalidField { .. }
        ));
    }

    #[test]
    fn irrigation_unique_per_field_and_date() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();

        let first = store
            .upsert_irrigation_event(field.id, d(6, 2), "drip", 10.0)
            .unwrap();
        let second = store
            .upsert_irrigation_event(field.id, d(6, 2), "sprinkler", 25.0)
            .unwrap();
        assert_eq!(first.id, second.id);

        let events = store.list_irrigation_events(field.id, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount_mm, 25.0);
        assert_eq!(events[0].method, "sprinkler");
    }

    #[test]
    fn first_event_respects_year() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();
        store
            .upsert_irrigation_event(field.id, NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(), "drip", 5.0)
            .unwrap();
        store
            .upsert_irrigation_event(field.id, d(6, 10), "drip", 5.0)
            .unwrap();
        store
            .upsert_irrigation_event(field.id, d(5, 1), "drip", 5.0)
            .unwrap();

        let first = store.first_irrigation_event(field.id, 2024).unwrap().unwrap();
        assert_eq!(first.date, d(5, 1));
        assert!(store.first_irrigation_event(field.id, 2025).unwrap().is_none());
    }

    #[test]
    fn latest_and_query_balance() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();
        let table = BalanceTable::new(
            field.id,
            vec![record(d(6, 1), 90.0), record(d(6, 2), 85.0), record(d(6, 3), 80.0)],
        );
        assert_eq!(store.upsert_balance(&table).unwrap(), 3);

        let latest = store.latest_balance(field.id).unwrap().unwrap();
        assert_eq!(latest.date, d(6, 3));

        let window = store
            .query_balance(field.id, Some(d(6, 2)), Some(d(6, 3)))
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].date, d(6, 2));
    }

    #[test]
    fn upsert_balance_overwrites_same_date() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();
        store
            .upsert_balance(&BalanceTable::new(field.id, vec![record(d(6, 1), 90.0)]))
            .unwrap();
        store
            .upsert_balance(&BalanceTable::new(field.id, vec![record(d(6, 1), 70.0)]))
            .unwrap();

        let rows = store.query_balance(field.id, None, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].soil_storage, 70.0);
    }

    #[test]
    fn delete_field_cascades() {
        let store = MemoryStore::new();
        let (field, _) = store.upsert_field(&spec("north")).unwrap();
        store
            .upsert_irrigation_event(field.id, d(6, 2), "drip", 10.0)
            .unwrap();
        store
            .upsert_balance(&BalanceTable::new(field.id, vec![record(d(6, 1), 90.0)]))
            .unwrap();

        store.delete_field(field.id).unwrap();
        assert!(store.get_field(field.id).unwrap().is_none());
        assert!(store.list_irrigation_events(field.id, None).unwrap().is_empty());
        assert!(store.query_balance(field.id, None, None).unwrap().is_empty());
    }

    #[test]
    fn clear_balance_selective() {
        let store = MemoryStore::new();
        let (a, _) = store.upsert_field(&spec("a")).unwrap();
        let (b, _) = store.upsert_field(&spec("b")).unwrap();
        store
            .upsert_balance(&BalanceTable::new(a.id, vec![record(d(6, 1), 90.0)]))
            .unwrap();
        store
            .upsert_balance(&BalanceTable::new(b.id, vec![record(d(6, 1), 80.0)]))
            .unwrap();

        assert_eq!(store.clear_balance(Some(&[a.id])).unwrap(), 1);
        assert!(store.query_balance(a.id, None, None).unwrap().is_empty());
        assert_eq!(store.query_balance(b.id, None, None).unwrap().len(), 1);

        assert_eq!(store.clear_balance(None).unwrap(), 1);
    }
}
