//! # demeter-balance
//!
//! The daily water-balance integrator: a storage variable clamped between
//! zero and field capacity, updated day by day with precipitation plus
//! irrigation minus evapotranspiration.
//!
//! The recurrence is order-dependent (each day's storage feeds the next),
//! so the simulation is a sequential scan. A fresh field starts at full
//! capacity; a resumed field carries yesterday's persisted storage forward.

mod error;
mod record;
mod simulate;

pub use error::BalanceError;
pub use record::{BalanceRecord, BalanceTable};
pub use simulate::simulate;
