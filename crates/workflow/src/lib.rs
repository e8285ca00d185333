//! # demeter-workflow
//!
//! Per-field orchestration of the water-balance pipeline.
//!
//! For every configured field the [`Orchestrator`] decides which window to
//! (re)compute: it resumes the day after the last persisted balance row,
//! carrying that row's storage forward, instead of recomputing the season
//! from scratch. Fields are processed independently; a failure computing new
//! data for one field degrades that field to its last persisted series and
//! never touches the others.
//!
//! The two external seams are the [`BalanceStore`] repository (persistence
//! technology is out of scope) and the [`StationProvider`] data source
//! (network acquisition is out of scope). [`MemoryStore`] is the in-memory
//! repository used by tests and the demo binary.

mod error;
mod memory;
mod model;
mod orchestrator;
mod provider;
mod store;

pub use error::{FieldRunError, ProviderError, StoreError, WorkflowError};
pub use memory::MemoryStore;
pub use model::{Field, FieldSpec, IrrigationEvent};
pub use orchestrator::{FieldRun, Orchestrator, RunStatus, WorkflowConfig};
pub use provider::{StationData, StationMeta, StationProvider};
pub use store::BalanceStore;
