//! # demeter-soil
//!
//! Estimates the readily usable water-holding capacity (nFK) of a field's
//! root zone from its soil type, humus content, and rooting depth.
//!
//! The estimate is a pure function of its inputs: a closed lookup table maps
//! the soil-type name to a usable-water range per 10 cm of soil, the mean of
//! that range is raised by a capped humus bonus, and the per-decimeter rate
//! is scaled to the rooting depth.
//!
//! ```
//! use demeter_soil::estimate;
//!
//! let fc = estimate("Sand", 1.5, 30.0, None).unwrap();
//! assert_eq!(fc.nfk_mm_per_dm, 9.0);
//! assert_eq!(fc.nfk_total_mm, 27.0);
//! ```

mod error;
mod estimator;
mod lookup;

pub use error::SoilError;
pub use estimator::{FieldCapacity, estimate};
pub use lookup::SoilTable;
