//! Soil-type lookup table.

use std::collections::BTreeMap;

/// Usable-water ranges in mm per 10 cm of soil, keyed by normalized
/// soil-type name.
///
/// Keys are normalized (trimmed, lower-cased) once at insertion and lookup,
/// so callers can pass names as they appear in configuration.
#[derive(Debug, Clone)]
pub struct SoilTable {
    ranges: BTreeMap<String, (f64, f64)>,
}

/// Default usable-water ranges (mm per dm) for common texture classes.
///
/// Values follow the usual German soil-survey (KA5-style) nFK spans for
/// medium bulk density.
const DEFAULT_RANGES: &[(&str, (f64, f64))] = &[
    ("sand", (6.0, 12.0)),
    ("loamy sand", (11.0, 16.0)),
    ("sandy loam", (14.0, 19.0)),
    ("loam", (17.0, 22.0)),
    ("silt loam", (19.0, 24.0)),
    ("silt", (20.0, 26.0)),
    ("clay loam", (14.0, 19.0)),
    ("clay", (11.0, 16.0)),
    ("peat", (20.0, 30.0)),
];

impl Default for SoilTable {
    fn default() -> Self {
        let mut table = Self {
            ranges: BTreeMap::new(),
        };
        for &(name, range) in DEFAULT_RANGES {
            table.insert(name, range);
        }
        table
    }
}

impl SoilTable {
    /// Creates an empty table (no soil types resolve).
    pub fn empty() -> Self {
        Self {
            ranges: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a soil type's `(min, max)` usable-water range.
    pub fn insert(&mut self, soil_type: &str, range: (f64, f64)) {
        self.ranges.insert(normalize(soil_type), range);
    }

    /// Looks up the `(min, max)` range for a soil type.
    pub fn get(&self, soil_type: &str) -> Option<(f64, f64)> {
        self.ranges.get(&normalize(soil_type)).copied()
    }

    /// Known soil-type keys in lexical order.
    pub fn soil_types(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }
}

/// Normalizes a soil-type name into a lookup key.
fn normalize(soil_type: &str) -> String {
    soil_type.trim().to_lowercase()
}
