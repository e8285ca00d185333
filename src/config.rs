use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level Demeter configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemeterConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralToml,

    /// Reference-evapotranspiration settings.
    #[serde(default)]
    pub evapotranspiration: Et0Toml,

    /// Daily resampling settings.
    #[serde(default)]
    pub resampling: ResamplingToml,

    /// Usable-water overrides for the built-in soil table.
    #[serde(default)]
    pub soil_types: Vec<SoilTypeToml>,

    /// Configured fields.
    #[serde(default)]
    pub fields: Vec<FieldToml>,

    /// Recorded irrigation applications.
    #[serde(default)]
    pub irrigation: Vec<IrrigationToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralToml {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneralToml {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            provider: default_provider(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_provider() -> String {
    "csv".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Et0Toml {
    #[serde(default = "default_method")]
    pub method: String,
    /// Season end date (dd-mm-yyyy) closing the last correction period.
    #[serde(default)]
    pub season_end: Option<String>,
    /// Crop-coefficient correction periods.
    #[serde(default)]
    pub correction: Vec<CorrectionToml>,
}

impl Default for Et0Toml {
    fn default() -> Self {
        Self {
            method: default_method(),
            season_end: None,
            correction: Vec::new(),
        }
    }
}

fn default_method() -> String {
    "penman-fao56".to_string()
}

/// One crop-coefficient period (dates are dd-mm-yyyy).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectionToml {
    pub name: String,
    pub value: f64,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ResamplingToml {
    /// Per-variable aggregation overrides, e.g. `sun_duration = "sum"`.
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
}

/// Usable-water range (mm per dm) for one soil texture class.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoilTypeToml {
    pub name: String,
    pub nfk_min: f64,
    pub nfk_max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldToml {
    pub name: String,
    pub station: String,
    pub soil_type: String,
    #[serde(default)]
    pub humus: f64,
    pub root_depth: f64,
    #[serde(default)]
    pub p_allowable: f64,
    #[serde(default)]
    pub area_ha: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrrigationToml {
    /// Name of the field the water was applied to.
    pub field: String,
    /// Application date (dd-mm-yyyy).
    pub date: String,
    #[serde(default = "default_irrigation_method")]
    pub method: String,
    /// Applied depth in mm.
    pub amount: f64,
}

fn default_irrigation_method() -> String {
    "sprinkler".to_string()
}
