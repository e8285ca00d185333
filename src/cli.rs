use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Demeter daily soil-water balance engine.
#[derive(Parser)]
#[command(
    name = "demeter",
    version,
    about = "Daily soil-water balance for irrigated fields"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Refresh the water balance for all configured fields.
    Run(RunArgs),
    /// Estimate usable field capacity for one soil profile.
    Capacity(CapacityArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "demeter.toml")]
    pub config: PathBuf,

    /// Compute as if the current instant were this RFC 3339 timestamp.
    #[arg(long = "as-of")]
    pub as_of: Option<String>,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `capacity` subcommand.
#[derive(clap::Args)]
pub struct CapacityArgs {
    /// Soil texture class (e.g. "loam", "silt loam").
    #[arg(long = "soil-type")]
    pub soil_type: String,

    /// Humus content in percent.
    #[arg(long, default_value_t = 0.0)]
    pub humus: f64,

    /// Effective rooting depth in cm.
    #[arg(long = "root-depth")]
    pub root_depth: f64,

    /// Optional TOML config providing [[soil_types]] overrides.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
