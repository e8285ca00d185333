use std::fs;

use anyhow::{Context, Result};

use demeter_soil::estimate;

use crate::cli::CapacityArgs;
use crate::config::DemeterConfig;
use crate::convert;

/// Estimate and print the usable field capacity for one soil profile.
pub fn run(args: CapacityArgs) -> Result<()> {
    let soil_table = match args.config {
        Some(ref path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config: DemeterConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            convert::build_soil_table(&config.soil_types)
        }
        None => None,
    };

    let capacity = estimate(
        &args.soil_type,
        args.humus,
        args.root_depth,
        soil_table.as_ref(),
    )?;

    println!("soil type:      {}", capacity.soil_type);
    println!("humus:          {:.1} %", capacity.humus_pct);
    println!("root depth:     {:.0} cm", capacity.root_depth_cm);
    println!("nFK rate:       {:.2} mm/dm", capacity.nfk_mm_per_dm);
    println!("field capacity: {:.1} mm", capacity.nfk_total_mm);
    Ok(())
}
