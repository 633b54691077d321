// ww3rs/src/cli/check.rs

use crate::cli::load_config;
use anyhow::Result;
use std::path::Path;

/// Validate a configuration without writing anything.
pub fn check_config(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let warnings = config.validate()?;

    let programs: Vec<String> = config
        .components
        .programs()
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!("✓ {} is consistent", config_path.display());
    println!("  Programs: {}", programs.join(", "));
    if let Some(period) = &config.period {
        println!("  Period: {}", period);
    }

    if warnings.is_empty() {
        println!("✓ No warnings");
    } else {
        println!("{} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }
    Ok(())
}
