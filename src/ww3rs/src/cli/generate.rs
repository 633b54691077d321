// ww3rs/src/cli/generate.rs

use crate::cli::load_config;
use anyhow::Result;
use std::path::Path;

/// Write the namelists of every configured program under
/// `output_dir/<run_id>`.
pub fn generate_run(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    println!("✓ Loaded configuration");

    let manifest = config.generate(output_dir)?;
    for (program, written) in &manifest.programs {
        for file in &written.files {
            println!("  ✓ {} ({}, {} bytes)", file.path.display(), program, file.bytes);
        }
    }
    println!(
        "✓ Run {} written to {} (fingerprint {})",
        manifest.run_id,
        manifest.directory.display(),
        manifest.fingerprint
    );
    Ok(())
}
