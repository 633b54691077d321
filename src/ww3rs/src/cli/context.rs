// ww3rs/src/cli/context.rs

use crate::cli::load_config;
use anyhow::Result;
use std::path::Path;

/// Print the template context as JSON.
pub fn print_context(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let context = config.get_template_context()?;
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}
