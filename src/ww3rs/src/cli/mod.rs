// ww3rs/src/cli/mod.rs

pub mod check;
pub mod context;
pub mod generate;

pub use check::check_config;
pub use context::print_context;
pub use generate::generate_run;

use crate::config::Ww3Config;
use std::path::Path;

fn load_config(config_path: &Path) -> anyhow::Result<Ww3Config> {
    if !config_path.exists() {
        anyhow::bail!(
            "Expected a configuration file: {} but it doesn't exist.",
            config_path.display()
        );
    }
    Ww3Config::try_from(config_path)
}
