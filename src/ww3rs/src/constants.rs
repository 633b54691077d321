// ww3rs/src/constants.rs

pub const DEFAULT_CONFIG_NAME: &str = "ww3-config.yml";
pub const DEFAULT_RUN_ID: &str = "run";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
