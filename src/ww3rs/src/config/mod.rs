// ww3rs/src/config/mod.rs

pub mod manifest;
pub mod model;
pub mod period;

pub use manifest::RunManifest;
pub use model::{NamelistLayout, Ww3Config};
pub use period::RunPeriod;
