// ww3rs/src/lib.rs

pub mod cli;
pub mod components;
pub mod config;
pub mod constants;

pub use components::{Component, Components, Program};
pub use config::{NamelistLayout, RunManifest, RunPeriod, Ww3Config};
