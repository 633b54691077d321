// ww3rs/src/config/manifest.rs

use crate::components::Program;
use crate::config::model::NamelistLayout;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use ww3nml::fingerprint::combined_fingerprint;
use ww3nml::WriteManifest;

/// What `generate` wrote into a run directory, saved as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub layout: NamelistLayout,
    pub directory: PathBuf,
    /// Fingerprint over every namelist file of the run
    pub fingerprint: String,
    pub programs: BTreeMap<Program, WriteManifest>,
}

impl RunManifest {
    pub fn new(run_id: &str, layout: NamelistLayout, directory: &Path) -> Self {
        Self {
            run_id: run_id.to_string(),
            generated_at: Utc::now(),
            layout,
            directory: directory.to_path_buf(),
            fingerprint: combined_fingerprint(Vec::<String>::new()),
            programs: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, program: Program, written: WriteManifest) {
        self.programs
            .entry(program)
            .or_insert_with(|| WriteManifest {
                directory: written.directory.clone(),
                files: Vec::new(),
            })
            .extend(written);
        self.fingerprint = combined_fingerprint(self.programs.values().map(|m| m.fingerprint()));
    }

    pub fn file_count(&self) -> usize {
        self.programs.values().map(WriteManifest::len).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs_err::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)?;
        serde_json::from_str(&content)
            .context(format!("Error deserializing manifest {}", path.display()))
    }
}
