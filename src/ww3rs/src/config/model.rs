// ww3rs/src/config/model.rs

use crate::components::{Components, Program};
use crate::config::manifest::RunManifest;
use crate::config::period::RunPeriod;
use crate::constants::{DEFAULT_RUN_ID, MANIFEST_FILE_NAME};
use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use ww3nml::Composition;

/// How a program's namelists are laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamelistLayout {
    /// `<run>/ww3_<program>.nml`
    #[default]
    Combined,
    /// `<run>/ww3_<program>/<block>.nml`
    PerBlock,
}

fn default_run_id() -> String {
    DEFAULT_RUN_ID.to_string()
}

/// Run configuration parsed from ww3-config.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ww3Config {
    #[serde(default = "default_run_id")]
    pub run_id: String,
    pub period: Option<RunPeriod>,
    #[serde(default)]
    pub layout: NamelistLayout,
    #[serde(default)]
    pub components: Components,
}

impl Ww3Config {
    pub fn new(components: Components) -> Self {
        Self {
            run_id: default_run_id(),
            period: None,
            layout: NamelistLayout::default(),
            components,
        }
    }

    /// Components with the run period applied.
    pub fn resolved_components(&self) -> anyhow::Result<Components> {
        let mut components = self.components.clone();
        if let Some(period) = &self.period {
            period.apply(&mut components)?;
        }
        Ok(components)
    }

    /// Check every program and return its completeness warnings.
    ///
    /// Fails on an unusable run id, an empty configuration or any
    /// contradiction between the blocks of one program.
    pub fn validate(&self) -> anyhow::Result<Vec<String>> {
        let (_, warnings) = self.checked_compositions()?;
        Ok(warnings)
    }

    fn checked_compositions(&self) -> anyhow::Result<(Vec<(Program, Composition)>, Vec<String>)> {
        let run_id = self.run_id.trim();
        if run_id.is_empty() || Path::new(run_id).file_name() != Some(OsStr::new(run_id)) {
            anyhow::bail!("run_id must be a plain directory name, got {:?}", self.run_id);
        }

        let compositions = self.resolved_components()?.compositions();
        if compositions.is_empty() {
            anyhow::bail!("No components are configured");
        }

        let mut warnings = Vec::new();
        for (program, composition) in &compositions {
            composition
                .ensure_consistent()
                .context(format!("Inconsistent {} namelists", program))?;
            warnings.extend(
                composition
                    .validate_completeness()
                    .into_iter()
                    .map(|w| format!("{}: {}", program, w)),
            );
        }
        Ok((compositions, warnings))
    }

    /// Directory `generate` writes into.
    pub fn run_dir(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.run_id.trim())
    }

    /// Validate, then write every program's namelists under
    /// `output_dir/<run_id>` followed by `manifest.json`.
    pub fn generate(&self, output_dir: &Path) -> anyhow::Result<RunManifest> {
        let (compositions, warnings) = self.checked_compositions()?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let run_dir = self.run_dir(output_dir);
        fs_err::create_dir_all(&run_dir)
            .context(format!("Failed to create directory: {}", run_dir.display()))?;

        let mut manifest = RunManifest::new(self.run_id.trim(), self.layout, &run_dir);
        for (program, composition) in &compositions {
            let written = match self.layout {
                NamelistLayout::Combined => {
                    composition.write_combined(&run_dir, &program.filename())
                }
                NamelistLayout::PerBlock => {
                    composition.write_all_namelists(run_dir.join(program.name()))
                }
            }
            .context(format!("Error writing {} namelists", program))?;
            info!("Wrote {} file(s) for {}", written.len(), program);
            manifest.record(*program, written);
        }

        let manifest_path = run_dir.join(MANIFEST_FILE_NAME);
        manifest
            .save(&manifest_path)
            .context(format!("Error writing {}", manifest_path.display()))?;
        info!("Run {} written to {}", manifest.run_id, run_dir.display());
        Ok(manifest)
    }

    /// Values for an external run-script renderer: the resolved
    /// configuration under `config` and each program's rendered namelist
    /// under `namelists`, keyed by file name.
    pub fn get_template_context(&self) -> anyhow::Result<Value> {
        let (compositions, warnings) = self.checked_compositions()?;
        let resolved = Ww3Config {
            components: self.resolved_components()?,
            ..self.clone()
        };

        let mut namelists = Map::new();
        for (program, composition) in &compositions {
            namelists.insert(
                program.filename(),
                Value::String(composition.render_combined()),
            );
        }

        Ok(json!({
            "run_id": self.run_id.trim(),
            "config": serde_json::to_value(&resolved)?,
            "namelists": namelists,
            "warnings": warnings,
        }))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config = serde_saphyr::from_str::<Ww3Config>(content)
            .context("Error parsing YAML configuration")?;
        if let Some(period) = &config.period {
            period.validate()?;
        }
        Ok(config)
    }
}

impl TryFrom<&Path> for Ww3Config {
    type Error = anyhow::Error;

    fn try_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs_err::read_to_string(path)
            .context(format!("Error reading {} to string.", path.display()))?;

        Self::from_yaml_str(&content)
            .context(format!("Error parsing YAML file: {}", path.display()))
    }
}

impl TryFrom<&PathBuf> for Ww3Config {
    type Error = anyhow::Error;

    fn try_from(path: &PathBuf) -> anyhow::Result<Self> {
        Self::try_from(path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BouncComponent, ShelComponent};
    use tempfile::TempDir;
    use ww3nml::{Bound, BoundMode, HomogCount, HomogName, Namelist};

    fn bounc_config() -> Ww3Config {
        Ww3Config::new(Components {
            bounc: Some(BouncComponent {
                bound: Bound {
                    mode: BoundMode::Read,
                    interp: Some(2),
                    verbose: Some(1),
                    file: "spec.list".into(),
                }
                .validated()
                .unwrap(),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_config_is_rejected() {
        let config = Ww3Config::new(Components::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_id_must_be_plain() {
        let mut config = bounc_config();
        config.run_id = "../elsewhere".into();
        assert!(config.validate().is_err());
        config.run_id = "case_01".into();
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_inconsistent_program_fails_validation() {
        let config = Ww3Config::new(Components {
            shel: Some(ShelComponent {
                homog_count: Some(
                    HomogCount::default()
                        .with(HomogName::Wnd, 1)
                        .validated()
                        .unwrap(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("ww3_shel"));
    }

    #[test]
    fn test_generate_combined_layout() {
        let tmp = TempDir::new().unwrap();
        let manifest = bounc_config().generate(tmp.path()).unwrap();

        let run_dir = tmp.path().join("run");
        let text = fs_err::read_to_string(run_dir.join("ww3_bounc.nml")).unwrap();
        assert!(text.starts_with("&BOUND_NML\n"));
        assert!(run_dir.join(MANIFEST_FILE_NAME).exists());
        assert_eq!(manifest.file_count(), 1);
        assert_eq!(manifest.programs[&Program::Bounc].files[0].key, "ww3_bounc.nml");
    }

    #[test]
    fn test_generate_per_block_layout() {
        let tmp = TempDir::new().unwrap();
        let mut config = bounc_config();
        config.layout = NamelistLayout::PerBlock;
        config.generate(tmp.path()).unwrap();
        assert!(tmp.path().join("run/ww3_bounc/bound.nml").exists());
    }

    #[test]
    fn test_template_context_keys() {
        let context = bounc_config().get_template_context().unwrap();
        assert_eq!(context["config"]["run_id"], "run");
        assert_eq!(context["config"]["components"]["bounc"]["bound"]["mode"], "READ");
        let text = context["namelists"]["ww3_bounc.nml"].as_str().unwrap();
        assert!(text.contains("BOUND%FILE = 'spec.list'"));
    }
}
