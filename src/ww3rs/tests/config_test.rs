// ww3rs/tests/config_test.rs

use std::fs;
use tempfile::TempDir;
use ww3rs::config::{NamelistLayout, RunManifest, Ww3Config};
use ww3rs::constants::MANIFEST_FILE_NAME;
use ww3rs::Program;

const CONFIG: &str = r#"
run_id: glob_2023
period:
  start: "2023-01-01 00:00:00"
  end: "20230103 000000"
  interval: 3h
components:
  grid:
    spectrum:
      xfr: 1.1
      freq1: 0.04118
      nk: 32
      nth: 24
    run:
      flcx: true
      flcy: true
    timesteps:
      dtmax: 900.0
      dtxy: 300.0
      dtkth: 450.0
      dtmin: 15.0
    grid:
      name: GLOBAL 1 DEG
      type: RECT
      coord: SPHE
      clos: SMPL
      zlim: -0.1
      dmin: 2.5
    payload:
      rect:
        nx: 360
        ny: 161
        sx: 1.0
        sy: 1.0
        x0: 0.0
        y0: -80.0
    depth:
      filename: glob.depth
      sf: -0.001
  shel:
    input:
      forcing:
        WINDS: T
        ICE_CONC: T
    output_type:
      field: [HS, DIR, FP]
"#;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("ww3-config.yml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_and_validate() {
    let tmp = TempDir::new().unwrap();
    let config = Ww3Config::try_from(write_config(&tmp, CONFIG).as_path()).unwrap();

    assert_eq!(config.run_id, "glob_2023");
    assert_eq!(config.layout, NamelistLayout::Combined);
    assert_eq!(config.period.unwrap().interval, Some(10800));
    assert_eq!(
        config.components.programs(),
        vec![Program::Grid, Program::Shel]
    );
    assert!(config.validate().unwrap().is_empty());
}

#[test]
fn test_generate_writes_programs_and_manifest() {
    let tmp = TempDir::new().unwrap();
    let config = Ww3Config::try_from(write_config(&tmp, CONFIG).as_path()).unwrap();
    let out = tmp.path().join("runs");
    let manifest = config.generate(&out).unwrap();

    let run_dir = out.join("glob_2023");
    let grid = fs::read_to_string(run_dir.join("ww3_grid.nml")).unwrap();
    assert!(grid.starts_with("&SPECTRUM_NML\n"));
    assert!(grid.contains("GRID%NAME = 'GLOBAL 1 DEG'"));
    assert!(grid.contains("GRID%CLOS = 'SMPL'"));
    assert!(grid.contains("&RECT_NML\n"));
    assert!(grid.contains("&DEPTH_NML\n"));

    let shel = fs::read_to_string(run_dir.join("ww3_shel.nml")).unwrap();
    assert!(shel.contains("DOMAIN%START = '20230101 000000'"));
    assert!(shel.contains("DOMAIN%STOP = '20230103 000000'"));
    assert!(shel.contains("INPUT%FORCING%WINDS = 'T'"));
    assert!(shel.contains("DATE%FIELD%STRIDE = '10800'"));

    let saved = RunManifest::load(&run_dir.join(MANIFEST_FILE_NAME)).unwrap();
    assert_eq!(saved, manifest);
    assert_eq!(saved.file_count(), 2);
}

#[test]
fn test_template_context() {
    let tmp = TempDir::new().unwrap();
    let config = Ww3Config::try_from(write_config(&tmp, CONFIG).as_path()).unwrap();
    let context = config.get_template_context().unwrap();

    assert_eq!(context["run_id"], "glob_2023");
    assert_eq!(
        context["config"]["components"]["shel"]["domain"]["start"],
        "20230101 000000"
    );
    let namelists = context["namelists"].as_object().unwrap();
    assert_eq!(namelists.len(), 2);
    assert!(namelists["ww3_shel.nml"]
        .as_str()
        .unwrap()
        .starts_with("&DOMAIN_NML\n"));
}

#[test]
fn test_invalid_block_is_rejected_on_load() {
    let tmp = TempDir::new().unwrap();
    let bad = CONFIG.replace("dtmin: 15.0", "dtmin: 1.0");
    let err = Ww3Config::try_from(write_config(&tmp, &bad).as_path()).unwrap_err();
    assert!(format!("{:#}", err).contains("DTMIN"));
}

#[test]
fn test_inconsistent_program_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let content = format!("{}    homog_count:\n      WND: 2\n", CONFIG);
    let config = Ww3Config::try_from(write_config(&tmp, &content).as_path()).unwrap();
    let out = tmp.path().join("runs");
    assert!(config.generate(&out).is_err());
    assert!(!out.join("glob_2023").join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_multi_output_uses_all_grid_scope() {
    let tmp = TempDir::new().unwrap();
    let content = r#"
run_id: mosaic
period:
  start: "20230101 000000"
  end: "20230102 000000"
  interval: 1h
components:
  multi:
    output_type:
      scope: grid
      field: [HS, DIR]
"#;
    let config = Ww3Config::try_from(write_config(&tmp, content).as_path()).unwrap();
    let out = tmp.path().join("runs");
    config.generate(&out).unwrap();

    let multi = fs::read_to_string(out.join("mosaic").join("ww3_multi.nml")).unwrap();
    assert!(multi.contains("ALLTYPE%FIELD%LIST = 'HS DIR'"));
    assert!(multi.contains("ALLDATE%FIELD%STRIDE = '3600'"));
    assert!(!multi.contains("\nTYPE%"));
    assert!(!multi.contains("\nDATE%"));
}

#[test]
fn test_missing_config_file() {
    let tmp = TempDir::new().unwrap();
    let result = ww3rs::cli::check_config(&tmp.path().join("missing.yml"));
    assert!(result.is_err());
}
