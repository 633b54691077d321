// ww3nml/src/composition.rs

//! Sets of namelist blocks written together.
//!
//! A [`Composition`] maps file keys (`"domain.nml"`, `"ww3_grid.nml"`) to
//! validated blocks, in insertion order. Cross-block checks come in two
//! strengths:
//!
//! * [`Composition::validate_consistency`] reports contradictions: count
//!   blocks disagreeing with their lists, duplicated groups, conflicting grid
//!   payloads, references to grids that do not exist. Writing refuses to run
//!   while any of these remain.
//! * [`Composition::validate_completeness`] reports absences that are
//!   suspicious but not contradictory, such as a grid without a depth file.
//!   These are advisory.

use crate::blocks::{
    Curv, Domain, ExcludedBodies, ExcludedCount, ExcludedPoints, Forcing, ForcingFile, FromBlock,
    Grid, HomogCount, HomogInputs, InboundCount, InboundPoints, Input, InputGrids, ModelGrids,
    NamelistBlock, OutboundCount, OutboundLines, OutputDate, OutputType, Rect, Run, Smc, Spectrum,
    Timesteps, Unst,
};
use crate::enums::{ForcingChannel, ForcingFlag, GridType, HomogName, OutputKind};
use crate::error::{ConsistencyFinding, Result, Ww3Error};
use crate::fingerprint::{combined_fingerprint, fingerprint};
use linked_hash_map::LinkedHashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// Ordered mapping from file key to an optional block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Composition {
    blocks: LinkedHashMap<String, Option<NamelistBlock>>,
}

/// One file produced by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub key: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub fingerprint: String,
}

/// What a write put on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteManifest {
    pub directory: PathBuf,
    pub files: Vec<WrittenFile>,
}

impl WriteManifest {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// Fingerprint over every written file.
    pub fn fingerprint(&self) -> String {
        combined_fingerprint(self.files.iter().map(|f| f.fingerprint.as_str()))
    }

    /// Append the files of `other`.
    pub fn extend(&mut self, other: WriteManifest) {
        self.files.extend(other.files);
    }
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a composition from `(key, block)` pairs, keeping their order.
    pub fn compose<I, K>(blocks: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<NamelistBlock>)>,
        K: Into<String>,
    {
        let mut composition = Self::new();
        for (key, block) in blocks {
            composition.blocks.insert(key.into(), block);
        }
        composition
    }

    /// One entry per block, keyed by [`NamelistBlock::default_filename`].
    pub fn from_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = NamelistBlock>,
    {
        Self::compose(
            blocks
                .into_iter()
                .map(|block| (block.default_filename(), Some(block))),
        )
    }

    /// Set or replace the block at `key`, returning the previous entry.
    /// A replaced entry keeps its position.
    pub fn insert<K, B>(&mut self, key: K, block: B) -> Option<Option<NamelistBlock>>
    where
        K: Into<String>,
        B: Into<Option<NamelistBlock>>,
    {
        let key = key.into();
        let block = block.into();
        match self.blocks.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, block)),
            None => self.blocks.insert(key, block),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<NamelistBlock>> {
        self.blocks.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&NamelistBlock> {
        self.blocks.get(key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.blocks.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Number of keys, absent entries included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Present blocks in key order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &NamelistBlock)> {
        self.blocks
            .iter()
            .filter_map(|(key, block)| block.as_ref().map(|b| (key.as_str(), b)))
    }

    /// First present block of type `T` and its key.
    pub fn find<T: FromBlock>(&self) -> Option<(&str, &T)> {
        self.present()
            .find_map(|(key, block)| block.downcast::<T>().map(|b| (key, b)))
    }

    /// Every present block of type `T`.
    pub fn find_all<T: FromBlock>(&self) -> Vec<(&str, &T)> {
        self.present()
            .filter_map(|(key, block)| block.downcast::<T>().map(|b| (key, b)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Consistency
    // -------------------------------------------------------------------------

    /// Contradictions between blocks. An empty list means the composition can
    /// be written.
    pub fn validate_consistency(&self) -> Vec<ConsistencyFinding> {
        let mut findings = Vec::new();
        self.check_duplicate_groups(&mut findings);
        self.check_homog_counts(&mut findings);
        self.check_grid_payload(&mut findings);
        self.check_boundary_counts(&mut findings);
        self.check_multi_grid_counts(&mut findings);
        self.check_input_grid_references(&mut findings);
        self.check_prnc_variables(&mut findings);
        findings
    }

    /// Fail with [`Ww3Error::CompositionConsistency`] on any contradiction.
    pub fn ensure_consistent(&self) -> Result<()> {
        let findings = self.validate_consistency();
        if findings.is_empty() {
            Ok(())
        } else {
            Err(Ww3Error::CompositionConsistency(findings))
        }
    }

    fn check_duplicate_groups(&self, findings: &mut Vec<ConsistencyFinding>) {
        let mut seen: LinkedHashMap<&'static str, Vec<&str>> = LinkedHashMap::new();
        for (key, block) in self.present() {
            seen.entry(block.group_name()).or_insert_with(Vec::new).push(key);
        }
        for (group, keys) in seen.iter().filter(|(_, keys)| keys.len() > 1) {
            findings.push(ConsistencyFinding::new(
                keys,
                format!("{} is given {} times", group, keys.len()),
            ));
        }
    }

    fn check_homog_counts(&self, findings: &mut Vec<ConsistencyFinding>) {
        let count = self.find::<HomogCount>();
        let inputs = self.find::<HomogInputs>();

        let mut names: BTreeSet<HomogName> = BTreeSet::new();
        if let Some((_, count)) = count {
            names.extend(count.0.iter().filter(|(_, n)| **n > 0).map(|(name, _)| *name));
        }
        if let Some((_, inputs)) = inputs {
            names.extend(inputs.counts().keys().copied());
        }

        let mut keys: Vec<&str> = Vec::new();
        keys.extend(count.map(|(key, _)| key));
        keys.extend(inputs.map(|(key, _)| key));

        for name in names {
            let declared = count.map(|(_, c)| c.count(name)).unwrap_or(0);
            let given = inputs.map(|(_, i)| i.count(name)).unwrap_or(0);
            if declared != given {
                findings.push(ConsistencyFinding::new(
                    &keys,
                    format!(
                        "HOMOG_COUNT%{} = {} but HOMOG_INPUT_NML has {} {} record(s)",
                        name.count_field(),
                        declared,
                        given,
                        name
                    ),
                ));
            }
        }
    }

    fn payloads(&self) -> Vec<(&str, GridType)> {
        self.present()
            .filter_map(|(key, block)| {
                let kind = match block {
                    NamelistBlock::Rect(_) => GridType::Rect,
                    NamelistBlock::Curv(_) => GridType::Curv,
                    NamelistBlock::Unst(_) => GridType::Unst,
                    NamelistBlock::Smc(_) => GridType::Smc,
                    _ => return None,
                };
                Some((key, kind))
            })
            .collect()
    }

    fn check_grid_payload(&self, findings: &mut Vec<ConsistencyFinding>) {
        let payloads = self.payloads();
        if payloads.len() > 1 {
            let keys: Vec<&str> = payloads.iter().map(|(key, _)| *key).collect();
            let kinds: Vec<String> = payloads.iter().map(|(_, kind)| kind.to_string()).collect();
            findings.push(ConsistencyFinding::new(
                &keys,
                format!(
                    "only one grid payload may be attached, found {}",
                    kinds.join(", ")
                ),
            ));
            return;
        }
        if let (Some((grid_key, grid)), Some((payload_key, kind))) =
            (self.find::<Grid>(), payloads.first())
        {
            if grid.grid_type != *kind {
                findings.push(ConsistencyFinding::new(
                    &[grid_key, *payload_key],
                    format!(
                        "GRID%TYPE is {} but the attached payload is {}",
                        grid.grid_type, kind
                    ),
                ));
            }
        }
    }

    fn check_count<C, L>(
        &self,
        findings: &mut Vec<ConsistencyFinding>,
        declared: impl Fn(&C) -> u32,
        given: impl Fn(&L) -> usize,
        what: &str,
    ) where
        C: FromBlock,
        L: FromBlock,
    {
        let count = self.find::<C>();
        let list = self.find::<L>();
        if count.is_none() && list.is_none() {
            return;
        }
        let n_declared = count.map(|(_, c)| declared(c) as usize).unwrap_or(0);
        let n_given = list.map(|(_, l)| given(l)).unwrap_or(0);
        if n_declared != n_given {
            let mut keys: Vec<&str> = Vec::new();
            keys.extend(count.map(|(key, _)| key));
            keys.extend(list.map(|(key, _)| key));
            findings.push(ConsistencyFinding::new(
                &keys,
                format!(
                    "{} declares {} but {} are listed",
                    what, n_declared, n_given
                ),
            ));
        }
    }

    fn check_boundary_counts(&self, findings: &mut Vec<ConsistencyFinding>) {
        self.check_count::<InboundCount, InboundPoints>(
            findings,
            |c| c.n_point,
            |l| l.0.len(),
            "INBND_COUNT%N_POINT",
        );
        self.check_count::<ExcludedCount, ExcludedPoints>(
            findings,
            |c| c.n_point,
            |l| l.0.len(),
            "EXCL_COUNT%N_POINT",
        );
        self.check_count::<ExcludedCount, ExcludedBodies>(
            findings,
            |c| c.n_body,
            |l| l.0.len(),
            "EXCL_COUNT%N_BODY",
        );
        self.check_count::<OutboundCount, OutboundLines>(
            findings,
            |c| c.n_line,
            |l| l.0.len(),
            "OUTBND_COUNT%N_LINE",
        );
    }

    fn check_multi_grid_counts(&self, findings: &mut Vec<ConsistencyFinding>) {
        let Some((domain_key, domain)) = self.find::<Domain>() else {
            return;
        };
        if let Some(nrgrd) = domain.nrgrd {
            let models = self.find::<ModelGrids>();
            let given = models.map(|(_, m)| m.0.len()).unwrap_or(0);
            if nrgrd as usize != given {
                let mut keys = vec![domain_key];
                keys.extend(models.map(|(key, _)| key));
                findings.push(ConsistencyFinding::new(
                    &keys,
                    format!("DOMAIN%NRGRD = {} but {} model grid(s) are listed", nrgrd, given),
                ));
            }
        }
        if let Some(nrinp) = domain.nrinp {
            let inputs = self.find::<InputGrids>();
            let given = inputs.map(|(_, i)| i.0.len()).unwrap_or(0);
            if nrinp as usize != given {
                let mut keys = vec![domain_key];
                keys.extend(inputs.map(|(key, _)| key));
                findings.push(ConsistencyFinding::new(
                    &keys,
                    format!("DOMAIN%NRINP = {} but {} input grid(s) are listed", nrinp, given),
                ));
            }
        }
    }

    fn check_input_grid_references(&self, findings: &mut Vec<ConsistencyFinding>) {
        let Some((models_key, models)) = self.find::<ModelGrids>() else {
            return;
        };
        let inputs = self.find::<InputGrids>();
        let known: Vec<String> = inputs
            .map(|(_, i)| i.names().iter().map(|n| n.trim().to_lowercase()).collect())
            .unwrap_or_default();

        for model in &models.0 {
            for (channel, source) in model.input_references() {
                if !known.contains(&source.to_lowercase()) {
                    let mut keys = vec![models_key];
                    keys.extend(inputs.map(|(key, _)| key));
                    findings.push(ConsistencyFinding::new(
                        &keys,
                        format!(
                            "model grid {:?} takes {} from unknown input grid {:?}",
                            model.name, channel, source
                        ),
                    ));
                }
            }
        }
    }

    fn check_prnc_variables(&self, findings: &mut Vec<ConsistencyFinding>) {
        let (Some((forcing_key, forcing)), Some((file_key, file))) =
            (self.find::<Forcing>(), self.find::<ForcingFile>())
        else {
            return;
        };
        if let Some(channel) = forcing.field.selected() {
            if channel.is_vector() && file.var.len() < 2 {
                findings.push(ConsistencyFinding::new(
                    &[forcing_key, file_key],
                    format!("{} is a vector field and needs FILE%VAR(2)", channel),
                ));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Completeness
    // -------------------------------------------------------------------------

    /// Advisory warnings about blocks that are probably missing.
    pub fn validate_completeness(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        self.check_homog_coverage(&mut warnings);
        self.check_grid_sections(&mut warnings);
        self.check_output_windows(&mut warnings);
        if let Some((key, forcing)) = self.find::<Forcing>() {
            if forcing.field.selected().is_none() {
                warnings.push(format!("{}: no forcing field is selected", key));
            }
        }
        warnings
    }

    fn check_homog_coverage(&self, warnings: &mut Vec<String>) {
        let Some((input_key, input)) = self.find::<Input>() else {
            return;
        };
        let records = self.find::<HomogInputs>().map(|(_, h)| h);
        for channel in input.channels_with(ForcingFlag::Homogeneous) {
            let Some(name) = channel.homog_name() else {
                continue;
            };
            if records.map(|r| r.count(name)).unwrap_or(0) == 0 {
                warnings.push(format!(
                    "{}: {} is homogeneous but there are no {} records",
                    input_key, channel, name
                ));
            }
        }
        if let Some(records) = records {
            for name in records.counts().keys() {
                let channel = ForcingChannel::iter().find(|c| c.homog_name() == Some(*name));
                if let Some(channel) = channel {
                    if input.flag(channel) != ForcingFlag::Homogeneous {
                        warnings.push(format!(
                            "{}: {} records are given but {} is not flagged H",
                            input_key, name, channel
                        ));
                    }
                }
            }
        }
    }

    fn check_grid_sections(&self, warnings: &mut Vec<String>) {
        let Some((grid_key, grid)) = self.find::<Grid>() else {
            return;
        };
        let mut missing: Vec<&str> = Vec::new();
        if self.find::<Spectrum>().is_none() {
            missing.push("SPECTRUM_NML");
        }
        if self.find::<Run>().is_none() {
            missing.push("RUN_NML");
        }
        if self.find::<Timesteps>().is_none() {
            missing.push("TIMESTEPS_NML");
        }
        let payload_present = match grid.grid_type {
            GridType::Rect => self.find::<Rect>().is_some(),
            GridType::Curv => self.find::<Curv>().is_some(),
            GridType::Unst => self.find::<Unst>().is_some(),
            GridType::Smc => self.find::<Smc>().is_some(),
        };
        let payload_group = match grid.grid_type {
            GridType::Rect => "RECT_NML",
            GridType::Curv => "CURV_NML",
            GridType::Unst => "UNST_NML",
            GridType::Smc => "SMC_NML",
        };
        if !payload_present {
            missing.push(payload_group);
        }
        let needs_depth = matches!(grid.grid_type, GridType::Rect | GridType::Curv);
        if needs_depth && self.find::<crate::blocks::Depth>().is_none() {
            missing.push("DEPTH_NML");
        }
        for group in missing {
            warnings.push(format!("{}: grid {:?} has no {}", grid_key, grid.name, group));
        }
    }

    fn check_output_windows(&self, warnings: &mut Vec<String>) {
        let types = self.find::<OutputType>();
        let dates = self.find::<OutputDate>();

        if let Some((type_key, types)) = types {
            for kind in types.kinds() {
                if dates.and_then(|(_, d)| d.window(kind)).is_none() {
                    warnings.push(format!(
                        "{}: {} output is requested without an output date window",
                        type_key, kind
                    ));
                }
            }
        }

        let Some((date_key, dates)) = dates else {
            return;
        };
        let requested = types.map(|(_, t)| t.kinds()).unwrap_or_default();
        for kind in dates.windows.keys() {
            let needs_type = matches!(
                kind,
                OutputKind::Field
                    | OutputKind::Point
                    | OutputKind::Track
                    | OutputKind::Partition
                    | OutputKind::Coupling
            );
            if needs_type && !requested.contains(kind) {
                warnings.push(format!(
                    "{}: {} window is set but no {} output is requested",
                    date_key, kind, kind
                ));
            }
        }

        if let Some((_, domain)) = self.find::<Domain>() {
            if let (Some(start), Some(stop)) = (&domain.start, &domain.stop) {
                for (kind, window) in &dates.windows {
                    if !window.within(start, stop) {
                        warnings.push(format!(
                            "{}: {} window {}..{} extends past the run {}..{}",
                            date_key, kind, window.start, window.stop, start, stop
                        ));
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Rendering and writing
    // -------------------------------------------------------------------------

    /// Render every present block under its key. No I/O.
    pub fn render_all_namelists(&self) -> LinkedHashMap<String, String> {
        self.present()
            .map(|(key, block)| (key.to_string(), block.render()))
            .collect()
    }

    /// Every present block in key order, as one file.
    pub fn render_combined(&self) -> String {
        self.present()
            .map(|(_, block)| block.render())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write one file per present block into `directory`.
    ///
    /// Consistency is checked and everything is rendered before the first
    /// write. Files are staged in a temporary directory inside `directory`
    /// and renamed into place. If any rename fails, the files already moved
    /// are taken back out and the files they replaced are restored.
    pub fn write_all_namelists<P: AsRef<Path>>(&self, directory: P) -> Result<WriteManifest> {
        self.ensure_consistent()?;
        let files: Vec<(String, String, String)> = self
            .render_all_namelists()
            .into_iter()
            .map(|(key, text)| (key.clone(), key, text))
            .collect();
        write_staged(directory.as_ref(), files)
    }

    /// Write every present block into `directory/filename`.
    pub fn write_combined<P: AsRef<Path>>(
        &self,
        directory: P,
        filename: &str,
    ) -> Result<WriteManifest> {
        self.ensure_consistent()?;
        let text = self.render_combined();
        write_staged(
            directory.as_ref(),
            vec![(filename.to_string(), filename.to_string(), text)],
        )
    }
}

fn ensure_plain_filename(name: &str) -> Result<()> {
    let path = Path::new(name);
    let plain = !name.trim().is_empty()
        && path.file_name().map(|f| f == path.as_os_str()).unwrap_or(false)
        && name != "."
        && name != "..";
    if !plain {
        return Err(Ww3Error::validation(
            "composition",
            &[name],
            "file keys must be plain file names",
        ));
    }
    Ok(())
}

/// `(key, filename, text)` triples written through a staging directory.
///
/// On failure every file already moved into `directory` is removed, files
/// it replaced are restored and a directory created here is removed again.
fn write_staged(directory: &Path, files: Vec<(String, String, String)>) -> Result<WriteManifest> {
    for (_, filename, _) in &files {
        ensure_plain_filename(filename)?;
    }

    let created = !directory.exists();
    fs_err::create_dir_all(directory)?;
    let result = stage_and_promote(directory, files);
    if result.is_err() && created {
        if let Err(err) = fs_err::remove_dir(directory) {
            warn!("Could not remove {}: {}", directory.display(), err);
        }
    }
    result
}

/// A target name touched by [`stage_and_promote`].
struct Promoted {
    target: PathBuf,
    /// Where the file previously at `target` was moved
    previous: Option<PathBuf>,
    placed: bool,
}

fn stage_and_promote(
    directory: &Path,
    files: Vec<(String, String, String)>,
) -> Result<WriteManifest> {
    let staging = tempfile::Builder::new()
        .prefix(".ww3nml-staging-")
        .tempdir_in(directory)?;
    let staged_dir = staging.path().join("new");
    let previous_dir = staging.path().join("previous");
    fs_err::create_dir(&staged_dir)?;
    fs_err::create_dir(&previous_dir)?;

    for (_, filename, text) in &files {
        let staged = staged_dir.join(filename);
        debug!("Staging {}", staged.display());
        fs_err::write(&staged, text)?;
    }

    let mut promoted: Vec<Promoted> = Vec::with_capacity(files.len());
    for (_, filename, _) in &files {
        let target = directory.join(filename);
        let moved = promote(
            &staged_dir.join(filename),
            &target,
            &previous_dir.join(filename),
            &mut promoted,
        );
        if let Err(err) = moved {
            roll_back(promoted);
            return Err(err);
        }
    }

    let mut manifest = WriteManifest {
        directory: directory.to_path_buf(),
        files: Vec::with_capacity(files.len()),
    };
    for ((key, _, text), done) in files.into_iter().zip(promoted) {
        debug!("Wrote {} ({} bytes)", done.target.display(), text.len());
        manifest.files.push(WrittenFile {
            key,
            path: done.target,
            bytes: text.len(),
            fingerprint: fingerprint(text.as_str()),
        });
    }
    staging.close()?;
    Ok(manifest)
}

fn promote(staged: &Path, target: &Path, backup: &Path, promoted: &mut Vec<Promoted>) -> Result<()> {
    let previous = if target.is_file() {
        fs_err::rename(target, backup)?;
        Some(backup.to_path_buf())
    } else {
        None
    };
    promoted.push(Promoted {
        target: target.to_path_buf(),
        previous,
        placed: false,
    });
    fs_err::rename(staged, target)?;
    if let Some(last) = promoted.last_mut() {
        last.placed = true;
    }
    Ok(())
}

fn roll_back(promoted: Vec<Promoted>) {
    for entry in promoted.into_iter().rev() {
        if entry.placed {
            if let Err(err) = fs_err::remove_file(&entry.target) {
                warn!("Could not remove {}: {}", entry.target.display(), err);
            }
        }
        if let Some(previous) = &entry.previous {
            if let Err(err) = fs_err::rename(previous, &entry.target) {
                warn!("Could not restore {}: {}", entry.target.display(), err);
            }
        }
    }
}
