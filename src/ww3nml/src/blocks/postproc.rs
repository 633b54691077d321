// ww3nml/src/blocks/postproc.rs

//! Blocks read by the boundary preprocessor and the output postprocessors
//! (`ww3_bounc`, `ww3_ounf`, `ww3_ounp`, `ww3_trnc`).

use crate::blocks::Namelist;
use crate::enums::{BoundMode, NetcdfVersion};
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{count, ensure_not_blank, ensure_positive, stride, Ww3Date};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Accepted `TIMESPLIT` values: none, year, month, day, hour.
pub const TIMESPLITS: [u8; 5] = [0, 4, 6, 8, 10];

// -----------------------------------------------------------------------------
// Shared time selection
// -----------------------------------------------------------------------------

/// `TIMESTART`, `TIMESTRIDE`, `TIMECOUNT` and `TIMESPLIT` of a postprocessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub timestart: Option<Ww3Date>,
    #[serde(default, with = "stride::option")]
    pub timestride: Option<u64>,
    #[serde(default, with = "count::option")]
    pub timecount: Option<u64>,
    pub timesplit: Option<u8>,
}

impl TimeSeries {
    fn validate_in(&self, block: &str) -> Result<()> {
        if self.timestride == Some(0) {
            return Err(Ww3Error::validation(
                block,
                &["TIMESTRIDE"],
                "stride must be > 0",
            ));
        }
        if self.timecount == Some(0) {
            return Err(Ww3Error::validation(
                block,
                &["TIMECOUNT"],
                "count must be > 0",
            ));
        }
        if let Some(split) = self.timesplit {
            if !TIMESPLITS.contains(&split) {
                return Err(Ww3Error::validation(
                    block,
                    &["TIMESPLIT"],
                    format!("timesplit must be one of {:?}, got {}", TIMESPLITS, split),
                ));
            }
        }
        Ok(())
    }

    fn push_into(&self, group: &mut NamelistGroup) {
        group
            .set_opt("TIMESTART", self.timestart)
            .set_opt("TIMESTRIDE", self.timestride.map(|s| s.to_string()))
            .set_opt("TIMECOUNT", self.timecount.map(|c| c.to_string()))
            .set_opt("TIMESPLIT", self.timesplit);
    }
}

fn ensure_in_range(block: &str, field: &str, value: u8, lo: u8, hi: u8) -> Result<()> {
    if value < lo || value > hi {
        return Err(Ww3Error::validation(
            block,
            &[field],
            format!("{} must lie in {}..={}, got {}", field, lo, hi, value),
        ));
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// ww3_bounc
// -----------------------------------------------------------------------------

/// `BOUND_NML`: conversion between spectral boundary files and `nest.ww3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bound {
    pub mode: BoundMode,
    /// 1 nearest point, 2 linear interpolation
    pub interp: Option<u8>,
    pub verbose: Option<u8>,
    /// Text file listing the spectral files to read
    pub file: String,
}

impl Namelist for Bound {
    const GROUP: &'static str = "BOUND_NML";

    fn validate(&self) -> Result<()> {
        if let Some(interp) = self.interp {
            ensure_in_range(Self::GROUP, "INTERP", interp, 1, 2)?;
        }
        if let Some(verbose) = self.verbose {
            ensure_in_range(Self::GROUP, "VERBOSE", verbose, 0, 2)?;
        }
        ensure_not_blank(Self::GROUP, "FILE", &self.file)
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "BOUND");
        group
            .set("MODE", self.mode)
            .set_opt("INTERP", self.interp)
            .set_opt("VERBOSE", self.verbose)
            .set("FILE", &self.file);
        group
    }
}

// -----------------------------------------------------------------------------
// ww3_ounf
// -----------------------------------------------------------------------------

/// `FIELD_NML`: gridded fields written to NetCDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(flatten)]
    pub times: TimeSeries,
    pub list: Vec<String>,
    /// Partition indices for partitioned parameters
    pub partition: Option<Vec<u32>>,
    pub samefile: Option<bool>,
    /// 2 real, 3 short, 4 short with scaling
    #[serde(rename = "type")]
    pub output_type: Option<u8>,
}

impl Field {
    pub fn new(list: Vec<String>) -> Self {
        Self {
            times: TimeSeries::default(),
            list,
            partition: None,
            samefile: None,
            output_type: None,
        }
    }
}

impl Namelist for Field {
    const GROUP: &'static str = "FIELD_NML";

    fn validate(&self) -> Result<()> {
        self.times.validate_in(Self::GROUP)?;
        if self.list.is_empty() {
            return Err(Ww3Error::validation(Self::GROUP, &["LIST"], "field list is empty"));
        }
        let mut seen = HashSet::new();
        for name in &self.list {
            ensure_not_blank(Self::GROUP, "LIST", name)?;
            if !seen.insert(name.trim().to_uppercase()) {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["LIST"],
                    format!("{} is listed twice", name.trim()),
                ));
            }
        }
        if let Some(kind) = self.output_type {
            ensure_in_range(Self::GROUP, "TYPE", kind, 2, 4)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "FIELD");
        self.times.push_into(&mut group);
        let list: Vec<&str> = self.list.iter().map(|s| s.trim()).collect();
        group.set("LIST", list.join(" "));
        group
            .set_opt(
                "PARTITION",
                self.partition.as_ref().map(|p| {
                    p.iter().map(u32::to_string).collect::<Vec<_>>().join(" ")
                }),
            )
            .set_opt("SAMEFILE", self.samefile)
            .set_opt("TYPE", self.output_type);
        group
    }
}

/// `FILE_NML` of the output postprocessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFile {
    pub prefix: Option<String>,
    pub netcdf: Option<NetcdfVersion>,
    pub ix0: Option<u32>,
    pub ixn: Option<u32>,
    pub iy0: Option<u32>,
    pub iyn: Option<u32>,
}

impl Namelist for OutputFile {
    const GROUP: &'static str = "FILE_NML";

    fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            ensure_not_blank(Self::GROUP, "PREFIX", prefix)?;
        }
        for (lo_field, lo, hi_field, hi) in [
            ("IX0", self.ix0, "IXN", self.ixn),
            ("IY0", self.iy0, "IYN", self.iyn),
        ] {
            for (field, value) in [(lo_field, lo), (hi_field, hi)] {
                if value == Some(0) {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &[field],
                        "grid indices start at 1",
                    ));
                }
            }
            if let (Some(lo), Some(hi)) = (lo, hi) {
                if lo > hi {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &[lo_field, hi_field],
                        format!("{} ({}) must be <= {} ({})", lo_field, lo, hi_field, hi),
                    ));
                }
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "FILE");
        group
            .set_opt("PREFIX", self.prefix.as_ref())
            .set_opt("NETCDF", self.netcdf)
            .set_opt("IX0", self.ix0)
            .set_opt("IXN", self.ixn)
            .set_opt("IY0", self.iy0)
            .set_opt("IYN", self.iyn);
        group
    }
}

// -----------------------------------------------------------------------------
// ww3_ounp
// -----------------------------------------------------------------------------

/// Point selection: every point or explicit 1-based indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointList {
    All(AllPoints),
    Indices(Vec<u32>),
}

/// The literal `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllPoints {
    All,
}

impl Default for PointList {
    fn default() -> Self {
        PointList::All(AllPoints::All)
    }
}

impl PointList {
    fn token(&self) -> String {
        match self {
            PointList::All(_) => "all".to_string(),
            PointList::Indices(indices) => indices
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// `POINT_NML`: spectral point output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(flatten)]
    pub times: TimeSeries,
    #[serde(default)]
    pub list: PointList,
    pub samefile: Option<bool>,
    pub buffer: Option<u32>,
    /// 0 inventory, 1 spectra, 2 mean parameters, 3 source terms, 4 wind-wave
    #[serde(rename = "type")]
    pub output_type: Option<u8>,
    /// Station dimension first
    pub dimorder: Option<bool>,
}

impl Namelist for Point {
    const GROUP: &'static str = "POINT_NML";

    fn validate(&self) -> Result<()> {
        self.times.validate_in(Self::GROUP)?;
        if let PointList::Indices(indices) = &self.list {
            if indices.is_empty() {
                return Err(Ww3Error::validation(Self::GROUP, &["LIST"], "point list is empty"));
            }
            if indices.contains(&0) {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["LIST"],
                    "point indices start at 1",
                ));
            }
        }
        if self.buffer == Some(0) {
            return Err(Ww3Error::validation(Self::GROUP, &["BUFFER"], "buffer must be > 0"));
        }
        if let Some(kind) = self.output_type {
            ensure_in_range(Self::GROUP, "TYPE", kind, 0, 4)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "POINT");
        self.times.push_into(&mut group);
        group
            .set("LIST", self.list.token())
            .set_opt("SAMEFILE", self.samefile)
            .set_opt("BUFFER", self.buffer)
            .set_opt("TYPE", self.output_type)
            .set_opt("DIMORDER", self.dimorder);
        group
    }
}

/// `SPECTRA_NML`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spectra {
    /// 1 print plots, 2 table of 1-D spectra, 3 transfer file, 4 NetCDF
    pub output: Option<u8>,
    pub scale_fac: Option<f64>,
    pub output_fac: Option<f64>,
}

impl Namelist for Spectra {
    const GROUP: &'static str = "SPECTRA_NML";

    fn validate(&self) -> Result<()> {
        if let Some(output) = self.output {
            ensure_in_range(Self::GROUP, "OUTPUT", output, 1, 4)?;
        }
        if let Some(fac) = self.scale_fac {
            // negative factors ask WW3 for a per-spectrum scale
            if fac == 0.0 || !fac.is_finite() {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["SCALE_FAC"],
                    "scale factor must be non-zero",
                ));
            }
        }
        if let Some(fac) = self.output_fac {
            ensure_positive(Self::GROUP, "OUTPUT_FAC", fac)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "SPECTRA");
        group
            .set_opt("OUTPUT", self.output)
            .set_opt("SCALE_FAC", self.scale_fac)
            .set_opt("OUTPUT_FAC", self.output_fac);
        group
    }
}

/// `PARAM_NML`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Param {
    /// 1 print plots, 2 table, 3 transfer file, 4 NetCDF
    pub output: Option<u8>,
}

impl Namelist for Param {
    const GROUP: &'static str = "PARAM_NML";

    fn validate(&self) -> Result<()> {
        if let Some(output) = self.output {
            ensure_in_range(Self::GROUP, "OUTPUT", output, 1, 4)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "PARAM");
        group.set_opt("OUTPUT", self.output);
        group
    }
}

/// `SOURCE_NML`: source term output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub output: Option<u8>,
    pub scale_fac: Option<f64>,
    pub output_fac: Option<f64>,
    pub table_fac: Option<u8>,
    pub spectrum: Option<bool>,
    pub input: Option<bool>,
    pub interactions: Option<bool>,
    pub dissipation: Option<bool>,
    pub bottom: Option<bool>,
    pub ice: Option<bool>,
    pub total: Option<bool>,
}

impl Source {
    fn terms(&self) -> [(&'static str, Option<bool>); 7] {
        [
            ("SPECTRUM", self.spectrum),
            ("INPUT", self.input),
            ("INTERACTIONS", self.interactions),
            ("DISSIPATION", self.dissipation),
            ("BOTTOM", self.bottom),
            ("ICE", self.ice),
            ("TOTAL", self.total),
        ]
    }
}

impl Namelist for Source {
    const GROUP: &'static str = "SOURCE_NML";

    fn validate(&self) -> Result<()> {
        if let Some(output) = self.output {
            ensure_in_range(Self::GROUP, "OUTPUT", output, 1, 4)?;
        }
        if let Some(table) = self.table_fac {
            ensure_in_range(Self::GROUP, "TABLE_FAC", table, 0, 4)?;
        }
        if let Some(fac) = self.output_fac {
            ensure_positive(Self::GROUP, "OUTPUT_FAC", fac)?;
        }
        if !self.terms().iter().any(|(_, on)| *on == Some(true)) {
            let fields: Vec<&str> = self.terms().iter().map(|(name, _)| *name).collect();
            return Err(Ww3Error::validation(
                Self::GROUP,
                &fields,
                "at least one source term must be selected",
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "SOURCE");
        group
            .set_opt("OUTPUT", self.output)
            .set_opt("SCALE_FAC", self.scale_fac)
            .set_opt("OUTPUT_FAC", self.output_fac)
            .set_opt("TABLE_FAC", self.table_fac);
        for (name, on) in self.terms() {
            group.set_opt(name, on);
        }
        group
    }
}

// -----------------------------------------------------------------------------
// ww3_trnc
// -----------------------------------------------------------------------------

/// `TRACK_NML`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    pub times: TimeSeries,
}

impl Namelist for Track {
    const GROUP: &'static str = "TRACK_NML";

    fn validate(&self) -> Result<()> {
        self.times.validate_in(Self::GROUP)
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "TRACK");
        self.times.push_into(&mut group);
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_rules() {
        let bound = Bound {
            mode: BoundMode::Write,
            interp: Some(2),
            verbose: Some(1),
            file: "spec.list".into(),
        };
        bound.validate().unwrap();
        assert_eq!(
            bound.render(),
            "&BOUND_NML\nBOUND%MODE = 'WRITE'\nBOUND%INTERP = 2\nBOUND%VERBOSE = 1\nBOUND%FILE = 'spec.list'\n/\n"
        );
        assert!(Bound { interp: Some(3), ..bound.clone() }.validate().is_err());
        assert!(Bound { verbose: Some(3), ..bound.clone() }.validate().is_err());
        assert!(Bound { file: " ".into(), ..bound }.validate().is_err());
    }

    #[test]
    fn test_field_render() {
        let mut field = Field::new(vec!["HS".into(), "DIR".into()]);
        field.times = TimeSeries {
            timestart: Some("20230101 000000".parse().unwrap()),
            timestride: Some(3600),
            timecount: Some(24),
            timesplit: Some(6),
        };
        field.output_type = Some(3);
        field.validate().unwrap();
        let text = field.render();
        assert!(text.contains("FIELD%TIMESTART = '20230101 000000'"));
        assert!(text.contains("FIELD%TIMESTRIDE = '3600'"));
        assert!(text.contains("FIELD%TIMECOUNT = '24'"));
        assert!(text.contains("FIELD%TIMESPLIT = 6"));
        assert!(text.contains("FIELD%LIST = 'HS DIR'"));
        assert!(text.contains("FIELD%TYPE = 3"));
    }

    #[test]
    fn test_field_rules() {
        let field = Field::new(vec!["HS".into()]);
        assert!(Field::new(vec![]).validate().is_err());
        assert!(Field::new(vec!["HS".into(), "hs".into()]).validate().is_err());

        let mut bad = field.clone();
        bad.times.timesplit = Some(5);
        assert!(bad.validate().is_err());
        let mut bad = field.clone();
        bad.times.timestride = Some(0);
        assert!(bad.validate().is_err());
        let mut bad = field;
        bad.output_type = Some(1);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_field_deserialize_flattened_times() {
        let field: Field = serde_json::from_str(
            r#"{"timestart": "2023-01-01 00:00:00", "timestride": "30m", "list": ["HS"], "type": 4}"#,
        )
        .unwrap();
        assert_eq!(field.times.timestride, Some(1800));
        assert_eq!(field.output_type, Some(4));
    }

    #[test]
    fn test_field_deserialize_numeric_string_count() {
        let field: Field =
            serde_json::from_str(r#"{"list": ["HS"], "timecount": "24"}"#).unwrap();
        assert_eq!(field.times.timecount, Some(24));
        let field: Field = serde_json::from_str(r#"{"list": ["HS"], "timecount": 12}"#).unwrap();
        assert_eq!(field.times.timecount, Some(12));

        assert!(serde_json::from_str::<Field>(r#"{"list": ["HS"], "timecount": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Field>(r#"{"list": ["HS"], "timecount": "0"}"#).is_err());
    }

    #[test]
    fn test_output_file_index_box() {
        let file = OutputFile {
            prefix: Some("ww3.".into()),
            netcdf: Some(NetcdfVersion::Netcdf4),
            ix0: Some(1),
            ixn: Some(100),
            ..Default::default()
        };
        file.validate().unwrap();
        assert!(file.render().contains("FILE%NETCDF = 4"));
        assert!(OutputFile { ix0: Some(101), ..file.clone() }.validate().is_err());
        assert!(OutputFile { iy0: Some(0), ..file }.validate().is_err());
    }

    #[test]
    fn test_point_list_forms() {
        let all: Point = serde_json::from_str(r#"{"list": "all"}"#).unwrap();
        assert!(all.render().contains("POINT%LIST = 'all'"));

        let some: Point = serde_json::from_str(r#"{"list": [1, 3, 5], "buffer": 150}"#).unwrap();
        some.validate().unwrap();
        assert!(some.render().contains("POINT%LIST = '1 3 5'"));

        let zero = Point {
            list: PointList::Indices(vec![0]),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        assert!(Point { buffer: Some(0), ..Default::default() }.validate().is_err());
        assert!(Point { output_type: Some(5), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_source_needs_a_term() {
        assert!(Source::default().validate().is_err());
        let source = Source {
            output: Some(4),
            input: Some(true),
            total: Some(false),
            ..Default::default()
        };
        source.validate().unwrap();
        let text = source.render();
        assert!(text.contains("SOURCE%INPUT = T"));
        assert!(text.contains("SOURCE%TOTAL = F"));
    }

    #[test]
    fn test_track_and_params() {
        let track = Track {
            times: TimeSeries {
                timestart: Some("20230101 000000".parse().unwrap()),
                timestride: Some(600),
                ..Default::default()
            },
        };
        track.validate().unwrap();
        assert!(track.render().contains("TRACK%TIMESTRIDE = '600'"));
        assert!(Param { output: Some(0) }.validate().is_err());
        assert!(Spectra { scale_fac: Some(0.0), ..Default::default() }.validate().is_err());
        assert!(Spectra { output: Some(3), scale_fac: Some(-1.0), output_fac: None }
            .validate()
            .is_ok());
    }
}
