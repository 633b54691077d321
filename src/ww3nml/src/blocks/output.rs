// ww3nml/src/blocks/output.rs

//! Output requests (`OUTPUT_TYPE_NML`) and their date windows
//! (`OUTPUT_DATE_NML`).

use crate::blocks::{Namelist, Validated};
use crate::enums::OutputKind;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{ensure_ordered, stride, Ww3Date};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Whether a block configures one grid (`TYPE`, `DATE`) or every grid of a
/// multi-grid run (`ALLTYPE`, `ALLDATE`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputScope {
    #[default]
    Grid,
    All,
}

impl OutputScope {
    fn type_prefix(self) -> &'static str {
        match self {
            OutputScope::Grid => "TYPE",
            OutputScope::All => "ALLTYPE",
        }
    }

    fn date_prefix(self) -> &'static str {
        match self {
            OutputScope::Grid => "DATE",
            OutputScope::All => "ALLDATE",
        }
    }
}

/// Index box for partition output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputPartition {
    pub x0: u32,
    pub xn: u32,
    pub nx: u32,
    pub y0: u32,
    pub yn: u32,
    pub ny: u32,
    /// Formatted (T) or unformatted (F) file
    pub format: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputType {
    #[serde(default)]
    pub scope: OutputScope,
    /// Gridded field names, e.g. `["HS", "DIR", "FP"]`
    pub field: Option<Vec<String>>,
    /// Point list file
    pub point_file: Option<String>,
    /// Formatted track output
    pub track_format: Option<bool>,
    pub partition: Option<OutputPartition>,
    /// Extra fields written to restart files
    pub restart_extra: Option<Vec<String>>,
    pub coupling_sent: Option<Vec<String>>,
    pub coupling_received: Option<Vec<String>>,
}

impl OutputType {
    /// Output families this block asks for.
    pub fn kinds(&self) -> Vec<OutputKind> {
        let mut kinds = Vec::new();
        if self.field.is_some() {
            kinds.push(OutputKind::Field);
        }
        if self.point_file.is_some() {
            kinds.push(OutputKind::Point);
        }
        if self.track_format.is_some() {
            kinds.push(OutputKind::Track);
        }
        if self.partition.is_some() {
            kinds.push(OutputKind::Partition);
        }
        if self.coupling_sent.is_some() || self.coupling_received.is_some() {
            kinds.push(OutputKind::Coupling);
        }
        kinds
    }

    fn lists(&self) -> [(&'static str, Option<&Vec<String>>); 4] {
        [
            ("FIELD%LIST", self.field.as_ref()),
            ("RESTART%EXTRA", self.restart_extra.as_ref()),
            ("COUPLING%SENT", self.coupling_sent.as_ref()),
            ("COUPLING%RECEIVED", self.coupling_received.as_ref()),
        ]
    }
}

fn validate_token_list(block: &str, field: &str, tokens: &[String]) -> Result<()> {
    if tokens.is_empty() {
        return Err(Ww3Error::validation(block, &[field], "list is empty"));
    }
    let mut seen = HashSet::new();
    for token in tokens {
        if token.trim().is_empty() || token.trim().contains(char::is_whitespace) {
            return Err(Ww3Error::validation(
                block,
                &[field],
                format!("{:?} is not a single field name", token),
            ));
        }
        if !seen.insert(token.trim().to_uppercase()) {
            return Err(Ww3Error::validation(
                block,
                &[field],
                format!("{} is listed twice", token.trim()),
            ));
        }
    }
    Ok(())
}

fn join_tokens(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| t.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Namelist for OutputType {
    const GROUP: &'static str = "OUTPUT_TYPE_NML";

    fn validate(&self) -> Result<()> {
        for (field, list) in self.lists() {
            if let Some(tokens) = list {
                validate_token_list(Self::GROUP, field, tokens)?;
            }
        }
        if let Some(file) = &self.point_file {
            if file.trim().is_empty() {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["POINT%FILE"],
                    "point list file name is empty",
                ));
            }
        }
        if let Some(box_) = &self.partition {
            if box_.x0 > box_.xn || box_.y0 > box_.yn {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["PARTITION%X0", "PARTITION%XN", "PARTITION%Y0", "PARTITION%YN"],
                    format!(
                        "partition box is reversed: x {}..{}, y {}..{}",
                        box_.x0, box_.xn, box_.y0, box_.yn
                    ),
                ));
            }
            if box_.nx < 1 || box_.ny < 1 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["PARTITION%NX", "PARTITION%NY"],
                    "partition increments must be >= 1",
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, self.scope.type_prefix());
        group
            .set_opt("FIELD%LIST", self.field.as_deref().map(join_tokens))
            .set_opt("POINT%FILE", self.point_file.as_ref())
            .set_opt("TRACK%FORMAT", self.track_format);
        if let Some(box_) = &self.partition {
            group
                .set("PARTITION%X0", box_.x0)
                .set("PARTITION%XN", box_.xn)
                .set("PARTITION%NX", box_.nx)
                .set("PARTITION%Y0", box_.y0)
                .set("PARTITION%YN", box_.yn)
                .set("PARTITION%NY", box_.ny)
                .set_opt("PARTITION%FORMAT", box_.format);
        }
        group
            .set_opt("RESTART%EXTRA", self.restart_extra.as_deref().map(join_tokens))
            .set_opt("COUPLING%SENT", self.coupling_sent.as_deref().map(join_tokens))
            .set_opt(
                "COUPLING%RECEIVED",
                self.coupling_received.as_deref().map(join_tokens),
            );
        group
    }
}

impl Validated<OutputType> {
    /// The same block addressed to `scope`. Validation does not depend on
    /// the scope.
    pub fn scoped(&self, scope: OutputScope) -> Self {
        Validated(OutputType {
            scope,
            ..self.inner().clone()
        })
    }
}

/// `start`, `stride` (seconds) and `stop` of one output family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputWindow {
    pub start: Ww3Date,
    #[serde(with = "stride")]
    pub stride: u64,
    pub stop: Ww3Date,
}

impl OutputWindow {
    pub fn new(start: Ww3Date, stride: u64, stop: Ww3Date) -> Self {
        Self {
            start,
            stride,
            stop,
        }
    }

    /// Whether the window lies within `start..=stop`.
    pub fn within(&self, start: &Ww3Date, stop: &Ww3Date) -> bool {
        self.start >= *start && self.stop <= *stop
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDate {
    #[serde(default)]
    pub scope: OutputScope,
    #[serde(default)]
    pub windows: BTreeMap<OutputKind, OutputWindow>,
}

impl OutputDate {
    pub fn with(mut self, kind: OutputKind, window: OutputWindow) -> Self {
        self.windows.insert(kind, window);
        self
    }

    pub fn window(&self, kind: OutputKind) -> Option<&OutputWindow> {
        self.windows.get(&kind)
    }
}

impl Namelist for OutputDate {
    const GROUP: &'static str = "OUTPUT_DATE_NML";

    fn validate(&self) -> Result<()> {
        for (kind, window) in &self.windows {
            let start = format!("{}%START", kind);
            let stop = format!("{}%STOP", kind);
            // a window may hold a single output time
            if window.start != window.stop {
                ensure_ordered(Self::GROUP, &start, &stop, &window.start, &window.stop)?;
            }
            if window.stride == 0 {
                let field = format!("{}%STRIDE", kind);
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &[field.as_str()],
                    "stride must be > 0",
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, self.scope.date_prefix());
        for (kind, window) in &self.windows {
            group
                .set(&format!("{}%START", kind), window.start)
                .set(&format!("{}%STRIDE", kind), window.stride.to_string())
                .set(&format!("{}%STOP", kind), window.stop);
        }
        group
    }
}

impl Validated<OutputDate> {
    /// The same block addressed to `scope`. Validation does not depend on
    /// the scope.
    pub fn scoped(&self, scope: OutputScope) -> Self {
        Validated(OutputDate {
            scope,
            ..self.inner().clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Ww3Date {
        s.parse().unwrap()
    }

    #[test]
    fn test_output_type_render() {
        let output = OutputType {
            field: Some(vec!["HS".into(), "DIR".into(), "FP".into()]),
            point_file: Some("points.list".into()),
            track_format: Some(false),
            ..Default::default()
        };
        output.validate().unwrap();
        assert_eq!(
            output.render(),
            "&OUTPUT_TYPE_NML\nTYPE%FIELD%LIST = 'HS DIR FP'\nTYPE%POINT%FILE = 'points.list'\nTYPE%TRACK%FORMAT = F\n/\n"
        );
        assert_eq!(
            output.kinds(),
            vec![OutputKind::Field, OutputKind::Point, OutputKind::Track]
        );
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let output = OutputType {
            field: Some(vec!["HS".into(), "hs".into()]),
            ..Default::default()
        };
        let msg = output.validate().unwrap_err().to_string();
        assert!(msg.contains("FIELD%LIST"));
        let blank = OutputType {
            field: Some(vec!["HS DIR".into()]),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_partition_box_must_be_ordered() {
        let mut output = OutputType {
            partition: Some(OutputPartition {
                x0: 10,
                xn: 1,
                nx: 1,
                y0: 1,
                yn: 10,
                ny: 1,
                format: None,
            }),
            ..Default::default()
        };
        assert!(output.validate().is_err());
        if let Some(p) = output.partition.as_mut() {
            p.xn = 20;
        }
        output.validate().unwrap();
        assert!(output.render().contains("TYPE%PARTITION%XN = 20"));
    }

    #[test]
    fn test_all_scope_prefixes() {
        let output = OutputType {
            scope: OutputScope::All,
            field: Some(vec!["HS".into()]),
            ..Default::default()
        };
        assert!(output.render().contains("ALLTYPE%FIELD%LIST = 'HS'"));

        let dates = OutputDate {
            scope: OutputScope::All,
            ..Default::default()
        }
        .with(
            OutputKind::Field,
            OutputWindow::new(date("20230101 000000"), 3600, date("20230102 000000")),
        );
        assert!(dates.render().contains("ALLDATE%FIELD%START = '20230101 000000'"));

        let grid = dates.validated().unwrap().scoped(OutputScope::Grid);
        assert!(grid.render().starts_with("&OUTPUT_DATE_NML\nDATE%FIELD%START"));
        let all = OutputType::default().validated().unwrap().scoped(OutputScope::All);
        assert_eq!(all.scope, OutputScope::All);
    }

    #[test]
    fn test_output_date_render_order_and_stride() {
        let window = OutputWindow::new(date("20230101 000000"), 3600, date("20230102 000000"));
        let dates = OutputDate::default()
            .with(OutputKind::Restart, window)
            .with(OutputKind::Field, window);
        dates.validate().unwrap();
        let text = dates.render();
        assert!(text.contains("DATE%FIELD%STRIDE = '3600'"));
        assert!(text.find("DATE%FIELD").unwrap() < text.find("DATE%RESTART").unwrap());
    }

    #[test]
    fn test_output_date_rules() {
        let reversed = OutputDate::default().with(
            OutputKind::Point,
            OutputWindow::new(date("20230102 000000"), 600, date("20230101 000000")),
        );
        assert!(reversed.validate().is_err());

        let single = OutputDate::default().with(
            OutputKind::Point,
            OutputWindow::new(date("20230101 000000"), 600, date("20230101 000000")),
        );
        assert!(single.validate().is_ok());

        let zero = OutputDate::default().with(
            OutputKind::Point,
            OutputWindow::new(date("20230101 000000"), 0, date("20230102 000000")),
        );
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_window_deserializes_duration_strides() {
        let window: OutputWindow = serde_json::from_str(
            r#"{"start": "2023-01-01 00:00:00", "stride": "1h", "stop": "20230102 000000"}"#,
        )
        .unwrap();
        assert_eq!(window.stride, 3600);
        assert!(serde_json::from_str::<OutputWindow>(
            r#"{"start": "20230101 000000", "stride": 0, "stop": "20230102 000000"}"#
        )
        .is_err());
    }
}
