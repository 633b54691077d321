// ww3nml/src/blocks/prnc.rs

//! Forcing preprocessor blocks (`ww3_prnc.nml`).

use crate::blocks::Namelist;
use crate::enums::ForcingChannel;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{ensure_not_blank, ensure_ordered, Ww3Date};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    static ref TIME_SHIFT: Regex = Regex::new(r"^[0-9]{8} [0-9]{6}$").unwrap();
}

/// Field selector of the forcing preprocessor: one channel per run.
///
/// Channels missing from the map read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForcingField(pub BTreeMap<ForcingChannel, bool>);

impl ForcingField {
    /// Selector with only `channel` switched on.
    pub fn only(channel: ForcingChannel) -> Self {
        ForcingField(BTreeMap::from([(channel, true)]))
    }

    pub fn is_set(&self, channel: ForcingChannel) -> bool {
        self.0.get(&channel).copied().unwrap_or(false)
    }

    fn active(&self) -> Vec<ForcingChannel> {
        self.0
            .iter()
            .filter(|(_, on)| **on)
            .map(|(channel, _)| *channel)
            .collect()
    }

    /// The selected channel, if exactly one is on.
    pub fn selected(&self) -> Option<ForcingChannel> {
        match self.active().as_slice() {
            [channel] => Some(*channel),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let active = self.active();
        if active.len() > 1 {
            let fields: Vec<String> = active.iter().map(|c| format!("FIELD%{}", c)).collect();
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            return Err(Ww3Error::validation(
                Forcing::GROUP,
                &fields,
                format!(
                    "only one forcing field may be True, got {}",
                    active
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }
        Ok(())
    }
}

/// `FORCING_NML`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Forcing {
    pub timestart: Option<Ww3Date>,
    pub timestop: Option<Ww3Date>,
    #[serde(default)]
    pub field: ForcingField,
    /// Keep the input grid instead of interpolating onto the model grid
    pub grid_asis: Option<bool>,
    pub grid_latlon: Option<bool>,
    /// Tidal constituents to analyse, e.g. `"M2 S2 N2"`
    pub tidal: Option<String>,
}

impl Namelist for Forcing {
    const GROUP: &'static str = "FORCING_NML";

    fn validate(&self) -> Result<()> {
        self.field.validate()?;
        if let (Some(start), Some(stop)) = (&self.timestart, &self.timestop) {
            ensure_ordered(Self::GROUP, "TIMESTART", "TIMESTOP", start, stop)?;
        }
        if let Some(tidal) = &self.tidal {
            ensure_not_blank(Self::GROUP, "TIDAL", tidal)?;
            let tidal_field = matches!(
                self.field.selected(),
                Some(ForcingChannel::WaterLevels | ForcingChannel::Currents)
            );
            if !tidal_field {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["TIDAL"],
                    "tidal analysis needs WATER_LEVELS or CURRENTS as the forcing field",
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "FORCING");
        group
            .set_opt("TIMESTART", self.timestart)
            .set_opt("TIMESTOP", self.timestop);
        for (channel, on) in &self.field.0 {
            group.set(&format!("FIELD%{}", channel), *on);
        }
        group
            .set_opt("GRID%ASIS", self.grid_asis)
            .set_opt("GRID%LATLON", self.grid_latlon)
            .set_opt("TIDAL", self.tidal.as_ref());
        group
    }
}

/// `FILE_NML` of the forcing preprocessor: the NetCDF file to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForcingFile {
    pub filename: String,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    /// Variable names, one per component
    pub var: Vec<String>,
    /// Shift applied to file times, `YYYYMMDD HHMMSS`
    pub timeshift: Option<String>,
}

impl ForcingFile {
    pub fn new<S: Into<String>>(filename: S, var: Vec<String>) -> Self {
        Self {
            filename: filename.into(),
            longitude: None,
            latitude: None,
            var,
            timeshift: None,
        }
    }
}

impl Namelist for ForcingFile {
    const GROUP: &'static str = "FILE_NML";

    fn validate(&self) -> Result<()> {
        ensure_not_blank(Self::GROUP, "FILENAME", &self.filename)?;
        for (field, value) in [("LONGITUDE", &self.longitude), ("LATITUDE", &self.latitude)] {
            if let Some(value) = value {
                ensure_not_blank(Self::GROUP, field, value)?;
            }
        }
        if self.var.is_empty() || self.var.len() > 3 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["VAR"],
                format!("expected 1 to 3 variable names, got {}", self.var.len()),
            ));
        }
        for (i, var) in self.var.iter().enumerate() {
            let field = format!("VAR({})", i + 1);
            ensure_not_blank(Self::GROUP, &field, var)?;
        }
        if let Some(shift) = &self.timeshift {
            if !TIME_SHIFT.is_match(shift) {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["TIMESHIFT"],
                    format!("time shift {:?} must look like 'YYYYMMDD HHMMSS'", shift),
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "FILE");
        group
            .set("FILENAME", &self.filename)
            .set_opt("LONGITUDE", self.longitude.as_ref())
            .set_opt("LATITUDE", self.latitude.as_ref());
        for (i, var) in self.var.iter().enumerate() {
            group.set(&format!("VAR({})", i + 1), var);
        }
        group.set_opt("TIMESHIFT", self.timeshift.as_ref());
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_active_fields_rejected() {
        let field = ForcingField(BTreeMap::from([
            (ForcingChannel::Winds, true),
            (ForcingChannel::Currents, true),
        ]));
        let err = field.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("only one forcing field may be True"));
        assert!(msg.contains("FIELD%CURRENTS"));
        assert!(msg.contains("FIELD%WINDS"));

        let forcing = Forcing {
            field,
            ..Default::default()
        };
        assert!(forcing.validate().is_err());
    }

    #[test]
    fn test_single_active_field() {
        let field = ForcingField(BTreeMap::from([
            (ForcingChannel::Winds, true),
            (ForcingChannel::Currents, false),
        ]));
        field.validate().unwrap();
        assert_eq!(field.selected(), Some(ForcingChannel::Winds));
        assert!(field.is_set(ForcingChannel::Winds));
        assert!(!field.is_set(ForcingChannel::Currents));
        assert!(!field.is_set(ForcingChannel::IceConc));
    }

    #[test]
    fn test_forcing_render_and_tidal_rule() {
        let forcing = Forcing {
            timestart: Some("20230101 000000".parse().unwrap()),
            field: ForcingField::only(ForcingChannel::WaterLevels),
            tidal: Some("M2 S2".into()),
            ..Default::default()
        };
        forcing.validate().unwrap();
        let text = forcing.render();
        assert!(text.contains("FORCING%TIMESTART = '20230101 000000'"));
        assert!(text.contains("FORCING%FIELD%WATER_LEVELS = T"));
        assert!(text.contains("FORCING%TIDAL = 'M2 S2'"));

        let winds = Forcing {
            field: ForcingField::only(ForcingChannel::Winds),
            ..forcing
        };
        assert!(winds.validate().is_err());
    }

    #[test]
    fn test_forcing_file() {
        let mut file = ForcingFile::new("wind.nc", vec!["u10".into(), "v10".into()]);
        file.longitude = Some("lon".into());
        file.timeshift = Some("00000000 030000".into());
        file.validate().unwrap();
        let text = file.render();
        assert!(text.contains("FILE%VAR(1) = 'u10'"));
        assert!(text.contains("FILE%VAR(2) = 'v10'"));
        assert!(text.contains("FILE%TIMESHIFT = '00000000 030000'"));

        file.timeshift = Some("3h".into());
        assert!(file.validate().is_err());
        file.timeshift = Some("\u{0660}0000000 030000".into());
        assert!(file.validate().is_err());
        assert!(ForcingFile::new("wind.nc", vec![]).validate().is_err());
    }
}
