// ww3rs/src/components/postproc.rs

//! Pre- and postprocessor programs.

use crate::components::{required, slot, Component, Program};
use serde::{Deserialize, Serialize};
use ww3nml::{
    Bound, Composition, Field, Forcing, ForcingFile, OutputFile, Param, Point, Restart, Source,
    Spectra, Track, Update, Validated,
};

/// `ww3_prnc`: forcing field preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrncComponent {
    pub forcing: Validated<Forcing>,
    pub file: Validated<ForcingFile>,
}

impl Component for PrncComponent {
    const PROGRAM: Program = Program::Prnc;

    fn composition(&self) -> Composition {
        Composition::compose([
            required("forcing.nml", &self.forcing),
            required("file.nml", &self.file),
        ])
    }
}

/// `ww3_bounc`: boundary spectra preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BouncComponent {
    pub bound: Validated<Bound>,
}

impl Component for BouncComponent {
    const PROGRAM: Program = Program::Bounc;

    fn composition(&self) -> Composition {
        Composition::compose([required("bound.nml", &self.bound)])
    }
}

/// `ww3_ounf`: gridded NetCDF output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OunfComponent {
    pub field: Validated<Field>,
    pub file: Option<Validated<OutputFile>>,
}

impl Component for OunfComponent {
    const PROGRAM: Program = Program::Ounf;

    fn composition(&self) -> Composition {
        Composition::compose([
            required("field.nml", &self.field),
            slot("file.nml", self.file.as_ref()),
        ])
    }
}

/// `ww3_ounp`: point output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OunpComponent {
    pub point: Validated<Point>,
    pub file: Option<Validated<OutputFile>>,
    pub spectra: Option<Validated<Spectra>>,
    pub param: Option<Validated<Param>>,
    pub source: Option<Validated<Source>>,
}

impl Component for OunpComponent {
    const PROGRAM: Program = Program::Ounp;

    fn composition(&self) -> Composition {
        Composition::compose([
            required("point.nml", &self.point),
            slot("file.nml", self.file.as_ref()),
            slot("spectra.nml", self.spectra.as_ref()),
            slot("param.nml", self.param.as_ref()),
            slot("source.nml", self.source.as_ref()),
        ])
    }
}

/// `ww3_trnc`: track output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrncComponent {
    pub track: Validated<Track>,
    pub file: Option<Validated<OutputFile>>,
}

impl Component for TrncComponent {
    const PROGRAM: Program = Program::Trnc;

    fn composition(&self) -> Composition {
        Composition::compose([
            required("track.nml", &self.track),
            slot("file.nml", self.file.as_ref()),
        ])
    }
}

/// `ww3_uprstr`: restart file update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UprstrComponent {
    pub restart: Validated<Restart>,
    pub update: Validated<Update>,
}

impl Component for UprstrComponent {
    const PROGRAM: Program = Program::Uprstr;

    fn composition(&self) -> Composition {
        Composition::compose([
            required("restart.nml", &self.restart),
            required("update.nml", &self.update),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww3nml::{ForcingChannel, ForcingField, Namelist, UpdateMethod};

    #[test]
    fn test_prnc_vector_field_needs_second_variable() {
        let prnc = PrncComponent {
            forcing: Forcing {
                field: ForcingField::only(ForcingChannel::Currents),
                ..Default::default()
            }
            .validated()
            .unwrap(),
            file: ForcingFile::new("cur.nc", vec!["uo".into()]).validated().unwrap(),
        };
        assert_eq!(prnc.composition().validate_consistency().len(), 1);
    }

    #[test]
    fn test_uprstr_render_combined() {
        let uprstr = UprstrComponent {
            restart: Restart {
                restarttime: "20230101 000000".parse().unwrap(),
            }
            .validated()
            .unwrap(),
            update: Update::new(UpdateMethod::Upd0f).validated().unwrap(),
        };
        let text = uprstr.composition().render_combined();
        assert!(text.starts_with("&RESTART_NML\n"));
        assert!(text.contains("&UPDATE_NML\nUPDATE%UPDPROC = 'UPD0F'\n/\n"));
    }
}
