// ww3nml/src/blocks/domain.rs

use crate::blocks::Namelist;
use crate::enums::OutputServer;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{ensure_ordered, Ww3Date};
use serde::{Deserialize, Serialize};

/// `DOMAIN_NML`: run period and, for the multi-grid driver, grid counts and
/// process layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Domain {
    /// Number of input grids (multi-grid only)
    pub nrinp: Option<u32>,
    /// Number of model grids (multi-grid only)
    pub nrgrd: Option<u32>,
    pub unipts: Option<bool>,
    pub iostyp: Option<OutputServer>,
    pub upproc: Option<bool>,
    pub pshare: Option<bool>,
    pub flghg1: Option<bool>,
    pub flghg2: Option<bool>,
    pub start: Option<Ww3Date>,
    pub stop: Option<Ww3Date>,
}

impl Domain {
    /// Single-grid shell domain covering `start..stop`.
    pub fn period(start: Ww3Date, stop: Ww3Date) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            ..Default::default()
        }
    }
}

impl Namelist for Domain {
    const GROUP: &'static str = "DOMAIN_NML";

    fn validate(&self) -> Result<()> {
        if let Some(nrgrd) = self.nrgrd {
            if nrgrd < 1 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["NRGRD"],
                    format!("nrgrd must be >= 1, got {}", nrgrd),
                ));
            }
        }
        if let Some(nrinp) = self.nrinp {
            if nrinp < 1 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["NRINP"],
                    format!("nrinp must be >= 1, got {}", nrinp),
                ));
            }
        }
        if let (Some(start), Some(stop)) = (&self.start, &self.stop) {
            ensure_ordered(Self::GROUP, "START", "STOP", start, stop)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "DOMAIN");
        group
            .set_opt("NRINP", self.nrinp)
            .set_opt("NRGRD", self.nrgrd)
            .set_opt("UNIPTS", self.unipts)
            .set_opt("IOSTYP", self.iostyp)
            .set_opt("UPPROC", self.upproc)
            .set_opt("PSHARE", self.pshare)
            .set_opt("FLGHG1", self.flghg1)
            .set_opt("FLGHG2", self.flghg2)
            .set_opt("START", self.start)
            .set_opt("STOP", self.stop);
        group
    }
}
