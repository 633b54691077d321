// ww3nml/src/blocks/restart.rs

//! Restart update blocks (`ww3_uprstr.nml`).

use crate::blocks::Namelist;
use crate::enums::UpdateMethod;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{ensure_finite, ensure_not_blank, ensure_positive, Ww3Date};
use serde::{Deserialize, Serialize};

/// `RESTART_NML`: time of the restart file to update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Restart {
    pub restarttime: Ww3Date,
}

impl Namelist for Restart {
    const GROUP: &'static str = "RESTART_NML";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "RESTART");
        group.set("RESTARTTIME", self.restarttime);
        group
    }
}

/// `UPDATE_NML`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Update {
    pub updproc: UpdateMethod,
    /// Correction factor applied to the whole field
    pub prcntg: Option<f64>,
    /// Cap on the correction factor
    pub prcntg_cap: Option<f64>,
    /// Threshold on wind sea fraction
    pub thrwsea: Option<f64>,
    /// Analysis file
    pub file: Option<String>,
}

impl Update {
    pub fn new(updproc: UpdateMethod) -> Self {
        Self {
            updproc,
            prcntg: None,
            prcntg_cap: None,
            thrwsea: None,
            file: None,
        }
    }
}

impl Namelist for Update {
    const GROUP: &'static str = "UPDATE_NML";

    fn validate(&self) -> Result<()> {
        if let Some(prcntg) = self.prcntg {
            ensure_positive(Self::GROUP, "PRCNTG", prcntg)?;
        }
        if let Some(cap) = self.prcntg_cap {
            ensure_finite(Self::GROUP, "PRCNTG_CAP", cap)?;
            if cap < 1.0 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["PRCNTG_CAP"],
                    format!("prcntg_cap must be >= 1, got {}", cap),
                ));
            }
        }
        if let Some(thrwsea) = self.thrwsea {
            if !(0.0..=1.0).contains(&thrwsea) {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["THRWSEA"],
                    format!("thrwsea must lie in [0, 1], got {}", thrwsea),
                ));
            }
        }

        if self.updproc == UpdateMethod::Upd1 && self.prcntg.is_none() {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["UPDPROC", "PRCNTG"],
                "UPD1 applies a fixed correction and needs prcntg",
            ));
        }
        if self.updproc.needs_file() {
            match &self.file {
                Some(file) => ensure_not_blank(Self::GROUP, "FILE", file)?,
                None => {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &["UPDPROC", "FILE"],
                        format!("{} reads an analysis file", self.updproc),
                    ));
                }
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "UPDATE");
        group
            .set("UPDPROC", self.updproc)
            .set_opt("PRCNTG", self.prcntg)
            .set_opt("PRCNTG_CAP", self.prcntg_cap)
            .set_opt("THRWSEA", self.thrwsea)
            .set_opt("FILE", self.file.as_ref());
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_render() {
        let restart = Restart {
            restarttime: "20230101 060000".parse().unwrap(),
        };
        assert_eq!(
            restart.render(),
            "&RESTART_NML\nRESTART%RESTARTTIME = '20230101 060000'\n/\n"
        );
    }

    #[test]
    fn test_update_method_requirements() {
        assert!(Update::new(UpdateMethod::Upd0f).validate().is_ok());
        assert!(Update::new(UpdateMethod::Upd1).validate().is_err());

        let mut fixed = Update::new(UpdateMethod::Upd1);
        fixed.prcntg = Some(1.2);
        fixed.validate().unwrap();

        let mut analysis = Update::new(UpdateMethod::Upd2);
        assert!(analysis.validate().is_err());
        analysis.file = Some("anl.grbtxt".into());
        analysis.validate().unwrap();
        let text = analysis.render();
        assert!(text.contains("UPDATE%UPDPROC = 'UPD2'"));
        assert!(text.contains("UPDATE%FILE = 'anl.grbtxt'"));
    }

    #[test]
    fn test_update_ranges() {
        let mut update = Update::new(UpdateMethod::Upd0f);
        update.prcntg = Some(0.0);
        assert!(update.validate().is_err());
        update.prcntg = Some(1.0);
        update.prcntg_cap = Some(0.5);
        assert!(update.validate().is_err());
        update.prcntg_cap = Some(2.0);
        update.thrwsea = Some(1.5);
        assert!(update.validate().is_err());
        update.thrwsea = Some(0.7);
        assert!(update.validate().is_ok());
    }
}
