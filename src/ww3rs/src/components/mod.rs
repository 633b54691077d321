// ww3rs/src/components/mod.rs

//! Per-program bundles of namelist blocks.
//!
//! Each component holds the blocks one WW3 executable reads and turns them
//! into a [`Composition`] with fixed file keys. The keys double as file
//! names when a run is written one file per block.

pub mod grid;
pub mod postproc;
pub mod shel;

use serde::{Deserialize, Serialize};
use std::fmt;
use ww3nml::{Composition, Namelist, NamelistBlock, Validated};

pub use grid::{GridComponent, GridPayload};
pub use postproc::{
    BouncComponent, OunfComponent, OunpComponent, PrncComponent, TrncComponent, UprstrComponent,
};
pub use shel::{MultiComponent, ShelComponent};

/// WW3 executables whose namelists are generated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    Grid,
    Shel,
    Multi,
    Prnc,
    Bounc,
    Ounf,
    Ounp,
    Trnc,
    Uprstr,
}

impl Program {
    /// Executable name, e.g. `ww3_shel`.
    pub fn name(self) -> &'static str {
        match self {
            Program::Grid => "ww3_grid",
            Program::Shel => "ww3_shel",
            Program::Multi => "ww3_multi",
            Program::Prnc => "ww3_prnc",
            Program::Bounc => "ww3_bounc",
            Program::Ounf => "ww3_ounf",
            Program::Ounp => "ww3_ounp",
            Program::Trnc => "ww3_trnc",
            Program::Uprstr => "ww3_uprstr",
        }
    }

    /// Namelist file the executable reads, e.g. `ww3_shel.nml`.
    pub fn filename(self) -> String {
        format!("{}.nml", self.name())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The blocks of one program.
pub trait Component {
    const PROGRAM: Program;

    fn composition(&self) -> Composition;
}

/// Composition entry for an optional block.
pub(crate) fn slot<T>(key: &str, block: Option<&Validated<T>>) -> (String, Option<NamelistBlock>)
where
    T: Namelist,
    Validated<T>: Into<NamelistBlock>,
{
    (key.to_string(), block.cloned().map(Into::into))
}

/// Composition entry for a required block.
pub(crate) fn required<T>(key: &str, block: &Validated<T>) -> (String, Option<NamelistBlock>)
where
    T: Namelist,
    Validated<T>: Into<NamelistBlock>,
{
    slot(key, Some(block))
}

/// Every configured program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Components {
    pub grid: Option<GridComponent>,
    pub shel: Option<ShelComponent>,
    pub multi: Option<MultiComponent>,
    pub prnc: Option<PrncComponent>,
    pub bounc: Option<BouncComponent>,
    pub ounf: Option<OunfComponent>,
    pub ounp: Option<OunpComponent>,
    pub trnc: Option<TrncComponent>,
    pub uprstr: Option<UprstrComponent>,
}

fn push<C: Component>(out: &mut Vec<(Program, Composition)>, component: &Option<C>) {
    if let Some(component) = component {
        out.push((C::PROGRAM, component.composition()));
    }
}

impl Components {
    /// One composition per configured program, in a fixed program order.
    pub fn compositions(&self) -> Vec<(Program, Composition)> {
        let mut out = Vec::new();
        push(&mut out, &self.grid);
        push(&mut out, &self.shel);
        push(&mut out, &self.multi);
        push(&mut out, &self.prnc);
        push(&mut out, &self.bounc);
        push(&mut out, &self.ounf);
        push(&mut out, &self.ounp);
        push(&mut out, &self.trnc);
        push(&mut out, &self.uprstr);
        out
    }

    pub fn programs(&self) -> Vec<Program> {
        self.compositions().into_iter().map(|(p, _)| p).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.compositions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww3nml::{Bound, BoundMode};

    #[test]
    fn test_program_names() {
        assert_eq!(Program::Shel.name(), "ww3_shel");
        assert_eq!(Program::Uprstr.filename(), "ww3_uprstr.nml");
        assert_eq!(Program::Ounp.to_string(), "ww3_ounp");
    }

    #[test]
    fn test_compositions_follow_program_order() {
        let components = Components {
            bounc: Some(BouncComponent {
                bound: Bound {
                    mode: BoundMode::Write,
                    interp: None,
                    verbose: None,
                    file: "spec.list".into(),
                }
                .validated()
                .unwrap(),
            }),
            shel: Some(ShelComponent::default()),
            ..Default::default()
        };
        assert_eq!(components.programs(), vec![Program::Shel, Program::Bounc]);
        assert!(!components.is_empty());
        assert!(Components::default().is_empty());
    }
}
