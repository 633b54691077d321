// ww3nml/src/blocks/mod.rs

//! Namelist blocks: one validated struct per WW3 namelist group.
//!
//! Blocks are plain data. A block only reaches a [`Composition`] wrapped in
//! [`Validated`], which can only be built by running the block's validation,
//! so every composed block satisfies its own invariants and renders without
//! failing.
//!
//! [`Composition`]: crate::composition::Composition

pub mod boundary;
pub mod domain;
pub mod grid;
pub mod homog;
pub mod input;
pub mod multi;
pub mod output;
pub mod postproc;
pub mod prnc;
pub mod restart;

use crate::error::Result;
use crate::group::NamelistGroup;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::ops::Deref;

pub use boundary::{
    ExcludedBodies, ExcludedCount, ExcludedPoints, GridPoint, InboundCount, InboundPoints,
    OutboundCount, OutboundLine, OutboundLines,
};
pub use domain::Domain;
pub use grid::{
    Curv, Depth, FileSpec, Grid, Mask, Obst, Rect, Run, Sed, Slope, Smc, Spectrum, Timesteps,
    Unst,
};
pub use homog::{HomogCount, HomogInput, HomogInputs};
pub use input::{Input, InputAssim};
pub use multi::{InputGrid, InputGrids, ModelGrid, ModelGrids, ModelResource, NATIVE_SOURCE, NO_SOURCE};
pub use output::{OutputDate, OutputPartition, OutputScope, OutputType, OutputWindow};
pub use postproc::{
    AllPoints, Bound, Field, OutputFile, Param, Point, PointList, Source, Spectra, TimeSeries, Track,
};
pub use prnc::{Forcing, ForcingField, ForcingFile};
pub use restart::{Restart, Update};

/// A WW3 namelist group with its own validation and rendering.
pub trait Namelist: Clone + Debug {
    /// Group header without `&`, e.g. `DOMAIN_NML`.
    const GROUP: &'static str;

    /// Check every single-block invariant.
    fn validate(&self) -> Result<()>;

    /// Build the ordered group. Unset optional fields are left out.
    fn to_group(&self) -> NamelistGroup;

    fn render(&self) -> String {
        self.to_group().render()
    }

    fn validated(self) -> Result<Validated<Self>> {
        Validated::new(self)
    }
}

/// A block that passed [`Namelist::validate`].
///
/// There is no mutable access: change a field by taking the block out with
/// [`Validated::into_inner`] and validating it again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Validated<T>(T);

impl<T: Namelist> Validated<T> {
    pub fn new(block: T) -> Result<Self> {
        block.validate()?;
        Ok(Validated(block))
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Apply `f` to a copy of the block and validate the result.
    pub fn modify<F: FnOnce(&mut T)>(&self, f: F) -> Result<Self> {
        let mut block = self.0.clone();
        f(&mut block);
        Validated::new(block)
    }
}

impl<T> Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for Validated<T>
where
    T: Namelist + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let block = T::deserialize(deserializer)?;
        Validated::new(block).map_err(D::Error::custom)
    }
}

/// Typed access to one variant of [`NamelistBlock`].
pub trait FromBlock: Namelist {
    fn from_block(block: &NamelistBlock) -> Option<&Self>;
}

macro_rules! namelist_blocks {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// Any validated namelist block.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum NamelistBlock {
            $($variant(Validated<$ty>)),+
        }

        impl NamelistBlock {
            /// Group header, e.g. `DOMAIN_NML`.
            pub fn group_name(&self) -> &'static str {
                match self {
                    $(NamelistBlock::$variant(_) => <$ty as Namelist>::GROUP),+
                }
            }

            pub fn to_group(&self) -> NamelistGroup {
                match self {
                    $(NamelistBlock::$variant(block) => block.to_group()),+
                }
            }
        }

        $(
            impl From<Validated<$ty>> for NamelistBlock {
                fn from(block: Validated<$ty>) -> Self {
                    NamelistBlock::$variant(block)
                }
            }

            impl FromBlock for $ty {
                fn from_block(block: &NamelistBlock) -> Option<&Self> {
                    match block {
                        NamelistBlock::$variant(inner) => Some(inner.inner()),
                        _ => None,
                    }
                }
            }
        )+
    };
}

namelist_blocks! {
    Domain(Domain),
    Spectrum(Spectrum),
    Run(Run),
    Timesteps(Timesteps),
    Grid(Grid),
    Rect(Rect),
    Curv(Curv),
    Unst(Unst),
    Smc(Smc),
    Depth(Depth),
    Mask(Mask),
    Obst(Obst),
    Slope(Slope),
    Sed(Sed),
    InboundCount(InboundCount),
    InboundPoints(InboundPoints),
    ExcludedCount(ExcludedCount),
    ExcludedPoints(ExcludedPoints),
    ExcludedBodies(ExcludedBodies),
    OutboundCount(OutboundCount),
    OutboundLines(OutboundLines),
    Input(Input),
    OutputType(OutputType),
    OutputDate(OutputDate),
    HomogCount(HomogCount),
    HomogInputs(HomogInputs),
    InputGrids(InputGrids),
    ModelGrids(ModelGrids),
    Forcing(Forcing),
    ForcingFile(ForcingFile),
    Bound(Bound),
    Field(Field),
    OutputFile(OutputFile),
    Point(Point),
    Track(Track),
    Spectra(Spectra),
    Param(Param),
    Source(Source),
    Restart(Restart),
    Update(Update),
}

impl NamelistBlock {
    /// Validate `block` and wrap it.
    pub fn build<T>(block: T) -> Result<Self>
    where
        T: Namelist,
        Validated<T>: Into<NamelistBlock>,
    {
        Ok(Validated::new(block)?.into())
    }

    pub fn render(&self) -> String {
        self.to_group().render()
    }

    /// Conventional single-block file name, e.g. `domain.nml`.
    pub fn default_filename(&self) -> String {
        let name = self.group_name();
        format!(
            "{}.nml",
            name.strip_suffix("_NML").unwrap_or(name).to_lowercase()
        )
    }

    /// Typed view of this block, if it is a `T`.
    pub fn downcast<T: FromBlock>(&self) -> Option<&T> {
        T::from_block(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::OutputServer;

    #[test]
    fn test_validated_rejects_invalid_block() {
        let domain = Domain {
            start: Some("20230102 000000".parse().unwrap()),
            stop: Some("20230101 000000".parse().unwrap()),
            ..Default::default()
        };
        assert!(Validated::new(domain).is_err());
    }

    #[test]
    fn test_modify_revalidates() {
        let domain = Domain {
            iostyp: Some(OutputServer::SingleProcess),
            ..Default::default()
        }
        .validated()
        .unwrap();

        let ok = domain.modify(|d| d.nrgrd = Some(2)).unwrap();
        assert_eq!(ok.nrgrd, Some(2));
        assert!(domain.modify(|d| d.nrgrd = Some(0)).is_err());
        // the original is untouched
        assert_eq!(domain.nrgrd, None);
    }

    #[test]
    fn test_block_metadata_and_downcast() {
        let block = NamelistBlock::build(Domain::default()).unwrap();
        assert_eq!(block.group_name(), "DOMAIN_NML");
        assert_eq!(block.default_filename(), "domain.nml");
        assert!(block.downcast::<Domain>().is_some());
        assert!(block.downcast::<Spectrum>().is_none());
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let ok: Validated<Domain> =
            serde_json::from_str(r#"{"start": "2023-01-01 00:00:00", "stop": "20230102 000000"}"#)
                .unwrap();
        assert_eq!(ok.start.unwrap().to_string(), "20230101 000000");

        let bad = serde_json::from_str::<Validated<Domain>>(
            r#"{"start": "20230102 000000", "stop": "20230101 000000"}"#,
        );
        assert!(bad.is_err());
    }
}
