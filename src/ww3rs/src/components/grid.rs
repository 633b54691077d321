// ww3rs/src/components/grid.rs

use crate::components::{required, slot, Component, Program};
use serde::{Deserialize, Serialize};
use ww3nml::{
    Composition, Curv, Depth, ExcludedBodies, ExcludedCount, ExcludedPoints, Grid, InboundCount,
    InboundPoints, Mask, NamelistBlock, Obst, OutboundCount, OutboundLines, Rect, Run, Sed, Slope,
    Smc, Spectrum, Timesteps, Unst, Validated,
};

/// Grid geometry. A grid carries exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPayload {
    Rect(Validated<Rect>),
    Curv(Validated<Curv>),
    Unst(Validated<Unst>),
    Smc(Validated<Smc>),
}

impl GridPayload {
    pub fn key(&self) -> &'static str {
        match self {
            GridPayload::Rect(_) => "rect.nml",
            GridPayload::Curv(_) => "curv.nml",
            GridPayload::Unst(_) => "unst.nml",
            GridPayload::Smc(_) => "smc.nml",
        }
    }

    pub fn block(&self) -> NamelistBlock {
        match self {
            GridPayload::Rect(b) => b.clone().into(),
            GridPayload::Curv(b) => b.clone().into(),
            GridPayload::Unst(b) => b.clone().into(),
            GridPayload::Smc(b) => b.clone().into(),
        }
    }
}

/// `ww3_grid`: spectral and spatial grid definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridComponent {
    pub spectrum: Option<Validated<Spectrum>>,
    pub run: Option<Validated<Run>>,
    pub timesteps: Option<Validated<Timesteps>>,
    pub grid: Validated<Grid>,
    pub payload: Option<GridPayload>,
    pub depth: Option<Validated<Depth>>,
    pub mask: Option<Validated<Mask>>,
    pub obst: Option<Validated<Obst>>,
    pub slope: Option<Validated<Slope>>,
    pub sed: Option<Validated<Sed>>,
    pub inbnd_count: Option<Validated<InboundCount>>,
    pub inbnd_point: Option<Validated<InboundPoints>>,
    pub excl_count: Option<Validated<ExcludedCount>>,
    pub excl_point: Option<Validated<ExcludedPoints>>,
    pub excl_body: Option<Validated<ExcludedBodies>>,
    pub outbnd_count: Option<Validated<OutboundCount>>,
    pub outbnd_line: Option<Validated<OutboundLines>>,
}

impl GridComponent {
    pub fn new(grid: Validated<Grid>, payload: GridPayload) -> Self {
        Self {
            spectrum: None,
            run: None,
            timesteps: None,
            grid,
            payload: Some(payload),
            depth: None,
            mask: None,
            obst: None,
            slope: None,
            sed: None,
            inbnd_count: None,
            inbnd_point: None,
            excl_count: None,
            excl_point: None,
            excl_body: None,
            outbnd_count: None,
            outbnd_line: None,
        }
    }
}

impl Component for GridComponent {
    const PROGRAM: Program = Program::Grid;

    fn composition(&self) -> Composition {
        let mut entries = vec![
            slot("spectrum.nml", self.spectrum.as_ref()),
            slot("run.nml", self.run.as_ref()),
            slot("timesteps.nml", self.timesteps.as_ref()),
            required("grid.nml", &self.grid),
        ];
        if let Some(payload) = &self.payload {
            entries.push((payload.key().to_string(), Some(payload.block())));
        }
        entries.extend([
            slot("depth.nml", self.depth.as_ref()),
            slot("mask.nml", self.mask.as_ref()),
            slot("obst.nml", self.obst.as_ref()),
            slot("slope.nml", self.slope.as_ref()),
            slot("sed.nml", self.sed.as_ref()),
            slot("inbnd_count.nml", self.inbnd_count.as_ref()),
            slot("inbnd_point.nml", self.inbnd_point.as_ref()),
            slot("excl_count.nml", self.excl_count.as_ref()),
            slot("excl_point.nml", self.excl_point.as_ref()),
            slot("excl_body.nml", self.excl_body.as_ref()),
            slot("outbnd_count.nml", self.outbnd_count.as_ref()),
            slot("outbnd_line.nml", self.outbnd_line.as_ref()),
        ]);
        Composition::compose(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww3nml::{CoordSystem, FileSpec, GridType, Namelist};

    fn rect_component() -> GridComponent {
        let grid = Grid::new("GLOB", GridType::Rect, CoordSystem::Spherical)
            .validated()
            .unwrap();
        let rect = Rect {
            nx: 360,
            ny: 181,
            sx: 1.0,
            sy: 1.0,
            sf: None,
            x0: 0.0,
            y0: -90.0,
            sf0: None,
        }
        .validated()
        .unwrap();
        GridComponent::new(grid, GridPayload::Rect(rect))
    }

    #[test]
    fn test_grid_composition_order() {
        let mut component = rect_component();
        component.spectrum = Some(Spectrum::default().validated().unwrap());
        component.depth = Some(Depth(FileSpec::new("depth.inp")).validated().unwrap());

        let composition = component.composition();
        let present: Vec<&str> = composition.present().map(|(key, _)| key).collect();
        assert_eq!(present, vec!["spectrum.nml", "grid.nml", "rect.nml", "depth.nml"]);
        assert!(composition.validate_consistency().is_empty());
    }

    #[test]
    fn test_payload_is_tagged_by_kind() {
        let json = serde_json::to_value(rect_component()).unwrap();
        assert_eq!(json["payload"]["rect"]["nx"], 360);
        assert_eq!(json["grid"]["type"], "RECT");
    }
}
