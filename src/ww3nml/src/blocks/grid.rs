// ww3nml/src/blocks/grid.rs

//! Blocks read by the grid preprocessor (`ww3_grid.nml`).

use crate::blocks::Namelist;
use crate::enums::{ClosureType, CoordSystem, FormatIndicator, GridType, LayoutIndicator};
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::source::SourceRef;
use crate::validators::{ensure_finite, ensure_not_blank, ensure_positive};
use serde::{Deserialize, Serialize};

/// Longest grid name WW3 stores (`CHARACTER(LEN=30)`).
pub const MAX_GRID_NAME_LEN: usize = 30;

// -----------------------------------------------------------------------------
// SPECTRUM_NML
// -----------------------------------------------------------------------------

/// Spectral discretization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spectrum {
    /// Frequency increment factor
    pub xfr: f64,
    /// First frequency (Hz)
    pub freq1: f64,
    /// Number of frequencies
    pub nk: u32,
    /// Number of directions
    pub nth: u32,
    /// Relative offset of the first direction, in [-0.5, 0.5]
    pub thoff: Option<f64>,
}

impl Default for Spectrum {
    fn default() -> Self {
        Self {
            xfr: 1.1,
            freq1: 0.04118,
            nk: 32,
            nth: 24,
            thoff: None,
        }
    }
}

impl Namelist for Spectrum {
    const GROUP: &'static str = "SPECTRUM_NML";

    fn validate(&self) -> Result<()> {
        ensure_finite(Self::GROUP, "XFR", self.xfr)?;
        if self.xfr <= 1.0 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["XFR"],
                format!("xfr must be > 1, got {}", self.xfr),
            ));
        }
        ensure_positive(Self::GROUP, "FREQ1", self.freq1)?;
        if self.nk < 3 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["NK"],
                format!("nk must be >= 3, got {}", self.nk),
            ));
        }
        if self.nth < 4 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["NTH"],
                format!("nth must be >= 4, got {}", self.nth),
            ));
        }
        if let Some(thoff) = self.thoff {
            if !(-0.5..=0.5).contains(&thoff) {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["THOFF"],
                    format!("thoff must lie in [-0.5, 0.5], got {}", thoff),
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "SPECTRUM");
        group
            .set("XFR", self.xfr)
            .set("FREQ1", self.freq1)
            .set("NK", self.nk)
            .set("NTH", self.nth)
            .set_opt("THOFF", self.thoff);
        group
    }
}

// -----------------------------------------------------------------------------
// RUN_NML
// -----------------------------------------------------------------------------

/// Switches for the integration steps of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Run {
    pub fldry: Option<bool>,
    pub flcx: Option<bool>,
    pub flcy: Option<bool>,
    pub flcth: Option<bool>,
    pub flck: Option<bool>,
    pub flsou: Option<bool>,
}

impl Namelist for Run {
    const GROUP: &'static str = "RUN_NML";

    fn validate(&self) -> Result<()> {
        let steps = [self.flcx, self.flcy, self.flcth, self.flck, self.flsou];
        let all_off = steps.iter().all(|flag| *flag == Some(false));
        if all_off && self.fldry != Some(true) {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["FLCX", "FLCY", "FLCTH", "FLCK", "FLSOU"],
                "every integration step is switched off; enable one or set fldry",
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "RUN");
        group
            .set_opt("FLDRY", self.fldry)
            .set_opt("FLCX", self.flcx)
            .set_opt("FLCY", self.flcy)
            .set_opt("FLCTH", self.flcth)
            .set_opt("FLCK", self.flck)
            .set_opt("FLSOU", self.flsou);
        group
    }
}

// -----------------------------------------------------------------------------
// TIMESTEPS_NML
// -----------------------------------------------------------------------------

/// Model timesteps, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timesteps {
    /// Maximum global timestep
    pub dtmax: f64,
    /// Maximum CFL timestep for spatial propagation
    pub dtxy: f64,
    /// Maximum CFL timestep for intra-spectral propagation
    pub dtkth: f64,
    /// Minimum source term timestep
    pub dtmin: f64,
}

impl Timesteps {
    pub const DTMIN_RANGE: (f64, f64) = (5.0, 60.0);

    pub fn new(dtmax: f64, dtxy: f64, dtkth: f64, dtmin: f64) -> Result<Self> {
        let timesteps = Self {
            dtmax,
            dtxy,
            dtkth,
            dtmin,
        };
        timesteps.validate()?;
        Ok(timesteps)
    }
}

impl Namelist for Timesteps {
    const GROUP: &'static str = "TIMESTEPS_NML";

    fn validate(&self) -> Result<()> {
        ensure_positive(Self::GROUP, "DTMAX", self.dtmax)?;
        ensure_positive(Self::GROUP, "DTXY", self.dtxy)?;
        ensure_positive(Self::GROUP, "DTKTH", self.dtkth)?;
        ensure_positive(Self::GROUP, "DTMIN", self.dtmin)?;

        if self.dtxy > self.dtmax {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["DTXY", "DTMAX"],
                format!(
                    "dtxy ({}) must be <= dtmax ({})",
                    self.dtxy, self.dtmax
                ),
            ));
        }

        let (lo, hi) = (self.dtmax / 10.0, self.dtmax / 2.0);
        if self.dtkth < lo || self.dtkth > hi {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["DTKTH", "DTMAX"],
                format!(
                    "dtkth ({}) must lie between dtmax/10 ({}) and dtmax/2 ({})",
                    self.dtkth, lo, hi
                ),
            ));
        }

        let (min, max) = Self::DTMIN_RANGE;
        if self.dtmin < min || self.dtmin > max {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["DTMIN"],
                format!(
                    "dtmin ({}) must lie between {} and {} seconds",
                    self.dtmin, min, max
                ),
            ));
        }
        if self.dtmin > self.dtmax {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["DTMIN", "DTMAX"],
                format!(
                    "dtmin ({}) must be <= dtmax ({})",
                    self.dtmin, self.dtmax
                ),
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "TIMESTEPS");
        group
            .set("DTMAX", self.dtmax)
            .set("DTXY", self.dtxy)
            .set("DTKTH", self.dtkth)
            .set("DTMIN", self.dtmin);
        group
    }
}

// -----------------------------------------------------------------------------
// GRID_NML
// -----------------------------------------------------------------------------

/// Grid name, kind, coordinates and closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    pub name: String,
    /// Namelist file holding the source term parameters
    pub nml: Option<String>,
    #[serde(rename = "type")]
    pub grid_type: GridType,
    pub coord: CoordSystem,
    pub clos: Option<ClosureType>,
    /// Coast line limit depth (m), must be <= 0
    pub zlim: Option<f64>,
    /// Abs. minimum water depth (m)
    pub dmin: Option<f64>,
}

impl Grid {
    pub fn new<S: Into<String>>(name: S, grid_type: GridType, coord: CoordSystem) -> Self {
        Self {
            name: name.into(),
            nml: None,
            grid_type,
            coord,
            clos: None,
            zlim: None,
            dmin: None,
        }
    }
}

impl Namelist for Grid {
    const GROUP: &'static str = "GRID_NML";

    fn validate(&self) -> Result<()> {
        ensure_not_blank(Self::GROUP, "NAME", &self.name)?;
        if self.name.chars().count() > MAX_GRID_NAME_LEN {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["NAME"],
                format!(
                    "name {:?} is longer than {} characters",
                    self.name, MAX_GRID_NAME_LEN
                ),
            ));
        }

        match self.clos {
            None | Some(ClosureType::None) => {}
            Some(clos) => {
                if self.coord != CoordSystem::Spherical {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &["CLOS", "COORD"],
                        format!("closure {} requires SPHE coordinates, got {}", clos, self.coord),
                    ));
                }
                let allowed = match clos {
                    ClosureType::Tripole => matches!(self.grid_type, GridType::Curv),
                    _ => matches!(self.grid_type, GridType::Rect | GridType::Curv),
                };
                if !allowed {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &["CLOS", "TYPE"],
                        format!("closure {} is not supported on a {} grid", clos, self.grid_type),
                    ));
                }
            }
        }

        if let Some(zlim) = self.zlim {
            ensure_finite(Self::GROUP, "ZLIM", zlim)?;
            if zlim > 0.0 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["ZLIM"],
                    format!("zlim must be <= 0, got {}", zlim),
                ));
            }
        }
        if let Some(dmin) = self.dmin {
            ensure_finite(Self::GROUP, "DMIN", dmin)?;
            if dmin < 0.0 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &["DMIN"],
                    format!("dmin must be >= 0, got {}", dmin),
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "GRID");
        group
            .set("NAME", &self.name)
            .set_opt("NML", self.nml.as_ref())
            .set("TYPE", self.grid_type)
            .set("COORD", self.coord)
            .set_opt("CLOS", self.clos)
            .set_opt("ZLIM", self.zlim)
            .set_opt("DMIN", self.dmin);
        group
    }
}

// -----------------------------------------------------------------------------
// RECT_NML
// -----------------------------------------------------------------------------

/// Regular grid extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rect {
    pub nx: u32,
    pub ny: u32,
    pub sx: f64,
    pub sy: f64,
    /// Scaling applied to sx and sy
    pub sf: Option<f64>,
    pub x0: f64,
    pub y0: f64,
    /// Scaling applied to x0 and y0
    pub sf0: Option<f64>,
}

impl Namelist for Rect {
    const GROUP: &'static str = "RECT_NML";

    fn validate(&self) -> Result<()> {
        if self.nx < 1 || self.ny < 1 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["NX", "NY"],
                format!("grid dimensions must be >= 1, got {}x{}", self.nx, self.ny),
            ));
        }
        ensure_positive(Self::GROUP, "SX", self.sx)?;
        ensure_positive(Self::GROUP, "SY", self.sy)?;
        ensure_finite(Self::GROUP, "X0", self.x0)?;
        ensure_finite(Self::GROUP, "Y0", self.y0)?;
        for (field, scale) in [("SF", self.sf), ("SF0", self.sf0)] {
            if let Some(scale) = scale {
                ensure_nonzero_scale(Self::GROUP, field, scale)?;
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "RECT");
        group
            .set("NX", self.nx)
            .set("NY", self.ny)
            .set("SX", self.sx)
            .set("SY", self.sy)
            .set_opt("SF", self.sf)
            .set("X0", self.x0)
            .set("Y0", self.y0)
            .set_opt("SF0", self.sf0);
        group
    }
}

fn ensure_nonzero_scale(block: &str, field: &str, scale: f64) -> Result<()> {
    ensure_finite(block, field, scale)?;
    if scale == 0.0 {
        return Err(Ww3Error::validation(
            block,
            &[field],
            format!("scale factor {} must not be 0", field),
        ));
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// File descriptors
// -----------------------------------------------------------------------------

/// How WW3 reads one gridded input file (`SF`, `FILENAME`, `IDF`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    /// Scale factor
    pub sf: Option<f64>,
    /// Offset added after scaling
    pub off: Option<f64>,
    pub filename: String,
    /// Unit number
    pub idf: Option<u32>,
    pub idla: Option<LayoutIndicator>,
    pub idfm: Option<FormatIndicator>,
    /// Fortran format, only used with `IDFM = 2`
    pub format: Option<String>,
}

impl FileSpec {
    pub fn new<S: SourceRef + ?Sized>(source: &S) -> Self {
        Self {
            sf: None,
            off: None,
            filename: source.render_path(),
            idf: None,
            idla: None,
            idfm: None,
            format: None,
        }
    }

    pub fn with_scale(mut self, sf: f64) -> Self {
        self.sf = Some(sf);
        self
    }

    pub fn with_unit(mut self, idf: u32) -> Self {
        self.idf = Some(idf);
        self
    }

    pub fn with_layout(mut self, idla: LayoutIndicator) -> Self {
        self.idla = Some(idla);
        self
    }

    /// Formatted read with an explicit Fortran format.
    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.idfm = Some(FormatIndicator::Formatted);
        self.format = Some(format.into());
        self
    }

    /// Validate as part of `block`; field names are reported relative to the
    /// descriptor.
    pub fn validate_in(&self, block: &str) -> Result<()> {
        ensure_not_blank(block, "FILENAME", &self.filename)?;
        if let Some(sf) = self.sf {
            ensure_nonzero_scale(block, "SF", sf)?;
        }
        if let Some(off) = self.off {
            ensure_finite(block, "OFF", off)?;
        }
        if let Some(format) = &self.format {
            if self.idfm != Some(FormatIndicator::Formatted) {
                return Err(Ww3Error::validation(
                    block,
                    &["FORMAT", "IDFM"],
                    "a FORMAT is only read with IDFM = 2",
                ));
            }
            let trimmed = format.trim();
            if !(trimmed.starts_with('(') && trimmed.ends_with(')')) {
                return Err(Ww3Error::validation(
                    block,
                    &["FORMAT"],
                    format!("format {:?} must be enclosed in parentheses", format),
                ));
            }
        }
        Ok(())
    }

    /// Push the descriptor's fields under `sub` (e.g. `XCOORD`), or directly
    /// under the group prefix when `sub` is `None`.
    pub fn push_into(&self, group: &mut NamelistGroup, sub: Option<&str>) {
        let path = |field: &str| match sub {
            Some(sub) => format!("{}%{}", sub, field),
            None => field.to_string(),
        };
        group
            .set_opt(&path("SF"), self.sf)
            .set_opt(&path("OFF"), self.off)
            .set(&path("FILENAME"), &self.filename)
            .set_opt(&path("IDF"), self.idf)
            .set_opt(&path("IDLA"), self.idla)
            .set_opt(&path("IDFM"), self.idfm)
            .set_opt(&path("FORMAT"), self.format.as_ref());
    }
}

// -----------------------------------------------------------------------------
// CURV_NML / UNST_NML / SMC_NML
// -----------------------------------------------------------------------------

/// Curvilinear grid: dimensions plus longitude and latitude coordinate files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Curv {
    pub nx: u32,
    pub ny: u32,
    pub xcoord: FileSpec,
    pub ycoord: FileSpec,
}

impl Namelist for Curv {
    const GROUP: &'static str = "CURV_NML";

    fn validate(&self) -> Result<()> {
        if self.nx < 1 || self.ny < 1 {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["NX", "NY"],
                format!("grid dimensions must be >= 1, got {}x{}", self.nx, self.ny),
            ));
        }
        self.xcoord
            .validate_in("XCOORD")
            .map_err(|e| e.nested(Self::GROUP, "XCOORD"))?;
        self.ycoord
            .validate_in("YCOORD")
            .map_err(|e| e.nested(Self::GROUP, "YCOORD"))?;
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "CURV");
        group.set("NX", self.nx).set("NY", self.ny);
        self.xcoord.push_into(&mut group, Some("XCOORD"));
        self.ycoord.push_into(&mut group, Some("YCOORD"));
        group
    }
}

/// Unstructured (triangle mesh) grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unst {
    #[serde(flatten)]
    pub mesh: FileSpec,
    /// Additional open boundary list file
    #[serde(default)]
    pub ugobcfile: Option<String>,
}

impl Namelist for Unst {
    const GROUP: &'static str = "UNST_NML";

    fn validate(&self) -> Result<()> {
        self.mesh
            .validate_in(Self::GROUP)
            .map_err(|e| e.nested(Self::GROUP, "UNST"))?;
        if let Some(file) = &self.ugobcfile {
            ensure_not_blank(Self::GROUP, "UGOBCFILE", file)?;
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "UNST");
        self.mesh.push_into(&mut group, None);
        group.set_opt("UGOBCFILE", self.ugobcfile.as_ref());
        group
    }
}

/// Spherical multiple-cell grid: cell, face and boundary lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Smc {
    pub mcels: FileSpec,
    pub iside: FileSpec,
    pub jside: FileSpec,
    pub subtr: FileSpec,
    pub obstr: FileSpec,
    pub bundy: FileSpec,
    /// Arctic part, all three or none
    pub mbarc: Option<FileSpec>,
    pub aisid: Option<FileSpec>,
    pub ajsid: Option<FileSpec>,
}

impl Smc {
    fn files(&self) -> Vec<(&'static str, Option<&FileSpec>)> {
        vec![
            ("MCELS", Some(&self.mcels)),
            ("ISIDE", Some(&self.iside)),
            ("JSIDE", Some(&self.jside)),
            ("SUBTR", Some(&self.subtr)),
            ("OBSTR", Some(&self.obstr)),
            ("BUNDY", Some(&self.bundy)),
            ("MBARC", self.mbarc.as_ref()),
            ("AISID", self.aisid.as_ref()),
            ("AJSID", self.ajsid.as_ref()),
        ]
    }
}

impl Namelist for Smc {
    const GROUP: &'static str = "SMC_NML";

    fn validate(&self) -> Result<()> {
        for (name, file) in self.files() {
            if let Some(file) = file {
                file.validate_in(name)
                    .map_err(|e| e.nested(Self::GROUP, name))?;
            }
        }
        let arctic = [&self.mbarc, &self.aisid, &self.ajsid];
        let given = arctic.iter().filter(|f| f.is_some()).count();
        if given != 0 && given != arctic.len() {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["MBARC", "AISID", "AJSID"],
                "the Arctic cell files must be given together",
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "SMC");
        for (name, file) in self.files() {
            if let Some(file) = file {
                file.push_into(&mut group, Some(name));
            }
        }
        group
    }
}

// -----------------------------------------------------------------------------
// DEPTH_NML, MASK_NML, OBST_NML, SLOPE_NML, SED_NML
// -----------------------------------------------------------------------------

macro_rules! grid_file_block {
    ($(#[$meta:meta])* $ty:ident, $group:literal, $prefix:literal, scaled = $scaled:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(pub FileSpec);

        impl $ty {
            pub fn file(&self) -> &FileSpec {
                &self.0
            }
        }

        impl Namelist for $ty {
            const GROUP: &'static str = $group;

            fn validate(&self) -> Result<()> {
                if !$scaled && (self.0.sf.is_some() || self.0.off.is_some()) {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &["SF", "OFF"],
                        concat!($prefix, " files are not scaled"),
                    ));
                }
                self.0
                    .validate_in(Self::GROUP)
                    .map_err(|e| e.nested(Self::GROUP, $prefix))
            }

            fn to_group(&self) -> NamelistGroup {
                let mut group = NamelistGroup::new(Self::GROUP, $prefix);
                self.0.push_into(&mut group, None);
                group
            }
        }
    };
}

grid_file_block!(
    /// Bathymetry for RECT and CURV grids.
    Depth, "DEPTH_NML", "DEPTH", scaled = true
);
grid_file_block!(
    /// Point status map.
    Mask, "MASK_NML", "MASK", scaled = false
);
grid_file_block!(
    /// Sub-grid obstructions.
    Obst, "OBST_NML", "OBST", scaled = true
);
grid_file_block!(
    /// Reflection slopes.
    Slope, "SLOPE_NML", "SLOPE", scaled = true
);
grid_file_block!(
    /// Sediment grain sizes.
    Sed, "SED_NML", "SED", scaled = true
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Ww3Enum;

    #[test]
    fn test_timesteps_accepts_consistent_values() {
        let ts = Timesteps::new(240.0, 80.0, 80.0, 5.0).unwrap();
        let text = ts.render();
        assert!(text.contains("TIMESTEPS%DTMAX = 240.0"));
        assert!(text.contains("TIMESTEPS%DTMIN = 5.0"));
    }

    #[test]
    fn test_timesteps_rejects_dtxy_above_dtmax() {
        let err = Timesteps::new(100.0, 150.0, 80.0, 5.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DTXY"));
        assert!(msg.contains("150"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_timesteps_dtkth_window() {
        assert!(Timesteps::new(240.0, 80.0, 20.0, 5.0).is_err());
        assert!(Timesteps::new(240.0, 80.0, 121.0, 5.0).is_err());
        assert!(Timesteps::new(240.0, 80.0, 24.0, 5.0).is_ok());
        assert!(Timesteps::new(240.0, 80.0, 120.0, 5.0).is_ok());
    }

    #[test]
    fn test_timesteps_dtmin_bounds() {
        assert!(Timesteps::new(480.0, 160.0, 240.0, 4.0).is_err());
        assert!(Timesteps::new(480.0, 160.0, 240.0, 61.0).is_err());
        assert!(Timesteps::new(480.0, 160.0, 240.0, 60.0).is_ok());
        assert!(Timesteps::new(-1.0, 1.0, 1.0, 5.0).is_err());
    }

    #[test]
    fn test_spectrum_defaults_valid() {
        let spectrum = Spectrum::default();
        spectrum.validate().unwrap();
        assert!(spectrum.render().contains("SPECTRUM%NTH = 24"));
        let bad = Spectrum {
            xfr: 1.0,
            ..Spectrum::default()
        };
        assert!(bad.validate().is_err());
        let bad_offset = Spectrum {
            thoff: Some(0.75),
            ..Spectrum::default()
        };
        assert!(bad_offset.validate().is_err());
    }

    #[test]
    fn test_run_needs_an_active_step() {
        let off = Run {
            flcx: Some(false),
            flcy: Some(false),
            flcth: Some(false),
            flck: Some(false),
            flsou: Some(false),
            ..Default::default()
        };
        assert!(off.validate().is_err());
        let dry = Run {
            fldry: Some(true),
            ..off.clone()
        };
        assert!(dry.validate().is_ok());
        assert!(Run::default().validate().is_ok());
    }

    #[test]
    fn test_grid_closure_rules() {
        let mut grid = Grid::new("GLOB", GridType::Rect, CoordSystem::Spherical);
        grid.clos = Some(ClosureType::Simple);
        assert!(grid.validate().is_ok());

        grid.coord = CoordSystem::Cartesian;
        assert!(grid.validate().is_err());

        let mut tripole = Grid::new("ARC", GridType::Rect, CoordSystem::Spherical);
        tripole.clos = Some(ClosureType::Tripole);
        assert!(tripole.validate().is_err());
        tripole.grid_type = GridType::Curv;
        assert!(tripole.validate().is_ok());

        let mut unst = Grid::new("MESH", GridType::Unst, CoordSystem::Spherical);
        unst.clos = Some(ClosureType::Simple);
        assert!(unst.validate().is_err());
    }

    #[test]
    fn test_grid_name_and_depth_limits() {
        assert!(Grid::new("", GridType::Rect, CoordSystem::Spherical)
            .validate()
            .is_err());
        assert!(Grid::new("x".repeat(31), GridType::Rect, CoordSystem::Spherical)
            .validate()
            .is_err());
        let mut grid = Grid::new("G", GridType::Rect, CoordSystem::Spherical);
        grid.zlim = Some(0.5);
        assert!(grid.validate().is_err());
        grid.zlim = Some(-0.1);
        grid.dmin = Some(-2.0);
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_grid_renders_canonical_tokens() {
        let grid_type = GridType::normalize("rect").unwrap();
        let grid = Grid::new("GLOB_30M", grid_type, CoordSystem::Spherical);
        let text = grid.render();
        assert!(text.contains("GRID%NAME = 'GLOB_30M'"));
        assert!(text.contains("GRID%TYPE = 'RECT'"));
        assert!(text.contains("GRID%COORD = 'SPHE'"));
    }

    #[test]
    fn test_curv_renders_nested_paths() {
        let curv = Curv {
            nx: 10,
            ny: 12,
            xcoord: FileSpec::new("lon.inp").with_scale(0.25).with_unit(21),
            ycoord: FileSpec::new("lat.inp").with_format("(....)"),
        };
        curv.validate().unwrap();
        let text = curv.render();
        assert!(text.contains("CURV%XCOORD%SF = 0.25"));
        assert!(text.contains("CURV%XCOORD%FILENAME = 'lon.inp'"));
        assert!(text.contains("CURV%XCOORD%IDF = 21"));
        assert!(text.contains("CURV%YCOORD%IDFM = 2"));
        assert!(text.contains("CURV%YCOORD%FORMAT = '(....)'"));
    }

    #[test]
    fn test_file_spec_rules() {
        let mut file = FileSpec::new("lon.inp");
        file.format = Some("(....)".to_string());
        let err = Curv {
            nx: 2,
            ny: 2,
            xcoord: file,
            ycoord: FileSpec::new("lat.inp"),
        }
        .validate()
        .unwrap_err();
        match err {
            Ww3Error::Validation { block, fields, .. } => {
                assert_eq!(block, "CURV_NML");
                assert!(fields.contains(&"XCOORD%FORMAT".to_string()));
            }
            other => panic!("unexpected: {other}"),
        }
        assert!(Depth(FileSpec::new("")).validate().is_err());
        assert!(Depth(FileSpec::new("d.inp").with_scale(0.0)).validate().is_err());
        assert!(Mask(FileSpec::new("m.inp").with_scale(1.0)).validate().is_err());
        assert!(Mask(FileSpec::new("m.inp")).validate().is_ok());
    }

    #[test]
    fn test_unst_and_depth_render() {
        let unst = Unst {
            mesh: FileSpec::new("mesh.msh").with_scale(-1.0).with_unit(20),
            ugobcfile: Some("obc.list".to_string()),
        };
        unst.validate().unwrap();
        let text = unst.render();
        assert!(text.starts_with("&UNST_NML\n"));
        assert!(text.contains("UNST%SF = -1.0"));
        assert!(text.contains("UNST%FILENAME = 'mesh.msh'"));
        assert!(text.contains("UNST%UGOBCFILE = 'obc.list'"));

        let depth = Depth(FileSpec::new("depth.inp").with_scale(0.001));
        assert!(depth.render().contains("DEPTH%SF = 0.001"));
    }

    #[test]
    fn test_smc_arctic_files_all_or_none() {
        let file = |name: &str| FileSpec::new(name);
        let mut smc = Smc {
            mcels: file("cels.dat"),
            iside: file("iside.dat"),
            jside: file("jside.dat"),
            subtr: file("subtr.dat"),
            obstr: file("obstr.dat"),
            bundy: file("bundy.dat"),
            mbarc: Some(file("mbarc.dat")),
            aisid: None,
            ajsid: None,
        };
        assert!(smc.validate().is_err());
        smc.mbarc = None;
        smc.validate().unwrap();
        assert!(smc.render().contains("SMC%MCELS%FILENAME = 'cels.dat'"));
        assert!(!smc.render().contains("MBARC"));
    }

    #[test]
    fn test_rect_rules() {
        let rect = Rect {
            nx: 360,
            ny: 181,
            sx: 1.0,
            sy: 1.0,
            sf: None,
            x0: 0.0,
            y0: -90.0,
            sf0: Some(1.0),
        };
        rect.validate().unwrap();
        assert!(rect.render().contains("RECT%Y0 = -90.0"));
        assert!(Rect { sx: 0.0, ..rect.clone() }.validate().is_err());
        assert!(Rect { nx: 0, ..rect.clone() }.validate().is_err());
        assert!(Rect { sf: Some(0.0), ..rect }.validate().is_err());
    }
}
