// ww3nml/src/blocks/boundary.rs

//! Active boundary, excluded point and output boundary line definitions of
//! `ww3_grid.nml`. Each list comes with a count block; matching the two is a
//! composition-level check.

use crate::blocks::Namelist;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::ensure_finite;
use crate::value::NmlValue;
use serde::{Deserialize, Serialize};

/// One `IX IY CONNECT` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
    /// Connect to the previous point, filling the segment in between
    #[serde(default)]
    pub connect: bool,
}

impl GridPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            connect: false,
        }
    }

    pub fn connected(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            connect: true,
        }
    }

    fn record(&self) -> NmlValue {
        NmlValue::Record(vec![self.x.into(), self.y.into(), self.connect.into()])
    }
}

fn validate_point_list(block: &str, points: &[GridPoint]) -> Result<()> {
    if points.is_empty() {
        return Err(Ww3Error::validation(block, &["POINTS"], "point list is empty"));
    }
    if let Some(i) = points.iter().position(|p| p.x == 0 || p.y == 0) {
        let index = format!("({})", i + 1);
        return Err(Ww3Error::validation(
            block,
            &[index.as_str()],
            "grid indices start at 1",
        ));
    }
    if points[0].connect {
        return Err(Ww3Error::validation(
            block,
            &["(1)"],
            "the first point cannot be connected to a previous one",
        ));
    }
    Ok(())
}

macro_rules! count_block {
    ($(#[$meta:meta])* $ty:ident, $group:literal, $prefix:literal, { $($field:ident => $name:literal),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $ty {
            $(pub $field: u32),+
        }

        impl Namelist for $ty {
            const GROUP: &'static str = $group;

            fn validate(&self) -> Result<()> {
                Ok(())
            }

            fn to_group(&self) -> NamelistGroup {
                let mut group = NamelistGroup::new(Self::GROUP, $prefix);
                $(group.set($name, self.$field);)+
                group
            }
        }
    };
}

count_block!(
    /// Number of active boundary points.
    InboundCount, "INBND_COUNT_NML", "INBND_COUNT", { n_point => "N_POINT" }
);
count_block!(
    /// Number of excluded points and excluded bodies.
    ExcludedCount, "EXCL_COUNT_NML", "EXCL_COUNT", { n_point => "N_POINT", n_body => "N_BODY" }
);
count_block!(
    /// Number of output boundary lines.
    OutboundCount, "OUTBND_COUNT_NML", "OUTBND_COUNT", { n_line => "N_LINE" }
);

/// Active boundary points, `INBND_POINT(i) = IX IY CONNECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundPoints(pub Vec<GridPoint>);

impl Namelist for InboundPoints {
    const GROUP: &'static str = "INBND_POINT_NML";

    fn validate(&self) -> Result<()> {
        validate_point_list(Self::GROUP, &self.0)
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "INBND_POINT");
        for (i, point) in self.0.iter().enumerate() {
            group.set_indexed(i + 1, point.record());
        }
        group
    }
}

/// Excluded points, `EXCL_POINT(i) = IX IY CONNECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludedPoints(pub Vec<GridPoint>);

impl Namelist for ExcludedPoints {
    const GROUP: &'static str = "EXCL_POINT_NML";

    fn validate(&self) -> Result<()> {
        validate_point_list(Self::GROUP, &self.0)
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "EXCL_POINT");
        for (i, point) in self.0.iter().enumerate() {
            group.set_indexed(i + 1, point.record());
        }
        group
    }
}

/// Seed points of excluded bodies, `EXCL_BODY(i) = IX IY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludedBodies(pub Vec<GridPoint>);

impl Namelist for ExcludedBodies {
    const GROUP: &'static str = "EXCL_BODY_NML";

    fn validate(&self) -> Result<()> {
        validate_point_list(Self::GROUP, &self.0)?;
        if let Some(i) = self.0.iter().position(|p| p.connect) {
            let index = format!("({})", i + 1);
            return Err(Ww3Error::validation(
                Self::GROUP,
                &[index.as_str()],
                "body seed points cannot be connected",
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "EXCL_BODY");
        for (i, point) in self.0.iter().enumerate() {
            group.set_indexed(i + 1, vec![point.x, point.y]);
        }
        group
    }
}

/// Straight output boundary line, `OUTBND_LINE(i) = X0 Y0 DX DY NP`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutboundLine {
    pub x0: f64,
    pub y0: f64,
    pub dx: f64,
    pub dy: f64,
    /// Number of points on the line
    pub np: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboundLines(pub Vec<OutboundLine>);

impl Namelist for OutboundLines {
    const GROUP: &'static str = "OUTBND_LINE_NML";

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Ww3Error::validation(Self::GROUP, &["LINES"], "line list is empty"));
        }
        for (i, line) in self.0.iter().enumerate() {
            let index = format!("({})", i + 1);
            for value in [line.x0, line.y0, line.dx, line.dy] {
                ensure_finite(Self::GROUP, &index, value)?;
            }
            if line.np < 1 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &[index.as_str()],
                    "a boundary line needs at least one point",
                ));
            }
            if line.np > 1 && line.dx == 0.0 && line.dy == 0.0 {
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &[index.as_str()],
                    format!("{} points with a zero increment collapse onto one", line.np),
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "OUTBND_LINE");
        for (i, line) in self.0.iter().enumerate() {
            group.set_indexed(
                i + 1,
                vec![
                    NmlValue::from(line.x0),
                    line.y0.into(),
                    line.dx.into(),
                    line.dy.into(),
                    line.np.into(),
                ],
            );
        }
        group
    }
}
