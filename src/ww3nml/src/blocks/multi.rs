// ww3nml/src/blocks/multi.rs

//! Grid lists of the multi-grid driver (`ww3_multi.nml`).

use crate::blocks::Namelist;
use crate::enums::ForcingChannel;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::ensure_not_blank;
use crate::value::NmlValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Forcing sources of a model grid that do not name an input grid.
pub const NATIVE_SOURCE: &str = "native";
pub const NO_SOURCE: &str = "no";

fn ensure_unique_names<'a, I>(block: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for (i, name) in names.into_iter().enumerate() {
        let field = format!("({})%NAME", i + 1);
        ensure_not_blank(block, &field, name)?;
        if !seen.insert(name.trim().to_lowercase()) {
            return Err(Ww3Error::validation(
                block,
                &[field.as_str()],
                format!("grid name {:?} is used twice", name),
            ));
        }
    }
    Ok(())
}

/// An input-only grid and the fields it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputGrid {
    pub name: String,
    #[serde(default)]
    pub forcing: BTreeMap<ForcingChannel, bool>,
}

/// `INPUT_GRID_NML`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputGrids(pub Vec<InputGrid>);

impl InputGrids {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|grid| grid.name.as_str()).collect()
    }
}

impl Namelist for InputGrids {
    const GROUP: &'static str = "INPUT_GRID_NML";

    fn validate(&self) -> Result<()> {
        ensure_unique_names(Self::GROUP, self.names())?;
        for (i, grid) in self.0.iter().enumerate() {
            if let Some(channel) = grid.forcing.keys().find(|c| !c.is_shell_input()) {
                let field = format!("({})%FORCING%{}", i + 1, channel);
                return Err(Ww3Error::validation(
                    Self::GROUP,
                    &[field.as_str()],
                    "channel cannot be provided by an input grid",
                ));
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "INPUT");
        for (i, grid) in self.0.iter().enumerate() {
            group.set_element(i + 1, "NAME", &grid.name);
            for (channel, enabled) in &grid.forcing {
                group.set_element(i + 1, &format!("FORCING%{}", channel), *enabled);
            }
        }
        group
    }
}

/// Process allocation of one model grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelResource {
    pub rank_id: u32,
    pub group_id: u32,
    /// Fraction of the communicator used, as `[lower, upper]`
    pub comm_frac: [f64; 2],
    pub bound_flag: bool,
}

impl Default for ModelResource {
    fn default() -> Self {
        Self {
            rank_id: 1,
            group_id: 1,
            comm_frac: [0.0, 1.0],
            bound_flag: false,
        }
    }
}

/// A model grid with the source of each forcing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelGrid {
    pub name: String,
    /// `native`, `no`, or the name of an input grid
    #[serde(default)]
    pub forcing: BTreeMap<ForcingChannel, String>,
    pub resource: Option<ModelResource>,
}

impl ModelGrid {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            forcing: BTreeMap::new(),
            resource: None,
        }
    }

    /// Forcing sources that name an input grid.
    pub fn input_references(&self) -> Vec<(ForcingChannel, &str)> {
        self.forcing
            .iter()
            .filter(|(_, source)| {
                let source = source.trim();
                !source.eq_ignore_ascii_case(NATIVE_SOURCE) && !source.eq_ignore_ascii_case(NO_SOURCE)
            })
            .map(|(channel, source)| (*channel, source.trim()))
            .collect()
    }
}

/// `MODEL_GRID_NML`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelGrids(pub Vec<ModelGrid>);

impl ModelGrids {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|grid| grid.name.as_str()).collect()
    }
}

impl Namelist for ModelGrids {
    const GROUP: &'static str = "MODEL_GRID_NML";

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Ww3Error::validation(Self::GROUP, &["MODEL"], "no model grids"));
        }
        ensure_unique_names(Self::GROUP, self.names())?;
        for (i, grid) in self.0.iter().enumerate() {
            let index = i + 1;
            for (channel, source) in &grid.forcing {
                let field = format!("({})%FORCING%{}", index, channel);
                ensure_not_blank(Self::GROUP, &field, source)?;
            }
            if let Some(resource) = &grid.resource {
                let field = format!("({})%RESOURCE", index);
                let [lo, hi] = resource.comm_frac;
                if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &[field.as_str()],
                        format!("communicator fraction {}..{} must satisfy 0 <= lo < hi <= 1", lo, hi),
                    ));
                }
                if resource.rank_id < 1 || resource.group_id < 1 {
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &[field.as_str()],
                        "rank and group ids start at 1",
                    ));
                }
            }
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "MODEL");
        for (i, grid) in self.0.iter().enumerate() {
            let index = i + 1;
            group.set_element(index, "NAME", &grid.name);
            for (channel, source) in &grid.forcing {
                group.set_element(index, &format!("FORCING%{}", channel), source.trim());
            }
            if let Some(resource) = &grid.resource {
                group.set_element(
                    index,
                    "RESOURCE",
                    vec![
                        NmlValue::from(resource.rank_id),
                        resource.group_id.into(),
                        resource.comm_frac[0].into(),
                        resource.comm_frac[1].into(),
                        resource.bound_flag.into(),
                    ],
                );
            }
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wind_input() -> InputGrid {
        InputGrid {
            name: "wind".into(),
            forcing: BTreeMap::from([(ForcingChannel::Winds, true)]),
        }
    }

    #[test]
    fn test_input_grids_render() {
        let grids = InputGrids(vec![wind_input()]);
        grids.validate().unwrap();
        assert_eq!(
            grids.render(),
            "&INPUT_GRID_NML\nINPUT(1)%NAME = 'wind'\nINPUT(1)%FORCING%WINDS = T\n/\n"
        );
    }

    #[test]
    fn test_names_must_be_unique() {
        let grids = InputGrids(vec![wind_input(), wind_input()]);
        let msg = grids.validate().unwrap_err().to_string();
        assert!(msg.contains("(2)%NAME"));

        let models = ModelGrids(vec![ModelGrid::new("grd1"), ModelGrid::new("GRD1")]);
        assert!(models.validate().is_err());
        assert!(ModelGrids::default().validate().is_err());
    }

    #[test]
    fn test_model_grid_render_and_references() {
        let mut grid = ModelGrid::new("coarse");
        grid.forcing.insert(ForcingChannel::Winds, "wind".into());
        grid.forcing.insert(ForcingChannel::WaterLevels, "native".into());
        grid.resource = Some(ModelResource {
            comm_frac: [0.0, 0.5],
            ..Default::default()
        });
        let models = ModelGrids(vec![grid.clone()]);
        models.validate().unwrap();
        let text = models.render();
        assert!(text.contains("MODEL(1)%FORCING%WINDS = 'wind'"));
        assert!(text.contains("MODEL(1)%FORCING%WATER_LEVELS = 'native'"));
        assert!(text.contains("MODEL(1)%RESOURCE = 1 1 0.0 0.5 F"));
        assert_eq!(grid.input_references(), vec![(ForcingChannel::Winds, "wind")]);
    }

    #[test]
    fn test_comm_fraction_bounds() {
        let mut grid = ModelGrid::new("g");
        grid.resource = Some(ModelResource {
            comm_frac: [0.6, 0.4],
            ..Default::default()
        });
        assert!(ModelGrids(vec![grid.clone()]).validate().is_err());
        grid.resource = Some(ModelResource {
            comm_frac: [0.0, 1.5],
            ..Default::default()
        });
        assert!(ModelGrids(vec![grid]).validate().is_err());
    }
}
