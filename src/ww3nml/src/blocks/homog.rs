// ww3nml/src/blocks/homog.rs

//! Homogeneous (spatially constant) forcing records.

use crate::blocks::Namelist;
use crate::enums::HomogName;
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use crate::validators::{ensure_finite, Ww3Date};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `HOMOG_COUNT_NML`: declared number of records per input name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomogCount(pub BTreeMap<HomogName, u32>);

impl HomogCount {
    pub fn with(mut self, name: HomogName, count: u32) -> Self {
        self.0.insert(name, count);
        self
    }

    /// Declared count, zero when absent.
    pub fn count(&self, name: HomogName) -> u32 {
        self.0.get(&name).copied().unwrap_or(0)
    }
}

impl Namelist for HomogCount {
    const GROUP: &'static str = "HOMOG_COUNT_NML";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "HOMOG_COUNT");
        for (name, count) in &self.0 {
            group.set(&name.count_field(), *count);
        }
        group
    }
}

/// One time-tagged homogeneous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomogInput {
    pub name: HomogName,
    pub date: Ww3Date,
    pub value1: Option<f64>,
    pub value2: Option<f64>,
    pub value3: Option<f64>,
}

impl HomogInput {
    pub fn new(name: HomogName, date: Ww3Date, values: &[f64]) -> Self {
        Self {
            name,
            date,
            value1: values.first().copied(),
            value2: values.get(1).copied(),
            value3: values.get(2).copied(),
        }
    }

    fn values(&self) -> [Option<f64>; 3] {
        [self.value1, self.value2, self.value3]
    }
}

/// `HOMOG_INPUT_NML`: the records, rendered as `HOMOG_INPUT(i)%...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomogInputs(pub Vec<HomogInput>);

impl HomogInputs {
    /// Number of records per name.
    pub fn counts(&self) -> BTreeMap<HomogName, u32> {
        let mut counts = BTreeMap::new();
        for input in &self.0 {
            *counts.entry(input.name).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, name: HomogName) -> u32 {
        self.0.iter().filter(|input| input.name == name).count() as u32
    }
}

impl Namelist for HomogInputs {
    const GROUP: &'static str = "HOMOG_INPUT_NML";

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Ww3Error::validation(
                Self::GROUP,
                &["HOMOG_INPUT"],
                "no homogeneous records",
            ));
        }

        let mut last_date: BTreeMap<HomogName, Ww3Date> = BTreeMap::new();
        for (i, input) in self.0.iter().enumerate() {
            let index = i + 1;
            let required = input.name.required_values();
            for (n, value) in input.values().iter().enumerate() {
                let field = format!("({})%VALUE{}", index, n + 1);
                match value {
                    Some(v) => ensure_finite(Self::GROUP, &field, *v)?,
                    None if n < required => {
                        return Err(Ww3Error::validation(
                            Self::GROUP,
                            &[field.as_str()],
                            format!("{} records need {} values", input.name, required),
                        ));
                    }
                    None => {}
                }
            }

            if let Some(previous) = last_date.get(&input.name) {
                if input.date <= *previous {
                    let field = format!("({})%DATE", index);
                    return Err(Ww3Error::validation(
                        Self::GROUP,
                        &[field.as_str()],
                        format!(
                            "{} record dates must increase: {} follows {}",
                            input.name, input.date, previous
                        ),
                    ));
                }
            }
            last_date.insert(input.name, input.date);
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "HOMOG_INPUT");
        for (i, input) in self.0.iter().enumerate() {
            let index = i + 1;
            group
                .set_element(index, "NAME", input.name)
                .set_element(index, "DATE", input.date)
                .set_element_opt(index, "VALUE1", input.value1)
                .set_element_opt(index, "VALUE2", input.value2)
                .set_element_opt(index, "VALUE3", input.value3);
        }
        group
    }
}
