// ww3rs/src/config/period.rs

use crate::components::Components;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use ww3nml::{Domain, Namelist, OutputDate, OutputKind, OutputType, OutputWindow, Validated, Ww3Date};

/// Simulated period of a run.
///
/// `interval` accepts seconds or a humantime string (`"1h"`, `"30m"`) and
/// becomes the stride of any gridded output window the run does not set
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunPeriod {
    pub start: Ww3Date,
    pub end: Ww3Date,
    #[serde(default, with = "ww3nml::validators::stride::option")]
    pub interval: Option<u64>,
}

impl RunPeriod {
    pub fn new(start: Ww3Date, end: Ww3Date) -> anyhow::Result<Self> {
        let period = Self {
            start,
            end,
            interval: None,
        };
        period.validate()?;
        Ok(period)
    }

    pub fn with_interval(mut self, seconds: u64) -> anyhow::Result<Self> {
        self.interval = Some(seconds);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.start >= self.end {
            anyhow::bail!(
                "Run period must end after it starts, got {} .. {}",
                self.start,
                self.end
            );
        }
        if self.interval == Some(0) {
            anyhow::bail!("Run period interval must be > 0");
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        let seconds = (self.end.as_datetime() - self.start.as_datetime()).num_seconds();
        Duration::from_secs(seconds.max(0) as u64)
    }

    /// Fill what the components leave open: Domain start/stop of the shell
    /// and multi-grid drivers and, with an interval, their FIELD output
    /// window. Blocks that set a value keep it.
    pub fn apply(&self, components: &mut Components) -> anyhow::Result<()> {
        self.validate()?;
        if let Some(shel) = components.shel.as_mut() {
            shel.domain = Some(self.fill_domain(shel.domain.take()).context("ww3_shel DOMAIN_NML")?);
            shel.output_date = self
                .fill_field_window(shel.output_type.as_ref(), shel.output_date.take())
                .context("ww3_shel OUTPUT_DATE_NML")?;
        }
        if let Some(multi) = components.multi.as_mut() {
            multi.domain =
                Some(self.fill_domain(multi.domain.take()).context("ww3_multi DOMAIN_NML")?);
            multi.output_date = self
                .fill_field_window(multi.output_type.as_ref(), multi.output_date.take())
                .context("ww3_multi OUTPUT_DATE_NML")?;
        }
        Ok(())
    }

    fn fill_domain(&self, domain: Option<Validated<Domain>>) -> ww3nml::Result<Validated<Domain>> {
        match domain {
            Some(domain) => domain.modify(|d| {
                d.start.get_or_insert(self.start);
                d.stop.get_or_insert(self.end);
            }),
            None => Domain::period(self.start, self.end).validated(),
        }
    }

    fn fill_field_window(
        &self,
        output_type: Option<&Validated<OutputType>>,
        output_date: Option<Validated<OutputDate>>,
    ) -> ww3nml::Result<Option<Validated<OutputDate>>> {
        let Some(interval) = self.interval else {
            return Ok(output_date);
        };
        let wants_field = output_type
            .map(|t| t.kinds().contains(&OutputKind::Field))
            .unwrap_or(false);
        if !wants_field {
            return Ok(output_date);
        }
        let window = OutputWindow::new(self.start, interval, self.end);
        match output_date {
            Some(dates) if dates.window(OutputKind::Field).is_some() => Ok(Some(dates)),
            Some(dates) => dates
                .modify(|d| {
                    d.windows.insert(OutputKind::Field, window);
                })
                .map(Some),
            None => OutputDate::default()
                .with(OutputKind::Field, window)
                .validated()
                .map(Some),
        }
    }
}

impl fmt::Display for RunPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)?;
        if let Some(interval) = self.interval {
            write!(
                f,
                " every {}",
                humantime::format_duration(Duration::from_secs(interval))
            )?;
        }
        Ok(())
    }
}
