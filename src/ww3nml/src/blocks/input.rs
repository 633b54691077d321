// ww3nml/src/blocks/input.rs

use crate::blocks::Namelist;
use crate::enums::{ForcingChannel, ForcingFlag};
use crate::error::{Result, Ww3Error};
use crate::group::NamelistGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data assimilation inputs of the shell. WW3 only reads these as on/off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputAssim {
    pub mean: Option<bool>,
    pub spec1d: Option<bool>,
    pub spec2d: Option<bool>,
}

impl InputAssim {
    fn entries(&self) -> [(&'static str, Option<bool>); 3] {
        [
            ("MEAN", self.mean),
            ("SPEC1D", self.spec1d),
            ("SPEC2D", self.spec2d),
        ]
    }
}

/// `INPUT_NML`: how the single-grid shell obtains each forcing channel.
///
/// Channels are kept in a map keyed by [`ForcingChannel`], so the render order
/// is the channel declaration order whatever order they were set in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    #[serde(default)]
    pub forcing: BTreeMap<ForcingChannel, ForcingFlag>,
    #[serde(default)]
    pub assim: InputAssim,
}

impl Input {
    pub fn with(mut self, channel: ForcingChannel, flag: ForcingFlag) -> Self {
        self.forcing.insert(channel, flag);
        self
    }

    /// Flag of `channel`; unset channels are disabled.
    pub fn flag(&self, channel: ForcingChannel) -> ForcingFlag {
        self.forcing.get(&channel).copied().unwrap_or_default()
    }

    /// Channels set to `flag`, in render order.
    pub fn channels_with(&self, flag: ForcingFlag) -> Vec<ForcingChannel> {
        self.forcing
            .iter()
            .filter(|(_, f)| **f == flag)
            .map(|(channel, _)| *channel)
            .collect()
    }
}

impl Namelist for Input {
    const GROUP: &'static str = "INPUT_NML";

    fn validate(&self) -> Result<()> {
        let unsupported: Vec<String> = self
            .forcing
            .keys()
            .filter(|channel| !channel.is_shell_input())
            .map(|channel| format!("FORCING%{}", channel))
            .collect();
        if !unsupported.is_empty() {
            let fields: Vec<&str> = unsupported.iter().map(String::as_str).collect();
            return Err(Ww3Error::validation(
                Self::GROUP,
                &fields,
                "channel is not read by the shell",
            ));
        }
        Ok(())
    }

    fn to_group(&self) -> NamelistGroup {
        let mut group = NamelistGroup::new(Self::GROUP, "INPUT");
        for (channel, flag) in &self.forcing {
            group.set(&format!("FORCING%{}", channel), *flag);
        }
        for (name, value) in self.assim.entries() {
            group.set_opt(&format!("ASSIM%{}", name), value.map(ForcingFlag::from));
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_ignores_insertion_order() {
        let a = Input::default()
            .with(ForcingChannel::Winds, ForcingFlag::File)
            .with(ForcingChannel::WaterLevels, ForcingFlag::Homogeneous);
        let b = Input::default()
            .with(ForcingChannel::WaterLevels, ForcingFlag::Homogeneous)
            .with(ForcingChannel::Winds, ForcingFlag::File);
        assert_eq!(a.render(), b.render());
        assert_eq!(
            a.render(),
            "&INPUT_NML\nINPUT%FORCING%WATER_LEVELS = 'H'\nINPUT%FORCING%WINDS = 'T'\n/\n"
        );
    }

    #[test]
    fn test_non_shell_channels_rejected() {
        let input = Input::default().with(ForcingChannel::WindsAst, ForcingFlag::File);
        let msg = input.validate().unwrap_err().to_string();
        assert!(msg.contains("FORCING%WINDS_AST"));
    }

    #[test]
    fn test_assimilation_renders_as_flags() {
        let input = Input {
            assim: InputAssim {
                mean: Some(true),
                spec1d: Some(false),
                spec2d: None,
            },
            ..Default::default()
        };
        let text = input.render();
        assert!(text.contains("INPUT%ASSIM%MEAN = 'T'"));
        assert!(text.contains("INPUT%ASSIM%SPEC1D = 'F'"));
        assert!(!text.contains("SPEC2D"));
    }

    #[test]
    fn test_deserialize_mixed_spellings() {
        let input: Input = serde_json::from_str(
            r#"{"forcing": {"winds": true, "ice_conc": "h", "currents": "C"}}"#,
        )
        .unwrap();
        assert_eq!(input.flag(ForcingChannel::Winds), ForcingFlag::File);
        assert_eq!(input.flag(ForcingChannel::IceConc), ForcingFlag::Homogeneous);
        assert_eq!(input.flag(ForcingChannel::Currents), ForcingFlag::Coupled);
        assert_eq!(input.flag(ForcingChannel::AirDensity), ForcingFlag::Disabled);
        assert_eq!(
            input.channels_with(ForcingFlag::Homogeneous),
            vec![ForcingChannel::IceConc]
        );
    }
}
