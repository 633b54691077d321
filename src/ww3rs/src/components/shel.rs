// ww3rs/src/components/shel.rs

use crate::components::{slot, Component, Program};
use serde::{Deserialize, Serialize};
use ww3nml::{
    Composition, Domain, HomogCount, HomogInputs, Input, InputGrids, ModelGrids, OutputDate,
    OutputScope, OutputType, Validated,
};

/// `ww3_shel`: single-grid model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShelComponent {
    pub domain: Option<Validated<Domain>>,
    pub input: Option<Validated<Input>>,
    pub output_type: Option<Validated<OutputType>>,
    pub output_date: Option<Validated<OutputDate>>,
    pub homog_count: Option<Validated<HomogCount>>,
    pub homog_input: Option<Validated<HomogInputs>>,
}

impl Component for ShelComponent {
    const PROGRAM: Program = Program::Shel;

    fn composition(&self) -> Composition {
        let output_type = self.output_type.as_ref().map(|t| t.scoped(OutputScope::Grid));
        let output_date = self.output_date.as_ref().map(|d| d.scoped(OutputScope::Grid));
        Composition::compose([
            slot("domain.nml", self.domain.as_ref()),
            slot("input.nml", self.input.as_ref()),
            slot("output_type.nml", output_type.as_ref()),
            slot("output_date.nml", output_date.as_ref()),
            slot("homog_count.nml", self.homog_count.as_ref()),
            slot("homog_input.nml", self.homog_input.as_ref()),
        ])
    }
}

/// `ww3_multi`: mosaic of model grids fed by input grids.
///
/// Output requests apply to every model grid and always render as
/// `ALLTYPE`/`ALLDATE`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiComponent {
    pub domain: Option<Validated<Domain>>,
    pub input_grid: Option<Validated<InputGrids>>,
    pub model_grid: Option<Validated<ModelGrids>>,
    pub output_type: Option<Validated<OutputType>>,
    pub output_date: Option<Validated<OutputDate>>,
    pub homog_count: Option<Validated<HomogCount>>,
    pub homog_input: Option<Validated<HomogInputs>>,
}

impl Component for MultiComponent {
    const PROGRAM: Program = Program::Multi;

    fn composition(&self) -> Composition {
        let output_type = self.output_type.as_ref().map(|t| t.scoped(OutputScope::All));
        let output_date = self.output_date.as_ref().map(|d| d.scoped(OutputScope::All));
        Composition::compose([
            slot("domain.nml", self.domain.as_ref()),
            slot("input_grid.nml", self.input_grid.as_ref()),
            slot("model_grid.nml", self.model_grid.as_ref()),
            slot("output_type.nml", output_type.as_ref()),
            slot("output_date.nml", output_date.as_ref()),
            slot("homog_count.nml", self.homog_count.as_ref()),
            slot("homog_input.nml", self.homog_input.as_ref()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww3nml::{ForcingChannel, ModelGrid, Namelist, OutputKind, OutputWindow};

    fn field_output(scope: OutputScope) -> (Validated<OutputType>, Validated<OutputDate>) {
        let window = OutputWindow::new(
            "20230101 000000".parse().unwrap(),
            3600,
            "20230102 000000".parse().unwrap(),
        );
        (
            OutputType {
                scope,
                field: Some(vec!["HS".into()]),
                ..Default::default()
            }
            .validated()
            .unwrap(),
            OutputDate {
                scope,
                ..Default::default()
            }
            .with(OutputKind::Field, window)
            .validated()
            .unwrap(),
        )
    }

    #[test]
    fn test_shel_keys_are_fixed() {
        let composition = ShelComponent::default().composition();
        assert_eq!(composition.len(), 6);
        assert_eq!(composition.present().count(), 0);
        assert!(composition.contains_key("homog_input.nml"));
    }

    #[test]
    fn test_multi_grid_count_checked() {
        let mut grid = ModelGrid::new("glob");
        grid.forcing.insert(ForcingChannel::Winds, "native".into());
        let multi = MultiComponent {
            domain: Some(
                Domain {
                    nrgrd: Some(2),
                    ..Default::default()
                }
                .validated()
                .unwrap(),
            ),
            model_grid: Some(ModelGrids(vec![grid]).validated().unwrap()),
            ..Default::default()
        };
        let findings = multi.composition().validate_consistency();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].keys, vec!["domain.nml", "model_grid.nml"]);
    }

    #[test]
    fn test_multi_output_renders_for_all_grids() {
        let (output_type, output_date) = field_output(OutputScope::Grid);
        let multi = MultiComponent {
            output_type: Some(output_type),
            output_date: Some(output_date),
            ..Default::default()
        };
        let text = multi.composition().render_combined();
        assert!(text.contains("ALLTYPE%FIELD%LIST = 'HS'"));
        assert!(text.contains("ALLDATE%FIELD%STRIDE = '3600'"));
        assert!(!text.contains("\nTYPE%"));
        assert!(!text.contains("\nDATE%"));
    }

    #[test]
    fn test_shel_output_renders_for_its_grid() {
        let (output_type, output_date) = field_output(OutputScope::All);
        let shel = ShelComponent {
            output_type: Some(output_type),
            output_date: Some(output_date),
            ..Default::default()
        };
        let text = shel.composition().render_combined();
        assert!(text.contains("\nTYPE%FIELD%LIST = 'HS'"));
        assert!(text.contains("\nDATE%FIELD%START = '20230101 000000'"));
        assert!(!text.contains("ALLTYPE"));
        assert!(!text.contains("ALLDATE"));
    }
}
