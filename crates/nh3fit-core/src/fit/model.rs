//! Multi-component spectral model evaluated during fitting.

use crate::domain::{
    ModelError, ModelParameter, ModelResult, ParameterSlot, PhysicalParameters, SpectralAxis,
};
use crate::physics::synthesize;

/// Sum of independently synthesized velocity components on a shared axis.
///
/// Each component owns six consecutive slots of the flat parameter vector.
/// Components do not interact radiatively; their brightness spectra add.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiComponentModel {
    slots: Vec<ParameterSlot>,
}

impl MultiComponentModel {
    pub fn new(component_count: usize) -> Self {
        let mut slots = Vec::with_capacity(component_count * ModelParameter::COUNT);
        for component in 0..component_count {
            for parameter in ModelParameter::ALL {
                slots.push(ParameterSlot::new(parameter, component));
            }
        }
        Self { slots }
    }

    pub fn from_slots(slots: Vec<ParameterSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    pub fn component_count(&self) -> usize {
        self.slots.len() / ModelParameter::COUNT
    }

    /// Physical parameters of one component, read from the flat vector by
    /// slot kind rather than by position.
    pub fn component_parameters(
        &self,
        values: &[f64],
        component: usize,
    ) -> ModelResult<PhysicalParameters> {
        self.validate(values)?;

        let mut parameters = PhysicalParameters::default();
        for (slot, &value) in self.slots.iter().zip(values) {
            if slot.component != component {
                continue;
            }
            match slot.parameter {
                ModelParameter::Tkin => parameters.kinetic_temperature = value,
                ModelParameter::Tex => parameters.excitation_temperature = Some(value),
                ModelParameter::Ntot => parameters.total_column = value,
                ModelParameter::Width => parameters.line_width = value,
                ModelParameter::XoffV => parameters.velocity_offset = value,
                ModelParameter::Fortho => parameters.ortho_fraction = value,
            }
        }
        parameters.fixed_tau11 = None;
        parameters.filling_fraction = None;

        Ok(parameters)
    }

    /// Evaluate the summed model spectrum for the flat parameter vector.
    pub fn evaluate(&self, axis: &SpectralAxis, values: &[f64]) -> ModelResult<Vec<f64>> {
        self.validate(values)?;

        let mut spectrum = vec![0.0f64; axis.len()];
        for component in 0..self.component_count() {
            let parameters = self.component_parameters(values, component)?;
            let component_spectrum = synthesize(axis, &parameters, false)?;
            for (total, value) in spectrum.iter_mut().zip(&component_spectrum) {
                *total += value;
            }
        }

        Ok(spectrum)
    }

    fn validate(&self, values: &[f64]) -> ModelResult<()> {
        if values.len() != self.slots.len() {
            return Err(ModelError::LengthMismatch {
                values: values.len(),
                slots: self.slots.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MultiComponentModel;
    use crate::common::constants::CKMS;
    use crate::domain::{ModelError, SpectralAxis, Transition};
    use crate::numerics::linear_grid;
    use crate::physics::synthesize;

    fn oneone_axis(samples: usize, half_width_kms: f64) -> SpectralAxis {
        let center = crate::catalog::record(Transition::OneOne).rest_frequency / 1.0e9;
        let half_width = center * half_width_kms / CKMS;
        let values =
            linear_grid(center - half_width, center + half_width, samples).expect("axis grid");
        SpectralAxis::ghz(values)
    }

    #[test]
    fn parameter_vector_length_is_validated() {
        let model = MultiComponentModel::new(2);
        let axis = oneone_axis(21, 10.0);
        let error = model
            .evaluate(&axis, &[20.0, 15.0, 14.0, 1.0, 0.0, 0.5])
            .expect_err("short vector should fail");
        assert_eq!(error, ModelError::LengthMismatch { values: 6, slots: 12 });
    }

    #[test]
    fn single_component_matches_direct_synthesis() {
        let model = MultiComponentModel::new(1);
        let axis = oneone_axis(101, 20.0);
        let values = [20.0, 15.0, 14.0, 1.0, 0.0, 0.5];

        let from_model = model.evaluate(&axis, &values).expect("model");
        let parameters = model
            .component_parameters(&values, 0)
            .expect("component parameters");
        let direct = synthesize(&axis, &parameters, false).expect("synthesis");
        assert_eq!(from_model, direct);
    }

    #[test]
    fn two_components_add_and_a_zero_column_component_vanishes() {
        let model = MultiComponentModel::new(2);
        let axis = oneone_axis(101, 20.0);

        let active = [20.0, 15.0, 14.0, 1.0, 0.0, 0.5];
        // Columns below the log window are linear; zero column means no gas.
        let empty = [20.0, 15.0, 0.0, 1.0, 3.0, 0.5];

        let mut combined = Vec::new();
        combined.extend_from_slice(&active);
        combined.extend_from_slice(&empty);

        let pair = model.evaluate(&axis, &combined).expect("pair");
        let single = MultiComponentModel::new(1)
            .evaluate(&axis, &active)
            .expect("single");
        for (a, b) in pair.iter().zip(&single) {
            assert!((a - b).abs() < 1.0e-12);
        }
    }

    #[test]
    fn offset_components_peak_at_their_own_velocities() {
        let model = MultiComponentModel::new(2);
        let axis = oneone_axis(401, 25.0);

        let mut values = Vec::new();
        values.extend_from_slice(&[20.0, 15.0, 14.0, 0.5, -8.0, 0.5]);
        values.extend_from_slice(&[20.0, 15.0, 14.0, 0.5, 8.0, 0.5]);

        let spectrum = model.evaluate(&axis, &values).expect("model");
        let center = spectrum[200];
        let peak = spectrum.iter().cloned().fold(f64::MIN, f64::max);
        // the two components straddle the rest velocity, leaving a dip between
        assert!(center < peak);
    }
}
