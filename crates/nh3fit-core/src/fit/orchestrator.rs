//! End-to-end multi-component fit driver.
//!
//! Validates the observed data, expands the caller's fit settings, runs the
//! constrained least-squares solve, and post-processes the solution into a
//! result bundle: fitted values with one-sigma errors, the best-fit model
//! spectrum, and the per-component line-center optical depths.

use crate::domain::{ModelError, ModelResult, SpectralAxis};
use crate::fit::model::MultiComponentModel;
use crate::fit::params::{ExpansionReport, ParameterSet, ParameterSetSpec};
use crate::numerics::{LevenbergMarquardt, Optimizer};
use crate::physics::{OpticalDepthMap, line_center_optical_depths};

/// Everything a caller needs from a completed fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub values: Vec<f64>,
    /// One-sigma errors; all zero when the covariance at the solution was
    /// unavailable.
    pub errors: Vec<f64>,
    /// Best-fit model spectrum on the input axis.
    pub model: Vec<f64>,
    pub chi_square: f64,
    /// Line-center optical depths of each fitted component.
    pub optical_depths: Vec<OpticalDepthMap>,
    pub parameters: ParameterSet,
    pub iterations: usize,
}

impl FitResult {
    pub fn expansion(&self) -> ExpansionReport {
        self.parameters.expansion()
    }
}

/// Fit `component_count` ammonia components to an observed spectrum.
///
/// `errors` are per-sample one-sigma uncertainties; `None` weights every
/// sample equally. After the solve each component's excitation temperature
/// is clamped to its kinetic temperature, matching the constraint the
/// synthesizer applies internally, so the reported values describe the model
/// actually evaluated.
pub fn fit_multi_component(
    axis: &SpectralAxis,
    data: &[f64],
    errors: Option<&[f64]>,
    spec: &ParameterSetSpec,
    component_count: usize,
) -> ModelResult<FitResult> {
    if axis.is_empty() {
        return Err(ModelError::EmptyAxis);
    }
    if data.len() != axis.len() {
        return Err(ModelError::DataLengthMismatch {
            what: "data vector",
            expected: axis.len(),
            actual: data.len(),
        });
    }

    let weights: Vec<f64> = match errors {
        Some(errors) => {
            if errors.len() != axis.len() {
                return Err(ModelError::DataLengthMismatch {
                    what: "error vector",
                    expected: axis.len(),
                    actual: errors.len(),
                });
            }
            if let Some(bad) = errors.iter().position(|error| !(*error > 0.0)) {
                return Err(ModelError::Solver(format!(
                    "uncertainty at sample {bad} is not strictly positive"
                )));
            }
            errors.to_vec()
        }
        None => vec![1.0; axis.len()],
    };

    let mut parameters = ParameterSet::expand(spec, component_count);
    let model = MultiComponentModel::from_slots(parameters.slots());

    let solver = LevenbergMarquardt::default();
    let solution = solver.minimize(
        &mut |trial, residuals| {
            let predicted = model.evaluate(axis, trial)?;
            for (index, residual) in residuals.iter_mut().enumerate() {
                *residual = (data[index] - predicted[index]) / weights[index];
            }
            Ok(())
        },
        axis.len(),
        &parameters.values(),
        &parameters.constraints(),
    )?;

    let mut values = solution.values;
    clamp_excitation_to_kinetic(&mut values, model.component_count());

    let errors = solution
        .uncertainties
        .unwrap_or_else(|| vec![0.0; values.len()]);

    let best_model = model.evaluate(axis, &values)?;

    let mut optical_depths = Vec::with_capacity(model.component_count());
    for component in 0..model.component_count() {
        let component_parameters = model.component_parameters(&values, component)?;
        optical_depths.push(line_center_optical_depths(&component_parameters, false));
    }

    parameters.apply_solution(&values, &errors);

    Ok(FitResult {
        values,
        errors,
        model: best_model,
        chi_square: solution.chi_square,
        optical_depths,
        parameters,
        iterations: solution.iterations,
    })
}

/// The synthesizer never uses an excitation temperature above the kinetic
/// one, so report the clamped value the model actually saw.
fn clamp_excitation_to_kinetic(values: &mut [f64], component_count: usize) {
    use crate::domain::ModelParameter;
    for component in 0..component_count {
        let base = component * ModelParameter::COUNT;
        let tkin = values[base];
        let tex = &mut values[base + 1];
        if *tex > tkin {
            *tex = tkin;
        }
    }
}
