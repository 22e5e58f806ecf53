//! Constrained Levenberg-Marquardt least-squares minimization.
//!
//! The solver accepts per-parameter constraints in the MINPACK tradition:
//! parameters can be frozen, boxed between lower and upper limits, and given
//! a maximum per-iteration step. The trial step solves the damped normal
//! equations and is then projected back into the feasible box, so iterates
//! never leave the constraint region.

use crate::domain::errors::{ModelError, ModelResult};
use crate::numerics::linalg::{DenseMatrix, lu_invert, lu_solve};
use crate::numerics::sum_of_squares;

/// Box and step constraints attached to a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterConstraint {
    pub fixed: bool,
    pub limited_low: bool,
    pub limited_high: bool,
    pub limit_low: f64,
    pub limit_high: f64,
    pub max_step: Option<f64>,
}

impl ParameterConstraint {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn fixed() -> Self {
        Self {
            fixed: true,
            ..Self::default()
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        let mut clamped = value;
        if self.limited_low && clamped < self.limit_low {
            clamped = self.limit_low;
        }
        if self.limited_high && clamped > self.limit_high {
            clamped = self.limit_high;
        }
        clamped
    }

    fn contains(&self, value: f64) -> bool {
        (!self.limited_low || value >= self.limit_low)
            && (!self.limited_high || value <= self.limit_high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Relative chi-square decrease fell below `ftol`.
    ChiSquareTolerance,
    /// Accepted step became negligible relative to the parameter values.
    ParameterTolerance,
    /// Gradient at the current iterate is effectively zero.
    GradientTolerance,
    /// Damping grew past its ceiling without finding a better point.
    NoFurtherImprovement,
    /// Iteration budget exhausted before any tolerance was met.
    MaxIterations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSolution {
    pub values: Vec<f64>,
    /// One-sigma uncertainties from the covariance diagonal. `None` when the
    /// curvature matrix at the solution could not be inverted; fixed
    /// parameters always report zero.
    pub uncertainties: Option<Vec<f64>>,
    pub chi_square: f64,
    pub status: ConvergenceStatus,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Residual-based least-squares backend.
///
/// The callback fills `residuals` from the trial parameter vector; the
/// backend minimizes the sum of squared residuals. Callback errors abort the
/// minimization unchanged.
pub trait Optimizer {
    fn minimize(
        &self,
        residual: &mut dyn FnMut(&[f64], &mut [f64]) -> ModelResult<()>,
        residual_count: usize,
        initial: &[f64],
        constraints: &[ParameterConstraint],
    ) -> ModelResult<OptimizerSolution>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    /// Relative chi-square decrease below which the fit is converged.
    pub ftol: f64,
    /// Relative step size below which the fit is converged.
    pub xtol: f64,
    /// Infinity-norm of the gradient below which the fit is converged.
    pub gtol: f64,
    /// Relative perturbation for the forward-difference Jacobian.
    pub epsfcn: f64,
    pub initial_lambda: f64,
    pub lambda_scale: f64,
    pub max_lambda: f64,
    pub max_iterations: usize,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            ftol: 1.0e-10,
            xtol: 1.0e-10,
            gtol: 1.0e-10,
            epsfcn: f64::EPSILON,
            initial_lambda: 1.0e-3,
            lambda_scale: 10.0,
            max_lambda: 1.0e12,
            max_iterations: 200,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    pub fn new(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }
}

impl Optimizer for LevenbergMarquardt {
    fn minimize(
        &self,
        residual: &mut dyn FnMut(&[f64], &mut [f64]) -> ModelResult<()>,
        residual_count: usize,
        initial: &[f64],
        constraints: &[ParameterConstraint],
    ) -> ModelResult<OptimizerSolution> {
        if initial.is_empty() {
            return Err(ModelError::Solver(
                "minimization requires at least one parameter".into(),
            ));
        }
        if residual_count == 0 {
            return Err(ModelError::Solver(
                "minimization requires at least one residual".into(),
            ));
        }
        if constraints.len() != initial.len() {
            return Err(ModelError::Solver(format!(
                "constraint count {} does not match parameter count {}",
                constraints.len(),
                initial.len()
            )));
        }
        for (index, (&value, constraint)) in initial.iter().zip(constraints).enumerate() {
            if !constraint.contains(value) {
                return Err(ModelError::Solver(format!(
                    "initial value {value} of parameter {index} lies outside its limits"
                )));
            }
            if constraint.limited_low
                && constraint.limited_high
                && constraint.limit_low > constraint.limit_high
            {
                return Err(ModelError::Solver(format!(
                    "parameter {index} has inverted limits [{}, {}]",
                    constraint.limit_low, constraint.limit_high
                )));
            }
        }

        let free: Vec<usize> = (0..initial.len())
            .filter(|&index| !constraints[index].fixed)
            .collect();

        let mut values = initial.to_vec();
        let mut residuals = vec![0.0f64; residual_count];
        let mut evaluations = 0usize;

        residual(&values, &mut residuals)?;
        evaluations += 1;
        let mut chi_square = sum_of_squares(&residuals);

        if free.is_empty() {
            return Ok(OptimizerSolution {
                values,
                uncertainties: Some(vec![0.0; initial.len()]),
                chi_square,
                status: ConvergenceStatus::ParameterTolerance,
                iterations: 0,
                evaluations,
            });
        }

        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0usize;
        let mut status = ConvergenceStatus::MaxIterations;

        let mut jacobian = DenseMatrix::zeros(residual_count, free.len());
        let mut perturbed = vec![0.0f64; residual_count];

        'outer: while iterations < self.config.max_iterations {
            iterations += 1;

            forward_difference_jacobian(
                residual,
                &mut jacobian,
                &mut values,
                &residuals,
                &mut perturbed,
                &free,
                constraints,
                self.config.epsfcn,
                &mut evaluations,
            )?;

            let (normal, gradient) = normal_equations(&jacobian, &residuals);

            let gradient_norm = gradient.iter().fold(0.0f64, |acc, g| acc.max(g.abs()));
            if gradient_norm <= self.config.gtol {
                status = ConvergenceStatus::GradientTolerance;
                break;
            }

            // Inner damping loop: retry the step with stronger damping until
            // the cost decreases or the damping ceiling is hit.
            loop {
                let step = match damped_step(&normal, &gradient, lambda) {
                    Ok(step) => step,
                    Err(_) => {
                        lambda *= self.config.lambda_scale;
                        if lambda > self.config.max_lambda {
                            status = ConvergenceStatus::NoFurtherImprovement;
                            break 'outer;
                        }
                        continue;
                    }
                };

                let step = limit_step_length(step, &free, constraints);

                let mut trial = values.clone();
                for (slot, &index) in free.iter().enumerate() {
                    trial[index] = constraints[index].clamp(trial[index] + step[slot]);
                }

                residual(&trial, &mut perturbed)?;
                evaluations += 1;
                let trial_chi_square = sum_of_squares(&perturbed);

                if trial_chi_square < chi_square {
                    let relative_decrease = (chi_square - trial_chi_square) / chi_square.max(1.0e-300);
                    let step_converged = free.iter().all(|&index| {
                        (trial[index] - values[index]).abs()
                            <= self.config.xtol * (values[index].abs() + self.config.xtol)
                    });

                    values = trial;
                    residuals.copy_from_slice(&perturbed);
                    chi_square = trial_chi_square;
                    lambda = (lambda / self.config.lambda_scale).max(1.0e-15);

                    if relative_decrease <= self.config.ftol {
                        status = ConvergenceStatus::ChiSquareTolerance;
                        break 'outer;
                    }
                    if step_converged {
                        status = ConvergenceStatus::ParameterTolerance;
                        break 'outer;
                    }
                    break;
                }

                lambda *= self.config.lambda_scale;
                if lambda > self.config.max_lambda {
                    status = ConvergenceStatus::NoFurtherImprovement;
                    break 'outer;
                }
            }
        }

        forward_difference_jacobian(
            residual,
            &mut jacobian,
            &mut values,
            &residuals,
            &mut perturbed,
            &free,
            constraints,
            self.config.epsfcn,
            &mut evaluations,
        )?;
        let uncertainties = covariance_uncertainties(&jacobian, &free, initial.len());

        Ok(OptimizerSolution {
            values,
            uncertainties,
            chi_square,
            status,
            iterations,
            evaluations,
        })
    }
}

/// Numerical Jacobian of the residual vector with respect to the free
/// parameters. The perturbation flips to a backward difference when a
/// forward step would cross the parameter's upper limit.
#[allow(clippy::too_many_arguments)]
fn forward_difference_jacobian(
    residual: &mut dyn FnMut(&[f64], &mut [f64]) -> ModelResult<()>,
    jacobian: &mut DenseMatrix,
    values: &mut [f64],
    baseline: &[f64],
    perturbed: &mut [f64],
    free: &[usize],
    constraints: &[ParameterConstraint],
    epsfcn: f64,
    evaluations: &mut usize,
) -> ModelResult<()> {
    let relative_step = epsfcn.sqrt();

    for (slot, &index) in free.iter().enumerate() {
        let original = values[index];
        let mut step = relative_step * original.abs();
        if step == 0.0 {
            step = relative_step;
        }

        let constraint = &constraints[index];
        if constraint.limited_high && original + step > constraint.limit_high {
            step = -step;
        }
        if constraint.limited_low && original + step < constraint.limit_low {
            step = -step;
        }

        values[index] = original + step;
        residual(values, perturbed)?;
        *evaluations += 1;
        values[index] = original;

        let inverse_step = 1.0 / step;
        for row in 0..baseline.len() {
            jacobian[(row, slot)] = (perturbed[row] - baseline[row]) * inverse_step;
        }
    }

    Ok(())
}

fn normal_equations(jacobian: &DenseMatrix, residuals: &[f64]) -> (DenseMatrix, Vec<f64>) {
    let rows = jacobian.nrows();
    let cols = jacobian.ncols();

    let mut normal = DenseMatrix::zeros(cols, cols);
    let mut gradient = vec![0.0f64; cols];

    for i in 0..cols {
        for j in i..cols {
            let mut sum = 0.0;
            for row in 0..rows {
                sum += jacobian[(row, i)] * jacobian[(row, j)];
            }
            normal[(i, j)] = sum;
            normal[(j, i)] = sum;
        }

        let mut g = 0.0;
        for row in 0..rows {
            g += jacobian[(row, i)] * residuals[row];
        }
        gradient[i] = g;
    }

    (normal, gradient)
}

fn damped_step(
    normal: &DenseMatrix,
    gradient: &[f64],
    lambda: f64,
) -> Result<Vec<f64>, crate::numerics::linalg::LuError> {
    let dimension = gradient.len();
    let mut damped = normal.clone();
    for index in 0..dimension {
        let diagonal = normal[(index, index)];
        // Marquardt scaling keeps the damping commensurate with each
        // parameter's own curvature; a flat direction falls back to unit
        // damping so the system stays solvable.
        let scale = if diagonal > 0.0 { diagonal } else { 1.0 };
        damped[(index, index)] = diagonal + lambda * scale;
    }

    let negative_gradient: Vec<f64> = gradient.iter().map(|g| -g).collect();
    lu_solve(&damped, &negative_gradient)
}

/// Rescale the whole step so no component exceeds its `max_step` hint.
/// Scaling the vector rather than clipping components preserves the step
/// direction.
fn limit_step_length(
    mut step: Vec<f64>,
    free: &[usize],
    constraints: &[ParameterConstraint],
) -> Vec<f64> {
    let mut scale = 1.0f64;
    for (slot, &index) in free.iter().enumerate() {
        if let Some(max_step) = constraints[index].max_step {
            let magnitude = step[slot].abs();
            if magnitude > max_step && magnitude > 0.0 {
                scale = scale.min(max_step / magnitude);
            }
        }
    }

    if scale < 1.0 {
        for component in &mut step {
            *component *= scale;
        }
    }

    step
}

fn covariance_uncertainties(
    jacobian: &DenseMatrix,
    free: &[usize],
    parameter_count: usize,
) -> Option<Vec<f64>> {
    let rows = jacobian.nrows();
    let cols = jacobian.ncols();

    let mut normal = DenseMatrix::zeros(cols, cols);
    for i in 0..cols {
        for j in i..cols {
            let mut sum = 0.0;
            for row in 0..rows {
                sum += jacobian[(row, i)] * jacobian[(row, j)];
            }
            normal[(i, j)] = sum;
            normal[(j, i)] = sum;
        }
    }

    let covariance = lu_invert(&normal).ok()?;

    let mut uncertainties = vec![0.0f64; parameter_count];
    for (slot, &index) in free.iter().enumerate() {
        let variance = covariance[(slot, slot)];
        uncertainties[index] = if variance > 0.0 { variance.sqrt() } else { 0.0 };
    }

    Some(uncertainties)
}
