//! Spectral synthesis of the ammonia inversion transitions.
//!
//! Turns one set of physical parameters into a predicted brightness
//! temperature spectrum: partition-function-weighted line-center optical
//! depths per transition, hyperfine expansion into Gaussian optical-depth
//! profiles, and the radiative-transfer conversion against the CMB
//! background. An alternate mode returns the per-transition line-center
//! optical depths instead of the spectrum.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::common::constants::{
    CCMS, CKMS, ENERGY_GAP_22_K, ENERGY_GAP_33_K, ENERGY_GAP_44_K, H_CGS, KB_CGS, T_CMB,
    TROT_GAP_K,
};
use crate::domain::{ModelError, ModelResult, PhysicalParameters, SpectralAxis, Transition};
use crate::physics::partition::PartitionWeights;

/// Line-center optical depths of the four transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalDepthMap {
    pub oneone: f64,
    pub twotwo: f64,
    pub threethree: f64,
    pub fourfour: f64,
}

impl OpticalDepthMap {
    pub const fn get(&self, transition: Transition) -> f64 {
        match transition {
            Transition::OneOne => self.oneone,
            Transition::TwoTwo => self.twotwo,
            Transition::ThreeThree => self.threethree,
            Transition::FourFour => self.fourfour,
        }
    }

    fn from_values(values: [f64; 4]) -> Self {
        Self {
            oneone: values[0],
            twotwo: values[1],
            threethree: values[2],
            fourfour: values[3],
        }
    }

    fn scale(&mut self, factor: f64) {
        self.oneone *= factor;
        self.twotwo *= factor;
        self.threethree *= factor;
        self.fourfour *= factor;
    }
}

/// Rotational temperature from the kinetic temperature, closed form used by
/// the thin-mode tau ratio formula.
fn rotational_temperature(kinetic_temperature: f64) -> f64 {
    kinetic_temperature
        / (1.0
            + kinetic_temperature / ENERGY_GAP_22_K
                * (1.0 + 0.6 * (-TROT_GAP_K / kinetic_temperature).exp()).ln())
}

/// Per-transition line-center optical depths for one parameter set.
///
/// With `fixed_tau11` and `thin` both set, all four depths come from the
/// rotational-temperature ratio formula referencing only tau(1-1) and the
/// kinetic temperature; no column density is involved. With `fixed_tau11`
/// alone, depths are synthesized from the column as usual and then uniformly
/// rescaled so tau(1-1) matches exactly while the relative line ratios keep
/// following the partition function.
pub fn line_center_optical_depths(parameters: &PhysicalParameters, thin: bool) -> OpticalDepthMap {
    let tkin = parameters.kinetic_temperature;
    let tex = parameters.effective_excitation_temperature(thin);

    if let (Some(tau11), true) = (parameters.fixed_tau11, thin) {
        let trot = rotational_temperature(tkin);
        return OpticalDepthMap {
            oneone: tau11,
            twotwo: tau11
                * (23.722f64 / 23.694).powi(2)
                * (4.0 / 3.0)
                * (5.0 / 3.0)
                * (-ENERGY_GAP_22_K / trot).exp(),
            threethree: tau11
                * (23.8701279f64 / 23.694).powi(2)
                * (3.0 / 2.0)
                * (14.0 / 3.0)
                * (-ENERGY_GAP_33_K / trot).exp(),
            fourfour: tau11
                * (24.1394169f64 / 23.694).powi(2)
                * (8.0 / 5.0)
                * (9.0 / 3.0)
                * (-ENERGY_GAP_44_K / trot).exp(),
        };
    }

    let ntot = parameters.effective_column(thin);
    let weights = PartitionWeights::at_temperature(tkin);

    let mut depths = [0.0f64; 4];
    let mut para_count = 0usize;
    // The 0-0 ortho level does not invert; counting starts above it.
    let mut ortho_count = 1usize;

    for transition in Transition::ALL {
        let record = catalog::record(transition);
        let (symmetry_fraction, population) = if record.is_ortho {
            let population = weights.ortho_fraction_at(ortho_count);
            ortho_count += 1;
            (parameters.ortho_fraction, population)
        } else {
            let population = weights.para_fraction_at(para_count);
            para_count += 1;
            (1.0 - parameters.ortho_fraction, population)
        };

        let frequency = record.rest_frequency;
        let stimulated = 1.0 + (-H_CGS * frequency / (KB_CGS * tkin)).exp();
        let emission = 1.0 - (-H_CGS * frequency / (KB_CGS * tex)).exp();
        let gaussian_norm =
            parameters.line_width / CKMS * frequency * (2.0 * std::f64::consts::PI).sqrt();

        depths[transition.index()] = ntot * symmetry_fraction * population / stimulated
            * CCMS.powi(2)
            / (8.0 * std::f64::consts::PI * frequency.powi(2))
            * record.einstein_a
            * emission
            / gaussian_norm;
    }

    let mut map = OpticalDepthMap::from_values(depths);
    if let Some(tau11) = parameters.fixed_tau11 {
        // Pin tau(1-1) to the supplied value, preserving line ratios.
        map.scale(tau11 / map.oneone);
    }
    map
}

/// Synthesize the model brightness-temperature spectrum on the given axis.
///
/// The returned spectrum is guaranteed non-negative; a negative sample means
/// the parameter combination is internally inconsistent and the synthesis
/// fails fast rather than returning a physically impossible spectrum. In
/// thin mode with a fixed tau(1-1) the result is the summed optical-depth
/// profile itself, without the radiative-transfer conversion.
pub fn synthesize(
    axis: &SpectralAxis,
    parameters: &PhysicalParameters,
    thin: bool,
) -> ModelResult<Vec<f64>> {
    if axis.is_empty() {
        return Err(ModelError::EmptyAxis);
    }

    let frequencies_ghz = axis.to_ghz();
    let tex = parameters.effective_excitation_temperature(thin);
    let filling_fraction = parameters.filling_fraction.unwrap_or(1.0);
    let depths = line_center_optical_depths(parameters, thin);
    let tau_passthrough = thin && parameters.fixed_tau11.is_some();

    let mut spectrum = vec![0.0f64; frequencies_ghz.len()];
    let mut tau_profile = vec![0.0f64; frequencies_ghz.len()];

    for transition in Transition::ALL {
        let record = catalog::record(transition);
        let weights = catalog::normalized_weights(transition);
        let depth = depths.get(transition);

        tau_profile.fill(0.0);
        for (offset, weight) in record.velocity_offsets.iter().zip(&weights) {
            let line_ghz = (1.0 - offset / CKMS) * record.rest_frequency / 1.0e9;
            let sigma_ghz = (parameters.line_width / CKMS * line_ghz).abs();
            let shift_ghz = parameters.velocity_offset / CKMS * line_ghz;
            let amplitude = depth * weight * filling_fraction;

            for (sample, tau) in frequencies_ghz.iter().zip(tau_profile.iter_mut()) {
                let delta = sample + shift_ghz - line_ghz;
                *tau += amplitude * (-delta * delta / (2.0 * sigma_ghz * sigma_ghz)).exp();
            }
        }

        if tau_passthrough {
            for (value, tau) in spectrum.iter_mut().zip(&tau_profile) {
                *value += tau;
            }
        } else {
            for ((value, tau), sample) in
                spectrum.iter_mut().zip(&tau_profile).zip(&frequencies_ghz)
            {
                // characteristic temperature of the sample frequency
                let t0 = H_CGS * sample * 1.0e9 / KB_CGS;
                let source = t0 / ((t0 / tex).exp() - 1.0) - t0 / ((t0 / T_CMB).exp() - 1.0);
                *value += source * (1.0 - (-tau).exp());
            }
        }

        for (index, value) in spectrum.iter().enumerate() {
            if *value < 0.0 {
                return Err(ModelError::NegativeSpectrum {
                    index,
                    value: *value,
                });
            }
        }
    }

    Ok(spectrum)
}
