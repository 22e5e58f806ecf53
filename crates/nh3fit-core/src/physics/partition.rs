//! Ortho/para partition-function weights for the ammonia rotational ladder.
//!
//! The weights are recomputed on every synthesis call: the kinetic
//! temperature changes on every solver iteration, so caching buys nothing.
//! Normalization is deferred to the synthesizer, which divides by the branch
//! sum so the ortho and para ladders normalize independently.

use crate::common::constants::{B_ROT, C_ROT, H_CGS, KB_CGS, ROTATIONAL_LEVELS};

/// Unnormalized Boltzmann weights of the rotational sublevels, split by
/// nuclear-spin symmetry class.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionWeights {
    ortho: Vec<f64>,
    para: Vec<f64>,
}

impl PartitionWeights {
    /// Boltzmann-weighted populations of the first `ROTATIONAL_LEVELS` rigid
    /// rotor sublevels at the given kinetic temperature. Levels with index
    /// divisible by three are ortho and carry a doubled statistical weight.
    pub fn at_temperature(kinetic_temperature: f64) -> Self {
        let mut ortho = Vec::with_capacity(ROTATIONAL_LEVELS / 3 + 1);
        let mut para = Vec::with_capacity(ROTATIONAL_LEVELS);

        for level in 0..ROTATIONAL_LEVELS {
            let j = level as f64;
            let energy = H_CGS * (B_ROT * j * (j + 1.0) + (C_ROT - B_ROT) * j * j);
            let weight = (2.0 * j + 1.0) * (-energy / (KB_CGS * kinetic_temperature)).exp();
            if level % 3 == 0 {
                ortho.push(2.0 * weight);
            } else {
                para.push(weight);
            }
        }

        Self { ortho, para }
    }

    /// Normalized population fraction of the ortho sublevel at `index`
    /// (counting ortho levels only, from J = 0 upward).
    pub fn ortho_fraction_at(&self, index: usize) -> f64 {
        self.ortho[index] / self.ortho.iter().sum::<f64>()
    }

    /// Normalized population fraction of the para sublevel at `index`
    /// (counting para levels only, from J = 1 upward).
    pub fn para_fraction_at(&self, index: usize) -> f64 {
        self.para[index] / self.para.iter().sum::<f64>()
    }

    pub fn ortho_level_count(&self) -> usize {
        self.ortho.len()
    }

    pub fn para_level_count(&self) -> usize {
        self.para.len()
    }
}
