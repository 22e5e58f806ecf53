//! Starting-point heuristic for a single-component fit.

use crate::domain::{ModelResult, SpectralAxis};

/// Initial single-component guess for the given spectrum.
///
/// Currently a fixed cold-cloud starting point; the spectrum is accepted so
/// a moment-based estimate can replace this without touching callers.
/// TODO: derive the velocity offset and width from the first and second
/// moments of the data.
pub fn initial_guess(_axis: &SpectralAxis, _data: &[f64]) -> ModelResult<Vec<f64>> {
    Ok(vec![20.0, 10.0, 1.0e15, 1.0, 0.0, 1.0])
}
