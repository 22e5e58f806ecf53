pub type ModelResult<T> = Result<T, ModelError>;

/// Errors surfaced by the synthesis and fit entry points.
///
/// Physics and validation failures are fatal and propagate immediately to the
/// caller; no partial-result recovery is attempted mid-synthesis, and the core
/// never retries a solve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(
        "synthesized spectrum dropped below zero at sample {index} (value {value:e}); \
         the parameter combination is not physically consistent"
    )]
    NegativeSpectrum { index: usize, value: f64 },
    #[error("parameter vector length {values} does not match slot list length {slots}")]
    LengthMismatch { values: usize, slots: usize },
    #[error("{what} has length {actual}, expected {expected}")]
    DataLengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("spectral axis contains no samples")]
    EmptyAxis,
    #[error("least-squares solver failed: {0}")]
    Solver(String),
}
