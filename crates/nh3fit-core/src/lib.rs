//! Ammonia inversion-transition spectral synthesis and fitting.
//!
//! The crate models the four metastable ammonia inversion transitions
//! (1-1 through 4-4) with their hyperfine structure: [`physics::synthesize`]
//! turns a set of physical gas parameters into a brightness-temperature
//! spectrum, and [`fit::fit_multi_component`] recovers those parameters from
//! an observed spectrum with a constrained Levenberg-Marquardt solve,
//! supporting any number of non-interacting velocity components.

pub mod catalog;
pub mod common;
pub mod domain;
pub mod fit;
pub mod numerics;
pub mod physics;

pub use domain::{
    AxisUnit, ModelError, ModelParameter, ModelResult, ParameterSlot, PhysicalParameters,
    SpectralAxis, Transition,
};
pub use fit::{FitResult, ParameterSet, ParameterSetSpec, fit_multi_component};
pub use physics::{OpticalDepthMap, line_center_optical_depths, synthesize};
