//! Multi-component fitting: parameter expansion, the summed spectral model,
//! the fit driver, and result annotation.

pub mod annotate;
pub mod guess;
pub mod model;
pub mod orchestrator;
pub mod params;

pub use annotate::annotations;
pub use guess::initial_guess;
pub use model::MultiComponentModel;
pub use orchestrator::{FitResult, fit_multi_component};
pub use params::{ExpansionReport, ExpansionSource, ParameterInfo, ParameterSet, ParameterSetSpec};
