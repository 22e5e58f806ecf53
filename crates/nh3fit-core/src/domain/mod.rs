pub mod errors;

pub use errors::{ModelError, ModelResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The four metastable ammonia inversion transitions covered by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    OneOne,
    TwoTwo,
    ThreeThree,
    FourFour,
}

impl Transition {
    /// Catalog iteration order; optical depths and population counters are
    /// accumulated in this order.
    pub const ALL: [Transition; 4] = [
        Transition::OneOne,
        Transition::TwoTwo,
        Transition::ThreeThree,
        Transition::FourFour,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneOne => "oneone",
            Self::TwoTwo => "twotwo",
            Self::ThreeThree => "threethree",
            Self::FourFour => "fourfour",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::OneOne => 0,
            Self::TwoTwo => 1,
            Self::ThreeThree => 2,
            Self::FourFour => 3,
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Canonical fit parameter kinds for one velocity component.
///
/// The flat parameter vector repeats these six slots once per component, in
/// this order. Typed slots replace the name-with-digit-suffix convention for
/// grouping, while `display_name` keeps the caller-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelParameter {
    Tkin,
    Tex,
    Ntot,
    Width,
    XoffV,
    Fortho,
}

impl ModelParameter {
    pub const COUNT: usize = 6;

    pub const ALL: [ModelParameter; 6] = [
        ModelParameter::Tkin,
        ModelParameter::Tex,
        ModelParameter::Ntot,
        ModelParameter::Width,
        ModelParameter::XoffV,
        ModelParameter::Fortho,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tkin => "tkin",
            Self::Tex => "tex",
            Self::Ntot => "ntot",
            Self::Width => "width",
            Self::XoffV => "xoff_v",
            Self::Fortho => "fortho",
        }
    }

    /// Temperature slots get tight per-iteration step control; large jumps in
    /// temperature make the partition-function evaluation ill-conditioned.
    pub const fn is_temperature(self) -> bool {
        matches!(self, Self::Tkin | Self::Tex)
    }

    /// Fraction slots are the only ones with a physical upper bound of 1.
    pub const fn is_fraction(self) -> bool {
        matches!(self, Self::Fortho)
    }

    /// TeX symbol used in annotation labels.
    pub const fn tex_symbol(self) -> &'static str {
        match self {
            Self::Tkin => "T_K",
            Self::Tex => "T_{ex}",
            Self::Ntot => "N",
            Self::Width => "\\sigma",
            Self::XoffV => "v",
            Self::Fortho => "F_o",
        }
    }
}

impl Display for ModelParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One slot of the flattened multi-component parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSlot {
    pub parameter: ModelParameter,
    pub component: usize,
}

impl ParameterSlot {
    pub const fn new(parameter: ModelParameter, component: usize) -> Self {
        Self {
            parameter,
            component,
        }
    }

    /// Caller-facing label, base name suffixed with the component index.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.parameter.as_str(), self.component)
    }
}

/// Frequency units accepted on the spectral axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AxisUnit {
    Hz,
    MHz,
    GHz,
}

impl AxisUnit {
    const fn scale_to_ghz(self) -> f64 {
        match self {
            Self::Hz => 1.0e-9,
            Self::MHz => 1.0e-3,
            Self::GHz => 1.0,
        }
    }
}

/// Sample positions of an observed or synthesized spectrum.
///
/// The core only requires conversion to GHz; any further unit bookkeeping is
/// the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralAxis {
    values: Vec<f64>,
    unit: AxisUnit,
}

impl SpectralAxis {
    pub fn new(values: Vec<f64>, unit: AxisUnit) -> Self {
        Self { values, unit }
    }

    pub fn ghz(values: Vec<f64>) -> Self {
        Self::new(values, AxisUnit::GHz)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn unit(&self) -> AxisUnit {
        self.unit
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn to_ghz(&self) -> Vec<f64> {
        let scale = self.unit.scale_to_ghz();
        self.values.iter().map(|value| value * scale).collect()
    }
}

/// Physical parameters of one velocity component, immutable within a single
/// synthesis evaluation.
///
/// `total_column` may be given either linearly (e.g. 1e14) or as a log10
/// column (values in the open interval (5, 25) are interpreted as log10; the
/// plausible range of real columns does not overlap that window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParameters {
    pub kinetic_temperature: f64,
    pub excitation_temperature: Option<f64>,
    pub total_column: f64,
    pub line_width: f64,
    pub velocity_offset: f64,
    pub ortho_fraction: f64,
    pub fixed_tau11: Option<f64>,
    pub filling_fraction: Option<f64>,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            kinetic_temperature: 20.0,
            excitation_temperature: None,
            total_column: 1.0e14,
            line_width: 1.0,
            velocity_offset: 0.0,
            ortho_fraction: 1.0,
            fixed_tau11: None,
            filling_fraction: None,
        }
    }
}

impl PhysicalParameters {
    /// Excitation temperature actually used by the model: unspecified values
    /// assume LTE, and excitation cannot exceed kinetic temperature. Thin
    /// mode does not use the excitation temperature at all.
    pub fn effective_excitation_temperature(&self, thin: bool) -> f64 {
        match self.excitation_temperature {
            Some(tex) if !thin && tex <= self.kinetic_temperature => tex,
            _ => self.kinetic_temperature,
        }
    }

    /// Column density in linear cm^-2, resolving the log10 window and the
    /// thin-mode nominal substitute.
    pub fn effective_column(&self, thin: bool) -> f64 {
        if thin {
            crate::common::constants::THIN_MODE_COLUMN
        } else if self.total_column > 5.0 && self.total_column < 25.0 {
            10f64.powf(self.total_column)
        } else {
            self.total_column
        }
    }
}
