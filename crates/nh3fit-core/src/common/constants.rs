//! Physical constants shared by the ammonia model kernels.
//!
//! All radiative-transfer arithmetic is carried out in CGS units, matching the
//! catalog coefficients. Values are shared here to avoid ad hoc per-module
//! literal constants.

/// Speed of light in km/s.
pub const CKMS: f64 = 2.99792458e5;
/// Speed of light in cm/s.
pub const CCMS: f64 = CKMS * 1.0e5;
/// Planck constant in erg s.
pub const H_CGS: f64 = 6.6260693e-27;
/// Boltzmann constant in erg/K.
pub const KB_CGS: f64 = 1.3806505e-16;
/// Cosmic microwave background temperature in K.
pub const T_CMB: f64 = 2.73;

/// Rotational constant B of NH3 in Hz (rigid rotor).
pub const B_ROT: f64 = 298_117.06e6;
/// Rotational constant C of NH3 in Hz (rigid rotor).
pub const C_ROT: f64 = 186_726.36e6;
/// Number of rotational sublevels summed in the partition function.
pub const ROTATIONAL_LEVELS: usize = 51;

/// Nominal column density substituted in thin mode, where the spectrum
/// depends only on optical depth and the column plays no role.
pub const THIN_MODE_COLUMN: f64 = 1.0e15;

/// Energy gap between the (2,2) and (1,1) states in K, used both in the
/// rotational-temperature estimate and the thin-mode (2,2)/(1,1) tau ratio.
pub const ENERGY_GAP_22_K: f64 = 41.5;
/// Energy gap between the (3,3) and (1,1) states in K.
pub const ENERGY_GAP_33_K: f64 = 101.1;
/// Energy gap between the (4,4) and (1,1) states in K.
pub const ENERGY_GAP_44_K: f64 = 177.34;
/// Exponential gap constant in the rotational-temperature closed form.
pub const TROT_GAP_K: f64 = 15.7;
