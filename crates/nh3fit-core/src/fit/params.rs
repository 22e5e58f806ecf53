//! Expansion of caller-supplied fit settings into per-slot parameter records.
//!
//! Callers describe the fit with six-entry arrays (one entry per parameter
//! kind) or with full `6 * components` arrays. Expansion normalizes every
//! array to the full length and tags where each one came from, so a caller
//! can tell after the fact whether their input was used as given, tiled
//! across components, or discarded for the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::domain::{ModelParameter, ParameterSlot};
use crate::numerics::ParameterConstraint;

/// Minimum physical temperature, the CMB floor.
const TEMPERATURE_FLOOR: f64 = 2.73;

/// Per-iteration step ceiling applied to temperature slots.
const TEMPERATURE_MAX_STEP: f64 = 1.0;

/// How one settings array was turned into its full-length form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionSource {
    /// The caller supplied the full `6 * components` array.
    Provided,
    /// The caller supplied one six-entry group; it was tiled per component.
    Replicated,
    /// The array had an unusable length and was replaced by defaults.
    DefaultReset,
}

/// Expansion provenance, one tag per settings array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub values: ExpansionSource,
    pub fixed: ExpansionSource,
    pub limited_low: ExpansionSource,
    pub limited_high: ExpansionSource,
    pub limits_low: ExpansionSource,
    pub limits_high: ExpansionSource,
}

/// Caller-facing fit settings before expansion.
///
/// Empty arrays mean "use the defaults". Each array may hold either six
/// entries (replicated across components) or `6 * components` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParameterSetSpec {
    pub values: Vec<f64>,
    pub fixed: Vec<bool>,
    pub limited_low: Vec<bool>,
    pub limited_high: Vec<bool>,
    pub limits_low: Vec<f64>,
    pub limits_high: Vec<f64>,
}

impl ParameterSetSpec {
    /// Default starting point for a single component.
    pub fn default_values() -> [f64; ModelParameter::COUNT] {
        [20.0, 20.0, 14.0, 1.0, 0.0, 0.5]
    }

    /// Starting point substituted when the caller's value array has an
    /// unusable length. Matches the historical reset vector, which uses a
    /// linear column rather than a log one.
    fn reset_values() -> [f64; ModelParameter::COUNT] {
        [20.0, 20.0, 1.0e10, 1.0, 0.0, 0.5]
    }

    fn default_fixed() -> [bool; ModelParameter::COUNT] {
        [false; ModelParameter::COUNT]
    }

    fn default_limited_low() -> [bool; ModelParameter::COUNT] {
        let mut limited = [false; ModelParameter::COUNT];
        for (slot, parameter) in ModelParameter::ALL.iter().enumerate() {
            // every parameter except the velocity offset has a hard floor
            limited[slot] = !matches!(parameter, ModelParameter::XoffV);
        }
        limited
    }

    fn default_limited_high() -> [bool; ModelParameter::COUNT] {
        let mut limited = [false; ModelParameter::COUNT];
        for (slot, parameter) in ModelParameter::ALL.iter().enumerate() {
            limited[slot] = parameter.is_fraction();
        }
        limited
    }

    fn default_limits_low() -> [f64; ModelParameter::COUNT] {
        let mut limits = [0.0; ModelParameter::COUNT];
        for (slot, parameter) in ModelParameter::ALL.iter().enumerate() {
            if parameter.is_temperature() {
                limits[slot] = TEMPERATURE_FLOOR;
            }
        }
        limits
    }

    fn default_limits_high() -> [f64; ModelParameter::COUNT] {
        let mut limits = [0.0; ModelParameter::COUNT];
        for (slot, parameter) in ModelParameter::ALL.iter().enumerate() {
            if parameter.is_fraction() {
                limits[slot] = 1.0;
            }
        }
        limits
    }
}

/// One fully-resolved parameter slot of the fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub slot: ParameterSlot,
    pub value: f64,
    pub fixed: bool,
    pub limited_low: bool,
    pub limited_high: bool,
    pub limit_low: f64,
    pub limit_high: f64,
    pub max_step: Option<f64>,
    pub error: f64,
}

impl ParameterInfo {
    pub fn constraint(&self) -> ParameterConstraint {
        ParameterConstraint {
            fixed: self.fixed,
            limited_low: self.limited_low,
            limited_high: self.limited_high,
            limit_low: self.limit_low,
            limit_high: self.limit_high,
            max_step: self.max_step,
        }
    }
}

/// Fully-expanded parameter records for a multi-component fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    parameters: Vec<ParameterInfo>,
    component_count: usize,
    expansion: ExpansionReport,
}

impl ParameterSet {
    /// Expand caller settings into per-slot records for `component_count`
    /// components.
    ///
    /// When the value array holds a whole number of six-entry groups and
    /// implies more components than requested, the larger count wins; a
    /// caller passing eighteen starting values clearly wants three
    /// components.
    pub fn expand(spec: &ParameterSetSpec, component_count: usize) -> Self {
        let mut component_count = component_count.max(1);
        if !spec.values.is_empty()
            && spec.values.len() % ModelParameter::COUNT == 0
            && spec.values.len() / ModelParameter::COUNT > component_count
        {
            component_count = spec.values.len() / ModelParameter::COUNT;
        }

        let (values, values_source) = expand_array(
            &spec.values,
            component_count,
            &ParameterSetSpec::default_values(),
            &ParameterSetSpec::reset_values(),
        );
        let (fixed, fixed_source) = expand_array(
            &spec.fixed,
            component_count,
            &ParameterSetSpec::default_fixed(),
            &ParameterSetSpec::default_fixed(),
        );
        let (limited_low, limited_low_source) = expand_array(
            &spec.limited_low,
            component_count,
            &ParameterSetSpec::default_limited_low(),
            &ParameterSetSpec::default_limited_low(),
        );
        let (limited_high, limited_high_source) = expand_array(
            &spec.limited_high,
            component_count,
            &ParameterSetSpec::default_limited_high(),
            &ParameterSetSpec::default_limited_high(),
        );
        let (limits_low, limits_low_source) = expand_array(
            &spec.limits_low,
            component_count,
            &ParameterSetSpec::default_limits_low(),
            &ParameterSetSpec::default_limits_low(),
        );
        let (limits_high, limits_high_source) = expand_array(
            &spec.limits_high,
            component_count,
            &ParameterSetSpec::default_limits_high(),
            &ParameterSetSpec::default_limits_high(),
        );

        let mut parameters = Vec::with_capacity(component_count * ModelParameter::COUNT);
        for component in 0..component_count {
            for (offset, parameter) in ModelParameter::ALL.iter().enumerate() {
                let index = component * ModelParameter::COUNT + offset;
                let max_step = parameter
                    .is_temperature()
                    .then_some(TEMPERATURE_MAX_STEP);
                parameters.push(ParameterInfo {
                    slot: ParameterSlot::new(*parameter, component),
                    value: values[index],
                    fixed: fixed[index],
                    limited_low: limited_low[index],
                    limited_high: limited_high[index],
                    limit_low: limits_low[index],
                    limit_high: limits_high[index],
                    max_step,
                    error: 0.0,
                });
            }
        }

        Self {
            parameters,
            component_count,
            expansion: ExpansionReport {
                values: values_source,
                fixed: fixed_source,
                limited_low: limited_low_source,
                limited_high: limited_high_source,
                limits_low: limits_low_source,
                limits_high: limits_high_source,
            },
        }
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn expansion(&self) -> ExpansionReport {
        self.expansion
    }

    pub fn slots(&self) -> Vec<ParameterSlot> {
        self.parameters.iter().map(|info| info.slot).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.parameters.iter().map(|info| info.value).collect()
    }

    pub fn constraints(&self) -> Vec<ParameterConstraint> {
        self.parameters
            .iter()
            .map(ParameterInfo::constraint)
            .collect()
    }

    /// Write fitted values and one-sigma errors back into the records.
    /// Lengths are checked by the caller before the solve, so a mismatch
    /// here is a programming error.
    pub fn apply_solution(&mut self, values: &[f64], errors: &[f64]) {
        debug_assert_eq!(values.len(), self.parameters.len());
        debug_assert_eq!(errors.len(), self.parameters.len());
        for (info, (&value, &error)) in self.parameters.iter_mut().zip(values.iter().zip(errors)) {
            info.value = value;
            info.error = error;
        }
    }
}

/// Normalize one settings array to `6 * components` entries.
fn expand_array<T: Copy>(
    supplied: &[T],
    component_count: usize,
    per_component_default: &[T; ModelParameter::COUNT],
    reset: &[T; ModelParameter::COUNT],
) -> (Vec<T>, ExpansionSource) {
    let full = component_count * ModelParameter::COUNT;

    if supplied.len() == full {
        return (supplied.to_vec(), ExpansionSource::Provided);
    }

    if supplied.len() == ModelParameter::COUNT {
        let mut tiled = Vec::with_capacity(full);
        for _ in 0..component_count {
            tiled.extend_from_slice(supplied);
        }
        return (tiled, ExpansionSource::Replicated);
    }

    let source = if supplied.is_empty() {
        // absent arrays take defaults silently, that is not a reset
        ExpansionSource::Replicated
    } else {
        ExpansionSource::DefaultReset
    };
    let template = if supplied.is_empty() {
        per_component_default
    } else {
        reset
    };

    let mut tiled = Vec::with_capacity(full);
    for _ in 0..component_count {
        tiled.extend_from_slice(template);
    }
    (tiled, source)
}

#[cfg(test)]
mod tests {
    use super::{ExpansionSource, ParameterSet, ParameterSetSpec};
    use crate::domain::ModelParameter;

    #[test]
    fn single_group_is_replicated_across_components() {
        let spec = ParameterSetSpec {
            values: vec![15.0, 12.0, 14.5, 0.8, -1.0, 0.4],
            ..ParameterSetSpec::default()
        };
        let set = ParameterSet::expand(&spec, 3);

        assert_eq!(set.component_count(), 3);
        assert_eq!(set.parameters().len(), 18);
        assert_eq!(set.expansion().values, ExpansionSource::Replicated);

        let values = set.values();
        for component in 0..3 {
            assert_eq!(values[component * 6], 15.0);
            assert_eq!(values[component * 6 + 4], -1.0);
        }
    }

    #[test]
    fn full_length_arrays_pass_through_unchanged() {
        let mut values = Vec::new();
        for component in 0..2 {
            values.extend_from_slice(&[
                20.0 + component as f64,
                15.0,
                14.0,
                1.0,
                component as f64,
                0.5,
            ]);
        }
        let spec = ParameterSetSpec {
            values: values.clone(),
            ..ParameterSetSpec::default()
        };
        let set = ParameterSet::expand(&spec, 2);

        assert_eq!(set.expansion().values, ExpansionSource::Provided);
        assert_eq!(set.values(), values);
    }

    #[test]
    fn unusable_value_lengths_fall_back_to_the_reset_vector() {
        let spec = ParameterSetSpec {
            values: vec![20.0; 10],
            ..ParameterSetSpec::default()
        };
        let set = ParameterSet::expand(&spec, 2);

        assert_eq!(set.expansion().values, ExpansionSource::DefaultReset);
        let values = set.values();
        assert_eq!(values[2], 1.0e10);
        assert_eq!(values[8], 1.0e10);
    }

    #[test]
    fn component_count_is_inferred_from_longer_value_arrays() {
        let spec = ParameterSetSpec {
            values: vec![20.0, 15.0, 14.0, 1.0, 0.0, 0.5].repeat(3),
            ..ParameterSetSpec::default()
        };
        let set = ParameterSet::expand(&spec, 1);

        assert_eq!(set.component_count(), 3);
        assert_eq!(set.expansion().values, ExpansionSource::Provided);
    }

    #[test]
    fn default_bounds_follow_the_parameter_kind() {
        let set = ParameterSet::expand(&ParameterSetSpec::default(), 1);

        for info in set.parameters() {
            match info.slot.parameter {
                ModelParameter::Tkin | ModelParameter::Tex => {
                    assert!(info.limited_low);
                    assert_eq!(info.limit_low, 2.73);
                    assert!(!info.limited_high);
                    assert_eq!(info.max_step, Some(1.0));
                }
                ModelParameter::Ntot | ModelParameter::Width => {
                    assert!(info.limited_low);
                    assert_eq!(info.limit_low, 0.0);
                    assert!(!info.limited_high);
                    assert_eq!(info.max_step, None);
                }
                ModelParameter::XoffV => {
                    assert!(!info.limited_low);
                    assert!(!info.limited_high);
                }
                ModelParameter::Fortho => {
                    assert!(info.limited_low);
                    assert!(info.limited_high);
                    assert_eq!(info.limit_low, 0.0);
                    assert_eq!(info.limit_high, 1.0);
                }
            }
        }
    }

    #[test]
    fn fixed_flags_replicate_like_values() {
        let spec = ParameterSetSpec {
            fixed: vec![false, true, false, false, false, true],
            ..ParameterSetSpec::default()
        };
        let set = ParameterSet::expand(&spec, 2);

        let fixed: Vec<bool> = set.parameters().iter().map(|info| info.fixed).collect();
        assert_eq!(
            fixed,
            vec![
                false, true, false, false, false, true, false, true, false, false, false, true
            ]
        );
        assert_eq!(set.expansion().fixed, ExpansionSource::Replicated);
    }

    #[test]
    fn slot_labels_carry_the_component_index() {
        let set = ParameterSet::expand(&ParameterSetSpec::default(), 2);
        let labels: Vec<String> = set
            .parameters()
            .iter()
            .map(|info| info.slot.display_name())
            .collect();
        assert_eq!(labels[0], "tkin0");
        assert_eq!(labels[5], "fortho0");
        assert_eq!(labels[6], "tkin1");
        assert_eq!(labels[11], "fortho1");
    }
}
