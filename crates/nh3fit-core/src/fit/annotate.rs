//! TeX annotation labels for fitted parameters.

use crate::fit::params::ParameterInfo;

/// One label per parameter slot, e.g. `$T_K(0)$=19.87 $\pm$ 0.4312`.
pub fn annotations(parameters: &[ParameterInfo]) -> Vec<String> {
    parameters
        .iter()
        .map(|info| {
            format!(
                "${}({})$={} $\\pm$ {}",
                info.slot.parameter.tex_symbol(),
                info.slot.component,
                format_significant(info.value, 4),
                format_significant(info.error, 4),
            )
        })
        .collect()
}

/// Render a value with the given number of significant digits, switching to
/// scientific notation outside a comfortable magnitude range.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return format!("{value}");
    }

    let magnitude = value.abs().log10().floor() as i32;
    if magnitude < -4 || magnitude >= digits as i32 {
        let decimals = digits.saturating_sub(1);
        format!("{value:.decimals$e}")
    } else {
        let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
        format!("{value:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::{annotations, format_significant};
    use crate::domain::{ModelParameter, ParameterSlot};
    use crate::fit::params::ParameterInfo;

    #[test]
    fn significant_digit_formatting_covers_common_magnitudes() {
        assert_eq!(format_significant(19.87234, 4), "19.87");
        assert_eq!(format_significant(0.43121, 4), "0.4312");
        assert_eq!(format_significant(0.0, 4), "0");
        assert_eq!(format_significant(1.23456e14, 4), "1.235e14");
        assert_eq!(format_significant(-2.5, 4), "-2.500");
    }

    #[test]
    fn labels_use_the_parameter_symbol_and_component_index() {
        let info = ParameterInfo {
            slot: ParameterSlot::new(ModelParameter::Tkin, 1),
            value: 19.87234,
            fixed: false,
            limited_low: true,
            limited_high: false,
            limit_low: 2.73,
            limit_high: 0.0,
            max_step: Some(1.0),
            error: 0.43121,
        };
        let labels = annotations(&[info]);
        assert_eq!(labels, vec!["$T_K(1)$=19.87 $\\pm$ 0.4312".to_string()]);
    }
}
