//! Regression guarantees of the spectral synthesizer.

use nh3fit_core::catalog;
use nh3fit_core::common::constants::CKMS;
use nh3fit_core::numerics::{linear_grid, relative_difference};
use nh3fit_core::physics::{line_center_optical_depths, synthesize};
use nh3fit_core::{PhysicalParameters, SpectralAxis, Transition};

fn axis_around(transition: Transition, samples: usize, half_width_kms: f64) -> SpectralAxis {
    let center = catalog::record(transition).rest_frequency / 1.0e9;
    let half_width = center * half_width_kms / CKMS;
    let values = linear_grid(center - half_width, center + half_width, samples).expect("axis grid");
    SpectralAxis::ghz(values)
}

#[test]
fn spectra_are_non_negative_across_a_parameter_sweep() {
    let axis = axis_around(Transition::OneOne, 257, 30.0);

    for tkin in [5.0, 12.0, 20.0, 40.0, 80.0] {
        for tex in [3.0, 8.0, 15.0] {
            for column in [12.5, 14.0, 15.5] {
                for fortho in [0.0, 0.25, 0.5, 1.0] {
                    let parameters = PhysicalParameters {
                        kinetic_temperature: tkin,
                        excitation_temperature: Some(tex),
                        total_column: column,
                        line_width: 0.7,
                        velocity_offset: -2.0,
                        ortho_fraction: fortho,
                        ..PhysicalParameters::default()
                    };
                    let spectrum = synthesize(&axis, &parameters, false).expect("synthesis");
                    assert!(
                        spectrum.iter().all(|value| *value >= 0.0),
                        "negative sample at tkin={tkin} tex={tex} column={column} fortho={fortho}"
                    );
                }
            }
        }
    }
}

#[test]
fn log_and_linear_column_inputs_are_interchangeable() {
    let axis = axis_around(Transition::OneOne, 129, 25.0);
    let log_form = PhysicalParameters {
        total_column: 14.0,
        excitation_temperature: Some(15.0),
        ortho_fraction: 0.5,
        ..PhysicalParameters::default()
    };
    let linear_form = PhysicalParameters {
        total_column: 1.0e14,
        ..log_form.clone()
    };

    let from_log = synthesize(&axis, &log_form, false).expect("log form");
    let from_linear = synthesize(&axis, &linear_form, false).expect("linear form");
    for (a, b) in from_log.iter().zip(&from_linear) {
        assert!(relative_difference(*a, *b, 1.0) <= 1.0e-12);
    }
}

#[test]
fn super_kinetic_excitation_behaves_exactly_like_lte() {
    let axis = axis_around(Transition::TwoTwo, 101, 25.0);
    let clamped = PhysicalParameters {
        kinetic_temperature: 20.0,
        excitation_temperature: Some(25.0),
        ortho_fraction: 0.5,
        ..PhysicalParameters::default()
    };
    let lte = PhysicalParameters {
        excitation_temperature: Some(20.0),
        ..clamped.clone()
    };

    assert_eq!(
        synthesize(&axis, &clamped, false).expect("clamped"),
        synthesize(&axis, &lte, false).expect("lte")
    );
}

#[test]
fn thin_fixed_tau_output_ignores_the_column_entirely() {
    let axis = axis_around(Transition::OneOne, 101, 20.0);
    let base = PhysicalParameters {
        fixed_tau11: Some(1.5),
        total_column: 13.0,
        ..PhysicalParameters::default()
    };
    let low = synthesize(&axis, &base, true).expect("low column");
    let high = synthesize(
        &axis,
        &PhysicalParameters {
            total_column: 16.0,
            ..base.clone()
        },
        true,
    )
    .expect("high column");
    assert_eq!(low, high);

    let low_depths = line_center_optical_depths(&base, true);
    assert!((low_depths.oneone - 1.5).abs() < 1.0e-12);
}

#[test]
fn hyperfine_weights_normalize_to_unity_for_every_transition() {
    for transition in Transition::ALL {
        let weights = catalog::normalized_weights(transition);
        let total: f64 = weights.iter().sum();
        assert!(
            (total - 1.0).abs() < 1.0e-12,
            "weights of {transition} sum to {total}"
        );
        assert_eq!(
            weights.len(),
            catalog::record(transition).velocity_offsets.len()
        );
    }
}

#[test]
fn four_transition_ladder_weakens_toward_higher_lines_in_cold_gas() {
    let parameters = PhysicalParameters {
        kinetic_temperature: 15.0,
        excitation_temperature: Some(10.0),
        ortho_fraction: 0.5,
        ..PhysicalParameters::default()
    };
    let depths = line_center_optical_depths(&parameters, false);
    assert!(depths.oneone > depths.twotwo);
    assert!(depths.twotwo > depths.threethree);
    assert!(depths.threethree > depths.fourfour);
}
