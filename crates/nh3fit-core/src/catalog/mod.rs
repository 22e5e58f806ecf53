//! Static hyperfine line catalog for the four ammonia inversion transitions.
//!
//! Rest frequencies, Einstein A coefficients, ortho/para classification, and
//! the hyperfine velocity-offset and relative-intensity tables are fixed
//! molecular data, constructed once and shared read-only by every synthesis
//! call. The intensity weights are sum-normalized at use, so the stored
//! magnitudes only matter relative to each other.

use crate::domain::Transition;
use crate::numerics::stable_sum;

/// Immutable physical data for one inversion transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRecord {
    /// Rest frequency in Hz.
    pub rest_frequency: f64,
    /// Einstein A coefficient in s^-1.
    pub einstein_a: f64,
    /// Ortho (true) or para (false) symmetry class.
    pub is_ortho: bool,
    /// Hyperfine component velocity offsets in km/s.
    pub velocity_offsets: &'static [f64],
    /// Relative hyperfine intensity weights (normalized at use).
    pub intensity_weights: &'static [f64],
}

const VOFF_ONEONE: [f64; 18] = [
    19.8513, 19.3159, 7.88669, 7.46967, 7.35132, 0.460409, 0.322042, -0.0751680, -0.213003,
    0.311034, 0.192266, -0.132382, -0.250923, -7.23349, -7.37280, -7.81526, -19.4117, -19.5500,
];

const WEIGHTS_ONEONE: [f64; 18] = [
    0.0740740, 0.148148, 0.0925930, 0.166667, 0.0185190, 0.0370370, 0.0185190, 0.0185190,
    0.0925930, 0.0333330, 0.300000, 0.466667, 0.0333330, 0.0925930, 0.0185190, 0.166667,
    0.0740740, 0.148148,
];

const VOFF_TWOTWO: [f64; 21] = [
    26.5263, 26.0111, 25.9505, 16.3917, 16.3793, 15.8642, 0.562503, 0.528408, 0.523745,
    0.0132820, -0.00379100, -0.0132820, -0.501831, -0.531340, -0.589080, -15.8547, -16.3698,
    -16.3822, -25.9505, -26.0111, -26.5263,
];

const WEIGHTS_TWOTWO: [f64; 21] = [
    0.00418600, 0.0376740, 0.0209300, 0.0372090, 0.0260470, 0.00186000, 0.0209300, 0.0116280,
    0.0106310, 0.267442, 0.499668, 0.146512, 0.0116280, 0.0106310, 0.0209300, 0.00186000,
    0.0260470, 0.0372090, 0.0209300, 0.0376740, 0.00418600,
];

const VOFF_THREETHREE: [f64; 26] = [
    29.195098, 29.044147, 28.941877, 28.911408, 21.234827, 21.214619, 21.136387, 21.087456,
    1.005122, 0.806082, 0.778062, 0.628569, 0.016754, -0.005589, -0.013401, -0.639734, -0.744554,
    -1.031924, -21.125222, -21.203441, -21.223649, -21.076291, -28.908067, -28.938523,
    -29.040794, -29.191744,
];

const WEIGHTS_THREETHREE: [f64; 26] = [
    0.012263, 0.008409, 0.003434, 0.005494, 0.006652, 0.008852, 0.004967, 0.011589, 0.019228,
    0.010387, 0.010820, 0.009482, 0.293302, 0.459109, 0.177372, 0.009482, 0.010820, 0.019228,
    0.004967, 0.008852, 0.006652, 0.011589, 0.005494, 0.003434, 0.008409, 0.012263,
];

const VOFF_FOURFOUR: [f64; 7] = [
    0.0,
    -30.49783692,
    30.49783692,
    0.0,
    24.25907811,
    -24.25907811,
    0.0,
];

const WEIGHTS_FOURFOUR: [f64; 7] = [0.2431, 0.0162, 0.0162, 0.3008, 0.0163, 0.0163, 0.3911];

const ONEONE: TransitionRecord = TransitionRecord {
    rest_frequency: 23.694506e9,
    einstein_a: 1.712e-7,
    is_ortho: false,
    velocity_offsets: &VOFF_ONEONE,
    intensity_weights: &WEIGHTS_ONEONE,
};

const TWOTWO: TransitionRecord = TransitionRecord {
    rest_frequency: 23.722633335e9,
    einstein_a: 2.291e-7,
    is_ortho: false,
    velocity_offsets: &VOFF_TWOTWO,
    intensity_weights: &WEIGHTS_TWOTWO,
};

const THREETHREE: TransitionRecord = TransitionRecord {
    rest_frequency: 23.8701296e9,
    einstein_a: 2.625e-7,
    is_ortho: true,
    velocity_offsets: &VOFF_THREETHREE,
    intensity_weights: &WEIGHTS_THREETHREE,
};

const FOURFOUR: TransitionRecord = TransitionRecord {
    rest_frequency: 24.1394169e9,
    einstein_a: 3.167e-7,
    is_ortho: false,
    velocity_offsets: &VOFF_FOURFOUR,
    intensity_weights: &WEIGHTS_FOURFOUR,
};

/// Catalog lookup for one transition.
pub const fn record(transition: Transition) -> &'static TransitionRecord {
    match transition {
        Transition::OneOne => &ONEONE,
        Transition::TwoTwo => &TWOTWO,
        Transition::ThreeThree => &THREETHREE,
        Transition::FourFour => &FOURFOUR,
    }
}

/// Intensity weights scaled so they sum to exactly one.
pub fn normalized_weights(transition: Transition) -> Vec<f64> {
    let weights = record(transition).intensity_weights;
    let total = stable_sum(weights);
    weights.iter().map(|weight| weight / total).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalized_weights, record};
    use crate::domain::Transition;

    #[test]
    fn hyperfine_component_counts_match_molecular_data() {
        let expected = [18, 21, 26, 7];
        for (transition, count) in Transition::ALL.iter().zip(expected) {
            let record = record(*transition);
            assert_eq!(record.velocity_offsets.len(), count);
            assert_eq!(record.intensity_weights.len(), count);
        }
    }

    #[test]
    fn only_threethree_is_ortho() {
        assert!(!record(Transition::OneOne).is_ortho);
        assert!(!record(Transition::TwoTwo).is_ortho);
        assert!(record(Transition::ThreeThree).is_ortho);
        assert!(!record(Transition::FourFour).is_ortho);
    }

    #[test]
    fn rest_frequencies_increase_with_transition() {
        let mut previous = 0.0;
        for transition in Transition::ALL {
            let frequency = record(transition).rest_frequency;
            assert!(frequency > previous);
            previous = frequency;
        }
    }

    #[test]
    fn normalized_weights_sum_to_one_for_every_transition() {
        for transition in Transition::ALL {
            let total: f64 = normalized_weights(transition).iter().sum();
            assert!((total - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn velocity_offsets_are_roughly_symmetric_about_line_center() {
        // Each inversion transition has satellite groups on both sides.
        for transition in Transition::ALL {
            let offsets = record(transition).velocity_offsets;
            let max = offsets.iter().cloned().fold(f64::MIN, f64::max);
            let min = offsets.iter().cloned().fold(f64::MAX, f64::min);
            assert!(max > 0.0 && min < 0.0);
            assert!((max + min).abs() < 1.0);
        }
    }
}
