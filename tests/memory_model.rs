use fftconv::convolution::ExperimentDims;
use fftconv::memory_model::{
    theoretical_peak_memory, theoretical_peak_memory_1d, theoretical_peak_memory_2d,
    theoretical_peak_memory_3d, BYTES_PER_ELEMENT,
};
use proptest::prelude::*;

#[test]
fn n1_four_regression_value() {
    assert_eq!(theoretical_peak_memory_1d(4), 0.0001373291015625);
}

#[test]
fn one_mebibyte_of_elements() {
    // 2*2^16 + 2*(2^15 + 1) + 2^16 elements
    let n = 1 << 16;
    let elements = 3.0 * n as f64 + 2.0 * (n / 2 + 1) as f64;
    let expected = elements * BYTES_PER_ELEMENT / (1024.0 * 1024.0);
    assert_eq!(theoretical_peak_memory_1d(n), expected);
}

#[test]
fn experiment_sizes_are_comparable() {
    let dims = ExperimentDims::from_n(1000);
    let one = theoretical_peak_memory(&dims.shape_1d());
    let three = theoretical_peak_memory(&dims.shape_3d());
    assert!(one <= three);
    assert!(three < 2.0 * one);
}

proptest! {
    #[test]
    fn prop_1d_monotone(n in 1usize..100_000) {
        prop_assert!(theoretical_peak_memory_1d(n) <= theoretical_peak_memory_1d(n + 1));
    }

    #[test]
    fn prop_2d_monotone_in_each_axis(a in 1usize..2000, b in 1usize..2000) {
        let base = theoretical_peak_memory_2d(a, b);
        prop_assert!(base <= theoretical_peak_memory_2d(a + 1, b));
        prop_assert!(base <= theoretical_peak_memory_2d(a, b + 1));
    }

    #[test]
    fn prop_3d_monotone_in_each_axis(a in 1usize..200, b in 1usize..200, c in 1usize..200) {
        let base = theoretical_peak_memory_3d(a, b, c);
        prop_assert!(base <= theoretical_peak_memory_3d(a + 1, b, c));
        prop_assert!(base <= theoretical_peak_memory_3d(a, b + 1, c));
        prop_assert!(base <= theoretical_peak_memory_3d(a, b, c + 1));
    }
}
