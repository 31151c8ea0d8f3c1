//! Numerical Edge Case Tests
//!
//! Size guards, degenerate blocks, non-finite inputs and the checksum
//! comparison boundaries.

#![allow(clippy::float_cmp)]

use spectralnorm::{
    approximate, approximate_with, element, mul_av, rayleigh_quotient, verify, verify_within,
    Error, Kernel, EXPECTED_CHECKSUM,
};

// =============================================================================
// Size Guards
// =============================================================================

#[test]
fn zero_size_is_rejected_for_every_kernel() {
    for &kernel in Kernel::available() {
        assert_eq!(
            approximate_with(0, kernel),
            Err(Error::InvalidSize { size: 0 }),
            "kernel {}",
            kernel
        );
    }
}

#[test]
fn overflowing_size_is_rejected_before_allocation() {
    // Allocating usize::MAX / 4 doubles would abort; the guard must fire first.
    let n = usize::MAX / 4;
    assert_eq!(approximate(n), Err(Error::SizeOverflow { size: n }));
}

// =============================================================================
// Element Formula
// =============================================================================

#[test]
fn element_uses_integer_denominator() {
    // 10000 * 10001 / 2 + 4000 + 1, converted once, then one division.
    assert_eq!(element(4_000, 6_000), 1.0 / 50_009_001.0);
    // 2^51 + 2^25 + 1, still below 2^53 so the conversion is exact.
    assert_eq!(element(0, 1 << 26), 1.0 / 2_251_799_847_239_681.0);
}

#[test]
#[should_panic(expected = "matrix index overflow")]
fn element_past_usize_panics() {
    let _ = element(usize::MAX / 2, 1);
}

#[test]
fn element_strictly_decreasing_along_antidiagonals() {
    // Largest element on anti-diagonal s+1 is below the smallest on s.
    for s in 0..50 {
        let smallest_here = element(s, 0);
        let largest_next = element(0, s + 1);
        assert!(
            largest_next < smallest_here,
            "s={}: {} !< {}",
            s,
            largest_next,
            smallest_here
        );
    }
}

#[test]
fn element_literal_spot_checks() {
    assert_eq!(element(0, 0), 1.0);
    assert_eq!(element(0, 1), 0.5);
    assert_eq!(element(1, 0), 1.0 / 3.0);
    assert_eq!(element(1, 1), 0.2);
    assert_eq!(element(3, 2), 1.0 / 19.0);
}

// =============================================================================
// Non-finite Propagation
// =============================================================================

#[test]
fn nan_input_propagates() {
    let v = [1.0, f64::NAN, 1.0];
    let mut out = [0.0; 3];
    mul_av(&v, &mut out);
    assert!(out.iter().all(|x| x.is_nan()));
}

#[test]
fn rayleigh_quotient_of_zero_vector_is_nan() {
    let zero = [0.0; 4];
    assert!(rayleigh_quotient(&zero, &zero).is_nan());
}

// =============================================================================
// Checksum Comparison
// =============================================================================

#[test]
fn verify_rejects_one_ulp_off() {
    let below = f64::from_bits(EXPECTED_CHECKSUM.to_bits() - 1);
    let err = verify(below).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("bad checksum: {} vs {}", below, EXPECTED_CHECKSUM)
    );
}

#[test]
fn verify_within_accepts_one_ulp_off() {
    let above = f64::from_bits(EXPECTED_CHECKSUM.to_bits() + 1);
    assert_eq!(verify_within(above, EXPECTED_CHECKSUM, 1e-13), Ok(above));
}

#[test]
fn verify_within_rejects_infinity() {
    assert!(verify_within(f64::INFINITY, EXPECTED_CHECKSUM, 1e-13).is_err());
}
