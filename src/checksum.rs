//! Reference checksum and the repeat harness.
//!
//! The shootout driver runs the estimator at [`REFERENCE_SIZE`] a number of
//! times and fails on the first result that differs from
//! [`EXPECTED_CHECKSUM`]. The estimator itself never checks its output.

use tracing::warn;

use crate::error::{Error, Result};
use crate::estimator::{approximate_with, Kernel};

/// Matrix order used by the benchmark driver.
pub const REFERENCE_SIZE: usize = 1000;

/// Published result of `approximate(REFERENCE_SIZE)`.
#[allow(clippy::excessive_precision)]
pub const EXPECTED_CHECKSUM: f64 = 1.2742241481294835914184204739285632967948913574218750;

/// Exact comparison against [`EXPECTED_CHECKSUM`].
///
/// Returns `computed` on success.
///
/// # Errors
///
/// [`Error::ChecksumMismatch`] when the bits differ.
///
/// # Example
///
/// ```rust
/// use spectralnorm::{verify, EXPECTED_CHECKSUM};
///
/// assert!(verify(EXPECTED_CHECKSUM).is_ok());
/// assert!(verify(1.274224148).is_err());
/// ```
#[allow(clippy::float_cmp)]
pub fn verify(computed: f64) -> Result<f64> {
    if computed == EXPECTED_CHECKSUM {
        Ok(computed)
    } else {
        Err(mismatch(computed, EXPECTED_CHECKSUM))
    }
}

/// Relative-tolerance comparison: `|computed - expected| <= rel_tol * |expected|`.
///
/// For kernels that do not reproduce the reference summation order. NaN never
/// passes.
///
/// # Errors
///
/// [`Error::ChecksumMismatch`] when outside the tolerance.
pub fn verify_within(computed: f64, expected: f64, rel_tol: f64) -> Result<f64> {
    if (computed - expected).abs() <= rel_tol * expected.abs() {
        Ok(computed)
    } else {
        Err(mismatch(computed, expected))
    }
}

fn mismatch(computed: f64, expected: f64) -> Error {
    warn!(computed, expected, "checksum mismatch");
    Error::ChecksumMismatch { computed, expected }
}

/// One estimator run at [`REFERENCE_SIZE`], verified exactly.
///
/// # Errors
///
/// [`Error::ChecksumMismatch`] if the result differs from the reference.
pub fn run_once(kernel: Kernel) -> Result<f64> {
    verify(approximate_with(REFERENCE_SIZE, kernel)?)
}

/// `repeats` verified runs at [`REFERENCE_SIZE`]; stops at the first mismatch.
///
/// Returns the last checksum.
///
/// # Errors
///
/// [`Error::InvalidRepeats`] for zero repeats, otherwise the first error from
/// [`run_once`].
pub fn run_iter(repeats: usize, kernel: Kernel) -> Result<f64> {
    if repeats == 0 {
        return Err(Error::InvalidRepeats { repeats });
    }

    let mut last = 0.0;
    for _ in 0..repeats {
        last = run_once(kernel)?;
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_exact() {
        assert_eq!(verify(EXPECTED_CHECKSUM), Ok(EXPECTED_CHECKSUM));
        let next = f64::from_bits(EXPECTED_CHECKSUM.to_bits() + 1);
        assert_eq!(
            verify(next),
            Err(Error::ChecksumMismatch {
                computed: next,
                expected: EXPECTED_CHECKSUM
            })
        );
    }

    #[test]
    fn test_verify_within_tolerance() {
        let near = EXPECTED_CHECKSUM * (1.0 + 1e-15);
        assert!(verify_within(near, EXPECTED_CHECKSUM, 1e-13).is_ok());
        assert!(verify_within(1.27, EXPECTED_CHECKSUM, 1e-13).is_err());
        assert!(verify_within(f64::NAN, EXPECTED_CHECKSUM, 1e-13).is_err());
    }

    #[test]
    fn test_run_iter_rejects_zero_repeats() {
        assert_eq!(
            run_iter(0, Kernel::Portable),
            Err(Error::InvalidRepeats { repeats: 0 })
        );
    }

    #[test]
    fn test_run_once_reference() {
        assert_eq!(run_once(Kernel::Simd), Ok(EXPECTED_CHECKSUM));
    }
}
