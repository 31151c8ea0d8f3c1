//! The implicit matrix `A` and its row kernels.
//!
//! `A(i, j) = 1 / ((i+j)(i+j+1)/2 + i + 1)` is never stored. Every kernel
//! regenerates the elements it needs while it accumulates a row.
//!
//! # Summation Order
//!
//! Each output row is accumulated from `0.0` in increasing column order with a
//! separate multiply and add (never a fused multiply-add). The SIMD kernels put
//! *different rows* in different lanes instead of splitting one row across
//! lanes, so every lane performs exactly the scalar sequence of roundings and
//! all kernels agree bit-for-bit.
//!
//! | ISA | Rows per block | Detection |
//! |-----|----------------|-----------|
//! | AVX | 4 | Runtime |
//! | SSE2 | 2 | Baseline on x86_64 |
//! | NEON | 2 | Always available |
//! | Portable | 1 | - |
//!
//! # Block Shapes
//!
//! Kernels take an input slice of length `c` and an output slice of length
//! `r`. [`mul_av`] multiplies by the leading `r × c` block of `A`;
//! [`mul_atv`] multiplies by the leading `r × c` block of `Aᵀ`. The estimator
//! only ever uses square blocks.

// arch is only used on architectures with SIMD dispatch
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::arch;

/// Integer denominator of `A(i, j)`.
///
/// Computed entirely in integer arithmetic so the conversion to `f64` happens
/// once, on an exact value.
///
/// Callers check the block with [`assert_indexable`] first.
#[inline(always)]
pub(crate) fn denominator(i: usize, j: usize) -> usize {
    let s = i + j;
    s * (s + 1) / 2 + i + 1
}

/// [`denominator`], or `None` when it does not fit in `usize`.
pub(crate) fn checked_denominator(i: usize, j: usize) -> Option<usize> {
    let s = i.checked_add(j)?;
    let p = s.checked_mul(s.checked_add(1)?)?;
    (p / 2).checked_add(i)?.checked_add(1)
}

/// Panic unless every denominator of the block `0..rows × 0..cols` fits.
///
/// `None` stands for a range end that itself overflowed. The denominator grows
/// in both indices, so the far corner bounds the block.
#[inline]
pub(crate) fn assert_indexable(rows: Option<usize>, cols: Option<usize>) {
    match (rows, cols) {
        (Some(0), _) | (_, Some(0)) => {}
        (Some(r), Some(c)) if checked_denominator(r - 1, c - 1).is_some() => {}
        _ => panic!(
            "matrix index overflow: {:?} x {:?} block exceeds usize denominators",
            rows, cols
        ),
    }
}

/// Exclusive end of `first..first + len`, `Some(0)` when the range is empty.
#[inline]
fn block_end(first: usize, len: usize) -> Option<usize> {
    if len == 0 {
        Some(0)
    } else {
        first.checked_add(len)
    }
}

#[inline(always)]
fn entry(i: usize, j: usize) -> f64 {
    1.0 / denominator(i, j) as f64
}

/// Element `A(i, j)` of the infinite matrix.
///
/// Every element is strictly positive, `A(0, 0) = 1`, and elements strictly
/// decrease as `i + j` grows.
///
/// # Panics
///
/// If `(i+j)(i+j+1)` or the denominator itself overflows `usize`, in debug
/// and release builds alike.
///
/// # Example
///
/// ```rust
/// use spectralnorm::element;
///
/// assert_eq!(element(0, 0), 1.0);
/// assert_eq!(element(0, 1), 0.5);
/// assert_eq!(element(1, 0), 1.0 / 3.0);
/// assert_eq!(element(1, 1), 0.2);
/// ```
#[inline]
#[must_use]
pub fn element(i: usize, j: usize) -> f64 {
    match checked_denominator(i, j) {
        Some(d) => 1.0 / d as f64,
        None => panic!("matrix index overflow: denominator of A({}, {}) exceeds usize", i, j),
    }
}

/// Forward product `out = A · v`.
///
/// Dispatches to the widest available SIMD row kernel; the result is
/// bit-identical to [`mul_av_portable`].
///
/// # Panics
///
/// If the `out.len() × v.len()` block reaches elements [`element`] would
/// panic on. Checked once per call, before any row is written.
///
/// # Example
///
/// ```rust
/// use spectralnorm::mul_av;
///
/// let v = [1.0, 1.0];
/// let mut out = [0.0; 2];
/// mul_av(&v, &mut out);
/// // Row 0: A(0,0) + A(0,1) = 1 + 1/2
/// assert_eq!(out[0], 1.5);
/// ```
#[inline]
pub fn mul_av(v: &[f64], out: &mut [f64]) {
    mul_av_rows(v, out, 0);
}

/// Portable (non-SIMD) forward product `out = A · v`.
///
/// This is the sequential kernel of record.
#[inline]
pub fn mul_av_portable(v: &[f64], out: &mut [f64]) {
    mul_av_rows_portable(v, out, 0);
}

/// Transpose product `out = Aᵀ · v`.
///
/// Dispatches like [`mul_av`]; bit-identical to [`mul_atv_portable`].
/// Panics like [`mul_av`], on the transposed block.
#[inline]
pub fn mul_atv(v: &[f64], out: &mut [f64]) {
    mul_atv_rows(v, out, 0);
}

/// Portable (non-SIMD) transpose product `out = Aᵀ · v`.
#[inline]
pub fn mul_atv_portable(v: &[f64], out: &mut [f64]) {
    mul_atv_rows_portable(v, out, 0);
}

/// Composite product `out = Aᵀ · (A · v)`.
///
/// `scratch` receives the intermediate `A · v`; its length sets the number of
/// rows of the forward block.
///
/// # Example
///
/// ```rust
/// use spectralnorm::mul_atav;
///
/// let v = [1.0];
/// let mut scratch = [0.0];
/// let mut out = [0.0];
/// mul_atav(&v, &mut scratch, &mut out);
/// assert_eq!(out[0], 1.0);
/// ```
#[inline]
pub fn mul_atav(v: &[f64], scratch: &mut [f64], out: &mut [f64]) {
    mul_av(v, scratch);
    mul_atv(scratch, out);
}

/// Portable composite product `out = Aᵀ · (A · v)`.
#[inline]
pub fn mul_atav_portable(v: &[f64], scratch: &mut [f64], out: &mut [f64]) {
    mul_av_portable(v, scratch);
    mul_atv_portable(scratch, out);
}

/// Forward rows `first_row..first_row + out.len()` of `A · v`.
///
/// Full SIMD blocks go through `arch`; the remaining rows are finished by the
/// portable kernel.
pub(crate) fn mul_av_rows(v: &[f64], out: &mut [f64], first_row: usize) {
    assert_indexable(block_end(first_row, out.len()), Some(v.len()));

    #[allow(unused_mut)]
    let mut done = 0;

    #[cfg(target_arch = "x86_64")]
    {
        if out.len() >= arch::x86_64::AVX_LANES && is_x86_feature_detected!("avx") {
            // SAFETY: AVX verified via runtime detection.
            done = unsafe { arch::x86_64::mul_av_rows_avx(v, out, first_row) };
        } else if out.len() >= arch::x86_64::SSE2_LANES {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            done = unsafe { arch::x86_64::mul_av_rows_sse2(v, out, first_row) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if out.len() >= arch::aarch64::NEON_LANES {
            // SAFETY: NEON is always available on aarch64.
            done = unsafe { arch::aarch64::mul_av_rows_neon(v, out, first_row) };
        }
    }

    mul_av_rows_portable(v, &mut out[done..], first_row + done);
}

/// Transpose rows `first_row..first_row + out.len()` of `Aᵀ · v`.
pub(crate) fn mul_atv_rows(v: &[f64], out: &mut [f64], first_row: usize) {
    assert_indexable(Some(v.len()), block_end(first_row, out.len()));

    #[allow(unused_mut)]
    let mut done = 0;

    #[cfg(target_arch = "x86_64")]
    {
        if out.len() >= arch::x86_64::AVX_LANES && is_x86_feature_detected!("avx") {
            // SAFETY: AVX verified via runtime detection.
            done = unsafe { arch::x86_64::mul_atv_rows_avx(v, out, first_row) };
        } else if out.len() >= arch::x86_64::SSE2_LANES {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            done = unsafe { arch::x86_64::mul_atv_rows_sse2(v, out, first_row) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if out.len() >= arch::aarch64::NEON_LANES {
            // SAFETY: NEON is always available on aarch64.
            done = unsafe { arch::aarch64::mul_atv_rows_neon(v, out, first_row) };
        }
    }

    mul_atv_rows_portable(v, &mut out[done..], first_row + done);
}

pub(crate) fn mul_av_rows_portable(v: &[f64], out: &mut [f64], first_row: usize) {
    assert_indexable(block_end(first_row, out.len()), Some(v.len()));
    for (k, o) in out.iter_mut().enumerate() {
        let i = first_row + k;
        let mut sum = 0.0;
        for (j, &vj) in v.iter().enumerate() {
            sum += entry(i, j) * vj;
        }
        *o = sum;
    }
}

pub(crate) fn mul_atv_rows_portable(v: &[f64], out: &mut [f64], first_row: usize) {
    assert_indexable(Some(v.len()), block_end(first_row, out.len()));
    for (k, o) in out.iter_mut().enumerate() {
        let i = first_row + k;
        let mut sum = 0.0;
        for (j, &vj) in v.iter().enumerate() {
            sum += entry(j, i) * vj;
        }
        *o = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_literals() {
        assert_eq!(element(0, 0), 1.0);
        assert_eq!(element(0, 1), 0.5);
        assert_eq!(element(1, 0), 1.0 / 3.0);
        // i + j = 2: denominators 4, 5, 6
        assert_eq!(element(0, 2), 0.25);
        assert_eq!(element(1, 1), 0.2);
        assert_eq!(element(2, 0), 1.0 / 6.0);
    }

    #[test]
    fn test_denominator_is_cantor_index_plus_one() {
        // Denominators enumerate 1, 2, 3, ... along anti-diagonals.
        let mut seen = Vec::new();
        for s in 0..6 {
            for i in 0..=s {
                seen.push(denominator(i, s - i));
            }
        }
        let expected: Vec<usize> = (1..=seen.len()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_checked_denominator_agrees_and_detects_overflow() {
        for (i, j) in [(0, 0), (3, 2), (999, 999), (4_000, 6_000)] {
            assert_eq!(checked_denominator(i, j), Some(denominator(i, j)));
        }
        assert_eq!(checked_denominator(usize::MAX, 0), None);
        assert_eq!(checked_denominator(0, usize::MAX / 2), None);
        // i + j itself overflows
        assert_eq!(checked_denominator(usize::MAX, 1), None);
    }

    #[test]
    #[should_panic(expected = "matrix index overflow")]
    fn test_element_panics_past_usize() {
        let _ = element(usize::MAX / 2, usize::MAX / 2);
    }

    #[test]
    #[should_panic(expected = "matrix index overflow")]
    fn test_mul_av_rows_checks_block_before_writing() {
        let mut out = [0.0; 2];
        mul_av_rows(&[1.0; 2], &mut out, usize::MAX / 2);
    }

    #[test]
    #[should_panic(expected = "matrix index overflow")]
    fn test_mul_atv_rows_checks_transposed_block() {
        let mut out = [0.0; 3];
        mul_atv_rows(&[1.0], &mut out, usize::MAX - 1);
    }

    #[test]
    fn test_empty_block_never_panics() {
        let mut out: [f64; 0] = [];
        mul_av_rows(&[1.0], &mut out, usize::MAX);
        mul_atv_rows(&[], &mut [0.0; 2], usize::MAX / 2);
    }

    #[test]
    fn test_mul_av_small_block() {
        let v = [1.0, 2.0];
        let mut out = [0.0; 2];
        mul_av(&v, &mut out);
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], element(1, 0) + element(1, 1) * 2.0);
    }

    #[test]
    fn test_mul_atv_uses_transpose() {
        // Row 0 of Aᵀ is column 0 of A: A(1,0) = 1/3, not A(0,1) = 1/2.
        let v = [0.0, 1.0];
        let mut fwd = [0.0; 2];
        let mut bwd = [0.0; 2];
        mul_av(&v, &mut fwd);
        mul_atv(&v, &mut bwd);
        assert_eq!(fwd[0], element(0, 1));
        assert_eq!(bwd[0], element(1, 0));
        assert_eq!(fwd[1], bwd[1]);
    }

    #[test]
    fn test_rectangular_block() {
        let v = [1.0; 3];
        let mut out = [0.0; 5];
        mul_av(&v, &mut out);
        for (i, &o) in out.iter().enumerate() {
            let expected = element(i, 0) + element(i, 1) + element(i, 2);
            assert_eq!(o, expected, "row {}", i);
        }
    }

    #[test]
    fn test_empty_input_zeroes_output() {
        let mut out = [7.0; 4];
        mul_av(&[], &mut out);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_dispatch_matches_portable_bitwise() {
        for n in [1, 2, 3, 4, 5, 7, 8, 9, 33] {
            let v: Vec<f64> = (0..n).map(|i| 1.0 + (i as f64) * 0.25).collect();
            let mut a = vec![0.0; n];
            let mut b = vec![0.0; n];
            mul_av(&v, &mut a);
            mul_av_portable(&v, &mut b);
            assert_eq!(a, b, "mul_av n={}", n);
            mul_atv(&v, &mut a);
            mul_atv_portable(&v, &mut b);
            assert_eq!(a, b, "mul_atv n={}", n);
        }
    }

    #[test]
    fn test_row_offset_matches_full_block() {
        let v: Vec<f64> = (0..10).map(|i| (i as f64).sin()).collect();
        let mut full = vec![0.0; 10];
        mul_av(&v, &mut full);
        let mut tail = vec![0.0; 6];
        mul_av_rows(&v, &mut tail, 4);
        assert_eq!(&full[4..], &tail[..]);
    }
}
