//! aarch64 SIMD row kernels using NEON.
//!
//! NEON is always available on aarch64, so no runtime detection needed.
//! We still use target_feature for consistency with x86_64.
//!
//! Each of the two `f64` lanes owns one output row; accumulation uses
//! `vmulq_f64` then `vaddq_f64` (never `vfmaq_f64`) to keep the portable
//! rounding sequence.

use crate::matrix::denominator;

/// Rows per NEON block.
pub const NEON_LANES: usize = 2;

/// NEON forward kernel over full 2-row blocks.
///
/// Returns the number of rows written.
///
/// # Safety
///
/// NEON is always available on aarch64; the annotation only mirrors x86_64.
#[target_feature(enable = "neon")]
pub unsafe fn mul_av_rows_neon(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::aarch64::{float64x2_t, vaddq_f64, vdivq_f64, vdupq_n_f64, vld1q_f64, vmulq_f64, vst1q_f64};

    let blocks = out.len() / NEON_LANES;
    let one = vdupq_n_f64(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * NEON_LANES;
        let mut acc: float64x2_t = vdupq_n_f64(0.0);
        for (j, &vj) in v.iter().enumerate() {
            let d = [denominator(row, j) as f64, denominator(row + 1, j) as f64];
            let a = vdivq_f64(one, vld1q_f64(d.as_ptr()));
            acc = vaddq_f64(acc, vmulq_f64(a, vdupq_n_f64(vj)));
        }
        vst1q_f64(out_ptr.add(b * NEON_LANES), acc);
    }

    blocks * NEON_LANES
}

/// NEON transpose kernel over full 2-row blocks.
///
/// # Safety
///
/// NEON is always available on aarch64; the annotation only mirrors x86_64.
#[target_feature(enable = "neon")]
pub unsafe fn mul_atv_rows_neon(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::aarch64::{float64x2_t, vaddq_f64, vdivq_f64, vdupq_n_f64, vld1q_f64, vmulq_f64, vst1q_f64};

    let blocks = out.len() / NEON_LANES;
    let one = vdupq_n_f64(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * NEON_LANES;
        let mut acc: float64x2_t = vdupq_n_f64(0.0);
        for (j, &vj) in v.iter().enumerate() {
            let d = [denominator(j, row) as f64, denominator(j, row + 1) as f64];
            let a = vdivq_f64(one, vld1q_f64(d.as_ptr()));
            acc = vaddq_f64(acc, vmulq_f64(a, vdupq_n_f64(vj)));
        }
        vst1q_f64(out_ptr.add(b * NEON_LANES), acc);
    }

    blocks * NEON_LANES
}
