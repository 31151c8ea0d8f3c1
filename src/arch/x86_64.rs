//! x86_64 SIMD row kernels using AVX and SSE2.
//!
//! These functions are unsafe and require feature detection before calling
//! (SSE2 is part of the x86_64 baseline). The safe API in `matrix` handles
//! dispatch and finishes leftover rows.
//!
//! Each lane owns one output row. Lanes accumulate with `mul` then `add`,
//! never FMA, so every lane rounds exactly like the portable kernel.
//!
//! | ISA | Width | Rows per block |
//! |-----|-------|----------------|
//! | AVX | 4 f64 | 4 |
//! | SSE2 | 2 f64 | 2 |

use crate::matrix::denominator;

/// Rows per AVX block.
pub const AVX_LANES: usize = 4;

/// Rows per SSE2 block.
pub const SSE2_LANES: usize = 2;

/// AVX forward kernel over full 4-row blocks.
///
/// Writes `out[..k]` for the largest multiple `k` of 4 not exceeding
/// `out.len()` and returns `k`.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx")` before calling.
#[target_feature(enable = "avx")]
pub unsafe fn mul_av_rows_avx(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::x86_64::{
        __m256d, _mm256_add_pd, _mm256_div_pd, _mm256_loadu_pd, _mm256_mul_pd, _mm256_set1_pd,
        _mm256_setzero_pd, _mm256_storeu_pd,
    };

    let blocks = out.len() / AVX_LANES;
    let one = _mm256_set1_pd(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * AVX_LANES;
        let mut acc: __m256d = _mm256_setzero_pd();
        for (j, &vj) in v.iter().enumerate() {
            let d = [
                denominator(row, j) as f64,
                denominator(row + 1, j) as f64,
                denominator(row + 2, j) as f64,
                denominator(row + 3, j) as f64,
            ];
            let a = _mm256_div_pd(one, _mm256_loadu_pd(d.as_ptr()));
            acc = _mm256_add_pd(acc, _mm256_mul_pd(a, _mm256_set1_pd(vj)));
        }
        _mm256_storeu_pd(out_ptr.add(b * AVX_LANES), acc);
    }

    blocks * AVX_LANES
}

/// AVX transpose kernel over full 4-row blocks.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx")` before calling.
#[target_feature(enable = "avx")]
pub unsafe fn mul_atv_rows_avx(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::x86_64::{
        __m256d, _mm256_add_pd, _mm256_div_pd, _mm256_loadu_pd, _mm256_mul_pd, _mm256_set1_pd,
        _mm256_setzero_pd, _mm256_storeu_pd,
    };

    let blocks = out.len() / AVX_LANES;
    let one = _mm256_set1_pd(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * AVX_LANES;
        let mut acc: __m256d = _mm256_setzero_pd();
        for (j, &vj) in v.iter().enumerate() {
            let d = [
                denominator(j, row) as f64,
                denominator(j, row + 1) as f64,
                denominator(j, row + 2) as f64,
                denominator(j, row + 3) as f64,
            ];
            let a = _mm256_div_pd(one, _mm256_loadu_pd(d.as_ptr()));
            acc = _mm256_add_pd(acc, _mm256_mul_pd(a, _mm256_set1_pd(vj)));
        }
        _mm256_storeu_pd(out_ptr.add(b * AVX_LANES), acc);
    }

    blocks * AVX_LANES
}

/// SSE2 forward kernel over full 2-row blocks.
///
/// # Safety
///
/// Requires SSE2, which every x86_64 CPU provides.
#[target_feature(enable = "sse2")]
pub unsafe fn mul_av_rows_sse2(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::x86_64::{
        __m128d, _mm_add_pd, _mm_div_pd, _mm_loadu_pd, _mm_mul_pd, _mm_set1_pd, _mm_setzero_pd,
        _mm_storeu_pd,
    };

    let blocks = out.len() / SSE2_LANES;
    let one = _mm_set1_pd(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * SSE2_LANES;
        let mut acc: __m128d = _mm_setzero_pd();
        for (j, &vj) in v.iter().enumerate() {
            let d = [denominator(row, j) as f64, denominator(row + 1, j) as f64];
            let a = _mm_div_pd(one, _mm_loadu_pd(d.as_ptr()));
            acc = _mm_add_pd(acc, _mm_mul_pd(a, _mm_set1_pd(vj)));
        }
        _mm_storeu_pd(out_ptr.add(b * SSE2_LANES), acc);
    }

    blocks * SSE2_LANES
}

/// SSE2 transpose kernel over full 2-row blocks.
///
/// # Safety
///
/// Requires SSE2, which every x86_64 CPU provides.
#[target_feature(enable = "sse2")]
pub unsafe fn mul_atv_rows_sse2(v: &[f64], out: &mut [f64], first_row: usize) -> usize {
    use std::arch::x86_64::{
        __m128d, _mm_add_pd, _mm_div_pd, _mm_loadu_pd, _mm_mul_pd, _mm_set1_pd, _mm_setzero_pd,
        _mm_storeu_pd,
    };

    let blocks = out.len() / SSE2_LANES;
    let one = _mm_set1_pd(1.0);
    let out_ptr = out.as_mut_ptr();

    for b in 0..blocks {
        let row = first_row + b * SSE2_LANES;
        let mut acc: __m128d = _mm_setzero_pd();
        for (j, &vj) in v.iter().enumerate() {
            let d = [denominator(j, row) as f64, denominator(j, row + 1) as f64];
            let a = _mm_div_pd(one, _mm_loadu_pd(d.as_ptr()));
            acc = _mm_add_pd(acc, _mm_mul_pd(a, _mm_set1_pd(vj)));
        }
        _mm_storeu_pd(out_ptr.add(b * SSE2_LANES), acc);
    }

    blocks * SSE2_LANES
}
