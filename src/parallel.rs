//! Row-parallel kernels on the rayon thread pool.
//!
//! Output rows are split into disjoint chunks; each chunk runs the SIMD row
//! kernel for its own row range, so per-row summation order (and therefore
//! every bit of the result) is unchanged. `for_each` returns only after all
//! chunks finish, which is the barrier between the forward and transpose
//! passes of [`mul_atav_par`].

use rayon::prelude::*;

use crate::matrix::{mul_atv_rows, mul_av_rows};

/// Below this many output rows the serial kernel runs instead.
pub const PARALLEL_THRESHOLD: usize = 128;

/// Rows handed to one rayon task. A multiple of every SIMD block width.
const ROW_CHUNK: usize = 32;

/// Row-parallel forward product `out = A · v`.
pub fn mul_av_par(v: &[f64], out: &mut [f64]) {
    if out.len() < PARALLEL_THRESHOLD {
        mul_av_rows(v, out, 0);
        return;
    }

    out.par_chunks_mut(ROW_CHUNK)
        .enumerate()
        .for_each(|(c, chunk)| mul_av_rows(v, chunk, c * ROW_CHUNK));
}

/// Row-parallel transpose product `out = Aᵀ · v`.
pub fn mul_atv_par(v: &[f64], out: &mut [f64]) {
    if out.len() < PARALLEL_THRESHOLD {
        mul_atv_rows(v, out, 0);
        return;
    }

    out.par_chunks_mut(ROW_CHUNK)
        .enumerate()
        .for_each(|(c, chunk)| mul_atv_rows(v, chunk, c * ROW_CHUNK));
}

/// Row-parallel composite product `out = Aᵀ · (A · v)`.
pub fn mul_atav_par(v: &[f64], scratch: &mut [f64], out: &mut [f64]) {
    mul_av_par(v, scratch);
    mul_atv_par(scratch, out);
}
