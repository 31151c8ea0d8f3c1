//! Spectral norm of the shootout's infinite implicit matrix.
//!
//! `spectralnorm` estimates the largest singular value of the leading `n × n`
//! block of
//!
//! ```text
//! A(i, j) = 1 / ((i+j)(i+j+1)/2 + i + 1)
//! ```
//!
//! with the power method on `B = AᵀA`, and returns the result as a checksum.
//!
//! - **Estimator**: [`approximate`], [`approximate_with`], [`rayleigh_quotient`]
//! - **Kernels**: [`element`], [`mul_av`], [`mul_atv`], [`mul_atav`] and their
//!   `_portable` forms; [`parallel`] row kernels (feature `rayon`)
//! - **Harness**: [`verify`], [`verify_within`], [`run_once`], [`run_iter`]
//!
//! # Bit Exactness
//!
//! Every kernel accumulates each output row in increasing column order with a
//! separate multiply and add. SIMD kernels spread *rows* across lanes and the
//! parallel kernel splits *rows* across threads, so all of them return the
//! same bits as the sequential loops:
//!
//! | Kernel | Strategy | Detection |
//! |--------|----------|-----------|
//! | [`Kernel::Portable`] | scalar loops | - |
//! | [`Kernel::Simd`] | AVX / SSE2 / NEON, rows per lane | Runtime on x86_64 |
//! | `Kernel::Parallel` | rayon row chunks over the SIMD kernel | feature `rayon` |
//!
//! # Example
//!
//! ```rust
//! use spectralnorm::{approximate_with, Kernel, EXPECTED_CHECKSUM, REFERENCE_SIZE};
//!
//! let norm = approximate_with(REFERENCE_SIZE, Kernel::Simd).unwrap();
//! assert_eq!(norm, EXPECTED_CHECKSUM);
//! ```
//!
//! # References
//!
//! - The Computer Language Benchmarks Game, "spectral-norm"
//! - Golub & Van Loan (2013). "Matrix Computations", §8.2 (power iterations)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arch;
mod checksum;
mod error;
mod estimator;
mod matrix;

#[cfg(feature = "rayon")]
pub mod parallel;

pub use checksum::{run_iter, run_once, verify, verify_within, EXPECTED_CHECKSUM, REFERENCE_SIZE};
pub use error::{Error, Result};
pub use estimator::{
    approximate, approximate_with, mul_atav_with, rayleigh_quotient, Kernel, POWER_ROUNDS,
};
pub use matrix::{
    element, mul_atav, mul_atav_portable, mul_atv, mul_atv_portable, mul_av, mul_av_portable,
};
