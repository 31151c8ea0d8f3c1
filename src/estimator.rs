//! Power-method spectral norm estimate.
//!
//! Starting from the all-ones vector, ten rounds each apply `B = AᵀA` twice,
//! alternating which buffer is source and destination. The norm estimate is
//! the square root of the Rayleigh quotient `vᵀBv / vᵀv`, where `Bv` is the
//! final `u`.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::matrix::{checked_denominator, mul_atav, mul_atav_portable};

/// Number of power-method rounds. Each round applies `AᵀA` twice.
///
/// The reference checksum depends on exactly this count.
pub const POWER_ROUNDS: usize = 10;

/// Which row kernel drives the matrix products.
///
/// All kernels produce bit-identical results; they differ only in speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kernel {
    /// Sequential scalar loops, the kernel of record.
    #[default]
    Portable,
    /// Rows across SIMD lanes (AVX/SSE2/NEON), portable elsewhere.
    Simd,
    /// Row chunks on the rayon pool, each chunk through the SIMD kernel.
    #[cfg(feature = "rayon")]
    Parallel,
}

impl Kernel {
    /// Kernels compiled into this build.
    #[must_use]
    pub fn available() -> &'static [Kernel] {
        #[cfg(feature = "rayon")]
        const ALL: &[Kernel] = &[Kernel::Portable, Kernel::Simd, Kernel::Parallel];
        #[cfg(not(feature = "rayon"))]
        const ALL: &[Kernel] = &[Kernel::Portable, Kernel::Simd];
        ALL
    }

    /// Lower-case name, as accepted by the CLI.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Portable => "portable",
            Kernel::Simd => "simd",
            #[cfg(feature = "rayon")]
            Kernel::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite product `out = Aᵀ · (A · v)` through the selected kernel.
#[inline]
pub fn mul_atav_with(kernel: Kernel, v: &[f64], scratch: &mut [f64], out: &mut [f64]) {
    match kernel {
        Kernel::Portable => mul_atav_portable(v, scratch, out),
        Kernel::Simd => mul_atav(v, scratch, out),
        #[cfg(feature = "rayon")]
        Kernel::Parallel => crate::parallel::mul_atav_par(v, scratch, out),
    }
}

/// `sqrt(Σ u[i]·v[i] / Σ v[i]·v[i])`, both sums in increasing `i`.
///
/// With `u = Bv` this is the square root of the Rayleigh quotient of `B`.
///
/// # Example
///
/// ```rust
/// use spectralnorm::rayleigh_quotient;
///
/// // u = 4v: quotient 4, root 2
/// assert_eq!(rayleigh_quotient(&[4.0, 8.0], &[1.0, 2.0]), 2.0);
/// ```
#[must_use]
pub fn rayleigh_quotient(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(
        u.len(),
        v.len(),
        "rayleigh_quotient: dimension mismatch ({} vs {})",
        u.len(),
        v.len()
    );

    let mut vbv = 0.0;
    let mut vv = 0.0;
    for (&ui, &vi) in u.iter().zip(v.iter()) {
        vbv += ui * vi;
        vv += vi * vi;
    }
    (vbv / vv).sqrt()
}

/// Reject orders the element formula cannot index.
///
/// The largest denominator in an `n × n` block is at `i = j = n - 1`:
/// `(2n-2)(2n-1)/2 + n`.
fn check_size(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidSize { size: n });
    }

    match checked_denominator(n - 1, n - 1) {
        Some(_) => Ok(()),
        None => Err(Error::SizeOverflow { size: n }),
    }
}

/// Spectral norm estimate of the leading `n × n` block, portable kernel.
///
/// # Errors
///
/// [`Error::InvalidSize`] for `n == 0`, [`Error::SizeOverflow`] when the
/// element denominators for this `n` do not fit in `usize`.
///
/// # Example
///
/// ```rust
/// use spectralnorm::approximate;
///
/// assert_eq!(approximate(1).unwrap(), 1.0);
/// assert!(approximate(0).is_err());
/// ```
pub fn approximate(n: usize) -> Result<f64> {
    approximate_with(n, Kernel::Portable)
}

/// Spectral norm estimate of the leading `n × n` block with a chosen kernel.
///
/// Every kernel returns the same bits as [`approximate`].
///
/// # Errors
///
/// Same as [`approximate`].
pub fn approximate_with(n: usize, kernel: Kernel) -> Result<f64> {
    check_size(n)?;
    debug!(n, %kernel, "power iteration start");

    let mut u = vec![1.0; n];
    let mut v = vec![0.0; n];
    let mut scratch = vec![0.0; n];

    for round in 0..POWER_ROUNDS {
        mul_atav_with(kernel, &u, &mut scratch, &mut v);
        mul_atav_with(kernel, &v, &mut scratch, &mut u);
        trace!(round, "power round complete");
    }

    let norm = rayleigh_quotient(&u, &v);
    debug!(n, %kernel, norm, "power iteration done");
    Ok(norm)
}
