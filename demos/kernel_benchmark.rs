//! Kernel Benchmark Demo
//!
//! Times every available kernel on the estimator and checks that they all
//! return the same bits.
//!
//! ```bash
//! cargo run --example kernel_benchmark --release
//! ```

use spectralnorm::{approximate, approximate_with, Kernel, EXPECTED_CHECKSUM, REFERENCE_SIZE};
use std::time::Instant;

fn main() {
    println!("spectralnorm Kernel Benchmark");
    println!("=============================\n");

    // Print detected architecture
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx") {
            println!("Architecture: x86_64 with AVX (4 rows per block)");
        } else {
            println!("Architecture: x86_64 with SSE2 (2 rows per block)");
        }
    }
    #[cfg(target_arch = "aarch64")]
    println!("Architecture: aarch64 with NEON (2 rows per block)");
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    println!("Architecture: portable");
    println!();

    for &n in &[100, 500, REFERENCE_SIZE, 2000] {
        benchmark_size(n);
    }

    let norm = approximate(REFERENCE_SIZE).expect("reference size is valid");
    println!("approximate({}) = {:.9}", REFERENCE_SIZE, norm);
    println!(
        "matches checksum: {}",
        norm.to_bits() == EXPECTED_CHECKSUM.to_bits()
    );
}

fn benchmark_size(n: usize) {
    println!("Order: {}", n);

    let baseline = approximate(n).expect("valid order");
    let mut portable_ns = None;

    for &kernel in Kernel::available() {
        let iterations = 3;
        let start = Instant::now();
        let mut norm = 0.0;
        for _ in 0..iterations {
            norm = approximate_with(n, kernel).expect("valid order");
        }
        let per_run = start.elapsed().as_nanos() as f64 / iterations as f64;
        let reference = *portable_ns.get_or_insert(per_run);

        println!(
            "  {:<9} {:>9.2} ms/run  speedup {:>5.1}x  {}",
            kernel.name(),
            per_run / 1e6,
            reference / per_run,
            if norm.to_bits() == baseline.to_bits() { "bit-exact" } else { "MISMATCH" }
        );
    }
    println!();
}
