use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use spectralnorm::{
    approximate_with, run_iter, verify_within, Kernel, EXPECTED_CHECKSUM, REFERENCE_SIZE,
};

#[derive(Parser)]
#[command(
    name = "spectralnorm",
    version,
    about = "Spectral norm benchmark driver - power method on the shootout matrix"
)]
struct Cli {
    /// Matrix order
    #[arg(short = 'n', long, env = "SPECTRALNORM_SIZE", default_value_t = REFERENCE_SIZE)]
    size: usize,

    /// How many times to run the estimator
    #[arg(short, long, env = "SPECTRALNORM_REPEATS", default_value_t = 1)]
    repeats: usize,

    /// Row kernel
    #[arg(short, long, env = "SPECTRALNORM_KERNEL", value_enum, default_value_t = CliKernel::Simd)]
    kernel: CliKernel,

    /// Accept results within this relative tolerance instead of exact bits
    #[arg(long)]
    tolerance: Option<f64>,

    /// Skip the checksum comparison
    #[arg(long)]
    no_verify: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliKernel {
    Portable,
    Simd,
    #[cfg(feature = "rayon")]
    Parallel,
}

impl From<CliKernel> for Kernel {
    fn from(val: CliKernel) -> Self {
        match val {
            CliKernel::Portable => Kernel::Portable,
            CliKernel::Simd => Kernel::Simd,
            #[cfg(feature = "rayon")]
            CliKernel::Parallel => Kernel::Parallel,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let kernel = Kernel::from(cli.kernel);
    anyhow::ensure!(cli.repeats > 0, "--repeats must be at least 1");

    // The checksum is only defined for the reference order.
    let check = !cli.no_verify && cli.size == REFERENCE_SIZE;

    let start = Instant::now();
    let norm = match (check, cli.tolerance) {
        (true, None) => run_iter(cli.repeats, kernel).context("benchmark run failed")?,
        (check, tolerance) => {
            let mut norm = 0.0;
            for _ in 0..cli.repeats {
                norm = approximate_with(cli.size, kernel)
                    .with_context(|| format!("estimating spectral norm for n = {}", cli.size))?;
                if let (true, Some(rel_tol)) = (check, tolerance) {
                    verify_within(norm, EXPECTED_CHECKSUM, rel_tol)
                        .context("benchmark run failed")?;
                }
            }
            norm
        }
    };
    let elapsed = start.elapsed();

    info!(
        n = cli.size,
        repeats = cli.repeats,
        %kernel,
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "benchmark finished"
    );

    println!("{:.9}", norm);
    Ok(())
}
