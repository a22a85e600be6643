use anyhow::{Context, Result};
use clap::Parser;
use fftconv::convolution::run_observed;
use fftconv::probe::default_probe;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Run the 1-D, 2-D and 3-D FFT convolution workloads for one problem size.
///
/// Meant to be observed by an external memory profiler.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Problem size; the 2-D case convolves n×n images
    n: usize,

    /// Seed for the random signals
    #[arg(long)]
    seed: Option<u64>,

    /// Print each driver's peak resident memory growth
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    fftconv_cli::init_logging();
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let probe = default_probe();
    let deltas = run_observed(args.n, &mut rng, probe.as_ref())
        .with_context(|| format!("running experiments for n={}", args.n))?;
    if args.report {
        for d in deltas {
            match d.growth_kib() {
                Some(kib) => println!("{}: +{} KiB peak RSS", d.label, kib),
                None => println!("{}: peak RSS unavailable", d.label),
            }
        }
    }
    Ok(())
}
