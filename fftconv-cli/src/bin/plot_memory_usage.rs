use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fftconv::profile::collect_series;
use fftconv_cli::figures::{memory_usage_figure, MEMORY_FIGURE_FILE, MEMORY_FIGURE_SIZE};

/// Plot profiler-measured peak memory against the theoretical model.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding scalene_profile_n<N>.json files
    #[arg(long, default_value = "scalene")]
    dir: PathBuf,

    /// Output PNG path
    #[arg(long, default_value = MEMORY_FIGURE_FILE)]
    output: PathBuf,

    /// Also open the chart in the default image viewer
    #[arg(long)]
    plot: bool,
}

fn main() -> Result<()> {
    fftconv_cli::init_logging();
    let args = Args::parse();
    let series = collect_series(&args.dir)
        .with_context(|| format!("reading profiles from {}", args.dir.display()))?;
    let figure = memory_usage_figure(&series);
    let (w, h) = MEMORY_FIGURE_SIZE;
    figure
        .save_png(&args.output, w, h)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());
    if args.plot {
        fftconv_cli::viewer::show(&args.output)
            .with_context(|| format!("opening {}", args.output.display()))?;
    }
    Ok(())
}
