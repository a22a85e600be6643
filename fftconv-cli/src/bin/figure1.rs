use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use fftconv::{FilterPipeline, PipelineConfig};
use fftconv_cli::figures::{pipeline_figure, PIPELINE_FIGURE_FILE, PIPELINE_FIGURE_SIZE};

/// Show how filtering, decimation, convolution and interpolation change a
/// 1-D signal in time and frequency.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Save the figure to effect_of_operations_on_1D_signal.png
    #[arg(short, long)]
    save: bool,

    /// Open the figure in the default image viewer
    #[arg(short, long)]
    plot: bool,
}

fn main() -> Result<()> {
    fftconv_cli::init_logging();
    let args = Args::parse();
    let pipeline = FilterPipeline::run(PipelineConfig::default())?;
    let figure = pipeline_figure(&pipeline)?;
    let (w, h) = PIPELINE_FIGURE_SIZE;
    if args.save {
        let path = Path::new(PIPELINE_FIGURE_FILE);
        figure
            .save_png(path, w, h)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    if args.plot {
        fftconv_cli::show_figure(&figure, w, h)?;
    }
    Ok(())
}
