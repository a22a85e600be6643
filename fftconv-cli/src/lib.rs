//! PNG rendering for the fftconv binaries.
//!
//! Charts are rasterised by hand onto an [`image::RgbImage`] with a small
//! bitmap font, so no system font or graphics library is needed.

pub mod canvas;
pub mod chart;
pub mod figures;
pub mod font;
pub mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub use canvas::{Canvas, LineStyle, Marker, Rect, Stroke};
pub use chart::{Axes, Figure, Scale, Series};

/// Initialise logging for a binary; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Render `figure` to a temporary PNG and open it in the default viewer.
///
/// The file is kept so the viewer can still read it after the process exits.
pub fn show_figure(figure: &Figure, width: u32, height: u32) -> Result<PathBuf> {
    let tmp = tempfile::Builder::new()
        .prefix("fftconv-")
        .suffix(".png")
        .tempfile()
        .context("creating temporary image")?;
    let (_, path) = tmp.keep().context("keeping temporary image")?;
    figure
        .save_png(&path, width, height)
        .with_context(|| format!("writing {}", path.display()))?;
    viewer::show(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(path)
}
