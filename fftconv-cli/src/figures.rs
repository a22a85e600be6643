//! The two published figures, assembled from library data.

use fftconv::pipeline::{magnitude_spectrum, time_axis, ColorRole, FilterPipeline};
use fftconv::profile::MemorySeries;
use fftconv::FftError;
use image::Rgb;

use crate::canvas::{LineStyle, Marker};
use crate::chart::{cycle, Figure, Scale, Series, BLACK, BLUE};

pub const MEMORY_FIGURE_FILE: &str = "memory_fft.png";
pub const MEMORY_FIGURE_SIZE: (u32, u32) = (1800, 900);
pub const MEMORY_FIGURE_TITLE: &str = "Theoretical vs Measured Memory Usage in FFT Convolution";

pub const PIPELINE_FIGURE_FILE: &str = "effect_of_operations_on_1D_signal.png";
pub const PIPELINE_FIGURE_SIZE: (u32, u32) = (1500, 2250);
pub const PIPELINE_FIGURE_TITLE: &str = "Effect of Different Operations on a 1D Signal";

/// Upper bound of the frequency panels.
const SPECTRUM_X_MAX: f64 = 8.0;

/// Log-log chart of measured against theoretical peak memory.
pub fn memory_usage_figure(series: &[MemorySeries]) -> Figure {
    let mut fig = Figure::new(1, 1);
    let ax = fig.axes_mut(0, 0);
    ax.set_title(MEMORY_FIGURE_TITLE)
        .set_x_label("n")
        .set_y_label("Memory Usage (MB)")
        .set_x_scale(Scale::Log10)
        .set_y_scale(Scale::Log10)
        .legend(true);
    for (i, s) in series.iter().enumerate() {
        let color = cycle(i);
        let dim = s.dim.label();
        ax.plot(
            Series::new(format!("Theoretical {}", dim), s.theoretical.clone())
                .color(color)
                .marker(Marker::Circle),
        );
        ax.plot(
            Series::new(format!("Measured {}", dim), s.measured.clone())
                .color(color)
                .style(LineStyle::Dashed)
                .marker(Marker::Cross),
        );
    }
    fig
}

fn role_color(role: ColorRole) -> Rgb<u8> {
    match role {
        ColorRole::Signal => BLUE,
        ColorRole::Kernel => cycle(1),
        ColorRole::Derived => BLACK,
    }
}

/// Six rows of time-domain and frequency-domain panels.
pub fn pipeline_figure(pipeline: &FilterPipeline) -> Result<Figure, FftError> {
    let stages = pipeline.stages();
    let mut fig = Figure::new(stages.len(), 2);
    fig.set_suptitle(PIPELINE_FIGURE_TITLE);
    for (row, overlays) in stages.iter().enumerate() {
        {
            let time = fig.axes_mut(row, 0);
            time.set_y_label("Amplitude")
                .set_x_limits(-core::f64::consts::PI, core::f64::consts::PI)
                .grid(true)
                .legend(true);
            if row == 0 {
                time.set_title("Time Domain");
            }
            for o in overlays {
                time.plot(
                    Series::from_xy(o.label, &time_axis(o.samples.len()), o.samples)
                        .color(role_color(o.color)),
                );
            }
        }
        let freq = fig.axes_mut(row, 1);
        freq.set_y_label("Magnitude")
            .set_x_limits(0.0, SPECTRUM_X_MAX)
            .grid(true)
            .legend(true);
        if row == 0 {
            freq.set_title("Frequency Domain");
        }
        for o in overlays {
            let (f, mag) = magnitude_spectrum(o.samples, pipeline.config.period)?;
            freq.plot(Series::from_xy(o.label, &f, &mag).color(role_color(o.color)));
        }
    }
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fftconv::profile::Dimensionality;
    use fftconv::PipelineConfig;

    #[test]
    fn memory_figure_has_two_series_per_dimensionality() {
        let series: Vec<MemorySeries> = Dimensionality::ALL
            .iter()
            .map(|&dim| MemorySeries {
                dim,
                measured: vec![(10.0, 1.0), (100.0, 2.0)],
                theoretical: vec![(10.0, 0.5), (100.0, 1.5)],
            })
            .collect();
        let mut fig = memory_usage_figure(&series);
        let ax = fig.axes_mut(0, 0);
        assert_eq!(ax.title(), Some(MEMORY_FIGURE_TITLE));
        let s = ax.series();
        assert_eq!(s.len(), 6);
        assert_eq!(s[0].label, "Theoretical 1D");
        assert_eq!(s[1].style, LineStyle::Dashed);
        assert_eq!(s[1].marker, Some(Marker::Cross));
        assert_eq!(s[4].color, cycle(2));
    }

    #[test]
    fn pipeline_figure_layout() {
        let pipeline = FilterPipeline::run(PipelineConfig::default()).unwrap();
        let fig = pipeline_figure(&pipeline).unwrap();
        assert_eq!(fig.shape(), (6, 2));
        assert_eq!(fig.suptitle(), Some(PIPELINE_FIGURE_TITLE));
        assert_eq!(fig.axes(0, 0).and_then(|a| a.title()), Some("Time Domain"));
        assert_eq!(fig.axes(0, 1).and_then(|a| a.title()), Some("Frequency Domain"));
        let kernel = &fig.axes(0, 0).unwrap().series()[1];
        assert_eq!(kernel.label, "Kernel h");
        assert_eq!(kernel.color, cycle(1));
        let last = &fig.axes(5, 1).unwrap().series()[0];
        assert_eq!(last.color, BLACK);
        assert_eq!(last.points.len(), 100);
    }
}
