//! Decimation filter pipeline behind the "effect of operations" figure.
//!
//! A two-tone periodic signal is low-passed by spectral masking, decimated,
//! convolved with a decimated windowed-sinc kernel, zero-stuffed back to the
//! original rate and low-passed again. Every intermediate array is kept so the
//! figure can show each stage in the time and frequency domain.

use std::f64::consts::PI;
use std::fmt;

use log::debug;

use crate::fft::{Complex64, FftError, FftImpl, ScalarFftImpl};
use crate::window::firwin_lowpass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    Fft(FftError),
    InvalidConfig(&'static str),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Fft(e) => write!(f, "transform failed: {}", e),
            PipelineError::InvalidConfig(why) => write!(f, "invalid pipeline config: {}", why),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Fft(e) => Some(e),
            PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<FftError> for PipelineError {
    fn from(e: FftError) -> Self {
        PipelineError::Fft(e)
    }
}

/// Parameters of the pipeline. The kernel has `sampling_rate` taps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub sampling_rate: usize,
    pub period: f64,
    pub downsample_factor: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 100,
            period: 2.0 * PI,
            downsample_factor: 2,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sampling_rate == 0 {
            return Err(PipelineError::InvalidConfig("sampling rate must be positive"));
        }
        if self.downsample_factor == 0 {
            return Err(PipelineError::InvalidConfig(
                "downsampling factor must be positive",
            ));
        }
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "period must be finite and positive",
            ));
        }
        if self.kernel_cutoff() >= 1.0 {
            return Err(PipelineError::InvalidConfig(
                "kernel cutoff must lie below the Nyquist frequency",
            ));
        }
        Ok(())
    }

    /// Cutoff of the masking low-pass, `π / factor`.
    pub fn cutoff(&self) -> f64 {
        PI / self.downsample_factor as f64
    }

    /// Kernel cutoff normalised to the Nyquist rate.
    pub fn kernel_cutoff(&self) -> f64 {
        self.cutoff() / (self.sampling_rate as f64 / 2.0)
    }

    pub fn kernel_len(&self) -> usize {
        self.sampling_rate
    }

    /// Sample instants `-π + 2πi / sampling_rate`.
    pub fn sample_times(&self) -> Vec<f64> {
        let fs = self.sampling_rate as f64;
        (0..self.sampling_rate)
            .map(|i| -PI + 2.0 * PI * i as f64 / fs)
            .collect()
    }

    /// `(period / sampling_rate) · (sin t + 0.5 sin 3t)` on [`Self::sample_times`].
    pub fn signal(&self) -> Vec<f64> {
        let gain = self.period / self.sampling_rate as f64;
        self.sample_times()
            .into_iter()
            .map(|t| gain * (t.sin() + 0.5 * (3.0 * t).sin()))
            .collect()
    }
}

/// Sample frequencies of a length-`n` DFT with sample spacing `d`, in the
/// standard order: non-negative frequencies first, then negative ones.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (n as f64 * d);
    let positive = (n - 1) / 2 + 1;
    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 * scale
            } else {
                -((n - k) as f64) * scale
            }
        })
        .collect()
}

/// Move the zero-frequency entry to the centre.
pub fn fftshift<T: Copy>(values: &[T]) -> Vec<T> {
    let mut out = values.to_vec();
    out.rotate_right(values.len() / 2);
    out
}

/// Undo [`fftshift`].
pub fn ifftshift<T: Copy>(values: &[T]) -> Vec<T> {
    let mut out = values.to_vec();
    out.rotate_left(values.len() / 2);
    out
}

fn spectrum_of(signal: &[f64], fft: &ScalarFftImpl<f64>) -> Result<Vec<Complex64>, FftError> {
    let buf: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    fft.fft_vec(&buf)
}

/// Zero every bin with `|f| > cutoff`, where `f = fftfreq(n, period / n)`,
/// and return the real part of the inverse transform.
pub fn low_pass_filter(signal: &[f64], cutoff: f64, period: f64) -> Result<Vec<f64>, FftError> {
    let n = signal.len();
    let fft = ScalarFftImpl::<f64>::default();
    let mut spectrum = spectrum_of(signal, &fft)?;
    for (bin, f) in spectrum.iter_mut().zip(fftfreq(n, period / n as f64)) {
        if f.abs() > cutoff {
            *bin = Complex64::zero();
        }
    }
    fft.ifft(&mut spectrum)?;
    Ok(spectrum.into_iter().map(|z| z.re).collect())
}

/// Every `factor`-th sample, starting with the first.
pub fn downsample(signal: &[f64], factor: usize) -> Vec<f64> {
    signal.iter().step_by(factor.max(1)).copied().collect()
}

/// Zero-insertion: `signal[i]` lands at `i * factor`, length `len * factor`.
pub fn upsample(signal: &[f64], factor: usize) -> Vec<f64> {
    let mut out = vec![0.0; signal.len() * factor];
    if factor == 0 {
        return out;
    }
    for (slot, &x) in out.iter_mut().step_by(factor).zip(signal) {
        *slot = x;
    }
    out
}

/// Linear convolution cropped to `max(len x, len h)` samples around the
/// centre of the full result.
pub fn convolve_same(x: &[f64], h: &[f64]) -> Vec<f64> {
    if x.is_empty() || h.is_empty() {
        return Vec::new();
    }
    let full_len = x.len() + h.len() - 1;
    let out_len = x.len().max(h.len());
    let start = (x.len().min(h.len()) - 1) / 2;
    (start..start + out_len)
        .map(|k| {
            let lo = k.saturating_sub(h.len() - 1);
            let hi = k.min(x.len() - 1);
            debug_assert!(k < full_len);
            (lo..=hi).map(|j| x[j] * h[k - j]).sum()
        })
        .collect()
}

/// Centred frequencies and spectrum magnitudes of `signal`, ready to plot.
pub fn magnitude_spectrum(signal: &[f64], period: f64) -> Result<(Vec<f64>, Vec<f64>), FftError> {
    let n = signal.len();
    let fft = ScalarFftImpl::<f64>::default();
    let spectrum = spectrum_of(signal, &fft)?;
    let freqs = fftshift(&fftfreq(n, period / n as f64));
    let magnitudes = fftshift(&spectrum).into_iter().map(|z| z.norm()).collect();
    Ok((freqs, magnitudes))
}

/// `len` evenly spaced points covering `[-π, π]`, both ends included.
pub fn time_axis(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![-PI],
        _ => {
            let step = 2.0 * PI / (len - 1) as f64;
            (0..len).map(|i| -PI + step * i as f64).collect()
        }
    }
}

/// Which colour an overlay is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    /// The signal under study before convolution.
    Signal,
    /// The FIR kernel.
    Kernel,
    /// Results of convolution and later stages.
    Derived,
}

/// One curve in a figure row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay<'a> {
    pub label: &'static str,
    pub samples: &'a [f64],
    pub color: ColorRole,
}

impl<'a> Overlay<'a> {
    pub fn new(label: &'static str, samples: &'a [f64], color: ColorRole) -> Self {
        Self {
            label,
            samples,
            color,
        }
    }
}

/// Every intermediate array of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPipeline {
    pub config: PipelineConfig,
    pub original: Vec<f64>,
    pub kernel: Vec<f64>,
    pub low_passed: Vec<f64>,
    pub downsampled: Vec<f64>,
    pub downsampled_kernel: Vec<f64>,
    pub convolved: Vec<f64>,
    pub upsampled: Vec<f64>,
    pub reconstructed: Vec<f64>,
}

impl FilterPipeline {
    pub fn run(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let factor = config.downsample_factor;
        let original = config.signal();
        let kernel = firwin_lowpass(config.kernel_len(), config.kernel_cutoff());
        let low_passed = low_pass_filter(&original, config.cutoff(), config.period)?;
        let downsampled = downsample(&low_passed, factor);
        let downsampled_kernel = downsample(&kernel, factor);
        let convolved = convolve_same(&downsampled, &downsampled_kernel);
        let upsampled = upsample(&convolved, factor);
        let reconstructed = low_pass_filter(&upsampled, PI, config.period)?;
        debug!(
            "pipeline: {} samples -> {} decimated -> {} reconstructed",
            original.len(),
            downsampled.len(),
            reconstructed.len()
        );
        Ok(Self {
            config,
            original,
            kernel,
            low_passed,
            downsampled,
            downsampled_kernel,
            convolved,
            upsampled,
            reconstructed,
        })
    }

    /// The six figure rows, top to bottom.
    pub fn stages(&self) -> Vec<Vec<Overlay<'_>>> {
        let o = Overlay::new;
        vec![
            vec![
                o("Original Signal", &self.original, ColorRole::Signal),
                o("Kernel h", &self.kernel, ColorRole::Kernel),
            ],
            vec![
                o("Low-pass Filtered Signal", &self.low_passed, ColorRole::Signal),
                o("Kernel h", &self.kernel, ColorRole::Kernel),
            ],
            vec![
                o("Downsampled Signal", &self.downsampled, ColorRole::Signal),
                o(
                    "Downsampled Kernel h",
                    &self.downsampled_kernel,
                    ColorRole::Kernel,
                ),
            ],
            vec![o("Convolved Signal", &self.convolved, ColorRole::Derived)],
            vec![o("Upsampled Signal", &self.upsampled, ColorRole::Derived)],
            vec![o(
                "Low-pass Filtered Upsampled Signal",
                &self.reconstructed,
                ColorRole::Derived,
            )],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fftfreq_matches_standard_ordering() {
        assert_eq!(fftfreq(4, 1.0), vec![0.0, 0.25, -0.5, -0.25]);
        assert_eq!(fftfreq(5, 0.5), vec![0.0, 0.4, 0.8, -0.8, -0.4]);
    }

    #[test]
    fn fftshift_centres_zero_and_ifftshift_undoes_it() {
        let f = fftfreq(5, 1.0);
        let shifted = fftshift(&f);
        assert_eq!(shifted[2], 0.0);
        assert!(shifted.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ifftshift(&shifted), f);
        assert_eq!(fftshift(&[0, 1, 2, 3]), vec![2, 3, 0, 1]);
    }

    #[test]
    fn downsample_then_upsample_preserves_length() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let d = downsample(&x, 2);
        assert_eq!(d, vec![1.0, 3.0, 5.0, 7.0]);
        let u = upsample(&d, 2);
        assert_eq!(u.len(), x.len());
        assert_eq!(u, vec![1.0, 0.0, 3.0, 0.0, 5.0, 0.0, 7.0, 0.0]);
    }

    #[test]
    fn convolve_same_centres_the_full_result() {
        // full: [1, 3, 6, 9, 7, 4]
        assert_eq!(
            convolve_same(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0, 1.0]),
            vec![3.0, 6.0, 9.0, 7.0]
        );
        // full: [1, 2, 2, 1], kernel longer than the signal
        assert_eq!(convolve_same(&[1.0, 1.0], &[1.0, 1.0, 1.0]), vec![1.0, 2.0, 2.0]);
        assert!(convolve_same(&[], &[1.0]).is_empty());
    }

    #[test]
    fn low_pass_keeps_slow_tone_and_drops_fast_one() {
        let config = PipelineConfig::default();
        let t = config.sample_times();
        let slow: Vec<f64> = t.iter().map(|t| t.sin()).collect();
        let mixed: Vec<f64> = t.iter().map(|t| t.sin() + (20.0 * t).sin()).collect();
        let filtered = low_pass_filter(&mixed, 0.5, config.period).unwrap();
        for (a, b) in filtered.iter().zip(&slow) {
            assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn magnitude_spectrum_peaks_at_signal_tones() {
        let config = PipelineConfig::default();
        let (freqs, mags) = magnitude_spectrum(&config.signal(), config.period).unwrap();
        assert_eq!(freqs.len(), mags.len());
        let peak = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| freqs[i].abs())
            .unwrap();
        assert!((peak - 1.0 / config.period).abs() < 1e-12);
    }

    #[test]
    fn run_produces_expected_lengths() {
        let p = FilterPipeline::run(PipelineConfig::default()).unwrap();
        assert_eq!(p.original.len(), 100);
        assert_eq!(p.kernel.len(), 100);
        assert_eq!(p.low_passed.len(), 100);
        assert_eq!(p.downsampled.len(), 50);
        assert_eq!(p.downsampled_kernel.len(), 50);
        assert_eq!(p.convolved.len(), 50);
        assert_eq!(p.upsampled.len(), 100);
        assert_eq!(p.reconstructed.len(), 100);
        let stages = p.stages();
        assert_eq!(stages.len(), 6);
        assert_eq!(stages[0][1].color, ColorRole::Kernel);
        assert_eq!(stages[5][0].label, "Low-pass Filtered Upsampled Signal");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let base = PipelineConfig::default();
        for config in [
            PipelineConfig {
                sampling_rate: 0,
                ..base
            },
            PipelineConfig {
                downsample_factor: 0,
                ..base
            },
            PipelineConfig {
                period: f64::NAN,
                ..base
            },
            PipelineConfig {
                period: -1.0,
                ..base
            },
            PipelineConfig {
                sampling_rate: 4,
                downsample_factor: 1,
                ..base
            },
        ] {
            assert!(matches!(
                FilterPipeline::run(config),
                Err(PipelineError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn time_axis_includes_both_ends() {
        let t = time_axis(5);
        assert_eq!(t.first(), Some(&-PI));
        assert!((t[4] - PI).abs() < 1e-12);
        assert!(time_axis(0).is_empty());
    }
}
