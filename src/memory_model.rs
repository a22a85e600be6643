//! Closed-form estimate of the peak memory of one FFT convolution.
//!
//! For a real input with `N` samples whose spectrum holds `M` bins (last axis
//! reduced to `n/2 + 1`), a driver keeps both inputs, both spectra and the
//! inverse output alive at once:
//!
//! ```text
//! elements = 2N + 2M + N
//! bytes    = elements * 8
//! ```
//!
//! Samples and bins are both counted as 8-byte elements.

use crate::ndfft::spectral_shape;

/// Bytes charged per sample or spectral bin.
pub const BYTES_PER_ELEMENT: f64 = 8.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Estimated peak memory, in MiB, of convolving two real arrays of `shape`.
/// An empty shape or a zero-length axis costs nothing.
pub fn theoretical_peak_memory(shape: &[usize]) -> f64 {
    if shape.is_empty() || shape.contains(&0) {
        return 0.0;
    }
    let samples: f64 = shape.iter().map(|&d| d as f64).product();
    let bins: f64 = spectral_shape(shape).iter().map(|&d| d as f64).product();
    let elements = 2.0 * samples + 2.0 * bins + samples;
    elements * BYTES_PER_ELEMENT / BYTES_PER_MB
}

pub fn theoretical_peak_memory_1d(n1: usize) -> f64 {
    theoretical_peak_memory(&[n1])
}

pub fn theoretical_peak_memory_2d(n1: usize, n2: usize) -> f64 {
    theoretical_peak_memory(&[n1, n2])
}

pub fn theoretical_peak_memory_3d(n1: usize, n2: usize, n3: usize) -> f64 {
    theoretical_peak_memory(&[n1, n2, n3])
}
