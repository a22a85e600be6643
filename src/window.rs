//! Hamming window and windowed-sinc FIR design.

use std::f64::consts::PI;

/// Symmetric Hamming window of length `len`; the last sample mirrors the
/// first, as filter design expects.
pub fn hamming(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Normalised sinc, `sin(πx) / (πx)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Hamming-windowed sinc low-pass FIR kernel with `numtaps` taps.
///
/// `cutoff` is relative to the Nyquist frequency, so it must lie in `(0, 1)`.
/// The taps are scaled to unit gain at DC. Returns an empty kernel when
/// `numtaps` is zero.
pub fn firwin_lowpass(numtaps: usize, cutoff: f64) -> Vec<f64> {
    if numtaps == 0 {
        return Vec::new();
    }
    let alpha = 0.5 * (numtaps - 1) as f64;
    let win = hamming(numtaps);
    let mut taps: Vec<f64> = (0..numtaps)
        .map(|k| {
            let m = k as f64 - alpha;
            cutoff * sinc(cutoff * m) * win[k]
        })
        .collect();
    let gain: f64 = taps.iter().sum();
    if gain != 0.0 {
        for t in taps.iter_mut() {
            *t /= gain;
        }
    }
    taps
}
