//! Multi-dimensional real FFTs over row-major arrays.
//!
//! - [`Signal`]: real samples with an arbitrary shape (1D/2D/3D in practice)
//! - [`Spectrum`]: complex bins; the last axis is reduced to `n/2 + 1`
//! - [`rfftn`]/[`irfftn`]: real FFT along the last axis, complex FFTs along
//!   the remaining ones (row-column algorithm)

use log::debug;

use crate::fft::{Complex64, FftError, FftImpl, ScalarFftImpl};
use crate::rfft::{rfft_len, RealFftImpl};

/// Real-valued row-major array.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Signal {
    /// Wrap `data` with `shape`. The element count must equal the product of
    /// the shape.
    pub fn new(shape: &[usize], data: Vec<f64>) -> Result<Self, FftError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(FftError::ShapeMismatch);
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![0.0; shape.iter().product()],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Complex spectrum produced by [`rfftn`].
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    shape: Vec<usize>,
    data: Vec<Complex64>,
}

impl Spectrum {
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Elementwise product in place (convolution theorem).
    pub fn mul_assign(&mut self, other: &Spectrum) -> Result<(), FftError> {
        if self.shape != other.shape {
            return Err(FftError::ShapeMismatch);
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = a.mul(*b);
        }
        Ok(())
    }
}

/// Shape of the spectrum of a real array of `shape`.
pub fn spectral_shape(shape: &[usize]) -> Vec<usize> {
    let mut out = shape.to_vec();
    if let Some(last) = out.last_mut() {
        *last = rfft_len(*last);
    }
    out
}

/// Run a complex transform along `axis` of a row-major array of `shape`.
fn transform_axis(
    data: &mut [Complex64],
    shape: &[usize],
    axis: usize,
    fft: &ScalarFftImpl<f64>,
    inverse: bool,
) -> Result<(), FftError> {
    let len = shape[axis];
    let stride: usize = shape[axis + 1..].iter().product();
    let outer: usize = shape[..axis].iter().product();
    let mut lane = vec![Complex64::zero(); len];
    for o in 0..outer {
        let block = &mut data[o * len * stride..(o + 1) * len * stride];
        for i in 0..stride {
            if inverse {
                fft.ifft_strided(&mut block[i..], stride, &mut lane)?;
            } else {
                fft.fft_strided(&mut block[i..], stride, &mut lane)?;
            }
        }
    }
    Ok(())
}

/// Forward N-dimensional real FFT.
pub fn rfftn(signal: &Signal, fft: &ScalarFftImpl<f64>) -> Result<Spectrum, FftError> {
    let shape = signal.shape();
    let Some(&last) = shape.last() else {
        return Err(FftError::EmptyInput);
    };
    if signal.is_empty() {
        return Err(FftError::EmptyInput);
    }
    let spec_shape = spectral_shape(shape);
    let bins = rfft_len(last);
    let mut data = vec![Complex64::zero(); signal.len() / last * bins];
    for (row, out) in signal
        .as_slice()
        .chunks_exact(last)
        .zip(data.chunks_exact_mut(bins))
    {
        fft.rfft(row, out)?;
    }
    for axis in 0..shape.len() - 1 {
        transform_axis(&mut data, &spec_shape, axis, fft, false)?;
    }
    debug!("rfftn {:?} -> {:?}", shape, spec_shape);
    Ok(Spectrum {
        shape: spec_shape,
        data,
    })
}

/// Inverse N-dimensional real FFT producing an array of `shape`.
pub fn irfftn(
    mut spectrum: Spectrum,
    shape: &[usize],
    fft: &ScalarFftImpl<f64>,
) -> Result<Signal, FftError> {
    let Some(&last) = shape.last() else {
        return Err(FftError::EmptyInput);
    };
    if shape.iter().any(|&d| d == 0) {
        return Err(FftError::EmptyInput);
    }
    if spectrum.shape != spectral_shape(shape) {
        return Err(FftError::ShapeMismatch);
    }
    for axis in 0..shape.len() - 1 {
        transform_axis(&mut spectrum.data, &spectrum.shape, axis, fft, true)?;
    }
    let bins = rfft_len(last);
    let mut out = Signal::zeros(shape);
    for (bins_row, row) in spectrum
        .data
        .chunks_exact(bins)
        .zip(out.as_mut_slice().chunks_exact_mut(last))
    {
        fft.irfft(bins_row, row)?;
    }
    debug!("irfftn {:?} -> {:?}", spectrum.shape, shape);
    Ok(out)
}
