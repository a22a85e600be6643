//! Real-input FFT (RFFT) built on top of the complex FFT routines.
//!
//! A real signal of length `n` has a conjugate-symmetric spectrum, so only the
//! first `n/2 + 1` bins carry independent information. Even lengths are
//! packed into a half-length complex transform and split afterwards; odd
//! lengths go through a full-length complex transform.

use crate::fft::{Complex, FftError, FftImpl};
use crate::num::Float;

/// Number of real samples that make up a packed complex pair.
pub const STRIDE: usize = 2;

/// Number of independent bins produced by a real FFT of length `n`.
#[inline]
pub const fn rfft_len(n: usize) -> usize {
    n / 2 + 1
}

/// `exp(-2πi k / n)`.
fn twiddle<T: Float>(k: usize, n: usize) -> Result<Complex<T>, FftError> {
    let k_f = T::from_usize(k).ok_or(FftError::InvalidValue)?;
    let n_f = T::from_usize(n).ok_or(FftError::InvalidValue)?;
    Ok(Complex::expi(-(T::from_f64(2.0) * T::pi() * k_f / n_f)))
}

/// Real-valued transforms available on every complex FFT provider.
pub trait RealFftImpl<T: Float>: FftImpl<T> {
    /// Forward real FFT. `output` must hold `input.len()/2 + 1` bins.
    fn rfft(&self, input: &[T], output: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if output.len() != rfft_len(n) {
            return Err(FftError::MismatchedLengths);
        }
        if n % STRIDE == 0 {
            rfft_even(self, input, output)
        } else {
            rfft_odd(self, input, output)
        }
    }

    /// Inverse real FFT producing `output.len()` samples from
    /// `output.len()/2 + 1` bins. The imaginary part of the DC bin (and of the
    /// Nyquist bin for even lengths) is ignored.
    fn irfft(&self, input: &[Complex<T>], output: &mut [T]) -> Result<(), FftError> {
        let n = output.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if input.len() != rfft_len(n) {
            return Err(FftError::MismatchedLengths);
        }
        if n % STRIDE == 0 {
            irfft_even(self, input, output)
        } else {
            irfft_odd(self, input, output)
        }
    }
}

impl<T: Float, U: FftImpl<T> + ?Sized> RealFftImpl<T> for U {}

/// Half-length complex FFT followed by the even/odd split.
fn rfft_even<T: Float, F: FftImpl<T> + ?Sized>(
    fft: &F,
    input: &[T],
    output: &mut [Complex<T>],
) -> Result<(), FftError> {
    let n = input.len();
    let m = n / STRIDE;
    let mut packed: Vec<Complex<T>> = input
        .chunks_exact(STRIDE)
        .map(|pair| Complex::new(pair[0], pair[1]))
        .collect();
    fft.fft(&mut packed)?;

    let y0 = packed[0];
    output[0] = Complex::new(y0.re + y0.im, T::zero());
    output[m] = Complex::new(y0.re - y0.im, T::zero());
    let half = T::from_f64(0.5);
    for k in 1..m {
        let a = packed[k];
        let b = packed[m - k].conj();
        let sum = a.add(b);
        let diff = a.sub(b);
        let t = twiddle::<T>(k, n)?.mul(diff);
        // sum - i·t
        let temp = sum.add(Complex::new(t.im, -t.re));
        output[k] = temp.scale(half);
    }
    Ok(())
}

fn irfft_even<T: Float, F: FftImpl<T> + ?Sized>(
    fft: &F,
    input: &[Complex<T>],
    output: &mut [T],
) -> Result<(), FftError> {
    let n = output.len();
    let m = n / STRIDE;
    let half = T::from_f64(0.5);
    let mut packed: Vec<Complex<T>> = Vec::with_capacity(m);
    packed.push(Complex::new(
        (input[0].re + input[m].re) * half,
        (input[0].re - input[m].re) * half,
    ));
    for k in 1..m {
        let a = input[k];
        let b = input[m - k].conj();
        let sum = a.add(b);
        let diff = a.sub(b);
        let t = twiddle::<T>(k, n)?.conj().mul(diff);
        // sum + i·t
        let temp = sum.sub(Complex::new(t.im, -t.re));
        packed.push(temp.scale(half));
    }
    fft.ifft(&mut packed)?;
    for (pair, z) in output.chunks_exact_mut(STRIDE).zip(packed.iter()) {
        pair[0] = z.re;
        pair[1] = z.im;
    }
    Ok(())
}

fn rfft_odd<T: Float, F: FftImpl<T> + ?Sized>(
    fft: &F,
    input: &[T],
    output: &mut [Complex<T>],
) -> Result<(), FftError> {
    let mut full: Vec<Complex<T>> = input.iter().map(|&x| Complex::new(x, T::zero())).collect();
    fft.fft(&mut full)?;
    let bins = output.len();
    output.copy_from_slice(&full[..bins]);
    Ok(())
}

fn irfft_odd<T: Float, F: FftImpl<T> + ?Sized>(
    fft: &F,
    input: &[Complex<T>],
    output: &mut [T],
) -> Result<(), FftError> {
    let n = output.len();
    let mut full = vec![Complex::zero(); n];
    full[0] = Complex::new(input[0].re, T::zero());
    for k in 1..input.len() {
        full[k] = input[k];
        full[n - k] = input[k].conj();
    }
    fft.ifft(&mut full)?;
    for (out, z) in output.iter_mut().zip(full.iter()) {
        *out = z.re;
    }
    Ok(())
}
