//! Complex Fast Fourier Transform.
//!
//! Power-of-two lengths run through a Stockham auto-sort radix-2 kernel; every
//! other length goes through Bluestein's chirp-z algorithm, which re-expresses
//! the transform as a power-of-two circular convolution. A [`FftPlanner`]
//! caches twiddle tables and chirp sequences per length so repeated
//! transforms along the axes of an N-dimensional array reuse them.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

pub use crate::num::{Complex, Complex64, Float};

type BluesteinPair<T> = (Arc<[Complex<T>]>, Arc<[Complex<T>]>);

pub struct FftPlanner<T: Float> {
    /// Twiddle tables keyed by transform length. The table for length `n`
    /// holds `exp(-2πi k / n)` for `k = 0..n/2`.
    cache: HashMap<usize, Arc<[Complex<T>]>>,
    /// Chirp `exp(-iπ k² / n)` and the transformed conjugate chirp of padded
    /// length `m`, keyed by `n`.
    bluestein_cache: HashMap<usize, BluesteinPair<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            bluestein_cache: HashMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Retrieve the twiddle table for a power-of-two length `n`.
    pub fn get_twiddles(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        if let Some(table) = self.cache.get(&n) {
            return Ok(Arc::clone(table));
        }
        let n_f = T::from_usize(n).ok_or(FftError::InvalidValue)?;
        let two_pi = T::from_f64(2.0) * T::pi();
        let mut table: Vec<Complex<T>> = Vec::with_capacity(n / 2);
        for k in 0..n / 2 {
            let k_f = T::from_usize(k).ok_or(FftError::InvalidValue)?;
            table.push(Complex::expi(-(two_pi * k_f / n_f)));
        }
        let table: Arc<[Complex<T>]> = Arc::from(table);
        self.cache.insert(n, Arc::clone(&table));
        Ok(table)
    }

    fn cached_bluestein(&self, n: usize) -> Option<BluesteinPair<T>> {
        self.bluestein_cache
            .get(&n)
            .map(|(chirp, b_fft)| (Arc::clone(chirp), Arc::clone(b_fft)))
    }

    /// Number of cached twiddle tables.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    EmptyInput,
    MismatchedLengths,
    ShapeMismatch,
    InvalidStride,
    InvalidValue,
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "transform input is empty"),
            FftError::MismatchedLengths => write!(f, "buffer lengths do not match"),
            FftError::ShapeMismatch => write!(f, "array shapes do not match"),
            FftError::InvalidStride => write!(f, "stride must be non-zero"),
            FftError::InvalidValue => {
                write!(f, "length cannot be represented in the floating-point type")
            }
        }
    }
}

impl std::error::Error for FftError {}

pub trait FftImpl<T: Float> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError>;

    /// Inverse transform, normalised by `1/n`.
    fn ifft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        for c in input.iter_mut() {
            c.im = -c.im;
        }
        self.fft(input)?;
        let scale = T::one() / T::from_usize(n).ok_or(FftError::InvalidValue)?;
        for c in input.iter_mut() {
            c.im = -c.im;
            c.re = c.re * scale;
            c.im = c.im * scale;
        }
        Ok(())
    }

    fn fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        if input.len() != output.len() {
            return Err(FftError::MismatchedLengths);
        }
        output.copy_from_slice(input);
        self.fft(output)
    }

    /// Transform every `stride`-th element of `input`, starting at index 0.
    /// The transform length is `scratch.len()`.
    fn fft_strided(
        &self,
        input: &mut [Complex<T>],
        stride: usize,
        scratch: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        gather(input, stride, scratch)?;
        self.fft(scratch)?;
        scatter(scratch, stride, input);
        Ok(())
    }

    fn ifft_strided(
        &self,
        input: &mut [Complex<T>],
        stride: usize,
        scratch: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        gather(input, stride, scratch)?;
        self.ifft(scratch)?;
        scatter(scratch, stride, input);
        Ok(())
    }
}

fn gather<T: Float>(
    input: &[Complex<T>],
    stride: usize,
    scratch: &mut [Complex<T>],
) -> Result<(), FftError> {
    if stride == 0 {
        return Err(FftError::InvalidStride);
    }
    let n = scratch.len();
    if n == 0 {
        return Err(FftError::EmptyInput);
    }
    if input.len() < (n - 1) * stride + 1 {
        return Err(FftError::MismatchedLengths);
    }
    for (i, s) in scratch.iter_mut().enumerate() {
        *s = input[i * stride];
    }
    Ok(())
}

fn scatter<T: Float>(scratch: &[Complex<T>], stride: usize, input: &mut [Complex<T>]) {
    for (i, s) in scratch.iter().enumerate() {
        input[i * stride] = *s;
    }
}

pub struct ScalarFftImpl<T: Float> {
    planner: RefCell<FftPlanner<T>>,
}

impl<T: Float> Default for ScalarFftImpl<T> {
    fn default() -> Self {
        Self {
            planner: RefCell::new(FftPlanner::new()),
        }
    }
}

impl<T: Float> ScalarFftImpl<T> {
    pub fn fft_vec(&self, input: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let mut out = input.to_vec();
        self.fft(&mut out)?;
        Ok(out)
    }

    /// Number of twiddle tables the planner currently holds.
    pub fn cached_tables(&self) -> usize {
        self.planner.borrow().cache_len()
    }

    fn stockham_fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        let (twiddles, mut scratch) = {
            let mut planner = self.planner.borrow_mut();
            let twiddles = planner.get_twiddles(n)?;
            let scratch = std::mem::take(&mut planner.scratch);
            (twiddles, scratch)
        };
        if scratch.len() < n {
            scratch.resize(n, Complex::zero());
        }

        // n1 = number of groups, n2 = size of each group in this pass.
        let mut in_input = true;
        let mut n1 = 1usize;
        let mut n2 = n;
        while n1 < n {
            n2 >>= 1;
            let (src, dst): (&[Complex<T>], &mut [Complex<T>]) = if in_input {
                (&*input, &mut scratch[..n])
            } else {
                (&scratch[..n], &mut *input)
            };
            for k in 0..n1 {
                // exp(-2πi k / (2 n1)) == table[k * n2]
                let w = twiddles[k * n2];
                let base0 = 2 * k * n2;
                let base1 = base0 + n2;
                for j in 0..n2 {
                    let u = src[base0 + j];
                    let v = src[base1 + j].mul(w);
                    dst[k * n2 + j] = u.add(v);
                    dst[(k + n1) * n2 + j] = u.sub(v);
                }
            }
            in_input = !in_input;
            n1 <<= 1;
        }
        if !in_input {
            input.copy_from_slice(&scratch[..n]);
        }

        self.planner.borrow_mut().scratch = scratch;
        Ok(())
    }

    fn bluestein_pair(&self, n: usize) -> Result<BluesteinPair<T>, FftError> {
        if let Some(pair) = self.planner.borrow().cached_bluestein(n) {
            return Ok(pair);
        }
        let m = (2 * n - 1).next_power_of_two();
        let n_f = T::from_usize(n).ok_or(FftError::InvalidValue)?;
        let mut chirp: Vec<Complex<T>> = Vec::with_capacity(n);
        let mut b: Vec<Complex<T>> = Vec::with_capacity(m);
        for i in 0..n {
            // i² mod 2n keeps the angle small for large n.
            let sq = ((i as u128 * i as u128) % (2 * n as u128)) as usize;
            let sq_f = T::from_usize(sq).ok_or(FftError::InvalidValue)?;
            let angle = T::pi() * sq_f / n_f;
            chirp.push(Complex::expi(-angle));
            b.push(Complex::expi(angle));
        }
        b.resize(m, Complex::zero());
        for i in 1..n {
            b[m - i] = b[i];
        }
        self.stockham_fft(&mut b)?;
        let pair: BluesteinPair<T> = (Arc::from(chirp), Arc::from(b));
        self.planner
            .borrow_mut()
            .bluestein_cache
            .insert(n, (Arc::clone(&pair.0), Arc::clone(&pair.1)));
        Ok(pair)
    }

    fn bluestein_fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        let (chirp, b_fft) = self.bluestein_pair(n)?;
        let m = b_fft.len();
        let mut a: Vec<Complex<T>> = Vec::with_capacity(m);
        for (x, c) in input.iter().zip(chirp.iter()) {
            a.push(x.mul(*c));
        }
        a.resize(m, Complex::zero());
        self.stockham_fft(&mut a)?;
        for (ai, bi) in a.iter_mut().zip(b_fft.iter()) {
            *ai = ai.mul(*bi);
        }
        // Inverse via conjugation so the padded transform stays on the
        // power-of-two path.
        for c in a.iter_mut() {
            c.im = -c.im;
        }
        self.stockham_fft(&mut a)?;
        let scale = T::one() / T::from_usize(m).ok_or(FftError::InvalidValue)?;
        for (out, (ai, c)) in input.iter_mut().zip(a.iter().zip(chirp.iter())) {
            *out = ai.conj().scale(scale).mul(*c);
        }
        Ok(())
    }
}

impl<T: Float> FftImpl<T> for ScalarFftImpl<T> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        if n.is_power_of_two() {
            self.stockham_fft(input)
        } else {
            self.bluestein_fft(input)
        }
    }
}
