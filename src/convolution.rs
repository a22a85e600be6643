//! FFT convolution drivers used as memory-profiling workloads.
//!
//! Each driver draws two uniform random signals of the requested shape and
//! convolves them circularly through the convolution theorem:
//! `irfftn(rfftn(a) · rfftn(b))`. Nothing is padded, so the output has exactly
//! the input shape.

use log::info;
use rand::Rng;

use crate::fft::{FftError, ScalarFftImpl};
use crate::ndfft::{irfftn, rfftn, Signal};
use crate::probe::{observe, MemoryProbe, NullProbe, PeakDelta};

/// Real signal of `shape` filled with samples from `[0, 1)`.
pub fn random_signal<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Signal {
    let mut signal = Signal::zeros(shape);
    for x in signal.as_mut_slice() {
        *x = rng.gen::<f64>();
    }
    signal
}

/// Circular convolution of two equally shaped signals.
pub fn fft_convolve(a: &Signal, b: &Signal) -> Result<Signal, FftError> {
    if a.shape() != b.shape() {
        return Err(FftError::ShapeMismatch);
    }
    let fft = ScalarFftImpl::<f64>::default();
    let mut spectrum = rfftn(a, &fft)?;
    spectrum.mul_assign(&rfftn(b, &fft)?)?;
    irfftn(spectrum, a.shape(), &fft)
}

fn convolve_random<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Signal, FftError> {
    let a = random_signal(shape, rng);
    let b = random_signal(shape, rng);
    fft_convolve(&a, &b)
}

/// Convolve two random signals of length `n1`.
pub fn fft_convolution_1d<R: Rng + ?Sized>(n1: usize, rng: &mut R) -> Result<Signal, FftError> {
    convolve_random(&[n1], rng)
}

/// Convolve two random `n1 × n2` images.
pub fn fft_convolution_2d<R: Rng + ?Sized>(
    n1: usize,
    n2: usize,
    rng: &mut R,
) -> Result<Signal, FftError> {
    convolve_random(&[n1, n2], rng)
}

/// Convolve two random `n1 × n2 × n3` volumes.
pub fn fft_convolution_3d<R: Rng + ?Sized>(
    n1: usize,
    n2: usize,
    n3: usize,
    rng: &mut R,
) -> Result<Signal, FftError> {
    convolve_random(&[n1, n2, n3], rng)
}

/// Problem sizes derived from the single experiment parameter `n`.
///
/// `side` is `n^(2/3)` truncated to an integer, so a `side³` volume holds
/// roughly as many samples as an `n × n` image. The 1-D case uses `side³`
/// samples as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentDims {
    pub n: usize,
    pub side: usize,
}

impl ExperimentDims {
    pub fn from_n(n: usize) -> Self {
        Self {
            n,
            side: two_thirds_power(n),
        }
    }

    pub fn len_1d(&self) -> usize {
        self.side.saturating_pow(3)
    }

    pub fn shape_1d(&self) -> [usize; 1] {
        [self.len_1d()]
    }

    pub fn shape_2d(&self) -> [usize; 2] {
        [self.n, self.n]
    }

    pub fn shape_3d(&self) -> [usize; 3] {
        [self.side, self.side, self.side]
    }
}

/// `n^(2/3)` evaluated in double precision and truncated.
///
/// Profiles under `scalene/` come from a driver that sizes its workloads with
/// this truncation, so perfect cubes land one below the integer root
/// (`n = 1000` gives 99, not 100).
fn two_thirds_power(n: usize) -> usize {
    (n as f64).powf(2.0 / 3.0) as usize
}

/// Run the 1-D, 2-D and 3-D drivers for `n` and discard their outputs.
pub fn run_experiments<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<(), FftError> {
    run_observed(n, rng, &NullProbe).map(|_| ())
}

/// Like [`run_experiments`], recording how far each driver raised the
/// process's peak resident memory.
pub fn run_observed<R, P>(n: usize, rng: &mut R, probe: &P) -> Result<Vec<PeakDelta>, FftError>
where
    R: Rng + ?Sized,
    P: MemoryProbe + ?Sized,
{
    let dims = ExperimentDims::from_n(n);
    info!(
        "running experiments for n={} (1d len {}, 3d side {})",
        n,
        dims.len_1d(),
        dims.side
    );
    let mut deltas = Vec::with_capacity(3);

    let (out, delta) = observe(probe, "fft_convolution_1d", || {
        fft_convolution_1d(dims.len_1d(), rng)
    });
    out?;
    deltas.push(delta);

    let (out, delta) = observe(probe, "fft_convolution_2d", || {
        fft_convolution_2d(dims.n, dims.n, rng)
    });
    out?;
    deltas.push(delta);

    let (out, delta) = observe(probe, "fft_convolution_3d", || {
        fft_convolution_3d(dims.side, dims.side, dims.side, rng)
    });
    out?;
    deltas.push(delta);

    info!("experiments for n={} finished", n);
    Ok(deltas)
}
