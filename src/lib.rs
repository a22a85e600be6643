//! # fftconv - FFT convolution memory experiments
//!
//! Workloads and models for studying how much memory an FFT-based convolution
//! needs in one, two and three dimensions, plus the decimation filter pipeline
//! shown in the "effect of operations" figure.
//!
//! ## Layout
//!
//! - [`fft`], [`rfft`], [`ndfft`]: complex, real and N-dimensional transforms
//! - [`convolution`]: random-signal convolution drivers profiled externally
//! - [`memory_model`]: closed-form peak-memory estimate for those drivers
//! - [`profile`]: reading the profiler's JSON output back in
//! - [`probe`]: in-process peak RSS observation
//! - [`window`], [`pipeline`]: FIR design and the filter pipeline
//!
//! ## Quick start
//!
//! ```
//! use fftconv::convolution::fft_convolution_2d;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let out = fft_convolution_2d(4, 6, &mut rng)?;
//! assert_eq!(out.shape(), &[4, 6]);
//! # Ok::<(), fftconv::fft::FftError>(())
//! ```
//!
//! Randomness is always supplied by the caller, so seeding the generator
//! makes a run reproducible.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0
//! - MIT license
//!
//! at your option.

/// Complex FFT with a caching planner.
pub mod fft;
/// Real-input FFT helpers built on top of the complex routines.
pub mod rfft;
pub mod num;

/// N-dimensional real FFTs over row-major arrays.
pub mod ndfft;

/// FFT convolution drivers and the experiment runner.
pub mod convolution;

/// Theoretical peak memory of the convolution drivers.
pub mod memory_model;

/// Parsing of profiler JSON artifacts.
pub mod profile;

/// Peak resident memory observation.
pub mod probe;

/// Window functions and FIR design.
pub mod window;

/// Decimation filter pipeline.
pub mod pipeline;

pub use convolution::{
    fft_convolution_1d, fft_convolution_2d, fft_convolution_3d, run_experiments, ExperimentDims,
};
pub use fft::{FftError, FftPlanner};
pub use memory_model::theoretical_peak_memory;
pub use ndfft::{Signal, Spectrum};
pub use num::{Complex, Complex64, Float};
pub use pipeline::{FilterPipeline, PipelineConfig, PipelineError};
pub use profile::ProfileError;
