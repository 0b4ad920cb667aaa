//! spectral — autocorrelation and frequency-domain analysis of channel matrices.
//!
//! Purpose
//! -------
//! Implement the numerical core: for a `(channels × timesteps)` matrix,
//! compute the raw mean-centred autocorrelation of every channel and the
//! discrete Fourier transform of every autocorrelation row.
//!
//! Key behaviors
//! -------------
//! - [`autocorrelation`]: causal half of the full self-correlation of each
//!   centred channel; no normalization.
//! - [`spectrum`] / [`inverse_spectrum`]: row-wise DFT of length `T`, no
//!   windowing or padding.
//! - [`SpectralAnalysis::compute`]: both steps, optionally mapped over
//!   channels on the `rayon` pool.
//! - [`validate_channels`]: rank, channel-count, length, and finiteness
//!   guards shared by the entry points.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are read-only; outputs are newly allocated and owned by the
//!   caller.
//! - Rank other than 2 is always a [`SpectralError::ShapeMismatch`]; arrays
//!   are never reshaped.
//! - Series shorter than two timesteps are a
//!   [`SpectralError::NotEnoughData`].
//!
//! Conventions
//! -----------
//! - Leading axis = channel (at most [`MAX_CHANNELS`]), trailing axis =
//!   timestep / lag / frequency bin.
//! - Complex values use `rustfft::num_complex::Complex64`.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use md_autocorr::spectral::{inverse_spectrum, AnalyzerOptions, SpectralAnalysis};
//! use ndarray::array;
//!
//! let x = array![[0.3, -1.2, 0.8, 2.0, -0.4], [1.0, 0.0, -1.0, 0.0, 1.0]];
//! let analysis = SpectralAnalysis::compute(&x, &AnalyzerOptions::default()).unwrap();
//! let back = inverse_spectrum(&analysis.spectrum).unwrap();
//! for (z, r) in back.iter().zip(analysis.autocorrelation.iter()) {
//!     assert!((z.re - r).abs() < 1e-9);
//! }
//! ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own step; crate-level
//!   integration tests in `tests/` run the full extraction → analysis path.

pub mod analyzer;
pub mod autocorr;
pub mod errors;
pub mod transform;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::analyzer::{AnalyzerOptions, SpectralAnalysis};
pub use self::autocorr::{
    CorrelationMethod, autocorrelation, center, channel_autocorrelation, full_correlation, mean,
};
pub use self::errors::{SpectralError, SpectralResult};
pub use self::transform::{frequency_axis, inverse_spectrum, magnitude, spectrum};
pub use self::validation::{MAX_CHANNELS, MIN_TIMESTEPS, validate_channels};
pub use rustfft::num_complex::Complex64;
