//! spectral::errors — error types for autocorrelation and transform routines.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the autocorrelation,
//! transform, and combined-analysis entry points, with a Python bridge for
//! the PyO3 bindings.
//!
//! Key behaviors
//! -------------
//! - Define [`SpectralResult`] and [`SpectralError`].
//! - Report the offending shape, length, or value in every message.
//! - Implement `From<SpectralError> for PyErr` when `python-bindings` is
//!   enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated before any allocation of result matrices; a
//!   returned error means no partial result was produced.
//!
//! Testing notes
//! -------------
//! - Unit tests check payload embedding in `Display` messages. Error
//!   emission is exercised by the validation and analyzer tests.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type SpectralResult<T> = Result<T, SpectralError>;

/// SpectralError — failures of the spectral analyzer.
///
/// Variants
/// --------
/// - `ShapeMismatch { shape, reason }`
///   The input is not a `(channels × timesteps)` matrix, has no channels,
///   has more than the supported number of channels, or two matrices that
///   must agree in shape do not.
/// - `NotEnoughData { len }`
///   Fewer than two timesteps per channel; the lag structure of a series
///   shorter than that is degenerate.
/// - `NonFiniteData { channel, index, value }`
///   A NaN or ±∞ entry at `[channel, index]`, either in the input or in
///   a computed autocorrelation/spectrum row (finite inputs can overflow).
#[derive(Debug, Clone, PartialEq)]
pub enum SpectralError {
    ShapeMismatch { shape: Vec<usize>, reason: &'static str },
    NotEnoughData { len: usize },
    NonFiniteData { channel: usize, index: usize, value: f64 },
}

impl std::error::Error for SpectralError {}

impl std::fmt::Display for SpectralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpectralError::ShapeMismatch { shape, reason } => {
                write!(f, "Shape mismatch for input of shape {shape:?}: {reason}.")
            }
            SpectralError::NotEnoughData { len } => write!(
                f,
                "Not enough data: need at least 2 timesteps per channel, got {len}."
            ),
            SpectralError::NonFiniteData { channel, index, value } => write!(
                f,
                "Channel {channel} holds a non-finite value at index {index}: {value}."
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SpectralError> for PyErr {
    fn from(err: SpectralError) -> PyErr {
        PyValueError::new_err(format!("SpectralError: {err}"))
    }
}
