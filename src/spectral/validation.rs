//! spectral::validation — shape and value guards for channel matrices.
//!
//! Purpose
//! -------
//! Check, once and before any computation, that an input array has the
//! `(channels × timesteps)` layout the analyzer works on. Arrays are taken
//! with an arbitrary dimension type so that rank errors surface as
//! [`SpectralError::ShapeMismatch`] instead of being reshaped.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rank must be exactly 2; leading axis = channel, trailing axis = time.
//! - Channel counts lie in `1..=MAX_CHANNELS`.
//! - Autocorrelation inputs need at least [`MIN_TIMESTEPS`] timesteps and
//!   finite values.
//!
//! Testing notes
//! -------------
//! - Unit tests cover rank 1 and rank 3 rejection, channel-count bounds,
//!   short series, and non-finite entries in inputs and computed rows.
use crate::spectral::errors::{SpectralError, SpectralResult};
use ndarray::{ArrayBase, ArrayView2, Data, Dimension, Ix2};
use rustfft::num_complex::Complex64;

/// Largest supported channel count (the independent stress components).
pub const MAX_CHANNELS: usize = 6;

/// Shortest series with a non-degenerate lag structure.
pub const MIN_TIMESTEPS: usize = 2;

/// View `x` as a rank-2 matrix without copying.
///
/// Errors
/// ------
/// - `SpectralError::ShapeMismatch` when `x.ndim() != 2`.
pub fn as_matrix<A, S, D>(x: &ArrayBase<S, D>) -> SpectralResult<ArrayView2<'_, A>>
where
    S: Data<Elem = A>,
    D: Dimension,
{
    x.view().into_dimensionality::<Ix2>().map_err(|_| SpectralError::ShapeMismatch {
        shape: x.shape().to_vec(),
        reason: "expected a rank-2 (channels × timesteps) array",
    })
}

/// Validate a channel matrix handed to the autocorrelation step.
///
/// Parameters
/// ----------
/// - `x`: `&ArrayBase<S, D>`
///   Candidate `(C × T)` matrix of any dimension type.
///
/// Returns
/// -------
/// `SpectralResult<ArrayView2<'_, f64>>`
///   A rank-2 view of `x` satisfying every check below.
///
/// Errors
/// ------
/// - `SpectralError::ShapeMismatch` if the rank is not 2, or if
///   `C == 0` or `C > MAX_CHANNELS`.
/// - `SpectralError::NotEnoughData { len: T }` if `T < MIN_TIMESTEPS`.
/// - `SpectralError::NonFiniteData` at the first NaN/±∞ entry in
///   row-major order.
pub fn validate_channels<S, D>(x: &ArrayBase<S, D>) -> SpectralResult<ArrayView2<'_, f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let view = as_matrix(x)?;
    let (n_channels, n_steps) = view.dim();

    if n_channels == 0 {
        return Err(SpectralError::ShapeMismatch {
            shape: x.shape().to_vec(),
            reason: "at least one channel is required",
        });
    }
    if n_channels > MAX_CHANNELS {
        return Err(SpectralError::ShapeMismatch {
            shape: x.shape().to_vec(),
            reason: "at most 6 channels are supported",
        });
    }
    if n_steps < MIN_TIMESTEPS {
        return Err(SpectralError::NotEnoughData { len: n_steps });
    }

    for ((channel, index), &value) in view.indexed_iter() {
        if !value.is_finite() {
            return Err(SpectralError::NonFiniteData { channel, index, value });
        }
    }

    Ok(view)
}

/// Check one computed row for overflow.
///
/// Errors
/// ------
/// - `SpectralError::NonFiniteData` at the first NaN/±∞ entry, with
///   `index` the lag of that entry.
pub fn check_finite_row(channel: usize, row: &[f64]) -> SpectralResult<()> {
    match row.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SpectralError::NonFiniteData { channel, index, value: row[index] }),
        None => Ok(()),
    }
}

/// Complex counterpart of [`check_finite_row`]; `value` is the offending
/// real or imaginary part and `index` the frequency bin.
pub fn check_finite_spectrum_row(channel: usize, row: &[Complex64]) -> SpectralResult<()> {
    for (index, z) in row.iter().enumerate() {
        if !z.re.is_finite() {
            return Err(SpectralError::NonFiniteData { channel, index, value: z.re });
        }
        if !z.im.is_finite() {
            return Err(SpectralError::NonFiniteData { channel, index, value: z.im });
        }
    }
    Ok(())
}
