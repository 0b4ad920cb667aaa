//! spectral::autocorr — raw, mean-centred autocorrelation per channel.
//!
//! Purpose
//! -------
//! Compute the causal half of the full discrete autocorrelation of each
//! channel of a `(C × T)` matrix. For a channel `x` of length `T` with mean
//! `x̄` and centred values `yₜ = xₜ − x̄`, the result at lag `τ` is
//!
//! ```text
//! r(τ) = ∑_{t=0}^{T−1−τ} y_{t+τ} · y_t ,   τ = 0, …, T−1.
//! ```
//!
//! Key behaviors
//! -------------
//! - [`full_correlation`] returns all `2T − 1` relative shifts, ordered from
//!   `−(T−1)` to `+(T−1)`, so index `T − 1` is lag 0.
//! - [`channel_autocorrelation`] keeps the non-negative lags of that
//!   sequence; the negative half mirrors it for real input.
//! - [`autocorrelation`] applies this to every channel of a validated
//!   matrix, returning a matrix of the same shape.
//!
//! Invariants & assumptions
//! ------------------------
//! - No normalization: the sums are divided neither by `T − τ` nor by the
//!   variance. `r(0) = ∑ yₜ² = T · Var(x)` (population variance).
//! - A constant channel yields an all-zero row.
//! - Both [`CorrelationMethod`]s produce the same sums up to floating-point
//!   rounding. The FFT route zero-pads to at least `2T − 1` points so the
//!   circular correlation never wraps.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the (2 × 4) worked example, constant channels, the
//!   lag-0 variance identity, symmetry of the full correlation, and
//!   agreement between the direct and FFT methods.
use crate::spectral::{
    errors::SpectralResult,
    validation::{check_finite_row, validate_channels},
};
use ndarray::{Array1, Array2, ArrayBase, Data, Dimension};
use rustfft::{FftDirection, FftPlanner, num_complex::Complex64};
use serde::{Deserialize, Serialize};

/// How lagged products are summed.
///
/// - `Direct`: explicit `O(T²)` sums; exact for small inputs.
/// - `Fft`: Wiener–Khinchin route through a zero-padded FFT, `O(T log T)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Direct,
    Fft,
}

/// Arithmetic mean of a non-empty series.
#[inline]
pub fn mean(series: &[f64]) -> f64 {
    series.iter().sum::<f64>() / series.len() as f64
}

/// Subtract the series mean from every element.
///
/// Returns an empty vector for an empty series.
pub fn center(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    let mu = mean(series);
    series.iter().map(|&v| v - mu).collect()
}

/// Sum of `x[t + shift] · x[t]` over all valid `t`, for a signed shift.
#[inline]
fn shifted_product_sum(x: &[f64], shift: isize) -> f64 {
    let k = shift.unsigned_abs();
    if shift >= 0 {
        x[k..].iter().zip(x).map(|(a, b)| a * b).sum()
    } else {
        x.iter().zip(&x[k..]).map(|(a, b)| a * b).sum()
    }
}

/// Full discrete correlation of `x` with itself.
///
/// Parameters
/// ----------
/// - `x`: `&[f64]`
///   Series to correlate, used as given (callers centre it first when a
///   mean-subtracted correlation is wanted).
///
/// Returns
/// -------
/// `Vec<f64>`
///   Length `2n − 1` (empty for empty input). Index `i` holds the shift
///   `i − (n − 1)`.
pub fn full_correlation(x: &[f64]) -> Vec<f64> {
    let n = x.len() as isize;
    (-(n - 1)..n).map(|shift| shifted_product_sum(x, shift)).collect()
}

/// Non-negative-lag autocorrelation of one mean-centred channel.
///
/// Parameters
/// ----------
/// - `series`: `&[f64]`
///   Raw channel values; centred internally.
/// - `method`: [`CorrelationMethod`]
///   Summation strategy.
///
/// Returns
/// -------
/// `Vec<f64>`
///   `r(0), …, r(T−1)`, same length as `series`.
///
/// Notes
/// -----
/// - Length checks belong to the caller; an empty series returns an empty
///   vector.
pub fn channel_autocorrelation(series: &[f64], method: CorrelationMethod) -> Vec<f64> {
    let centred = center(series);
    match method {
        CorrelationMethod::Direct => {
            (0..centred.len()).map(|lag| shifted_product_sum(&centred, lag as isize)).collect()
        }
        CorrelationMethod::Fft => fft_autocorrelation(&centred),
    }
}

/// Zero-padded FFT autocorrelation: `IFFT(|FFT(y)|²)` truncated to `n` lags.
fn fft_autocorrelation(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    if n == 0 {
        return Vec::new();
    }
    let padded_len = (2 * n - 1).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft(padded_len, FftDirection::Forward);
    let inverse = planner.plan_fft(padded_len, FftDirection::Inverse);

    let mut buffer: Vec<Complex64> = y
        .iter()
        .map(|&v| Complex64::new(v, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(padded_len)
        .collect();
    forward.process(&mut buffer);
    for z in buffer.iter_mut() {
        *z = Complex64::new(z.norm_sqr(), 0.0);
    }
    inverse.process(&mut buffer);

    let scale = 1.0 / padded_len as f64;
    buffer.iter().take(n).map(|z| z.re * scale).collect()
}

/// Autocorrelation matrix of a `(C × T)` channel matrix.
///
/// Parameters
/// ----------
/// - `x`: `&ArrayBase<S, D>`
///   Channel matrix; rows are channels, columns timesteps.
/// - `method`: [`CorrelationMethod`]
///   Summation strategy.
///
/// Returns
/// -------
/// `SpectralResult<Array2<f64>>`
///   Matrix of shape `(C, T)` whose row `c` is
///   [`channel_autocorrelation`] of row `c` of `x`.
///
/// Errors
/// ------
/// - `SpectralError::ShapeMismatch` for rank ≠ 2 or an unsupported
///   channel count.
/// - `SpectralError::NotEnoughData` for `T < 2`.
/// - `SpectralError::NonFiniteData` for NaN/±∞ entries, or for a lag whose
///   product sum overflows.
///
/// Examples
/// --------
/// ```rust
/// use md_autocorr::spectral::{autocorrelation, CorrelationMethod};
/// use ndarray::array;
///
/// let x = array![[1.0, 2.0, 3.0, 4.0], [4.0, 4.0, 4.0, 4.0]];
/// let acf = autocorrelation(&x, CorrelationMethod::Direct).unwrap();
///
/// assert_eq!(acf[[0, 0]], 5.0);
/// assert!(acf.row(1).iter().all(|&v| v == 0.0));
/// ```
pub fn autocorrelation<S, D>(
    x: &ArrayBase<S, D>, method: CorrelationMethod,
) -> SpectralResult<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let view = validate_channels(x)?;
    let mut out = Array2::<f64>::zeros(view.raw_dim());
    for (c, (row_in, mut row_out)) in view.outer_iter().zip(out.outer_iter_mut()).enumerate() {
        let acf = channel_autocorrelation(&row_in.to_vec(), method);
        check_finite_row(c, &acf)?;
        row_out.assign(&Array1::from(acf));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::errors::SpectralError;
    use approx::assert_relative_eq;
    use ndarray::{Array3, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The hand-computable (2 × 4) example.
    // - Constant channels, the lag-0 variance identity, and symmetry of the
    //   full correlation.
    // - Agreement between `Direct` and `Fft`.
    // - Error propagation from validation, and overflow of finite inputs.
    //
    // They intentionally DO NOT cover:
    // - The frequency-domain step (see `spectral::transform`).
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-9;

    fn wavy_series(n: usize) -> Vec<f64> {
        (0..n).map(|t| (0.3 * t as f64).sin() + 0.05 * t as f64 + ((t * 7) % 5) as f64).collect()
    }

    #[test]
    // Purpose
    // -------
    // Reproduce the worked example channel by channel.
    //
    // Given
    // -----
    // - Channel 0 = [1, 2, 3, 4] (mean 2.5, centred [-1.5, -0.5, 0.5, 1.5]).
    // - Channel 1 = [4, 4, 4, 4].
    //
    // Expect
    // ------
    // - Channel 0: [5.0, 1.25, -1.5, -2.25].
    // - Channel 1: all zeros.
    fn autocorrelation_matches_worked_example() {
        // Arrange
        let x = array![[1.0, 2.0, 3.0, 4.0], [4.0, 4.0, 4.0, 4.0]];

        // Act
        let acf = autocorrelation(&x, CorrelationMethod::Direct).unwrap();

        // Assert
        assert_eq!(acf.dim(), (2, 4));
        assert_eq!(acf.row(0).to_vec(), vec![5.0, 1.25, -1.5, -2.25]);
        assert_eq!(acf.row(1).to_vec(), vec![0.0; 4]);
    }

    #[test]
    // Purpose
    // -------
    // Mean subtraction removes a constant: every lag is exactly zero.
    fn constant_channel_has_zero_autocorrelation() {
        for value in [0.0, -3.25, 1e6] {
            let acf = channel_autocorrelation(&[value; 16], CorrelationMethod::Direct);

            assert!(acf.iter().all(|&r| r == 0.0), "value {value}: {acf:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // r(0) is the sum of squared deviations, i.e. T times the population
    // variance, and no normalization is applied.
    fn lag_zero_equals_sum_of_squared_deviations() {
        let series = wavy_series(50);
        let mu = mean(&series);
        let ss: f64 = series.iter().map(|v| (v - mu).powi(2)).sum();

        let acf = channel_autocorrelation(&series, CorrelationMethod::Direct);

        assert_relative_eq!(acf[0], ss, max_relative = TOL);
    }

    #[test]
    // Purpose
    // -------
    // The full correlation of a real centred series is symmetric around
    // lag 0, and its causal half is what `channel_autocorrelation` keeps.
    fn full_correlation_is_symmetric_and_halves_match() {
        let centred = center(&wavy_series(33));
        let n = centred.len();

        let full = full_correlation(&centred);
        let half = channel_autocorrelation(&wavy_series(33), CorrelationMethod::Direct);

        assert_eq!(full.len(), 2 * n - 1);
        for tau in 0..n {
            assert_relative_eq!(full[n - 1 + tau], full[n - 1 - tau], max_relative = TOL);
            assert_relative_eq!(full[n - 1 + tau], half[tau], max_relative = TOL);
        }
    }

    #[test]
    // Purpose
    // -------
    // The FFT route agrees with direct summation at every lag.
    //
    // Given
    // -----
    // - Series of lengths 2, 7 (odd), 64 (power of two) and 1000.
    //
    // Expect
    // ------
    // - |direct − fft| ≤ 1e-9 · max(1, |r(0)|) at every lag.
    fn fft_method_matches_direct_method() {
        for n in [2, 7, 64, 1000] {
            let series = wavy_series(n);

            let direct = channel_autocorrelation(&series, CorrelationMethod::Direct);
            let fft = channel_autocorrelation(&series, CorrelationMethod::Fft);

            let scale = direct[0].abs().max(1.0);
            for (d, f) in direct.iter().zip(fft.iter()) {
                assert!((d - f).abs() <= TOL * scale, "n={n}: direct {d} vs fft {f}");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Malformed inputs propagate the validation errors.
    fn autocorrelation_propagates_validation_errors() {
        let rank3 = Array3::<f64>::zeros((1, 2, 3));
        let short = array![[1.0], [2.0]];

        assert!(matches!(
            autocorrelation(&rank3, CorrelationMethod::Direct),
            Err(SpectralError::ShapeMismatch { .. })
        ));
        assert_eq!(
            autocorrelation(&short, CorrelationMethod::Fft).unwrap_err(),
            SpectralError::NotEnoughData { len: 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Finite but huge inputs whose lag products overflow are rejected
    // instead of returning ±∞ lags.
    //
    // Given
    // -----
    // - Channel 0 small and well behaved; channel 1 = ±1e200 alternating.
    //
    // Expect
    // ------
    // - `NonFiniteData` on channel 1 at lag 0 for the direct method
    //   (1e200² overflows), and on channel 1 for the FFT method.
    fn autocorrelation_rejects_overflowing_lags() {
        let x = array![[1.0, 2.0, 3.0, 4.0], [1e200, -1e200, 1e200, -1e200]];

        assert_eq!(
            autocorrelation(&x, CorrelationMethod::Direct).unwrap_err(),
            SpectralError::NonFiniteData { channel: 1, index: 0, value: f64::INFINITY }
        );
        assert!(matches!(
            autocorrelation(&x, CorrelationMethod::Fft),
            Err(SpectralError::NonFiniteData { channel: 1, .. })
        ));
    }
}
