//! spectral::transform — row-wise discrete Fourier transforms.
//!
//! Purpose
//! -------
//! Map each row of an autocorrelation matrix to its discrete Fourier
//! coefficients, and back. Rows are transformed independently along the lag
//! axis; channels never mix.
//!
//! Key behaviors
//! -------------
//! - [`spectrum`]: forward DFT of length exactly `T` per row, no window and
//!   no zero-padding, `X_k = ∑_τ r(τ) · e^{−2πi kτ/T}`.
//! - [`inverse_spectrum`]: inverse DFT scaled by `1/T`, so that
//!   `inverse_spectrum(spectrum(r)) ≈ r`.
//! - [`magnitude`] and [`frequency_axis`]: helpers for the reporting layer.
//!
//! Invariants & assumptions
//! ------------------------
//! - The only structural requirement is rank 2; rows share one length by
//!   construction of the matrix.
//! - The DC coefficient of a real row is the row sum with zero imaginary
//!   part.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the DC term, rank errors, the inverse round trip, and
//!   the frequency axis.
use crate::spectral::{
    errors::{SpectralError, SpectralResult},
    validation::as_matrix,
};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Dimension};
use rustfft::{FftDirection, FftPlanner, num_complex::Complex64};

/// Forward DFT of one real sequence.
pub(crate) fn forward_dft(row: &[f64]) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = row.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    if !buffer.is_empty() {
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft(buffer.len(), FftDirection::Forward).process(&mut buffer);
    }
    buffer
}

fn transform_rows(view: ArrayView2<'_, Complex64>, direction: FftDirection) -> Array2<Complex64> {
    let (n_rows, n_cols) = view.dim();
    let mut out = view.to_owned();
    if n_rows == 0 || n_cols == 0 {
        return out;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft(n_cols, direction);
    let mut buffer = vec![Complex64::new(0.0, 0.0); n_cols];
    for mut row in out.outer_iter_mut() {
        for (slot, &z) in buffer.iter_mut().zip(row.iter()) {
            *slot = z;
        }
        fft.process(&mut buffer);
        for (z, &slot) in row.iter_mut().zip(buffer.iter()) {
            *z = slot;
        }
    }
    out
}

/// Row-wise forward DFT of a `(C × T)` autocorrelation matrix.
///
/// Parameters
/// ----------
/// - `acf`: `&ArrayBase<S, D>`
///   Real matrix; rows are transformed independently.
///
/// Returns
/// -------
/// `SpectralResult<Array2<Complex64>>`
///   Complex matrix of the same shape; entry `[c, k]` is coefficient `k`
///   of row `c`.
///
/// Errors
/// ------
/// - `SpectralError::ShapeMismatch` if `acf` is not rank 2.
pub fn spectrum<S, D>(acf: &ArrayBase<S, D>) -> SpectralResult<Array2<Complex64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let view = as_matrix(acf)?;
    let complex = view.mapv(|v| Complex64::new(v, 0.0));
    Ok(transform_rows(complex.view(), FftDirection::Forward))
}

/// Row-wise inverse DFT, scaled by `1/T`.
///
/// Errors
/// ------
/// - `SpectralError::ShapeMismatch` if `spec` is not rank 2.
pub fn inverse_spectrum<S, D>(spec: &ArrayBase<S, D>) -> SpectralResult<Array2<Complex64>>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    let view = as_matrix(spec)?;
    let n_cols = view.ncols();
    let mut out = transform_rows(view, FftDirection::Inverse);
    if n_cols > 0 {
        let scale = 1.0 / n_cols as f64;
        out.mapv_inplace(|z| z * scale);
    }
    Ok(out)
}

/// Element-wise modulus `|X_k|` of a spectrum matrix.
pub fn magnitude(spec: &Array2<Complex64>) -> Array2<f64> {
    spec.mapv(|z| z.norm())
}

/// Frequencies of the DFT bins for `n_steps` samples spaced `timestep` apart.
///
/// Bin `k` sits at `k / (n_steps · timestep)`; bins above `n_steps / 2`
/// alias to negative frequencies and are left as-is for the caller.
///
/// Errors
/// ------
/// - `SpectralError::NotEnoughData` when `n_steps == 0`.
pub fn frequency_axis(n_steps: usize, timestep: f64) -> SpectralResult<Array1<f64>> {
    if n_steps == 0 {
        return Err(SpectralError::NotEnoughData { len: 0 });
    }
    let resolution = 1.0 / (n_steps as f64 * timestep);
    Ok(Array1::from_shape_fn(n_steps, |k| k as f64 * resolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array3, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The DC coefficient and a hand-computable 4-point transform.
    // - Rank checking.
    // - Round trip through `inverse_spectrum`.
    // - `frequency_axis` spacing.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-9;

    #[test]
    // Purpose
    // -------
    // Check the 4-point DFT of a known row.
    //
    // Given
    // -----
    // - Row [5.0, 1.25, -1.5, -2.25] and a zero row.
    //
    // Expect
    // ------
    // - X_0 = 2.5 (sum, zero imaginary part), X_1 = 6.5 − 3.5i,
    //   X_2 = 4.5, X_3 = 6.5 + 3.5i; the zero row stays zero.
    fn spectrum_matches_hand_computed_dft() {
        let acf = array![[5.0, 1.25, -1.5, -2.25], [0.0, 0.0, 0.0, 0.0]];

        let spec = spectrum(&acf).unwrap();

        let expected = [
            Complex64::new(2.5, 0.0),
            Complex64::new(6.5, -3.5),
            Complex64::new(4.5, 0.0),
            Complex64::new(6.5, 3.5),
        ];
        for (got, want) in spec.row(0).iter().zip(expected.iter()) {
            assert_relative_eq!(got.re, want.re, epsilon = TOL);
            assert_relative_eq!(got.im, want.im, epsilon = TOL);
        }
        assert!(spec.row(1).iter().all(|z| z.norm() == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Non rank-2 input is refused by both directions.
    fn spectrum_rejects_wrong_rank() {
        let v = Array1::<f64>::zeros(4);
        let cube = Array3::<Complex64>::zeros((1, 2, 2));

        assert!(matches!(spectrum(&v), Err(SpectralError::ShapeMismatch { .. })));
        assert!(matches!(inverse_spectrum(&cube), Err(SpectralError::ShapeMismatch { .. })));
    }

    #[test]
    // Purpose
    // -------
    // The inverse transform reproduces the input rows.
    fn inverse_spectrum_round_trips() {
        let acf = Array2::from_shape_fn((3, 37), |(c, t)| ((c + 1) as f64 * 0.2 * t as f64).cos());

        let back = inverse_spectrum(&spectrum(&acf).unwrap()).unwrap();

        for (z, &r) in back.iter().zip(acf.iter()) {
            assert_relative_eq!(z.re, r, epsilon = TOL);
            assert!(z.im.abs() < TOL);
        }
    }

    #[test]
    // Purpose
    // -------
    // Bins are evenly spaced at 1 / (T · dt), and empty input is refused.
    fn frequency_axis_spacing() {
        let freqs = frequency_axis(4, 0.5).unwrap();

        assert_eq!(freqs.to_vec(), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(frequency_axis(0, 1.0).unwrap_err(), SpectralError::NotEnoughData { len: 0 });
    }
}
