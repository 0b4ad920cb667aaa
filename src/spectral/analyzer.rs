//! spectral::analyzer — autocorrelation and spectrum in one pass per channel.
//!
//! Purpose
//! -------
//! Run both analyzer steps on a validated `(C × T)` channel matrix and keep
//! the two result matrices together. Channels are independent, so the work
//! is a map over rows that may run on the `rayon` pool.
//!
//! Key behaviors
//! -------------
//! - [`SpectralAnalysis::compute`] validates once, then maps each channel
//!   to `(autocorrelation row, spectrum row)` and writes the rows into
//!   freshly allocated matrices.
//! - [`SpectralAnalysis::accumulate`] adds another analysis of identical
//!   shape element-wise. Because the DFT is linear, the accumulated
//!   spectrum equals the spectrum of the accumulated autocorrelation.
//!
//! Invariants & assumptions
//! ------------------------
//! - `autocorrelation` and `spectrum` always share the input's shape.
//! - Sequential and parallel runs produce identical values: each channel is
//!   computed by the same side-effect-free function and lands in its own
//!   row.
//!
//! Testing notes
//! -------------
//! - Unit tests cover agreement with the step-wise functions, parallel vs
//!   sequential equality, and accumulation.
use crate::spectral::{
    autocorr::{CorrelationMethod, channel_autocorrelation},
    errors::{SpectralError, SpectralResult},
    transform::{forward_dft, magnitude},
    validation::{check_finite_row, check_finite_spectrum_row, validate_channels},
};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Data, Dimension};
use rayon::prelude::*;
use rustfft::num_complex::Complex64;

/// Options for [`SpectralAnalysis::compute`].
///
/// Fields
/// ------
/// - `method`: [`CorrelationMethod`]
///   Summation strategy for the autocorrelation step.
/// - `parallel`: `bool`
///   Map channels on the `rayon` thread pool instead of a plain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalyzerOptions {
    pub method: CorrelationMethod,
    pub parallel: bool,
}

impl AnalyzerOptions {
    pub fn new(method: CorrelationMethod, parallel: bool) -> Self {
        AnalyzerOptions { method, parallel }
    }
}

/// Autocorrelation and spectrum matrices of one channel matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralAnalysis {
    /// Raw mean-centred autocorrelation, `(C × T)`.
    pub autocorrelation: Array2<f64>,
    /// Row-wise DFT of `autocorrelation`, `(C × T)`.
    pub spectrum: Array2<Complex64>,
}

type ChannelResult = (Vec<f64>, Vec<Complex64>);

fn analyze_channel(
    channel: usize, series: &[f64], method: CorrelationMethod,
) -> SpectralResult<ChannelResult> {
    let acf = channel_autocorrelation(series, method);
    check_finite_row(channel, &acf)?;
    let spec = forward_dft(&acf);
    check_finite_spectrum_row(channel, &spec)?;
    Ok((acf, spec))
}

impl SpectralAnalysis {
    /// Compute both analyzer steps for every channel of `x`.
    ///
    /// Parameters
    /// ----------
    /// - `x`: `&ArrayBase<S, D>`
    ///   Channel matrix; rows are channels, columns timesteps.
    /// - `opts`: `&AnalyzerOptions`
    ///   Correlation method and parallelism switch.
    ///
    /// Returns
    /// -------
    /// `SpectralResult<SpectralAnalysis>`
    ///   Both matrices, shaped like `x`.
    ///
    /// Errors
    /// ------
    /// - Any error of `validate_channels` (`ShapeMismatch`,
    ///   `NotEnoughData`, `NonFiniteData`); nothing is computed in that case.
    /// - `SpectralError::NonFiniteData` if a finite channel overflows in its
    ///   autocorrelation or spectrum; no partial analysis is returned.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// use md_autocorr::spectral::{AnalyzerOptions, SpectralAnalysis};
    /// use ndarray::array;
    ///
    /// let x = array![[1.0, 2.0, 3.0, 4.0], [4.0, 4.0, 4.0, 4.0]];
    /// let analysis = SpectralAnalysis::compute(&x, &AnalyzerOptions::default()).unwrap();
    ///
    /// assert_eq!(analysis.autocorrelation[[0, 0]], 5.0);
    /// assert_eq!(analysis.spectrum[[0, 0]].re, 2.5);
    /// ```
    pub fn compute<S, D>(x: &ArrayBase<S, D>, opts: &AnalyzerOptions) -> SpectralResult<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let view = validate_channels(x)?;
        let (n_channels, n_steps) = view.dim();
        debug!(
            "analysing {n_channels} channels x {n_steps} steps (method={:?}, parallel={})",
            opts.method, opts.parallel
        );

        let rows: Vec<Vec<f64>> = view.outer_iter().map(|row| row.to_vec()).collect();
        let results: Vec<ChannelResult> = if opts.parallel {
            rows.par_iter()
                .enumerate()
                .map(|(c, row)| analyze_channel(c, row, opts.method))
                .collect::<SpectralResult<_>>()?
        } else {
            rows.iter()
                .enumerate()
                .map(|(c, row)| analyze_channel(c, row, opts.method))
                .collect::<SpectralResult<_>>()?
        };

        let mut autocorrelation = Array2::<f64>::zeros((n_channels, n_steps));
        let mut spectrum = Array2::<Complex64>::zeros((n_channels, n_steps));
        for (c, (acf, spec)) in results.into_iter().enumerate() {
            autocorrelation.row_mut(c).assign(&Array1::from(acf));
            spectrum.row_mut(c).assign(&Array1::from(spec));
        }

        Ok(SpectralAnalysis { autocorrelation, spectrum })
    }

    /// All-zero analysis of the given shape; the identity of [`accumulate`](Self::accumulate).
    pub fn zeros(n_channels: usize, n_steps: usize) -> Self {
        SpectralAnalysis {
            autocorrelation: Array2::zeros((n_channels, n_steps)),
            spectrum: Array2::zeros((n_channels, n_steps)),
        }
    }

    pub fn n_channels(&self) -> usize {
        self.autocorrelation.nrows()
    }

    pub fn n_steps(&self) -> usize {
        self.autocorrelation.ncols()
    }

    /// `|X_k|` for every spectrum entry.
    pub fn magnitude(&self) -> Array2<f64> {
        magnitude(&self.spectrum)
    }

    /// Add `other` element-wise into `self`.
    ///
    /// Errors
    /// ------
    /// - `SpectralError::ShapeMismatch` if the two analyses differ in shape.
    /// - `SpectralError::NonFiniteData` if the sum overflows.
    ///
    /// `self` is left untouched on error.
    pub fn accumulate(&mut self, other: &SpectralAnalysis) -> SpectralResult<()> {
        if self.autocorrelation.dim() != other.autocorrelation.dim() {
            return Err(SpectralError::ShapeMismatch {
                shape: other.autocorrelation.shape().to_vec(),
                reason: "accumulated analyses must share one (channels × timesteps) shape",
            });
        }
        let autocorrelation = &self.autocorrelation + &other.autocorrelation;
        let spectrum = &self.spectrum + &other.spectrum;
        let rows = autocorrelation.outer_iter().zip(spectrum.outer_iter());
        for (c, (acf, spec)) in rows.enumerate() {
            check_finite_row(c, &acf.to_vec())?;
            check_finite_spectrum_row(c, &spec.to_vec())?;
        }
        self.autocorrelation = autocorrelation;
        self.spectrum = spectrum;
        Ok(())
    }
}
