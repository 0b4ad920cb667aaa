//! md_autocorr — autocorrelation spectra of molecular-dynamics observables.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the spectral analyzer to Python via the `_md_autocorr` extension module.
//! Trajectory parsing stays with the caller; this crate starts from snapshot
//! records or channel matrices.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`extraction`, `spectral`, `pipeline`)
//!   as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_md_autocorr` Python extension when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Arrays coming from Python are never reshaped: rank and shape errors are
//!   reported as `ValueError`.
//!
//! Conventions
//! -----------
//! - Channel matrices are `(channels × timesteps)`; spectra are indexed by
//!   frequency bin `k`, with frequency `k / (T · timestep)`.
//! - Python-exposed classes live under `_md_autocorr.spectral`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code uses [`pipeline::analyze_snapshots`] or
//!   [`spectral::SpectralAnalysis::compute`] directly.
//! - Python tooling that already parses trajectories passes numpy arrays to
//!   `AutocorrSpectrum` or `PropertySpectrum`.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules and
//!   by the integration tests under `tests/`.

pub mod extraction;
pub mod pipeline;
pub mod spectral;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{Complex64, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    pipeline::{PipelineOutcome, analyze_snapshots},
    spectral::{AnalyzerOptions, SpectralAnalysis, frequency_axis},
    utils::{build_config, extract_f64_array_dyn, extract_method, snapshots_from_array},
};

/// AutocorrSpectrum — Python-facing wrapper for [`SpectralAnalysis`].
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `AutocorrSpectrum(data, method='direct', parallel=False)`:
/// - `data`: `&PyAny`
///   Two-dimensional `(channels, timesteps)` array-like of `f64`, at most 6
///   channels and at least 2 timesteps, all values finite.
/// - `method`: `Option<&str>`
///   `'direct'` or `'fft'` autocorrelation summation.
/// - `parallel`: `Option<bool>`
///   Map channels on the Rust thread pool.
///
/// Notes
/// -----
/// - Getters return fresh numpy arrays; the Rust-side matrices are copied
///   on every access.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "md_autocorr.spectral")]
pub struct AutocorrSpectrum {
    inner: SpectralAnalysis,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AutocorrSpectrum {
    #[new]
    #[pyo3(
        text_signature = "(data, /, method='direct', parallel=False)",
        signature = (data, method = None, parallel = None)
    )]
    pub fn new<'py>(
        py: Python<'py>, data: &Bound<'py, PyAny>, method: Option<&str>, parallel: Option<bool>,
    ) -> PyResult<AutocorrSpectrum> {
        let arr = extract_f64_array_dyn(py, data)?;
        let opts = AnalyzerOptions::new(extract_method(method)?, parallel.unwrap_or(false));
        let inner = SpectralAnalysis::compute(&arr.as_array(), &opts)?;
        Ok(AutocorrSpectrum { inner })
    }

    /// Raw mean-centred autocorrelation, `(channels, lags)`.
    #[getter]
    pub fn autocorrelation<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        PyArray2::from_array(py, &self.inner.autocorrelation)
    }

    /// Complex DFT of each autocorrelation row, `(channels, bins)`.
    #[getter]
    pub fn spectrum<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<Complex64>> {
        PyArray2::from_array(py, &self.inner.spectrum)
    }

    #[getter]
    pub fn magnitude<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        PyArray2::from_array(py, &self.inner.magnitude())
    }

    #[getter]
    pub fn n_channels(&self) -> usize {
        self.inner.n_channels()
    }

    #[getter]
    pub fn n_steps(&self) -> usize {
        self.inner.n_steps()
    }

    /// Frequency of each spectrum bin for samples `timestep` apart.
    #[pyo3(signature = (timestep = 1.0), text_signature = "(self, /, timestep=1.0)")]
    pub fn frequencies<'py>(
        &self, py: Python<'py>, timestep: f64,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let freqs = frequency_axis(self.inner.n_steps(), timestep)?;
        Ok(PyArray1::from_array(py, &freqs))
    }
}

/// PropertySpectrum — Python-facing wrapper for a windowed pipeline run.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `PropertySpectrum(data, property=0, first_step=0, window_size=1000,
/// method='direct', parallel=False, timestep=1.0)`:
/// - `data`: `&PyAny`
///   `(timesteps, 6)` stress array for `property=0`, or
///   `(timesteps, atoms, 3)` velocities (`1`) / positions (`2`).
/// - Remaining keywords mirror [`AnalysisConfig`](crate::pipeline::AnalysisConfig).
#[cfg(feature = "python-bindings")]
#[pyclass(module = "md_autocorr.spectral")]
pub struct PropertySpectrum {
    inner: PipelineOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PropertySpectrum {
    #[new]
    #[pyo3(
        text_signature = "(data, /, property=0, first_step=0, window_size=1000, \
                          method='direct', parallel=False, timestep=1.0)",
        signature = (
            data,
            property = None,
            first_step = None,
            window_size = None,
            method = None,
            parallel = None,
            timestep = None,
        )
    )]
    pub fn new<'py>(
        py: Python<'py>, data: &Bound<'py, PyAny>, property: Option<i64>,
        first_step: Option<usize>, window_size: Option<usize>, method: Option<&str>,
        parallel: Option<bool>, timestep: Option<f64>,
    ) -> PyResult<PropertySpectrum> {
        let config = build_config(first_step, window_size, property, method, parallel, timestep)?;
        let arr = extract_f64_array_dyn(py, data)?;
        let snapshots = snapshots_from_array(&arr, config.property)?;
        let inner = analyze_snapshots(&config, &snapshots)?;
        Ok(PropertySpectrum { inner })
    }

    #[getter]
    pub fn property(&self) -> u8 {
        self.inner.property.into()
    }

    #[getter]
    pub fn channel_labels(&self) -> Vec<String> {
        self.inner.channel_labels.clone()
    }

    #[getter]
    pub fn n_steps(&self) -> usize {
        self.inner.n_steps
    }

    #[getter]
    pub fn frequencies<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_array(py, &self.inner.frequencies)
    }

    #[getter]
    pub fn autocorrelation<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        PyArray2::from_array(py, &self.inner.analysis.autocorrelation)
    }

    #[getter]
    pub fn spectrum<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<Complex64>> {
        PyArray2::from_array(py, &self.inner.analysis.spectrum)
    }
}

/// _md_autocorr — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `spectral` submodule, attach it to `_md_autocorr`, and
///   register it in `sys.modules` so `md_autocorr.spectral` imports work.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _md_autocorr<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let spectral_mod = PyModule::new(_py, "spectral")?;
    spectral(_py, m, &spectral_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("md_autocorr.spectral", spectral_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn spectral<'py>(
    _py: Python, md_autocorr: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<AutocorrSpectrum>()?;
    m.add_class::<PropertySpectrum>()?;
    md_autocorr.add_submodule(m)?;
    Ok(())
}
