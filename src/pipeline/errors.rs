//! pipeline::errors — configuration and run-level error types.
//!
//! Purpose
//! -------
//! Collect every way a pipeline invocation can fail into one enum,
//! [`PipelineError`], that reports the error kind and the failing parameter.
//! Configuration problems get their own [`ConfigError`] so that config
//! parsing can be used and tested on its own.
//!
//! Key behaviors
//! -------------
//! - Wrap `extraction` and `spectral` errors without losing their variants
//!   (`From` conversions keep `?` usable throughout the pipeline).
//! - Fold reader failures (`anyhow::Error`) into
//!   [`PipelineError::Reader`] with the full context chain as message.
//! - Map to Python `ValueError`/`FileNotFoundError` when `python-bindings`
//!   is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors are terminal: nothing in the pipeline retries, and no partial
//!   outcome accompanies an error.

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyFileNotFoundError, PyValueError},
};

use crate::{extraction::ExtractError, spectral::SpectralError};
use std::path::PathBuf;

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type PipelineResult<T> = Result<T, PipelineError>;

/// ConfigError — invalid or unreadable analysis configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Window size must be a positive number of timesteps.
    InvalidWindowSize(usize),
    /// Property selector outside {0, 1, 2}.
    InvalidProperty(i64),
    /// Timestep must be finite and > 0.
    InvalidTimestep(f64),
    /// Config file could not be read.
    Io(String),
    /// Config text is not valid TOML for [`AnalysisConfig`](super::AnalysisConfig).
    Parse(String),
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidWindowSize(w) => {
                write!(f, "Invalid window size: {w}. Must be a positive number of timesteps.")
            }
            ConfigError::InvalidProperty(p) => write!(
                f,
                "Invalid property selector: {p}. Use 0 (viscosity), 1 (velocities) or 2 (positions)."
            ),
            ConfigError::InvalidTimestep(dt) => {
                write!(f, "Invalid timestep: {dt}. Must be finite and positive.")
            }
            ConfigError::Io(msg) => write!(f, "Could not read config: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Could not parse config: {msg}"),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// PipelineError — failure of one pipeline invocation.
///
/// Variants
/// --------
/// - `MissingInputFile { path }`
///   The configured trajectory file does not exist; checked before the
///   reader is called.
/// - `Config(ConfigError)`
///   The configuration failed validation.
/// - `Extract(ExtractError)`
///   Snapshot projection or channel assembly failed.
/// - `Spectral(SpectralError)`
///   The analyzer rejected the channel matrix.
/// - `Reader(String)`
///   The external snapshot reader failed; message includes its context.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    MissingInputFile { path: PathBuf },
    Config(ConfigError),
    Extract(ExtractError),
    Spectral(SpectralError),
    Reader(String),
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Extract(err) => Some(err),
            PipelineError::Spectral(err) => Some(err),
            PipelineError::MissingInputFile { .. } | PipelineError::Reader(_) => None,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingInputFile { path } => {
                write!(f, "The input file {} does not exist.", path.display())
            }
            PipelineError::Config(err) => write!(f, "Configuration error: {err}"),
            PipelineError::Extract(err) => write!(f, "Extraction error: {err}"),
            PipelineError::Spectral(err) => write!(f, "Spectral analysis error: {err}"),
            PipelineError::Reader(msg) => write!(f, "Snapshot reader failed: {msg}"),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err)
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        PipelineError::Extract(err)
    }
}

impl From<SpectralError> for PipelineError {
    fn from(err: SpectralError) -> Self {
        PipelineError::Spectral(err)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Reader(format!("{err:#}"))
    }
}

#[cfg(feature = "python-bindings")]
impl From<ConfigError> for PyErr {
    fn from(err: ConfigError) -> PyErr {
        PyValueError::new_err(format!("ConfigError: {err}"))
    }
}

#[cfg(feature = "python-bindings")]
impl From<PipelineError> for PyErr {
    fn from(err: PipelineError) -> PyErr {
        match err {
            PipelineError::MissingInputFile { .. } => PyFileNotFoundError::new_err(err.to_string()),
            other => PyValueError::new_err(format!("PipelineError: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::error::Error;

    #[test]
    // Purpose
    // -------
    // The missing-file message names the path.
    fn missing_input_file_names_path() {
        let err = PipelineError::MissingInputFile { path: PathBuf::from("run/OUTCAR.umd.dat") };

        assert!(err.to_string().contains("run/OUTCAR.umd.dat"));
        assert!(err.source().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Wrapped errors keep their variant and are exposed as `source`.
    fn wrapped_errors_keep_variant_and_source() {
        let err: PipelineError = SpectralError::NotEnoughData { len: 1 }.into();

        assert_eq!(err, PipelineError::Spectral(SpectralError::NotEnoughData { len: 1 }));
        assert_eq!(err.source().map(|s| s.to_string()), Some(
            SpectralError::NotEnoughData { len: 1 }.to_string()
        ));
    }

    #[test]
    // Purpose
    // -------
    // Reader errors carry the whole anyhow context chain.
    fn reader_error_keeps_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("unexpected end of file"));
        let err: PipelineError = inner.context("reading snapshot 12").unwrap_err().into();

        let msg = err.to_string();
        assert!(msg.contains("reading snapshot 12") && msg.contains("unexpected end of file"));
    }
}
