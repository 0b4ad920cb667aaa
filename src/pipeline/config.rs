//! pipeline::config — analysis configuration record and property selector.
//!
//! Purpose
//! -------
//! Hold every knob of one pipeline invocation in a single immutable
//! [`AnalysisConfig`], built either from [`Default`] or from TOML text, and
//! map the numeric property selector onto what gets extracted.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisConfig::validate`] checks window size, timestep and property
//!   before any data is touched.
//! - [`AnalysisConfig::window`] applies the equilibration discard and the
//!   window length to a snapshot slice, clamping to what is available.
//! - [`AnalysisConfig::from_toml_str`] / [`AnalysisConfig::load_from_file`]
//!   deserialize with `serde` + `toml`; missing keys fall back to the
//!   defaults and the result is validated.
//!
//! Conventions
//! -----------
//! - Property selector: `0` viscosity (stress tensor), `1` vibrational
//!   spectrum from velocities, `2` vibrational spectrum from positions.
//! - `timestep` is the spacing between retained snapshots, in whatever unit
//!   the caller wants the frequency axis inverted from.
use crate::{
    extraction::{AtomQuantity, Entity},
    pipeline::errors::{ConfigError, ConfigResult},
    spectral::{AnalyzerOptions, CorrelationMethod},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_INPUT_FILE: &str = "OUTCAR.umd.dat";
pub const DEFAULT_WINDOW_SIZE: usize = 1000;

/// Physical property whose autocorrelation spectrum is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
pub enum Property {
    /// Stress-tensor autocorrelation (shear viscosity).
    #[default]
    Viscosity = 0,
    /// Velocity autocorrelation summed over atoms.
    VibrationalFromVelocities = 1,
    /// Position autocorrelation summed over atoms.
    VibrationalFromPositions = 2,
}

impl Property {
    /// Entity read from each snapshot for this property.
    pub fn entity(&self) -> Entity {
        match self {
            Property::Viscosity => Entity::Stress,
            Property::VibrationalFromVelocities | Property::VibrationalFromPositions => {
                Entity::Atoms
            }
        }
    }

    /// Per-atom quantity, or `None` when the property is not atom-based.
    pub fn quantity(&self) -> Option<AtomQuantity> {
        match self {
            Property::Viscosity => None,
            Property::VibrationalFromVelocities => Some(AtomQuantity::Velocity),
            Property::VibrationalFromPositions => Some(AtomQuantity::Position),
        }
    }
}

impl TryFrom<i64> for Property {
    type Error = ConfigError;

    fn try_from(value: i64) -> ConfigResult<Self> {
        match value {
            0 => Ok(Property::Viscosity),
            1 => Ok(Property::VibrationalFromVelocities),
            2 => Ok(Property::VibrationalFromPositions),
            other => Err(ConfigError::InvalidProperty(other)),
        }
    }
}

impl From<Property> for u8 {
    fn from(property: Property) -> u8 {
        property as u8
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Property::Viscosity => "viscosity",
            Property::VibrationalFromVelocities => "vibrational spectrum (velocities)",
            Property::VibrationalFromPositions => "vibrational spectrum (positions)",
        };
        f.write_str(name)
    }
}

/// Configuration of one pipeline invocation.
///
/// Fields
/// ------
/// - `input_file`: `PathBuf`
///   Trajectory file handed to the snapshot reader. Default
///   `"OUTCAR.umd.dat"`.
/// - `first_step`: `usize`
///   Number of leading snapshots discarded as equilibration. Default `0`.
/// - `window_size`: `usize`
///   Maximum number of snapshots analysed after the discard. Must be
///   `> 0`. Default `1000`.
/// - `property`: [`Property`]
///   What to analyse. Default [`Property::Viscosity`].
/// - `method`: [`CorrelationMethod`]
///   Autocorrelation summation strategy. Default `Direct`.
/// - `parallel`: `bool`
///   Map channels on the `rayon` pool. Default `false`.
/// - `timestep`: `f64`
///   Spacing between snapshots for the frequency axis. Must be finite and
///   `> 0`. Default `1.0`.
///
/// Examples
/// --------
/// ```rust
/// use md_autocorr::pipeline::{AnalysisConfig, Property};
///
/// let cfg = AnalysisConfig::from_toml_str("window_size = 500\nproperty = 1").unwrap();
/// assert_eq!(cfg.window_size, 500);
/// assert_eq!(cfg.property, Property::VibrationalFromVelocities);
/// assert_eq!(cfg.first_step, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysisConfig")]
pub struct AnalysisConfig {
    pub input_file: PathBuf,
    pub first_step: usize,
    pub window_size: usize,
    pub property: Property,
    pub method: CorrelationMethod,
    pub parallel: bool,
    pub timestep: f64,
}

/// On-disk form of [`AnalysisConfig`]; the selector is any integer until
/// it is checked.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawAnalysisConfig {
    input_file: PathBuf,
    first_step: usize,
    window_size: usize,
    property: i64,
    method: CorrelationMethod,
    parallel: bool,
    timestep: f64,
}

impl Default for RawAnalysisConfig {
    fn default() -> Self {
        let defaults = AnalysisConfig::default();
        RawAnalysisConfig {
            input_file: defaults.input_file,
            first_step: defaults.first_step,
            window_size: defaults.window_size,
            property: i64::from(u8::from(defaults.property)),
            method: defaults.method,
            parallel: defaults.parallel,
            timestep: defaults.timestep,
        }
    }
}

impl TryFrom<RawAnalysisConfig> for AnalysisConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAnalysisConfig) -> ConfigResult<Self> {
        let config = AnalysisConfig {
            input_file: raw.input_file,
            first_step: raw.first_step,
            window_size: raw.window_size,
            property: Property::try_from(raw.property)?,
            method: raw.method,
            parallel: raw.parallel,
            timestep: raw.timestep,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            first_step: 0,
            window_size: DEFAULT_WINDOW_SIZE,
            property: Property::default(),
            method: CorrelationMethod::default(),
            parallel: false,
            timestep: 1.0,
        }
    }
}

impl AnalysisConfig {
    /// Check the numeric fields.
    ///
    /// Errors
    /// ------
    /// - `ConfigError::InvalidWindowSize` if `window_size == 0`.
    /// - `ConfigError::InvalidTimestep` if `timestep` is non-finite or `<= 0`.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.timestep));
        }
        Ok(())
    }

    /// Options forwarded to [`SpectralAnalysis::compute`](crate::spectral::SpectralAnalysis::compute).
    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions::new(self.method, self.parallel)
    }

    /// Retained snapshots: skip `first_step`, then take at most
    /// `window_size`.
    ///
    /// Notes
    /// -----
    /// - Never panics. A discard at or beyond the end yields an empty slice;
    ///   the analyzer then reports `NotEnoughData`.
    pub fn window<'a, S>(&self, snapshots: &'a [S]) -> &'a [S] {
        let start = self.first_step.min(snapshots.len());
        let end = start.saturating_add(self.window_size).min(snapshots.len());
        &snapshots[start..end]
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// Errors
    /// ------
    /// - `ConfigError::Parse` for malformed TOML, unknown keys, or wrongly
    ///   typed values.
    /// - `ConfigError::InvalidProperty` for a selector outside `{0, 1, 2}`.
    /// - Any error of [`validate`](Self::validate).
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        let raw: RawAnalysisConfig =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        AnalysisConfig::try_from(raw)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }
}
