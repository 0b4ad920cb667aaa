//! pipeline — configured analysis runs from snapshots to spectra.
//!
//! Purpose
//! -------
//! Provide the single entry point a trajectory tool calls: an
//! [`AnalysisConfig`] plus either a snapshot slice ([`analyze_snapshots`])
//! or a [`SnapshotReader`] ([`run`]) produce a [`PipelineOutcome`].
//!
//! Key behaviors
//! -------------
//! - Equilibration discard and analysis window are applied before
//!   extraction.
//! - The property selector decides the channels: stress tensor for
//!   viscosity, per-atom velocities or positions for vibrational spectra.
//! - Progress is reported through the `log` facade; no output is printed.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use md_autocorr::extraction::{Atom, Pressure, SnapshotRecord, StressTensor};
//! use md_autocorr::pipeline::{analyze_snapshots, AnalysisConfig, Property};
//!
//! let snapshots: Vec<SnapshotRecord> = (0..8)
//!     .map(|t| {
//!         let v = (t as f64).sin();
//!         let atoms = vec![Atom::new("O", [0.0; 3], [v, -v, 0.5 * v])];
//!         let stress = StressTensor::new([v, 0.0, 0.0, 0.0, 0.0, -v]);
//!         SnapshotRecord::new(atoms, Pressure::Scalar(v), 10.0, stress)
//!     })
//!     .collect();
//! let cfg = AnalysisConfig { property: Property::VibrationalFromVelocities, ..Default::default() };
//!
//! let outcome = analyze_snapshots(&cfg, &snapshots).unwrap();
//! assert_eq!(outcome.analysis.autocorrelation.dim(), (3, 8));
//! assert_eq!(outcome.frequencies.len(), 8);
//! ```

pub mod config;
pub mod errors;
pub mod run;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::config::{AnalysisConfig, DEFAULT_INPUT_FILE, DEFAULT_WINDOW_SIZE, Property};
pub use self::errors::{ConfigError, ConfigResult, PipelineError, PipelineResult};
pub use self::run::{PipelineOutcome, SnapshotReader, analyze_snapshots, run};
