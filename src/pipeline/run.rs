//! pipeline::run — from snapshots (or a trajectory file) to a spectrum.
//!
//! Purpose
//! -------
//! Wire the extractor and the spectral analyzer together under one
//! [`AnalysisConfig`]: window the snapshots, pick the channels the property
//! needs, analyse them, and attach the frequency axis.
//!
//! Key behaviors
//! -------------
//! - [`analyze_snapshots`] works on an in-memory snapshot slice.
//! - [`run`] first checks that the configured input file exists, then asks
//!   a caller-supplied [`SnapshotReader`] for the snapshots.
//! - Viscosity analyses the six stress channels directly. The vibrational
//!   properties analyse each atom's `(3 × T)` matrix and sum the analyses
//!   over atoms.
//!
//! Invariants & assumptions
//! ------------------------
//! - Config is validated before the reader is called or any data is read.
//! - The reader owns parsing; its errors are reported as
//!   [`PipelineError::Reader`] and never retried.
use crate::{
    extraction::{
        CARTESIAN_LABELS, STRESS_LABELS, Snapshot, atom_channels, extract, stress_channels,
    },
    pipeline::{
        config::{AnalysisConfig, Property},
        errors::{PipelineError, PipelineResult},
    },
    spectral::{AnalyzerOptions, MIN_TIMESTEPS, SpectralAnalysis, SpectralError, frequency_axis},
};
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::path::Path;

/// Source of snapshot records for [`run`].
///
/// Implementations parse whatever trajectory format they support;
/// failures are returned as `anyhow::Error` with context attached.
pub trait SnapshotReader {
    type Snapshot: Snapshot;

    fn read(&self, path: &Path) -> anyhow::Result<Vec<Self::Snapshot>>;
}

/// Result of one pipeline invocation.
///
/// Fields
/// ------
/// - `property`: [`Property`] that was analysed.
/// - `channel_labels`: `Vec<String>`
///   Label of each row of the analysis matrices (`"xx"` … `"xy"` or
///   `"x"`, `"y"`, `"z"`).
/// - `n_steps`: `usize`
///   Number of snapshots inside the analysis window.
/// - `frequencies`: `Array1<f64>`
///   Frequency of each spectrum column, `k / (n_steps · timestep)`.
/// - `analysis`: [`SpectralAnalysis`]
///   Autocorrelation and spectrum matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub property: Property,
    pub channel_labels: Vec<String>,
    pub n_steps: usize,
    pub frequencies: Array1<f64>,
    pub analysis: SpectralAnalysis,
}

/// Run the analysis described by `config` on in-memory snapshots.
///
/// Parameters
/// ----------
/// - `config`: `&AnalysisConfig`
///   Property, window and analyzer settings. `input_file` is ignored here.
/// - `snapshots`: `&[S]`
///   Full snapshot sequence, before equilibration discard.
///
/// Returns
/// -------
/// `PipelineResult<PipelineOutcome>`
///
/// Errors
/// ------
/// - `PipelineError::Config` if `config` fails validation.
/// - `PipelineError::Extract` if atom counts change inside the window.
/// - `PipelineError::Spectral` if the window holds fewer than two snapshots
///   (`NotEnoughData`), a snapshot without atoms is used for a vibrational
///   property (`ShapeMismatch`), or values are non-finite.
pub fn analyze_snapshots<S: Snapshot>(
    config: &AnalysisConfig, snapshots: &[S],
) -> PipelineResult<PipelineOutcome> {
    config.validate()?;
    let window = config.window(snapshots);
    let n_steps = window.len();
    if window.is_empty() && !snapshots.is_empty() {
        warn!(
            "first_step {} discards all {} snapshots; nothing left to analyse",
            config.first_step,
            snapshots.len()
        );
    }
    info!(
        "analysing {} over {n_steps} snapshots (discarded {}, window {})",
        config.property,
        config.first_step.min(snapshots.len()),
        config.window_size
    );

    let values = extract(window, config.property.entity());
    let opts = config.analyzer_options();
    let (analysis, labels) = match config.property.quantity() {
        None => {
            let channels = stress_channels(&values)?;
            (SpectralAnalysis::compute(&channels, &opts)?, &STRESS_LABELS[..])
        }
        Some(quantity) => {
            let per_atom = atom_channels(&values, quantity)?;
            debug!("summing {} per-atom analyses", per_atom.len());
            (sum_over_atoms(&per_atom, n_steps, &opts)?, &CARTESIAN_LABELS[..])
        }
    };

    let frequencies = frequency_axis(n_steps, config.timestep)?;
    Ok(PipelineOutcome {
        property: config.property,
        channel_labels: labels.iter().map(|l| l.to_string()).collect(),
        n_steps,
        frequencies,
        analysis,
    })
}

/// Read `config.input_file` with `reader`, then [`analyze_snapshots`].
///
/// Errors
/// ------
/// - `PipelineError::Config` if `config` fails validation.
/// - `PipelineError::MissingInputFile` if `input_file` is not an existing
///   file; the reader is not called.
/// - `PipelineError::Reader` if the reader fails.
/// - Any error of [`analyze_snapshots`].
pub fn run<R: SnapshotReader>(
    config: &AnalysisConfig, reader: &R,
) -> PipelineResult<PipelineOutcome> {
    config.validate()?;
    let path = config.input_file.as_path();
    if !path.is_file() {
        return Err(PipelineError::MissingInputFile { path: path.to_path_buf() });
    }

    let snapshots = reader.read(path)?;
    info!("read {} snapshots from {}", snapshots.len(), path.display());
    analyze_snapshots(config, &snapshots)
}

// Per-atom analyses run sequentially inside; parallelism is over atoms.
fn sum_over_atoms(
    per_atom: &[Array2<f64>], n_steps: usize, opts: &AnalyzerOptions,
) -> PipelineResult<SpectralAnalysis> {
    if per_atom.is_empty() {
        if n_steps < MIN_TIMESTEPS {
            return Err(SpectralError::NotEnoughData { len: n_steps }.into());
        }
        return Err(SpectralError::ShapeMismatch {
            shape: vec![0, n_steps],
            reason: "snapshots in the window contain no atoms",
        }
        .into());
    }

    let inner = AnalyzerOptions::new(opts.method, false);
    let identity = || SpectralAnalysis::zeros(CARTESIAN_LABELS.len(), n_steps);
    let total = if opts.parallel {
        per_atom
            .par_iter()
            .map(|channels| SpectralAnalysis::compute(channels, &inner))
            .try_fold(identity, |mut acc, analysis| {
                acc.accumulate(&analysis?)?;
                Ok::<_, SpectralError>(acc)
            })
            .try_reduce(identity, |mut left, right| {
                left.accumulate(&right)?;
                Ok(left)
            })?
    } else {
        per_atom.iter().try_fold(identity(), |mut acc, channels| {
            acc.accumulate(&SpectralAnalysis::compute(channels, &inner)?)?;
            Ok::<_, SpectralError>(acc)
        })?
    };
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extraction::{
            Atom, AtomQuantity, Entity, ExtractError, Pressure, SnapshotRecord, StressTensor,
        },
        spectral::{CorrelationMethod, autocorrelation, spectrum},
    };
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Viscosity and vibrational branches of `analyze_snapshots`.
    // - Window semantics and the resulting errors.
    // - `run`: missing input file, reader errors, and the happy path.
    //
    // They intentionally DO NOT cover:
    // - Numerical details of the analyzer (see `spectral`).
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-9;

    fn snapshot(t: usize, n_atoms: usize) -> SnapshotRecord {
        let tf = t as f64;
        let atoms = (0..n_atoms)
            .map(|a| {
                let af = a as f64 + 1.0;
                Atom::new(
                    "Mg",
                    [af + 0.1 * tf, (0.3 * af * tf).sin(), 0.05 * tf * tf],
                    [(0.2 * tf).cos() * af, 0.5 * af, (0.7 * tf + af).sin()],
                )
            })
            .collect();
        let stress = StressTensor::new([
            tf.sin(),
            (0.5 * tf).cos(),
            0.1 * tf,
            1.0,
            (tf * tf) % 3.0,
            -0.2 * tf,
        ]);
        SnapshotRecord::new(atoms, Pressure::Tensor(stress), 1000.0 + tf, stress)
    }

    fn trajectory(n_steps: usize, n_atoms: usize) -> Vec<SnapshotRecord> {
        (0..n_steps).map(|t| snapshot(t, n_atoms)).collect()
    }

    struct VecReader(Vec<SnapshotRecord>);

    impl SnapshotReader for VecReader {
        type Snapshot = SnapshotRecord;

        fn read(&self, _path: &Path) -> anyhow::Result<Vec<SnapshotRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingReader;

    impl SnapshotReader for FailingReader {
        type Snapshot = SnapshotRecord;

        fn read(&self, path: &Path) -> anyhow::Result<Vec<SnapshotRecord>> {
            anyhow::bail!("malformed header in {}", path.display())
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("md_autocorr_run_{}_{name}", std::process::id()))
    }

    /// Input file that exists for the lifetime of the guard.
    struct TempInput(PathBuf);

    impl TempInput {
        fn new(name: &str) -> Self {
            let path = temp_path(name);
            std::fs::write(&path, b"placeholder").unwrap();
            TempInput(path)
        }
    }

    impl Drop for TempInput {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Viscosity analyses the six stress channels of the retained window.
    //
    // Given
    // -----
    // - 30 snapshots, first_step = 5, window_size = 20, timestep = 0.5.
    //
    // Expect
    // ------
    // - Outcome shaped (6 × 20), labelled in Voigt order, equal to the
    //   analyzer run on snapshots 5..25, with frequencies k / (20 · 0.5).
    fn viscosity_uses_windowed_stress_channels() {
        let snaps = trajectory(30, 2);
        let cfg =
            AnalysisConfig { first_step: 5, window_size: 20, timestep: 0.5, ..Default::default() };

        let outcome = analyze_snapshots(&cfg, &snaps).unwrap();

        assert_eq!(outcome.property, Property::Viscosity);
        assert_eq!(outcome.channel_labels, vec!["xx", "yy", "zz", "yz", "xz", "xy"]);
        assert_eq!(outcome.n_steps, 20);
        assert_eq!(outcome.analysis.autocorrelation.dim(), (6, 20));
        assert_relative_eq!(outcome.frequencies[1], 0.1, epsilon = TOL);

        let expected_channels = stress_channels(&extract(&snaps[5..25], Entity::Stress)).unwrap();
        let expected =
            SpectralAnalysis::compute(&expected_channels, &AnalyzerOptions::default()).unwrap();
        assert_eq!(outcome.analysis, expected);
    }

    #[test]
    // Purpose
    // -------
    // Vibrational spectra are the sum of the per-atom analyses, and the
    // summed spectrum is the spectrum of the summed autocorrelation.
    fn vibrational_sums_per_atom_analyses() {
        let snaps = trajectory(40, 3);
        let cfg =
            AnalysisConfig { property: Property::VibrationalFromVelocities, ..Default::default() };

        let outcome = analyze_snapshots(&cfg, &snaps).unwrap();

        assert_eq!(outcome.channel_labels, vec!["x", "y", "z"]);
        assert_eq!(outcome.analysis.autocorrelation.dim(), (3, 40));

        let values = extract(&snaps, Entity::Atoms);
        let mut acf_sum = Array2::<f64>::zeros((3, 40));
        for channels in atom_channels(&values, AtomQuantity::Velocity).unwrap() {
            acf_sum += &autocorrelation(&channels, CorrelationMethod::Direct).unwrap();
        }
        for (got, want) in outcome.analysis.autocorrelation.iter().zip(acf_sum.iter()) {
            assert_relative_eq!(*got, *want, epsilon = TOL, max_relative = TOL);
        }
        let spec = spectrum(&acf_sum).unwrap();
        for (got, want) in outcome.analysis.spectrum.iter().zip(spec.iter()) {
            assert!((got - want).norm() < 1e-8 * (1.0 + want.norm()));
        }
    }

    #[test]
    // Purpose
    // -------
    // The parallel atom reduction matches the sequential fold.
    fn vibrational_parallel_matches_sequential() {
        let snaps = trajectory(64, 7);
        let seq_cfg =
            AnalysisConfig { property: Property::VibrationalFromPositions, ..Default::default() };
        let par_cfg = AnalysisConfig { parallel: true, ..seq_cfg.clone() };

        let seq = analyze_snapshots(&seq_cfg, &snaps).unwrap();
        let par = analyze_snapshots(&par_cfg, &snaps).unwrap();

        for (a, b) in seq.analysis.autocorrelation.iter().zip(par.analysis.autocorrelation.iter()) {
            assert_relative_eq!(*a, *b, epsilon = TOL, max_relative = TOL);
        }
        for (a, b) in seq.analysis.spectrum.iter().zip(par.analysis.spectrum.iter()) {
            assert!((a - b).norm() < 1e-8 * (1.0 + a.norm()));
        }
    }

    #[test]
    // Purpose
    // -------
    // Windows too short to analyse, and atom-less vibrational input, fail
    // with spectral errors.
    fn short_or_empty_windows_are_rejected() {
        let snaps = trajectory(10, 2);

        let beyond = AnalysisConfig { first_step: 10, ..Default::default() };
        assert_eq!(
            analyze_snapshots(&beyond, &snaps),
            Err(PipelineError::Spectral(SpectralError::NotEnoughData { len: 0 }))
        );

        let single = AnalysisConfig { first_step: 9, ..Default::default() };
        assert_eq!(
            analyze_snapshots(&single, &snaps),
            Err(PipelineError::Spectral(SpectralError::NotEnoughData { len: 1 }))
        );

        let no_atoms = trajectory(10, 0);
        let vib =
            AnalysisConfig { property: Property::VibrationalFromPositions, ..Default::default() };
        assert!(matches!(
            analyze_snapshots(&vib, &no_atoms),
            Err(PipelineError::Spectral(SpectralError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    // Purpose
    // -------
    // Atom counts changing inside the window surface as extraction errors.
    fn changing_atom_count_is_an_extract_error() {
        let mut snaps = trajectory(6, 2);
        snaps.push(snapshot(6, 3));
        let cfg =
            AnalysisConfig { property: Property::VibrationalFromVelocities, ..Default::default() };

        assert_eq!(
            analyze_snapshots(&cfg, &snaps),
            Err(PipelineError::Extract(ExtractError::AtomCountMismatch {
                step: 6,
                expected: 2,
                actual: 3
            }))
        );
    }

    #[test]
    // Purpose
    // -------
    // `run` refuses a missing input file before calling the reader.
    fn run_reports_missing_input_file() {
        let path = temp_path("missing_OUTCAR.umd.dat");
        let cfg = AnalysisConfig { input_file: path.clone(), ..Default::default() };

        assert_eq!(run(&cfg, &FailingReader), Err(PipelineError::MissingInputFile { path }));
    }

    #[test]
    // Purpose
    // -------
    // Reader failures are wrapped with their message; a good reader yields
    // the same outcome as `analyze_snapshots`.
    fn run_wraps_reader_and_matches_in_memory_analysis() {
        let input = TempInput::new("OUTCAR.umd.dat");
        let cfg =
            AnalysisConfig { input_file: input.0.clone(), window_size: 16, ..Default::default() };

        match run(&cfg, &FailingReader) {
            Err(PipelineError::Reader(msg)) => assert!(msg.contains("malformed header")),
            other => panic!("expected reader error, got {other:?}"),
        }

        let snaps = trajectory(25, 1);
        let outcome = run(&cfg, &VecReader(snaps.clone())).unwrap();
        assert_eq!(outcome, analyze_snapshots(&cfg, &snaps).unwrap());
        assert_eq!(outcome.n_steps, 16);
    }
}
