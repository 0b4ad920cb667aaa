//! extraction — select one physical quantity from a snapshot sequence.
//!
//! Purpose
//! -------
//! Bridge between trajectory readers and the spectral analyzer. Snapshots
//! are read through the typed [`Snapshot`] trait, projected onto one
//! [`Entity`], and assembled into `(channels × timesteps)` matrices.
//!
//! Key behaviors
//! -------------
//! - [`extract`] / [`extract_named`]: order- and length-preserving
//!   projection onto an entity.
//! - [`stress_channels`], [`scalar_channel`], [`atom_channels`]: channel
//!   matrix assembly for the stress tensor, scalar pressure/volume, and
//!   per-atom positions or velocities.
//!
//! Invariants & assumptions
//! ------------------------
//! - The extractor never touches the spectral analyzer; its only output is
//!   plain `ndarray` data.
//! - Empty input is valid here; the analyzer decides whether a series is
//!   long enough.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use md_autocorr::extraction::{extract, stress_channels, Entity, SnapshotRecord};
//!
//! let snapshots: Vec<SnapshotRecord> = Vec::new();
//! let values = extract(&snapshots, Entity::Stress);
//! let channels = stress_channels(&values).unwrap();
//! assert_eq!(channels.dim(), (6, 0));
//! ```

pub mod errors;
pub mod extract;
pub mod snapshot;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ExtractError, ExtractResult};
pub use self::extract::{
    AtomQuantity, CARTESIAN_LABELS, EntityValue, atom_channels, extract, extract_named,
    scalar_channel, stress_channels,
};
pub use self::snapshot::{
    Atom, Entity, Pressure, STRESS_LABELS, Snapshot, SnapshotRecord, StressTensor,
};
