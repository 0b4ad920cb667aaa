//! extraction::errors — error types for snapshot projection and channel assembly.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used when projecting snapshot
//! records onto one physical entity and when assembling the projected values
//! into fixed-shape channel matrices.
//!
//! Key behaviors
//! -------------
//! - Define [`ExtractResult`] and [`ExtractError`] as the canonical result
//!   and error types of the `extraction` subtree.
//! - Attach human-readable `Display` messages that embed the offending
//!   entity name, snapshot index, or atom count.
//! - Map errors to Python `ValueError`s when the `python-bindings` feature
//!   is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Extraction never returns partial results: the first failure aborts the
//!   projection and is reported through [`ExtractError`].
//! - Snapshot indices carried by variants are 0-based positions in the
//!   sequence handed to the extractor (after any equilibration discard).
//!
//! Testing notes
//! -------------
//! - Unit tests check that each variant's `Display` message carries its
//!   payload.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::extraction::snapshot::Entity;

pub type ExtractResult<T> = Result<T, ExtractError>;

/// ExtractError — failures while selecting an entity from snapshots.
///
/// Variants
/// --------
/// - `InvalidEntity(name)`
///   A string entity name outside `atoms`, `pressure`, `volume`, `stress`.
/// - `UnexpectedEntity { expected, found }`
///   A channel builder received values of a different entity kind than
///   the one it assembles.
/// - `AtomCountMismatch { step, expected, actual }`
///   The number of atoms changed between snapshots, so per-atom channels
///   cannot share one time axis.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    InvalidEntity(String),
    UnexpectedEntity { expected: Entity, found: Entity },
    AtomCountMismatch { step: usize, expected: usize, actual: usize },
}

impl std::error::Error for ExtractError {}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::InvalidEntity(name) => write!(
                f,
                "Invalid entity '{name}'. Choose from 'atoms', 'pressure', 'volume', or 'stress'."
            ),
            ExtractError::UnexpectedEntity { expected, found } => {
                write!(f, "Expected values of entity '{expected}', found '{found}'.")
            }
            ExtractError::AtomCountMismatch { step, expected, actual } => write!(
                f,
                "Snapshot {step} holds {actual} atoms; expected {expected} as in the first snapshot."
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ExtractError> for PyErr {
    fn from(err: ExtractError) -> PyErr {
        PyValueError::new_err(format!("ExtractError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that `InvalidEntity` names the rejected entity.
    //
    // Given
    // -----
    // - `ExtractError::InvalidEntity("temperature")`.
    //
    // Expect
    // ------
    // - The `Display` message contains "temperature".
    fn invalid_entity_includes_name_in_display() {
        // Arrange
        let err = ExtractError::InvalidEntity("temperature".to_string());

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("temperature"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `AtomCountMismatch` reports the snapshot index and both
    // atom counts.
    //
    // Given
    // -----
    // - step = 7, expected = 64, actual = 63.
    //
    // Expect
    // ------
    // - The message contains "7", "64" and "63".
    fn atom_count_mismatch_includes_payload_in_display() {
        // Arrange
        let err = ExtractError::AtomCountMismatch { step: 7, expected: 64, actual: 63 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('7') && msg.contains("64") && msg.contains("63"), "Got: {msg}");
    }
}
