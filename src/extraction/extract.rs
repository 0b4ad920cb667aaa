//! extraction::extract — project snapshots onto one entity and build channels.
//!
//! Purpose
//! -------
//! Turn a sequence of [`Snapshot`] records into per-entity value sequences
//! and then into the fixed-shape `(channels × timesteps)` matrices consumed
//! by the spectral analyzer.
//!
//! Key behaviors
//! -------------
//! - [`extract`] is an order-preserving projection: element `i` of the
//!   output is entity `e` of snapshot `i`, and the output length always
//!   equals the input length. An empty input yields an empty output.
//! - [`stress_channels`], [`scalar_channel`] and [`atom_channels`] assemble
//!   extracted values into `ndarray::Array2<f64>` matrices whose rows are
//!   channels and whose columns are timesteps.
//!
//! Invariants & assumptions
//! ------------------------
//! - All channels built from one value sequence share its length as the
//!   time axis.
//! - Per-atom channels require the atom count to stay constant over the
//!   sequence; a change is reported as
//!   [`ExtractError::AtomCountMismatch`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover order and length preservation for every entity, the
//!   empty sequence, and each channel builder's shape and error paths.
use crate::extraction::{
    errors::{ExtractError, ExtractResult},
    snapshot::{Atom, Entity, Pressure, STRESS_COMPONENTS, Snapshot, StressTensor},
};
use ndarray::Array2;

/// Number of Cartesian channels of a per-atom vector quantity.
pub const CARTESIAN_COMPONENTS: usize = 3;

/// Component labels for per-atom channels.
pub const CARTESIAN_LABELS: [&str; CARTESIAN_COMPONENTS] = ["x", "y", "z"];

/// Value of one [`Entity`] for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue<'a> {
    Atoms(&'a [Atom]),
    Pressure(Pressure),
    Volume(f64),
    Stress(StressTensor),
}

impl EntityValue<'_> {
    /// Entity this value was extracted for.
    pub fn entity(&self) -> Entity {
        match self {
            EntityValue::Atoms(_) => Entity::Atoms,
            EntityValue::Pressure(_) => Entity::Pressure,
            EntityValue::Volume(_) => Entity::Volume,
            EntityValue::Stress(_) => Entity::Stress,
        }
    }
}

/// Per-atom vector quantity used to build atom channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomQuantity {
    Position,
    Velocity,
}

impl AtomQuantity {
    fn read(&self, atom: &Atom) -> [f64; 3] {
        match self {
            AtomQuantity::Position => atom.position,
            AtomQuantity::Velocity => atom.velocity,
        }
    }
}

/// Project every snapshot onto `entity`, preserving order.
///
/// Parameters
/// ----------
/// - `snapshots`: `&[S]`
///   Snapshot sequence; may be empty.
/// - `entity`: [`Entity`]
///   Attribute to read from each snapshot.
///
/// Returns
/// -------
/// `Vec<EntityValue<'_>>`
///   One value per snapshot, borrowed from the snapshots where the value is
///   a collection (atoms).
///
/// Notes
/// -----
/// - Callers holding a string name parse it first with
///   `name.parse::<Entity>()`, which is where an unknown name fails with
///   [`ExtractError::InvalidEntity`]; see [`extract_named`].
pub fn extract<S: Snapshot>(snapshots: &[S], entity: Entity) -> Vec<EntityValue<'_>> {
    snapshots
        .iter()
        .map(|snapshot| match entity {
            Entity::Atoms => EntityValue::Atoms(snapshot.atoms()),
            Entity::Pressure => EntityValue::Pressure(snapshot.pressure()),
            Entity::Volume => EntityValue::Volume(snapshot.volume()),
            Entity::Stress => EntityValue::Stress(snapshot.stress()),
        })
        .collect()
}

/// [`extract`] for an entity given by name.
///
/// Errors
/// ------
/// - `ExtractError::InvalidEntity(name)` for an unrecognized name, before
///   any snapshot is read.
pub fn extract_named<'a, S: Snapshot>(
    snapshots: &'a [S], name: &str,
) -> ExtractResult<Vec<EntityValue<'a>>> {
    let entity: Entity = name.parse()?;
    Ok(extract(snapshots, entity))
}

/// Assemble stress values into a `(6 × T)` matrix, one row per component.
///
/// Errors
/// ------
/// - `ExtractError::UnexpectedEntity` if any value is not a stress tensor.
pub fn stress_channels(values: &[EntityValue<'_>]) -> ExtractResult<Array2<f64>> {
    let mut channels = Array2::<f64>::zeros((STRESS_COMPONENTS, values.len()));
    for (t, value) in values.iter().enumerate() {
        let EntityValue::Stress(stress) = value else {
            return Err(unexpected(Entity::Stress, value));
        };
        for (c, &component) in stress.components.iter().enumerate() {
            channels[[c, t]] = component;
        }
    }
    Ok(channels)
}

/// Assemble scalar pressure or volume values into a `(1 × T)` matrix.
///
/// Tensor pressures are reduced to their scalar (mean diagonal) value.
///
/// Errors
/// ------
/// - `ExtractError::UnexpectedEntity` for atom or stress values, or when
///   pressure and volume values are mixed.
pub fn scalar_channel(values: &[EntityValue<'_>]) -> ExtractResult<Array2<f64>> {
    // Volume only when the sequence starts with one; pressure otherwise.
    let expected = match values.first() {
        Some(EntityValue::Volume(_)) => Entity::Volume,
        _ => Entity::Pressure,
    };
    let mut channel = Array2::<f64>::zeros((1, values.len()));
    for (t, value) in values.iter().enumerate() {
        channel[[0, t]] = match (expected, value) {
            (Entity::Pressure, EntityValue::Pressure(p)) => p.scalar(),
            (Entity::Volume, EntityValue::Volume(v)) => *v,
            _ => return Err(unexpected(expected, value)),
        };
    }
    Ok(channel)
}

/// Assemble one `(3 × T)` matrix per atom for the chosen vector quantity.
///
/// Parameters
/// ----------
/// - `values`: `&[EntityValue<'_>]`
///   Atom collections, one per timestep.
/// - `quantity`: [`AtomQuantity`]
///   Whether to read positions or velocities.
///
/// Returns
/// -------
/// `ExtractResult<Vec<Array2<f64>>>`
///   Matrix `a` holds atom `a`'s x, y, z components over time. The vector is
///   empty when `values` is empty or holds no atoms.
///
/// Errors
/// ------
/// - `ExtractError::UnexpectedEntity` if any value is not an atom collection.
/// - `ExtractError::AtomCountMismatch` if a snapshot's atom count differs
///   from the first snapshot's.
pub fn atom_channels(
    values: &[EntityValue<'_>], quantity: AtomQuantity,
) -> ExtractResult<Vec<Array2<f64>>> {
    let n_steps = values.len();
    let mut per_atom: Vec<Array2<f64>> = Vec::new();

    for (t, value) in values.iter().enumerate() {
        let EntityValue::Atoms(atoms) = value else {
            return Err(unexpected(Entity::Atoms, value));
        };
        if t == 0 {
            per_atom = vec![Array2::zeros((CARTESIAN_COMPONENTS, n_steps)); atoms.len()];
        } else if atoms.len() != per_atom.len() {
            return Err(ExtractError::AtomCountMismatch {
                step: t,
                expected: per_atom.len(),
                actual: atoms.len(),
            });
        }
        for (channels, atom) in per_atom.iter_mut().zip(atoms.iter()) {
            for (c, component) in quantity.read(atom).into_iter().enumerate() {
                channels[[c, t]] = component;
            }
        }
    }
    Ok(per_atom)
}

fn unexpected(expected: Entity, found: &EntityValue<'_>) -> ExtractError {
    ExtractError::UnexpectedEntity { expected, found: found.entity() }
}
