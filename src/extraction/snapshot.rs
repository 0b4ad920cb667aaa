//! extraction::snapshot — typed view of one recorded simulation timestep.
//!
//! Purpose
//! -------
//! Describe the part of a molecular-dynamics snapshot the analysis core
//! reads: the atom collection, the pressure, the cell volume, and the
//! stress tensor. Trajectory readers live outside this crate; they only need
//! to hand over values implementing [`Snapshot`].
//!
//! Key behaviors
//! -------------
//! - [`Snapshot`] exposes one typed accessor per entity so selection is a
//!   match on the closed [`Entity`] enum rather than attribute lookup by
//!   name.
//! - [`Entity`] parses the four recognized entity names and rejects any
//!   other name with [`ExtractError::InvalidEntity`].
//! - [`SnapshotRecord`] is a plain owned implementation for callers that
//!   do not have their own snapshot type.
//!
//! Conventions
//! -----------
//! - Stress components use Voigt order `xx, yy, zz, yz, xz, xy`.
//! - Positions and velocities are Cartesian `[x, y, z]` triples in the
//!   units of the producing reader; the core does no unit conversion.
use crate::extraction::errors::{ExtractError, ExtractResult};
use std::str::FromStr;

/// Number of independent stress-tensor components.
pub const STRESS_COMPONENTS: usize = 6;

/// Component labels of [`StressTensor`] in storage order.
pub const STRESS_LABELS: [&str; STRESS_COMPONENTS] = ["xx", "yy", "zz", "yz", "xz", "xy"];

/// Closed set of entities a [`Snapshot`] can be projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Atoms,
    Pressure,
    Volume,
    Stress,
}

impl Entity {
    /// All entities, in the order they are listed in error messages.
    pub const ALL: [Entity; 4] = [Entity::Atoms, Entity::Pressure, Entity::Volume, Entity::Stress];

    /// Lower-case name used by trajectory tooling.
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Atoms => "atoms",
            Entity::Pressure => "pressure",
            Entity::Volume => "volume",
            Entity::Stress => "stress",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Entity {
    type Err = ExtractError;

    /// Parse an exact, lower-case entity name.
    ///
    /// Errors
    /// ------
    /// - `ExtractError::InvalidEntity(name)` for anything other than
    ///   `atoms`, `pressure`, `volume` or `stress`.
    fn from_str(name: &str) -> ExtractResult<Self> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.name() == name)
            .ok_or_else(|| ExtractError::InvalidEntity(name.to_string()))
    }
}

/// Six independent components of a symmetric stress tensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StressTensor {
    /// Components in Voigt order `xx, yy, zz, yz, xz, xy`.
    pub components: [f64; STRESS_COMPONENTS],
}

impl StressTensor {
    pub fn new(components: [f64; STRESS_COMPONENTS]) -> Self {
        StressTensor { components }
    }

    /// Build from the full symmetric 3×3 matrix, reading the upper triangle.
    pub fn from_matrix(m: [[f64; 3]; 3]) -> Self {
        StressTensor { components: [m[0][0], m[1][1], m[2][2], m[1][2], m[0][2], m[0][1]] }
    }

    /// Mean of the diagonal, i.e. the hydrostatic part.
    pub fn trace_mean(&self) -> f64 {
        (self.components[0] + self.components[1] + self.components[2]) / 3.0
    }
}

/// Pressure as recorded by the simulation: either a scalar or a full tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pressure {
    Scalar(f64),
    Tensor(StressTensor),
}

impl Pressure {
    /// Scalar view; a tensor pressure reduces to the mean of its diagonal.
    pub fn scalar(&self) -> f64 {
        match self {
            Pressure::Scalar(p) => *p,
            Pressure::Tensor(t) => t.trace_mean(),
        }
    }
}

/// One particle of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Chemical species or type label as given by the reader.
    pub species: String,
    /// Cartesian position.
    pub position: [f64; 3],
    /// Cartesian velocity.
    pub velocity: [f64; 3],
}

impl Atom {
    pub fn new(species: impl Into<String>, position: [f64; 3], velocity: [f64; 3]) -> Self {
        Atom { species: species.into(), position, velocity }
    }
}

/// Snapshot — typed accessors over one simulation timestep.
///
/// Purpose
/// -------
/// Decouple the analysis core from any particular trajectory format. A
/// reader implements this trait for its own record type and the extractor
/// only ever calls these four accessors.
///
/// Invariants
/// ----------
/// - Accessors are pure reads; calling them repeatedly yields identical
///   values.
pub trait Snapshot {
    fn atoms(&self) -> &[Atom];
    fn pressure(&self) -> Pressure;
    fn volume(&self) -> f64;
    fn stress(&self) -> StressTensor;
}

/// Owned snapshot record implementing [`Snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub atoms: Vec<Atom>,
    pub pressure: Pressure,
    pub volume: f64,
    pub stress: StressTensor,
}

impl SnapshotRecord {
    pub fn new(atoms: Vec<Atom>, pressure: Pressure, volume: f64, stress: StressTensor) -> Self {
        SnapshotRecord { atoms, pressure, volume, stress }
    }
}

impl Snapshot for SnapshotRecord {
    fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    fn pressure(&self) -> Pressure {
        self.pressure
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn stress(&self) -> StressTensor {
        self.stress
    }
}
