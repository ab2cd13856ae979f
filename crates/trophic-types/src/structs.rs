//! Core entity structs for the Trophic simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Kind;

/// The atomic unit of grid state: one cell holding at most one entity.
///
/// There is no entity identity beyond grid position. An entity is created by
/// writing a non-empty cell value and destroyed by overwriting it with
/// [`Cell::empty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// The species tag (or emptiness) of this cell.
    pub kind: Kind,

    /// Remaining energy. Meaningful only for animals; plants and empty
    /// cells carry 0 by convention. An animal dies when this drops to or
    /// below zero.
    pub energy: i32,

    /// Ticks since this entity was created.
    pub age: u32,
}

impl Cell {
    /// An unoccupied cell.
    pub const fn empty() -> Self {
        Self {
            kind: Kind::Empty,
            energy: 0,
            age: 0,
        }
    }

    /// A newborn plant (age 0, energy 0 by convention).
    pub const fn plant() -> Self {
        Self {
            kind: Kind::Plant,
            energy: 0,
            age: 0,
        }
    }

    /// A newborn herbivore with the given starting energy.
    pub const fn herbivore(energy: i32) -> Self {
        Self {
            kind: Kind::Herbivore,
            energy,
            age: 0,
        }
    }

    /// A newborn carnivore with the given starting energy.
    pub const fn carnivore(energy: i32) -> Self {
        Self {
            kind: Kind::Carnivore,
            energy,
            age: 0,
        }
    }

    /// Whether this cell is unoccupied.
    pub const fn is_empty(self) -> bool {
        matches!(self.kind, Kind::Empty)
    }
}

/// A complete, immutable copy of grid state at a point in time.
///
/// Safe to read without holding the store's lock: a snapshot is either the
/// complete pre-tick grid or the complete post-tick grid, never a mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridSnapshot {
    /// Generation counter: ticks applied since the last seed.
    pub tick: u64,

    /// Grid side length; `cells` holds `size` rows of `size` cells each.
    pub size: u32,

    /// Row-major cell matrix.
    pub cells: Vec<Vec<Cell>>,
}

impl GridSnapshot {
    /// Count the cells of the given kind across the whole snapshot.
    pub fn count(&self, kind: Kind) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.kind == kind)
            .count()
    }

    /// Total number of living entities (non-empty cells).
    pub fn population(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.kind.is_alive())
            .count()
    }
}

/// Requested entity counts for seeding the grid.
///
/// This is the seed request body; field names are part of the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationCounts {
    /// Number of plants to place.
    pub plants: u32,

    /// Number of herbivores to place.
    pub herbivores: u32,

    /// Number of carnivores to place.
    pub carnivores: u32,
}

impl PopulationCounts {
    /// Total number of entities requested across all kinds.
    ///
    /// Widened to `u64` so three maximal counts cannot overflow.
    pub fn total(self) -> u64 {
        u64::from(self.plants)
            .saturating_add(u64::from(self.herbivores))
            .saturating_add(u64::from(self.carnivores))
    }
}
