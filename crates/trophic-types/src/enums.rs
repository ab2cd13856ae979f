//! Enumeration types for the Trophic simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The species (or emptiness) tag of a grid cell.
///
/// The rule set is fixed and exhaustive: a cell is empty or holds exactly
/// one of the three trophic levels. Serializes to the one-character wire
/// encoding consumed by the dashboard: `" "`, `"P"`, `"H"`, `"C"`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Kind {
    /// An unoccupied cell.
    #[default]
    #[serde(rename = " ")]
    Empty,

    /// A plant: spreads into adjacent empty cells, dies of old age.
    #[serde(rename = "P")]
    Plant,

    /// A plant-eating animal: moves, grazes, reproduces, starves.
    #[serde(rename = "H")]
    Herbivore,

    /// A herbivore-eating animal: moves, hunts, reproduces, starves.
    #[serde(rename = "C")]
    Carnivore,
}

impl Kind {
    /// Whether this kind is a living entity (anything but [`Kind::Empty`]).
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Whether this kind is an animal subject to energy metabolism.
    pub const fn is_animal(self) -> bool {
        matches!(self, Self::Herbivore | Self::Carnivore)
    }
}
