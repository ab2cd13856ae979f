//! The cell matrix: addressing, neighbor queries, placement, snapshots.
//!
//! The grid is a row-major N×N matrix of [`Cell`] values, fixed size for the
//! process lifetime. Cells are addressed by [`Position`] with both
//! coordinates in `[0, N)`. "Adjacent" always means the four orthogonal
//! cells that lie within bounds; out-of-bounds directions are excluded from
//! candidate sets, never wrapped.

use rand::Rng;
use tracing::debug;
use trophic_types::{Cell, GridSnapshot, Kind};

use crate::error::GridError;

/// A `(row, column)` grid coordinate.
///
/// Used internally to describe cells and candidate move/reproduction
/// targets; never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Row index in `[0, N)`.
    pub row: usize,
    /// Column index in `[0, N)`.
    pub col: usize,
}

impl Position {
    /// Create a position from row and column indices.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The N×N matrix of cells.
///
/// Row-major storage. All access is bounds-checked: out-of-range positions
/// read as `None` and writes to them are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Side length N.
    size: usize,
    /// Row-major cell storage, `size * size` entries.
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid with the given side length.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::empty(); size.saturating_mul(size)],
        }
    }

    /// Side length N.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (N²).
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Row-major storage index for a position, or `None` if out of bounds.
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row < self.size && pos.col < self.size {
            pos.row.checked_mul(self.size)?.checked_add(pos.col)
        } else {
            None
        }
    }

    /// Read the cell at a position. Out-of-bounds reads return `None`.
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(self.index(pos)?)
    }

    /// Write the cell at a position. Returns `false` (and drops the write)
    /// if the position is out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        match self.cells.get_mut(idx) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Iterate all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Position { row, col }))
    }

    /// The orthogonally adjacent in-bounds positions (up, down, left, right).
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        if let Some(row) = pos.row.checked_sub(1) {
            out.push(Position { row, col: pos.col });
        }
        if let Some(row) = pos.row.checked_add(1).filter(|r| *r < self.size) {
            out.push(Position { row, col: pos.col });
        }
        if let Some(col) = pos.col.checked_sub(1) {
            out.push(Position { row: pos.row, col });
        }
        if let Some(col) = pos.col.checked_add(1).filter(|c| *c < self.size) {
            out.push(Position { row: pos.row, col });
        }
        out
    }

    /// The adjacent positions whose cells hold the given kind in this grid.
    pub fn neighbors_of_kind(&self, pos: Position, kind: Kind) -> Vec<Position> {
        self.neighbors(pos)
            .into_iter()
            .filter(|p| self.get(*p).is_some_and(|cell| cell.kind == kind))
            .collect()
    }

    /// All currently empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|p| self.get(*p).is_some_and(|cell| cell.is_empty()))
            .collect()
    }

    /// Count the cells of the given kind.
    pub fn count(&self, kind: Kind) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }

    /// Total number of living entities (non-empty cells).
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.kind.is_alive()).count()
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Place `count` copies of `template`, each at a uniformly chosen empty
    /// cell.
    ///
    /// One cell per entity: each placement is an independent uniform draw
    /// over the cells still empty at that point, so a cell filled earlier in
    /// the pass is excluded from subsequent draws.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPopulation`] if fewer than `count` empty
    /// cells remain; the grid is left unmodified in that case.
    pub fn populate(
        &mut self,
        template: Cell,
        count: u32,
        rng: &mut impl Rng,
    ) -> Result<(), GridError> {
        let mut free = self.empty_positions();
        let available = u64::try_from(free.len()).unwrap_or(u64::MAX);
        if u64::from(count) > available {
            return Err(GridError::InvalidPopulation {
                requested: u64::from(count),
                capacity: available,
            });
        }

        for _ in 0..count {
            if free.is_empty() {
                break;
            }
            let idx = rng.random_range(0..free.len());
            let pos = free.swap_remove(idx);
            let _ = self.set(pos, template);
        }

        debug!(kind = ?template.kind, count, "Entities placed");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------

    /// Extract a full value-copy of the grid tagged with a tick number.
    pub fn to_snapshot(&self, tick: u64) -> GridSnapshot {
        GridSnapshot {
            tick,
            size: u32::try_from(self.size).unwrap_or(u32::MAX),
            cells: self.cells.chunks(self.size.max(1)).map(<[Cell]>::to_vec).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn new_grid_is_all_empty() {
        let grid = Grid::new(15);
        assert_eq!(grid.capacity(), 225);
        assert_eq!(grid.count(Kind::Empty), 225);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut grid = Grid::new(4);
        assert!(grid.set(Position::new(3, 3), Cell::plant()));
        assert_eq!(grid.get(Position::new(3, 3)).unwrap().kind, Kind::Plant);

        assert!(grid.get(Position::new(4, 0)).is_none());
        assert!(grid.get(Position::new(0, 4)).is_none());
        assert!(!grid.set(Position::new(4, 4), Cell::plant()));
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn corner_has_two_neighbors() {
        let grid = Grid::new(5);
        let neighbors = grid.neighbors(Position::new(0, 0));
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&Position::new(1, 0)));
        assert!(neighbors.contains(&Position::new(0, 1)));
    }

    #[test]
    fn edge_has_three_neighbors_and_center_four() {
        let grid = Grid::new(5);
        assert_eq!(grid.neighbors(Position::new(0, 2)).len(), 3);
        assert_eq!(grid.neighbors(Position::new(2, 2)).len(), 4);
    }

    #[test]
    fn neighbors_never_wrap() {
        let grid = Grid::new(3);
        let neighbors = grid.neighbors(Position::new(2, 2));
        assert_eq!(neighbors.len(), 2);
        assert!(!neighbors.contains(&Position::new(0, 2)));
        assert!(!neighbors.contains(&Position::new(2, 0)));
    }

    #[test]
    fn neighbors_of_kind_filters_cells() {
        let mut grid = Grid::new(3);
        let center = Position::new(1, 1);
        let _ = grid.set(Position::new(0, 1), Cell::plant());
        let _ = grid.set(Position::new(1, 0), Cell::herbivore(10));

        let plants = grid.neighbors_of_kind(center, Kind::Plant);
        assert_eq!(plants, vec![Position::new(0, 1)]);
        let empties = grid.neighbors_of_kind(center, Kind::Empty);
        assert_eq!(empties.len(), 2);
    }

    #[test]
    fn populate_places_exact_counts_in_distinct_cells() {
        let mut grid = Grid::new(15);
        let mut rng = StdRng::seed_from_u64(7);

        grid.populate(Cell::plant(), 40, &mut rng).unwrap();
        grid.populate(Cell::herbivore(100), 30, &mut rng).unwrap();
        grid.populate(Cell::carnivore(100), 10, &mut rng).unwrap();

        assert_eq!(grid.count(Kind::Plant), 40);
        assert_eq!(grid.count(Kind::Herbivore), 30);
        assert_eq!(grid.count(Kind::Carnivore), 10);
        assert_eq!(grid.count(Kind::Empty), 225 - 80);
    }

    #[test]
    fn populate_can_fill_the_entire_grid() {
        let mut grid = Grid::new(4);
        let mut rng = StdRng::seed_from_u64(7);
        grid.populate(Cell::plant(), 16, &mut rng).unwrap();
        assert_eq!(grid.count(Kind::Plant), 16);
    }

    #[test]
    fn populate_rejects_overflow_without_mutating() {
        let mut grid = Grid::new(4);
        let mut rng = StdRng::seed_from_u64(7);
        grid.populate(Cell::plant(), 10, &mut rng).unwrap();

        let err = grid.populate(Cell::herbivore(100), 7, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidPopulation {
                requested: 7,
                capacity: 6,
            }
        );
        assert_eq!(grid.count(Kind::Plant), 10);
        assert_eq!(grid.count(Kind::Herbivore), 0);
    }

    #[test]
    fn snapshot_matches_grid_contents() {
        let mut grid = Grid::new(3);
        let _ = grid.set(Position::new(0, 2), Cell::carnivore(50));
        let snapshot = grid.to_snapshot(9);

        assert_eq!(snapshot.tick, 9);
        assert_eq!(snapshot.size, 3);
        assert_eq!(snapshot.cells.len(), 3);
        assert!(snapshot.cells.iter().all(|row| row.len() == 3));
        assert_eq!(snapshot.cells[0][2].kind, Kind::Carnivore);
        assert_eq!(snapshot.count(Kind::Carnivore), 1);
    }
}
