//! The authoritative grid behind a reader-writer lock.
//!
//! [`GridStore`] owns the current grid, the tick counter, and the shared
//! random generator, and arbitrates all access. Seeding and stepping take
//! the write half for their entire read-modify-write; snapshots take the
//! read half and copy the grid out. A reader therefore sees either the
//! complete pre-tick grid or the complete post-tick grid, never a mix:
//! the tick engine builds the successor off to the side and the store
//! installs it as a whole-grid swap.
//!
//! Concurrent seed/step calls against the same store serialize by waiting
//! on the lock (no busy rejection). Lock hold time is bounded by one full
//! grid sweep, O(N²) with O(1) work per cell.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::RwLock;
use tracing::info;
use trophic_grid::{Grid, GridError};
use trophic_types::{Cell, GridSnapshot, PopulationCounts};

use crate::config::SimulationConfig;
use crate::engine;

/// State guarded by the store's lock.
struct StoreInner {
    /// The current generation, visible to readers.
    grid: Grid,
    /// Ticks applied since the last seed.
    tick: u64,
    /// The single shared random source, seeded once at construction.
    rng: StdRng,
}

/// The authoritative grid store.
///
/// Constructed once at startup and shared behind an `Arc`; the
/// configuration is immutable for the store's lifetime.
pub struct GridStore {
    /// Deploy-time configuration (grid size, probabilities, energy rules).
    config: SimulationConfig,
    /// Side length N, derived from the configuration once.
    size: usize,
    /// Lock-guarded mutable state.
    inner: RwLock<StoreInner>,
}

impl GridStore {
    /// Create a store holding an all-empty grid, with the random generator
    /// seeded from `world.seed`.
    pub fn new(config: SimulationConfig) -> Self {
        let size = usize::try_from(config.world.grid_size).unwrap_or(usize::MAX);
        let inner = StoreInner {
            grid: Grid::new(size),
            tick: 0,
            rng: StdRng::seed_from_u64(config.world.seed),
        };
        Self {
            config,
            size,
            inner: RwLock::new(inner),
        }
    }

    /// The store's immutable configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Reset the grid to all-empty and place the requested populations,
    /// each entity at a uniformly chosen empty cell.
    ///
    /// Validation happens before any mutation: an over-capacity request
    /// fails with [`GridError::InvalidPopulation`] and leaves the prior
    /// grid untouched. The tick counter restarts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPopulation`] if the requested total
    /// exceeds the grid's capacity.
    pub async fn seed(&self, counts: PopulationCounts) -> Result<GridSnapshot, GridError> {
        let capacity = u64::try_from(self.size.saturating_mul(self.size)).unwrap_or(u64::MAX);
        if counts.total() > capacity {
            return Err(GridError::InvalidPopulation {
                requested: counts.total(),
                capacity,
            });
        }

        let mut inner = self.inner.write().await;
        let mut grid = Grid::new(self.size);
        grid.populate(Cell::plant(), counts.plants, &mut inner.rng)?;
        grid.populate(
            Cell::herbivore(self.config.herbivore.initial_energy),
            counts.herbivores,
            &mut inner.rng,
        )?;
        grid.populate(
            Cell::carnivore(self.config.carnivore.initial_energy),
            counts.carnivores,
            &mut inner.rng,
        )?;
        inner.grid = grid;
        inner.tick = 0;
        info!(
            plants = counts.plants,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            "Grid seeded"
        );
        Ok(inner.grid.to_snapshot(inner.tick))
    }

    /// Advance the simulation by exactly one tick and return the new
    /// current grid.
    ///
    /// Never fails: the all-empty grid is a valid, stable fixed point.
    /// The successor is computed from the current grid under the write
    /// lock and installed atomically; a tick committed here is never
    /// rolled back even if the caller goes away.
    pub async fn step(&self) -> GridSnapshot {
        let mut inner = self.inner.write().await;
        let tick = inner.tick.saturating_add(1);

        // Split the guard so the engine can read the grid while drawing
        // from the shared generator.
        let StoreInner { grid, rng, .. } = &mut *inner;
        let (next, summary) = engine::advance(grid, &self.config, rng, tick);
        *grid = next;
        inner.tick = tick;

        info!(
            tick,
            plants = summary.plants,
            herbivores = summary.herbivores,
            carnivores = summary.carnivores,
            births = summary.births,
            deaths = summary.deaths,
            "Tick applied"
        );
        inner.grid.to_snapshot(tick)
    }

    /// A read-only copy of the current grid state.
    ///
    /// Safe to call concurrently with other snapshots; waits out any
    /// in-flight seed or step rather than observing it mid-write.
    pub async fn snapshot(&self) -> GridSnapshot {
        let inner = self.inner.read().await;
        inner.grid.to_snapshot(inner.tick)
    }
}
