//! Tick engine: the generation transition that drives the simulation.
//!
//! Each tick performs one double-buffered sweep. The engine reads only the
//! immutable pre-tick grid and writes results into a freshly allocated
//! all-empty successor, so an entity's behavior always observes pre-tick
//! neighbor state, never a neighbor's already-updated post-tick state (a
//! herbivore cannot eat a plant that another herbivore planted this same
//! tick).
//!
//! Cells are visited in row-major order. Per living entity the sweep runs:
//!
//! 1. **Behavior** -- species-specific phases, each gated by an independent
//!    probability draw: plants spread; animals move, eat, and reproduce.
//! 2. **Aging** -- `age += 1` unconditionally; animals additionally pay one
//!    energy of metabolic upkeep, separate from action costs.
//! 3. **Death** -- evaluated last and overriding prior placement: an animal
//!    whose energy dropped to or below zero, or a plant that had reached its
//!    maximum age, is not carried into the successor. Offspring already
//!    written survive their parent.
//!
//! Two entities can independently target the same successor cell (two
//! movers, two spawners, or a mix). The first writer in row-major processing
//! order wins; later conflicting writers silently forfeit that action for
//! the tick. Prey consumption follows the same discipline against the
//! successor: a meal is forfeited when the prey already escaped or was
//! consumed earlier in the sweep.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::trace;
use trophic_grid::{Grid, Position};
use trophic_types::{Cell, Kind};

use crate::config::{SimulationConfig, SpeciesConfig};

/// Census summary of a single tick's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Plants alive at end of tick.
    pub plants: usize,
    /// Herbivores alive at end of tick.
    pub herbivores: usize,
    /// Carnivores alive at end of tick.
    pub carnivores: usize,
    /// Entities created during this tick.
    pub births: u32,
    /// Entities removed during this tick (starvation, old age, predation).
    pub deaths: u32,
}

/// Mutable sweep state: the successor grid being built plus bookkeeping.
///
/// The successor is exclusively owned by the in-progress sweep; nothing may
/// read it until the store installs it.
struct Sweep {
    /// The successor grid, all-empty at sweep start.
    next: Grid,
    /// Pre-tick positions of prey consumed before their own turn came.
    /// Entities at these positions are skipped by the sweep loop.
    eaten: BTreeSet<Position>,
    /// Entities created this tick.
    births: u32,
    /// Entities removed this tick.
    deaths: u32,
}

impl Sweep {
    fn new(size: usize) -> Self {
        Self {
            next: Grid::new(size),
            eaten: BTreeSet::new(),
            births: 0,
            deaths: 0,
        }
    }

    /// Claim a successor cell for a new entity (a mover's destination or a
    /// newborn). First writer wins: the claim fails if the cell was already
    /// taken earlier in the sweep.
    fn claim(&mut self, pos: Position, cell: Cell) -> bool {
        if self.next.get(pos).copied().is_some_and(Cell::is_empty) {
            self.next.set(pos, cell)
        } else {
            trace!(row = pos.row, col = pos.col, "Successor cell already claimed, action forfeited");
            false
        }
    }
}

/// Compute the successor generation from `current`.
///
/// Pure apart from the random draws: `current` is never mutated, and the
/// returned grid is built from scratch. `tick` is the generation number the
/// successor will carry, used for the summary only.
pub fn advance(
    current: &Grid,
    config: &SimulationConfig,
    rng: &mut impl Rng,
    tick: u64,
) -> (Grid, TickSummary) {
    let mut sweep = Sweep::new(current.size());

    for pos in current.positions() {
        if sweep.eaten.contains(&pos) {
            // Consumed by a predator earlier in the sweep, before acting.
            continue;
        }
        let Some(cell) = current.get(pos).copied() else {
            continue;
        };
        match cell.kind {
            Kind::Empty => {}
            Kind::Plant => step_plant(current, &mut sweep, pos, cell, config, rng),
            Kind::Herbivore => {
                let ctx = AnimalContext {
                    rules: &config.herbivore,
                    prey: Kind::Plant,
                    max_energy: config.world.max_energy,
                };
                step_animal(current, &mut sweep, pos, cell, &ctx, rng);
            }
            Kind::Carnivore => {
                let ctx = AnimalContext {
                    rules: &config.carnivore,
                    prey: Kind::Herbivore,
                    max_energy: config.world.max_energy,
                };
                step_animal(current, &mut sweep, pos, cell, &ctx, rng);
            }
        }
    }

    let summary = TickSummary {
        tick,
        plants: sweep.next.count(Kind::Plant),
        herbivores: sweep.next.count(Kind::Herbivore),
        carnivores: sweep.next.count(Kind::Carnivore),
        births: sweep.births,
        deaths: sweep.deaths,
    };
    (sweep.next, summary)
}

/// One Bernoulli gate: true with probability `probability`.
///
/// Draws a uniform real in `[0, 1)`, so a probability of 1.0 always fires
/// and 0.0 never does.
fn gate(rng: &mut impl Rng, probability: f64) -> bool {
    rng.random::<f64>() < probability
}

/// Uniformly pick one candidate position, if any.
fn pick(candidates: &[Position], rng: &mut impl Rng) -> Option<Position> {
    candidates.choose(rng).copied()
}

// ---------------------------------------------------------------------------
// Plant rules
// ---------------------------------------------------------------------------

/// Advance one plant: probabilistic spread, then aging, then the age check.
fn step_plant(
    current: &Grid,
    sweep: &mut Sweep,
    pos: Position,
    cell: Cell,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) {
    // Spread: one uniformly chosen adjacent cell that was empty pre-tick.
    if gate(rng, config.plant.reproduce_probability) {
        let candidates = current.neighbors_of_kind(pos, Kind::Empty);
        if let Some(target) = pick(&candidates, rng)
            && sweep.claim(target, Cell::plant())
        {
            sweep.births = sweep.births.saturating_add(1);
        }
    }

    // Aging. A plant that had already reached its maximum age dies this
    // sweep; its offspring (if any) survive it.
    let age = cell.age.saturating_add(1);
    if cell.age >= config.plant.max_age {
        sweep.deaths = sweep.deaths.saturating_add(1);
        return;
    }
    let _ = sweep.next.set(pos, Cell { age, ..cell });
}

// ---------------------------------------------------------------------------
// Animal rules (shared by herbivores and carnivores)
// ---------------------------------------------------------------------------

/// The constants distinguishing one animal species' sweep from the other's.
struct AnimalContext<'a> {
    /// Probability and energy constants for this species.
    rules: &'a SpeciesConfig,
    /// What this species eats.
    prey: Kind,
    /// Global energy ceiling.
    max_energy: i32,
}

/// Advance one animal through its three independently gated phases --
/// movement, feeding, reproduction -- then aging, metabolic decay, and the
/// death check.
fn step_animal(
    current: &Grid,
    sweep: &mut Sweep,
    pos: Position,
    cell: Cell,
    ctx: &AnimalContext<'_>,
    rng: &mut impl Rng,
) {
    let mut anchor = pos;
    let mut energy = cell.energy;

    // Phase (a): movement. Relocating re-anchors the later phases to the
    // new cell within this same tick.
    if gate(rng, ctx.rules.move_probability) {
        let candidates = current.neighbors_of_kind(pos, Kind::Empty);
        if let Some(target) = pick(&candidates, rng)
            && sweep.next.get(target).copied().is_some_and(Cell::is_empty)
        {
            // The destination stays reserved for this entity: the sweep
            // finishes this animal (and writes it at `anchor`) before any
            // other entity gets to claim cells.
            anchor = target;
            energy = energy.saturating_sub(ctx.rules.move_cost);
        }
    }

    // Phase (b): feeding on a pre-tick prey neighbor of the anchor.
    if gate(rng, ctx.rules.eat_probability) {
        let prey_cells = current.neighbors_of_kind(anchor, ctx.prey);
        if let Some(meal) = pick(&prey_cells, rng) && consume(sweep, meal, ctx.prey, pos) {
            energy = energy.saturating_add(ctx.rules.eat_gain).min(ctx.max_energy);
        }
    }

    // Phase (c): reproduction into a pre-tick empty neighbor of the anchor.
    if gate(rng, ctx.rules.reproduce_probability) && energy > ctx.rules.reproduce_threshold {
        let candidates = current.neighbors_of_kind(anchor, Kind::Empty);
        let offspring = Cell {
            kind: cell.kind,
            energy: ctx.rules.initial_energy,
            age: 0,
        };
        if let Some(target) = pick(&candidates, rng)
            && sweep.claim(target, offspring)
        {
            sweep.births = sweep.births.saturating_add(1);
            energy = energy.saturating_sub(ctx.rules.reproduce_cost);
        }
    }

    // Aging and metabolic upkeep, then the death check -- last, overriding
    // everything except offspring already written.
    let age = cell.age.saturating_add(1);
    energy = energy.saturating_sub(1);
    if energy <= 0 {
        sweep.deaths = sweep.deaths.saturating_add(1);
        return;
    }
    let _ = sweep.next.set(
        anchor,
        Cell {
            kind: cell.kind,
            energy,
            age,
        },
    );
}

/// Resolve one feeding attempt against the successor grid.
///
/// Three cases, all decided by row-major processing order:
///
/// - The prey was processed earlier and still sits at `meal` in the
///   successor: remove it there and succeed.
/// - The prey has not been processed yet (its position sorts after the
///   eater's) and no one else consumed it: mark it eaten so its turn is
///   skipped, and succeed.
/// - Otherwise the prey escaped (moved or died earlier in the sweep) or was
///   already consumed: forfeit.
fn consume(sweep: &mut Sweep, meal: Position, prey: Kind, eater: Position) -> bool {
    if sweep.next.get(meal).is_some_and(|c| c.kind == prey) {
        let _ = sweep.next.set(meal, Cell::empty());
        sweep.deaths = sweep.deaths.saturating_add(1);
        return true;
    }
    if meal > eater && !sweep.eaten.contains(&meal) {
        sweep.eaten.insert(meal);
        sweep.deaths = sweep.deaths.saturating_add(1);
        return true;
    }
    trace!(
        row = meal.row,
        col = meal.col,
        "Prey escaped or already consumed, meal forfeited"
    );
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// A configuration with every probability at zero: nothing moves, eats,
    /// or reproduces, so only aging, decay, and death apply.
    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.plant.reproduce_probability = 0.0;
        config.herbivore.move_probability = 0.0;
        config.herbivore.eat_probability = 0.0;
        config.herbivore.reproduce_probability = 0.0;
        config.carnivore.move_probability = 0.0;
        config.carnivore.eat_probability = 0.0;
        config.carnivore.reproduce_probability = 0.0;
        config
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn empty_grid_is_a_fixed_point() {
        let grid = Grid::new(15);
        let (next, summary) = advance(&grid, &SimulationConfig::default(), &mut rng(), 1);
        assert_eq!(next.population(), 0);
        assert_eq!(summary.births, 0);
        assert_eq!(summary.deaths, 0);
    }

    #[test]
    fn plant_below_max_age_survives_and_ages_by_one() {
        let config = quiet_config();
        let mut grid = Grid::new(5);
        let pos = Position::new(2, 2);
        let _ = grid.set(
            pos,
            Cell {
                kind: Kind::Plant,
                energy: 0,
                age: config.plant.max_age - 1,
            },
        );

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        let survivor = next.get(pos).copied().unwrap();
        assert_eq!(survivor.kind, Kind::Plant);
        assert_eq!(survivor.age, config.plant.max_age);
        assert_eq!(summary.plants, 1);
        assert_eq!(summary.deaths, 0);
    }

    #[test]
    fn plant_at_max_age_is_removed() {
        let config = quiet_config();
        let mut grid = Grid::new(5);
        let pos = Position::new(2, 2);
        let _ = grid.set(
            pos,
            Cell {
                kind: Kind::Plant,
                energy: 0,
                age: config.plant.max_age,
            },
        );

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert!(next.get(pos).copied().unwrap().is_empty());
        assert_eq!(summary.plants, 0);
        assert_eq!(summary.deaths, 1);
    }

    #[test]
    fn plant_spreads_into_its_only_empty_neighbor() {
        let mut config = quiet_config();
        config.plant.reproduce_probability = 1.0;
        // 2x2 grid, three plants, one empty cell: two of the plants are
        // adjacent to it and both will try to spread there.
        let mut grid = Grid::new(2);
        let _ = grid.set(Position::new(0, 0), Cell::plant());
        let _ = grid.set(Position::new(0, 1), Cell::plant());
        let _ = grid.set(Position::new(1, 0), Cell::plant());
        // (1, 1) is the only empty cell, adjacent to (0, 1) and (1, 0).

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.count(Kind::Plant), 4);
        // Exactly one spawner won the claim; the other forfeited.
        assert_eq!(summary.births, 1);
        assert_eq!(next.get(Position::new(1, 1)).copied().unwrap().age, 0);
    }

    #[test]
    fn herbivore_with_one_energy_starves() {
        let config = quiet_config();
        let mut grid = Grid::new(5);
        let _ = grid.set(Position::new(2, 2), Cell::herbivore(1));

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.population(), 0);
        assert_eq!(summary.deaths, 1);
    }

    #[test]
    fn herbivore_metabolism_costs_one_energy_per_tick() {
        let config = quiet_config();
        let mut grid = Grid::new(5);
        let pos = Position::new(2, 2);
        let _ = grid.set(pos, Cell::herbivore(50));

        let (next, _) = advance(&grid, &config, &mut rng(), 1);
        let survivor = next.get(pos).copied().unwrap();
        assert_eq!(survivor.energy, 49);
        assert_eq!(survivor.age, 1);
    }

    #[test]
    fn forced_graze_consumes_the_plant() {
        let mut config = quiet_config();
        config.herbivore.eat_probability = 1.0;
        let mut grid = Grid::new(5);
        let herb = Position::new(2, 2);
        let plant = Position::new(1, 2);
        let _ = grid.set(herb, Cell::herbivore(50));
        let _ = grid.set(plant, Cell::plant());

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert!(next.get(plant).copied().unwrap().is_empty());
        let gain = config.herbivore.eat_gain;
        assert_eq!(next.get(herb).copied().unwrap().energy, 50 + gain - 1);
        assert_eq!(summary.plants, 0);
        assert_eq!(summary.herbivores, 1);
        assert_eq!(summary.deaths, 1);
    }

    #[test]
    fn feeding_gain_is_capped_at_max_energy() {
        let mut config = quiet_config();
        config.herbivore.eat_probability = 1.0;
        let mut grid = Grid::new(5);
        let herb = Position::new(2, 2);
        let _ = grid.set(herb, Cell::herbivore(config.world.max_energy));
        let _ = grid.set(Position::new(1, 2), Cell::plant());

        let (next, _) = advance(&grid, &config, &mut rng(), 1);
        // Capped at the ceiling, then one energy of upkeep.
        assert_eq!(
            next.get(herb).copied().unwrap().energy,
            config.world.max_energy - 1
        );
    }

    #[test]
    fn reproduction_spawns_offspring_and_charges_the_parent() {
        let mut config = quiet_config();
        config.herbivore.reproduce_probability = 1.0;
        let mut grid = Grid::new(5);
        let parent = Position::new(2, 2);
        let _ = grid.set(parent, Cell::herbivore(100));

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.count(Kind::Herbivore), 2);
        assert_eq!(summary.births, 1);
        let parent_cell = next.get(parent).copied().unwrap();
        assert_eq!(
            parent_cell.energy,
            100 - config.herbivore.reproduce_cost - 1
        );
        // The child starts at the configured initial energy, age zero.
        let child = next
            .positions()
            .filter(|p| *p != parent)
            .find_map(|p| next.get(p).copied().filter(|c| c.kind == Kind::Herbivore))
            .unwrap();
        assert_eq!(child.energy, config.herbivore.initial_energy);
        assert_eq!(child.age, 0);
    }

    #[test]
    fn reproduction_requires_energy_above_threshold() {
        let mut config = quiet_config();
        config.herbivore.reproduce_probability = 1.0;
        let mut grid = Grid::new(5);
        let _ = grid.set(
            Position::new(2, 2),
            Cell::herbivore(config.herbivore.reproduce_threshold),
        );

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.count(Kind::Herbivore), 1);
        assert_eq!(summary.births, 0);
    }

    #[test]
    fn movers_contending_for_one_cell_resolve_first_writer_wins() {
        let mut config = quiet_config();
        config.herbivore.move_probability = 1.0;
        // Every cell holds a herbivore except the center. Only the four
        // orthogonal neighbors of the center have an empty candidate at
        // all, and they all want the same cell.
        let mut grid = Grid::new(3);
        let all: Vec<Position> = grid.positions().collect();
        for pos in all {
            let _ = grid.set(pos, Cell::herbivore(50));
        }
        let center = Position::new(1, 1);
        let _ = grid.set(center, Cell::empty());

        let (next, _) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.count(Kind::Herbivore), 8);
        // Row-major order: (0, 1) is processed first and wins the center.
        let winner = next.get(center).copied().unwrap();
        assert_eq!(winner.kind, Kind::Herbivore);
        assert_eq!(winner.energy, 50 - config.herbivore.move_cost - 1);
        assert!(next.get(Position::new(0, 1)).copied().unwrap().is_empty());
    }

    #[test]
    fn carnivore_eats_an_already_processed_herbivore() {
        let mut config = quiet_config();
        config.carnivore.eat_probability = 1.0;
        let mut grid = Grid::new(5);
        let prey = Position::new(1, 2);
        let hunter = Position::new(2, 2);
        let _ = grid.set(prey, Cell::herbivore(50));
        let _ = grid.set(hunter, Cell::carnivore(50));

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        assert_eq!(next.count(Kind::Herbivore), 0);
        assert_eq!(summary.carnivores, 1);
        let gain = config.carnivore.eat_gain;
        assert_eq!(next.get(hunter).copied().unwrap().energy, 50 + gain - 1);
    }

    #[test]
    fn carnivore_eats_a_not_yet_processed_herbivore() {
        let mut config = quiet_config();
        config.carnivore.eat_probability = 1.0;
        let mut grid = Grid::new(5);
        let hunter = Position::new(1, 2);
        let prey = Position::new(2, 2);
        let _ = grid.set(hunter, Cell::carnivore(50));
        let _ = grid.set(prey, Cell::herbivore(50));

        let (next, summary) = advance(&grid, &config, &mut rng(), 1);
        // The prey was consumed before its own turn: it never acts and its
        // cell stays empty in the successor.
        assert_eq!(next.count(Kind::Herbivore), 0);
        assert!(next.get(prey).copied().unwrap().is_empty());
        assert_eq!(summary.deaths, 1);
    }

    #[test]
    fn prey_that_moved_away_escapes_the_hunter() {
        let mut config = quiet_config();
        config.herbivore.move_probability = 1.0;
        config.carnivore.eat_probability = 1.0;
        let mut grid = Grid::new(5);
        let prey = Position::new(1, 2);
        let hunter = Position::new(2, 2);
        let _ = grid.set(prey, Cell::herbivore(50));
        let _ = grid.set(hunter, Cell::carnivore(50));

        let (next, _) = advance(&grid, &config, &mut rng(), 1);
        // The herbivore relocated before the carnivore's turn; the meal is
        // forfeited and both animals survive.
        assert_eq!(next.count(Kind::Herbivore), 1);
        assert_eq!(next.count(Kind::Carnivore), 1);
        assert_eq!(next.get(hunter).copied().unwrap().energy, 50 - 1);
    }

    #[test]
    fn population_never_exceeds_capacity() {
        let mut grid = Grid::new(6);
        let mut generator = rng();
        grid.populate(Cell::plant(), 12, &mut generator).unwrap();
        grid.populate(Cell::herbivore(100), 12, &mut generator).unwrap();
        grid.populate(Cell::carnivore(100), 12, &mut generator).unwrap();

        let config = SimulationConfig::default();
        let mut current = grid;
        for tick in 1..=50 {
            let (next, _) = advance(&current, &config, &mut generator, tick);
            assert!(next.population() <= next.capacity());
            current = next;
        }
    }
}
