/// Level setup: builds a fresh grid for a level from the level table.
///
/// Generation order:
///   1. Empty grid of the level's size
///   2. Player at (0, 0)
///   3. Walls (never on the player start)
///   4. Enemy spawns (random empty cells)
///   5. Mark player + enemies
///   6. Stars
///   7. Exit, only if the level has no stars
///
/// Every step can fail with `PlacementError` if the grid is too small for
/// the requested counts; the error is handed back to the caller.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::GameConfig;
use crate::domain::ai::PathRules;
use crate::domain::entity::Pos;
use crate::domain::grid::{self, Grid, PlacementError};
use crate::sim::world::{Phase, WorldState};

pub const PLAYER_START: Pos = Pos::new(0, 0);

/// A new game at level 1.
pub fn new_game(config: &GameConfig) -> Result<WorldState, PlacementError> {
    let rng = match config.rules.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let rules = PathRules { exit_blocks: config.rules.enemies_blocked_by_exit };
    let mut world = WorldState::new(config.levels.clone(), rules, rng);
    build_level(&mut world, 1)?;
    Ok(world)
}

/// Replace the grid and entities with a freshly generated level `level_no`
/// (1-based). Resets per-level counters; keeps the total score.
pub fn build_level(world: &mut WorldState, level_no: usize) -> Result<(), PlacementError> {
    let def = level_no
        .checked_sub(1)
        .and_then(|i| world.levels.get(i))
        .copied()
        .ok_or(PlacementError::UnknownLevel(level_no))?;

    let mut g = Grid::new(def.width, def.height);
    let player = PLAYER_START;
    if !g.contains(player) {
        return Err(PlacementError::GridTooDense { what: "player", wanted: 1, available: 0 });
    }

    let reserved: HashSet<Pos> = [player].into_iter().collect();
    grid::place_walls(&mut g, def.walls, &reserved, &mut world.rng)?;
    let enemies = grid::pick_empty(&g, def.enemies, &reserved, "enemies", &mut world.rng)?;
    grid::place_entities(&mut g, player, &enemies);
    let stars = grid::place_items(&mut g, def.stars, &mut world.rng)?;
    // Nothing to collect: the exit is open from the start
    let exit = if stars.is_empty() {
        Some(grid::place_exit(&mut g, &mut world.rng)?)
    } else {
        None
    };

    world.grid = g;
    world.player = player;
    world.enemies = enemies;
    world.star_total = stars.len();
    world.stars = stars;
    world.exit = exit;
    world.level = level_no;
    world.score = 0;
    world.time = 0;
    world.phase = Phase::Playing;
    world.paused = false;
    Ok(())
}
