/// The turn engine: player moves and enemy ticks.
///
/// Two transitions, never interleaved:
///   - `move_player`: one cell per input intent
///   - `enemy_tick`: one synchronous round of enemy moves, then time += 1
///
/// Both are no-ops once the phase is terminal (Caught / Completed).

use crate::domain::ai;
use crate::domain::cell::CellKind;
use crate::domain::entity::MoveDir;
use crate::domain::grid::{self, PlacementError};
use super::event::GameEvent;
use super::level;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Player move
// ══════════════════════════════════════════════════════════════

/// Move the player one cell. Blocked moves (terminal phase, edge, wall)
/// change nothing and return no events.
///
/// Fails only when a follow-up placement (exit, next level) does not fit.
pub fn move_player(world: &mut WorldState, dir: MoveDir) -> Result<Vec<GameEvent>, PlacementError> {
    let mut events = Vec::new();
    if world.phase.is_terminal() {
        return Ok(events);
    }

    let (dx, dy) = dir.delta();
    let Some(target) = world.grid.step(world.player, dx, dy) else { return Ok(events) };
    let kind = world.grid.kind_at(target);
    if !kind.is_walkable() {
        return Ok(events);
    }

    world.grid.set(world.player, CellKind::Empty);
    world.player = target;

    match kind {
        CellKind::Star => {
            world.stars.retain(|s| *s != target);
            world.score += 1;
            world.total_score += 1;
            events.push(GameEvent::StarCollected { at: target });
            if world.score == world.star_total {
                let exit = grid::place_exit(&mut world.grid, &mut world.rng)?;
                world.exit = Some(exit);
                events.push(GameEvent::ExitOpened { at: exit });
                world.set_message("All stars collected! Find the exit.", 30);
            }
        }
        CellKind::Exit => {
            let next = world.level + 1;
            if next > world.level_count() {
                world.exit = None;
                world.phase = Phase::Completed;
                events.push(GameEvent::GameCompleted);
                world.set_message("You cleared every level!", 0);
            } else {
                level::build_level(world, next)?;
                events.push(GameEvent::LevelCleared { next_level: next });
                world.set_message(&format!("Level {} cleared! On to level {}.", next - 1, next), 30);
                return Ok(events);
            }
        }
        CellKind::Enemy => {
            let by = world.enemies.iter().position(|e| *e == target).unwrap_or(0);
            world.phase = Phase::Caught;
            events.push(GameEvent::PlayerCaught { by });
            world.set_message(&format!("Game Over! Caught after {}s.", world.time), 0);
            return Ok(events);
        }
        _ => {}
    }

    world.grid.set(target, CellKind::Player);
    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Enemy tick
// ══════════════════════════════════════════════════════════════

/// One timer tick: every enemy, in order, takes one step along its
/// shortest path to the player; then the clock advances.
///
/// Paths are computed against the player's position at the start of the
/// tick. Enemy cells never block, so enemies may share a cell. The first
/// enemy to reach the player ends the round.
pub fn enemy_tick(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.phase.is_terminal() {
        return events;
    }

    let target = world.player;
    for id in 0..world.enemies.len() {
        let from = world.enemies[id];
        let Some(to) = ai::next_step(&world.grid, from, target, world.rules) else { continue };

        world.enemies[id] = to;
        let uncovered = world.uncovered_kind(from);
        world.grid.set(from, uncovered);
        world.grid.set(to, CellKind::Enemy);
        events.push(GameEvent::EnemyMoved { id, from, to });

        if to == target {
            world.phase = Phase::Caught;
            events.push(GameEvent::PlayerCaught { by: id });
            break;
        }
    }

    world.time += 1;
    if world.phase == Phase::Caught {
        world.set_message(&format!("Game Over! Caught after {}s.", world.time), 0);
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelDef;
    use crate::domain::ai::PathRules;
    use crate::domain::entity::Pos;

    fn p(x: usize, y: usize) -> Pos {
        Pos::new(x, y)
    }

    fn rows(world: &WorldState) -> Vec<String> {
        world.grid.to_rows()
    }

    // ── Player move ──

    #[test]
    fn move_into_empty_cell() {
        let mut w = WorldState::from_rows(&["P..", "..."]);
        let events = move_player(&mut w, MoveDir::Right).unwrap();
        assert!(events.is_empty());
        assert_eq!(w.player, p(1, 0));
        assert_eq!(rows(&w), [".P.", "..."]);
    }

    #[test]
    fn wall_move_changes_nothing() {
        let mut w = WorldState::from_rows(&[".#.", "#P#", ".#."]);
        let before = rows(&w);
        for dir in [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right] {
            assert!(move_player(&mut w, dir).unwrap().is_empty());
            assert_eq!(w.player, p(1, 1));
            assert_eq!(rows(&w), before);
        }
    }

    #[test]
    fn edge_move_changes_nothing() {
        let mut w = WorldState::from_rows(&["P.", ".."]);
        move_player(&mut w, MoveDir::Up).unwrap();
        move_player(&mut w, MoveDir::Left).unwrap();
        assert_eq!(w.player, p(0, 0));
        assert_eq!(rows(&w), ["P.", ".."]);
    }

    #[test]
    fn star_increments_score() {
        let mut w = WorldState::from_rows(&["P**", "..."]);
        let events = move_player(&mut w, MoveDir::Right).unwrap();
        assert_eq!(events, vec![GameEvent::StarCollected { at: p(1, 0) }]);
        assert_eq!(w.score, 1);
        assert_eq!(w.total_score, 1);
        assert_eq!(w.stars, vec![p(2, 0)]);
        assert_eq!(w.exit, None);
        assert_eq!(rows(&w), [".P*", "..."]);
    }

    #[test]
    fn last_star_opens_exactly_one_exit() {
        let mut w = WorldState::from_rows(&[
            "P*..",
            "#...",
            "E..#",
        ]);
        let before = rows(&w);
        let events = move_player(&mut w, MoveDir::Right).unwrap();

        let exit = w.exit.expect("exit placed");
        assert!(events.contains(&GameEvent::ExitOpened { at: exit }));
        assert_eq!(before[exit.y].as_bytes()[exit.x], b'.');

        let after = rows(&w);
        let mut changed = vec![];
        for y in 0..before.len() {
            for x in 0..before[y].len() {
                let (a, b) = (before[y].as_bytes()[x], after[y].as_bytes()[x]);
                if a != b {
                    changed.push((p(x, y), a as char, b as char));
                }
            }
        }
        changed.sort_by_key(|(pos, ..)| (pos.y, pos.x));
        let mut expected = vec![
            (p(0, 0), 'P', '.'),
            (p(1, 0), '*', 'P'),
            (exit, '.', 'X'),
        ];
        expected.sort_by_key(|(pos, ..)| (pos.y, pos.x));
        assert_eq!(changed, expected);
    }

    #[test]
    fn exit_advances_level() {
        let mut w = WorldState::from_rows(&["PX"]);
        w.levels.push(LevelDef { width: 6, height: 5, walls: 3, stars: 2, enemies: 2 });
        w.score = 4;
        w.time = 12;
        let events = move_player(&mut w, MoveDir::Right).unwrap();
        assert_eq!(events, vec![GameEvent::LevelCleared { next_level: 2 }]);
        assert_eq!(w.level, 2);
        assert_eq!((w.grid.width(), w.grid.height()), (6, 5));
        assert_eq!(w.player, level::PLAYER_START);
        assert_eq!(w.grid.kind_at(level::PLAYER_START), CellKind::Player);
        assert_eq!((w.score, w.time), (0, 0));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn exit_on_final_level_completes() {
        let mut w = WorldState::from_rows(&["PX."]);
        let events = move_player(&mut w, MoveDir::Right).unwrap();
        assert_eq!(events, vec![GameEvent::GameCompleted]);
        assert_eq!(w.phase, Phase::Completed);
        assert_eq!(rows(&w), [".P."]);

        // Terminal: further moves ignored
        assert!(move_player(&mut w, MoveDir::Right).unwrap().is_empty());
        assert_eq!(w.player, p(1, 0));
    }

    #[test]
    fn walking_into_enemy_is_caught() {
        let mut w = WorldState::from_rows(&["PE."]);
        let events = move_player(&mut w, MoveDir::Right).unwrap();
        assert_eq!(events, vec![GameEvent::PlayerCaught { by: 0 }]);
        assert_eq!(w.phase, Phase::Caught);
        assert_eq!(rows(&w), [".E."]);
    }

    // ── Enemy tick ──

    #[test]
    fn enemy_steps_along_shortest_path() {
        let mut w = WorldState::from_rows(&[
            "P#.",
            ".#.",
            "..E",
        ]);
        let events = enemy_tick(&mut w);
        assert_eq!(events, vec![GameEvent::EnemyMoved { id: 0, from: p(2, 2), to: p(1, 2) }]);
        assert_eq!(rows(&w), ["P#.", ".#.", ".E."]);
        assert_eq!(w.time, 1);
    }

    #[test]
    fn chase_on_open_4x4_catches_after_six_ticks() {
        let mut w = WorldState::from_rows(&[
            "P...",
            "....",
            "....",
            "...E",
        ]);
        let mut dist = w.enemies[0].manhattan(w.player);
        assert_eq!(dist, 6);
        for tick in 1..=6 {
            assert_eq!(w.phase, Phase::Playing, "tick {tick}");
            enemy_tick(&mut w);
            let d = w.enemies[0].manhattan(w.player);
            assert_eq!(d, dist - 1);
            dist = d;
        }
        assert_eq!(w.enemies[0], p(0, 0));
        assert_eq!(w.phase, Phase::Caught);
        assert_eq!(w.time, 6);
        assert_eq!(w.grid.kind_at(p(0, 0)), CellKind::Enemy);
    }

    #[test]
    fn catch_stops_later_enemies_and_freezes_clock() {
        let mut w = WorldState::from_rows(&["EP...E"]);
        let events = enemy_tick(&mut w);
        assert_eq!(
            events,
            vec![
                GameEvent::EnemyMoved { id: 0, from: p(0, 0), to: p(1, 0) },
                GameEvent::PlayerCaught { by: 0 },
            ]
        );
        assert_eq!(w.enemies[1], p(5, 0));
        assert_eq!(w.phase, Phase::Caught);
        assert_eq!(w.time, 1);

        assert!(enemy_tick(&mut w).is_empty());
        assert_eq!(w.time, 1);
        assert_eq!(w.enemies[1], p(5, 0));
    }

    #[test]
    fn unreachable_enemy_stays_put() {
        let mut w = WorldState::from_rows(&["P#E"]);
        assert!(enemy_tick(&mut w).is_empty());
        assert_eq!(w.enemies, vec![p(2, 0)]);
        assert_eq!(w.time, 1);
    }

    #[test]
    fn enemy_crossing_a_star_leaves_it_behind() {
        let mut w = WorldState::from_rows(&["P...*E"]);
        enemy_tick(&mut w);
        assert_eq!(rows(&w), ["P...E."]);
        enemy_tick(&mut w);
        assert_eq!(rows(&w), ["P..E*."]);
        assert_eq!(w.stars, vec![p(4, 0)]);
    }

    #[test]
    fn stacked_enemies_keep_cell_marked() {
        let mut w = WorldState::from_rows(&["P..E", "...E"]);
        // Enemy 0 at (3,0) -> (2,0); enemy 1 at (3,1) -> (2,1)
        enemy_tick(&mut w);
        assert_eq!(w.enemies, vec![p(2, 0), p(2, 1)]);

        // Force both onto one cell, then move one away.
        w.grid.set(p(2, 1), CellKind::Empty);
        w.enemies[1] = p(2, 0);
        enemy_tick(&mut w);
        assert_eq!(w.enemies, vec![p(1, 0), p(1, 0)]);
        assert_eq!(w.grid.kind_at(p(2, 0)), CellKind::Empty);
        assert_eq!(w.grid.kind_at(p(1, 0)), CellKind::Enemy);
    }

    #[test]
    fn exit_blocking_is_configurable() {
        let mut blocked = WorldState::from_rows(&["PXE", "###"]);
        assert!(enemy_tick(&mut blocked).is_empty());

        let mut open = WorldState::from_rows(&["PXE", "###"]);
        open.rules = PathRules { exit_blocks: false };
        enemy_tick(&mut open);
        assert_eq!(rows(&open), ["PE.", "###"]);
        enemy_tick(&mut open);
        assert_eq!(rows(&open), ["EX.", "###"]);
        assert_eq!(open.phase, Phase::Caught);
    }

    #[test]
    fn player_moves_are_ignored_after_caught() {
        let mut w = WorldState::from_rows(&["EP."]);
        enemy_tick(&mut w);
        assert_eq!(w.phase, Phase::Caught);
        assert!(move_player(&mut w, MoveDir::Right).unwrap().is_empty());
        assert_eq!(w.player, p(1, 0));
    }
}
