/// WorldState: the complete state of a running game.
///
/// The grid mirrors every entity as a cell kind; `player` and `enemies`
/// are the tracked coordinates used for movement math. The two are kept in
/// sync by the turn engine (`sim::step`) and level setup (`sim::level`).
///
/// Stars live in two places: as `CellKind::Star` while nothing stands on
/// them, and in `stars` until collected. An enemy standing on a star hides
/// the cell kind but not the entry in `stars`, so the star reappears when
/// the enemy moves on.

use rand_chacha::ChaCha8Rng;

use crate::config::LevelDef;
use crate::domain::ai::PathRules;
use crate::domain::cell::CellKind;
use crate::domain::entity::Pos;
use crate::domain::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// An enemy reached the player. Terminal.
    Caught,
    /// The final level was cleared. Terminal.
    Completed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Playing)
    }
}

pub struct WorldState {
    pub grid: Grid,
    pub player: Pos,
    pub enemies: Vec<Pos>,
    /// Uncollected stars of the current level.
    pub stars: Vec<Pos>,
    pub exit: Option<Pos>,

    // ── Level ──
    pub level: usize,
    pub levels: Vec<LevelDef>,
    pub star_total: usize,

    // ── Counters ──
    /// Stars collected on the current level.
    pub score: usize,
    /// Stars collected over the whole game.
    pub total_score: usize,
    /// Enemy ticks elapsed on the current level.
    pub time: u64,

    pub phase: Phase,
    pub rules: PathRules,
    pub rng: ChaCha8Rng,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub paused: bool,
}

impl WorldState {
    pub fn new(levels: Vec<LevelDef>, rules: PathRules, rng: ChaCha8Rng) -> Self {
        WorldState {
            grid: Grid::new(0, 0),
            player: Pos::default(),
            enemies: vec![],
            stars: vec![],
            exit: None,
            level: 0,
            levels,
            star_total: 0,
            score: 0,
            total_score: 0,
            time: 0,
            phase: Phase::Playing,
            rules,
            rng,
            message: String::new(),
            message_timer: 0,
            paused: false,
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the message timer; a duration of 0 means "until replaced".
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    /// What `pos` shows once the enemy standing there leaves.
    pub fn uncovered_kind(&self, pos: Pos) -> CellKind {
        if self.enemies.contains(&pos) {
            CellKind::Enemy
        } else if self.exit == Some(pos) {
            CellKind::Exit
        } else if self.stars.contains(&pos) {
            CellKind::Star
        } else {
            CellKind::Empty
        }
    }

    /// Build a world from an ASCII diagram (see `CellKind::from_glyph`).
    /// Enemies are numbered in row-major order. The star total is the
    /// number of stars on the board.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        use rand::SeedableRng;

        let grid = Grid::from_rows(rows);
        let mut world = WorldState::new(
            vec![LevelDef { width: grid.width(), height: grid.height(), walls: 0, stars: 0, enemies: 0 }],
            PathRules::default(),
            ChaCha8Rng::seed_from_u64(1),
        );
        world.player = grid.positions_of(CellKind::Player).first().copied().unwrap_or_default();
        world.enemies = grid.positions_of(CellKind::Enemy);
        world.stars = grid.positions_of(CellKind::Star);
        world.exit = grid.positions_of(CellKind::Exit).first().copied();
        world.star_total = world.stars.len();
        world.level = 1;
        world.grid = grid;
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(!Phase::Playing.is_terminal());
        assert!(Phase::Caught.is_terminal());
        assert!(Phase::Completed.is_terminal());
    }

    #[test]
    fn uncovered_kind_prefers_remaining_enemy() {
        let mut w = WorldState::from_rows(&["P*E"]);
        let star = Pos::new(1, 0);
        assert_eq!(w.uncovered_kind(star), CellKind::Star);
        w.enemies.push(star);
        assert_eq!(w.uncovered_kind(star), CellKind::Enemy);
        w.enemies.pop();
        w.stars.clear();
        assert_eq!(w.uncovered_kind(star), CellKind::Empty);
        w.exit = Some(star);
        assert_eq!(w.uncovered_kind(star), CellKind::Exit);
    }

    #[test]
    fn message_expires() {
        let mut w = WorldState::from_rows(&["P"]);
        w.set_message("hi", 2);
        w.tick_message();
        assert_eq!(w.message, "hi");
        w.tick_message();
        assert!(w.message.is_empty());

        w.set_message("sticky", 0);
        w.tick_message();
        assert_eq!(w.message, "sticky");
    }
}
