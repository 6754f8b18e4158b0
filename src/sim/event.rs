/// Events emitted by the turn engine.
/// The game loop turns these into sound effects.

use crate::domain::entity::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    StarCollected { at: Pos },
    ExitOpened { at: Pos },
    EnemyMoved { id: usize, from: Pos, to: Pos },
    LevelCleared { next_level: usize },
    PlayerCaught { by: usize },
    GameCompleted,
}
