/// Keyboard input collector.
///
/// Player moves are discrete: every Press or Repeat event of a movement
/// key is one move intent, in arrival order. Meta keys (restart, pause,
/// quit) are edge-triggered on Press only. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::MoveDir;

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Move intents collected during the most recent `drain_events()`.
    moves: Vec<MoveDir>,
    /// Keys freshly pressed (not repeats) this frame.
    fresh_presses: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            moves: Vec::with_capacity(4),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the simulation.
    pub fn drain_events(&mut self) {
        self.moves.clear();
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        if let Some(dir) = move_for(key.code) {
            self.moves.push(dir);
        }
        if key.kind == KeyEventKind::Press {
            self.fresh_presses.push(key.code);
        }
    }

    /// Move intents of this frame, oldest first.
    pub fn moves(&self) -> &[MoveDir] {
        &self.moves
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

fn move_for(code: KeyCode) -> Option<MoveDir> {
    if KEYS_UP.contains(&code) {
        Some(MoveDir::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(MoveDir::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(MoveDir::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(MoveDir::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    #[test]
    fn arrows_and_wasd_map_to_moves() {
        let mut input = InputState::new();
        input.handle_key(key(KeyCode::Up, KeyEventKind::Press));
        input.handle_key(key(KeyCode::Char('d'), KeyEventKind::Press));
        input.handle_key(key(KeyCode::Char('d'), KeyEventKind::Repeat));
        input.handle_key(key(KeyCode::Char('d'), KeyEventKind::Release));
        assert_eq!(input.moves(), [MoveDir::Up, MoveDir::Right, MoveDir::Right]);
    }

    #[test]
    fn meta_keys_fire_on_press_only() {
        let mut input = InputState::new();
        input.handle_key(key(KeyCode::Char('r'), KeyEventKind::Repeat));
        assert!(!input.any_pressed(KEYS_RESTART));
        input.handle_key(key(KeyCode::Char('R'), KeyEventKind::Press));
        assert!(input.any_pressed(KEYS_RESTART));
        assert!(!input.any_pressed(KEYS_QUIT));
        assert!(input.moves().is_empty());
    }

    #[test]
    fn ctrl_c_is_not_a_move_or_key() {
        let mut input = InputState::new();
        input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
        assert!(!input.any_pressed(&[KeyCode::Char('c')]));
    }
}
