/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move (one cell per press)
///   Start                 →  Confirm (new game after game over)
///   Select                →  Restart
///   Y                     →  Pause
///   B                     →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::MoveDir;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    restart: Vec<Btn>,
    pause: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start],
            restart: vec![Btn::Select],
            pause: vec![Btn::Y],
            quit: vec![Btn::B],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update()`.
    just_pressed: [bool; BTN_COUNT],
    /// D-pad presses and stick flicks since the last `update()`, in order.
    moves: Vec<MoveDir>,

    // Stick direction currently held (edge detection for flicks)
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<MoveDir>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            moves: Vec::with_capacity(4),
            stick_dir: None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// action whose list resolves to nothing keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        for (slot, names) in [
            (&mut map.confirm, &cfg.confirm),
            (&mut map.restart, &cfg.restart),
            (&mut map.pause, &cfg.pause),
            (&mut map.quit, &cfg.quit),
        ] {
            let parsed = parse_list(names);
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.moves.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.update_stick();
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_dir = None;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let dir = match btn {
            Button::DPadUp => Some(MoveDir::Up),
            Button::DPadDown => Some(MoveDir::Down),
            Button::DPadLeft => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.moves.push(dir);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.just_pressed[b as usize] = true;
        }
    }

    /// A stick flick past the deadzone counts as one move.
    #[cfg(feature = "gamepad")]
    fn update_stick(&mut self) {
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir.is_some() && dir != self.stick_dir {
            self.moves.extend(dir);
        }
        self.stick_dir = dir;
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn moves(&self) -> &[MoveDir] {
        &self.moves
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }
}

/// Dominant stick axis past the deadzone. Stick Y is up-positive.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<MoveDir> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    Some(if x.abs() >= y.abs() {
        if x < 0.0 { MoveDir::Left } else { MoveDir::Right }
    } else if y > 0.0 {
        MoveDir::Up
    } else {
        MoveDir::Down
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("north"), Some(Btn::Y));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn config_overrides_only_valid_lists() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["A".into()],
            restart: vec!["nope".into()],
            pause: vec![],
            quit: vec!["Select".into(), "B".into()],
        });
        assert_eq!(gp.action_map.confirm, vec![Btn::A]);
        assert_eq!(gp.action_map.restart, vec![Btn::Select]);
        assert_eq!(gp.action_map.pause, vec![Btn::Y]);
        assert_eq!(gp.action_map.quit, vec![Btn::Select, Btn::B]);
    }

    #[test]
    fn stick_uses_dominant_axis() {
        assert_eq!(stick_direction(0.1, 0.2), None);
        assert_eq!(stick_direction(-0.9, 0.3), Some(MoveDir::Left));
        assert_eq!(stick_direction(0.2, 0.8), Some(MoveDir::Up));
        assert_eq!(stick_direction(0.2, -0.8), Some(MoveDir::Down));
    }
}
