/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub levels: Vec<LevelDef>,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub enemy_tick_ms: u64,
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub enemies_blocked_by_exit: bool,
    pub seed: Option<u64>,
}

/// One level of the level table. Level N (1-based) is `levels[N - 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct LevelDef {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub walls: usize,
    #[serde(default)]
    pub stars: usize,
    #[serde(default)]
    pub enemies: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub restart: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default = "default_levels")]
    levels: Vec<LevelDef>,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_enemy_tick")]
    enemy_tick_ms: u64,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_exit_blocks")]
    enemies_blocked_by_exit: bool,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_enemy_tick() -> u64 { 1000 }
fn default_frame_sleep() -> u64 { 10 }
fn default_exit_blocks() -> bool { true }

/// Three 20x15 levels: level N has N enemies and N + 2 stars.
fn default_levels() -> Vec<LevelDef> {
    (1..=3)
        .map(|n| LevelDef { width: 20, height: 15, walls: 50, stars: n + 2, enemies: n })
        .collect()
}

fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }
fn default_quit() -> Vec<String> { vec!["B".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            enemy_tick_ms: default_enemy_tick(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            enemies_blocked_by_exit: default_exit_blocks(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            restart: default_restart(),
            pause: default_pause(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig { levels: default_levels(), ..TomlConfig::default() })
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/starchase.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        Self::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse a config document; malformed input is an error, missing keys are not.
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Self::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let mut levels: Vec<LevelDef> = cfg
            .levels
            .into_iter()
            .enumerate()
            .filter(|(i, l)| {
                let ok = l.width > 0 && l.height > 0;
                if !ok {
                    eprintln!("Warning: level {} has a zero-sized grid, skipping it.", i + 1);
                }
                ok
            })
            .map(|(_, l)| l)
            .collect();
        if levels.is_empty() {
            eprintln!("Warning: no usable levels configured, using built-in levels.");
            levels = default_levels();
        }

        GameConfig {
            timing: TimingConfig {
                enemy_tick_ms: cfg.timing.enemy_tick_ms.max(1),
                frame_sleep_ms: cfg.timing.frame_sleep_ms,
            },
            rules: RulesConfig {
                enemies_blocked_by_exit: cfg.rules.enemies_blocked_by_exit,
                seed: cfg.rules.seed,
            },
            levels,
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                restart: cfg.gamepad.restart,
                pause: cfg.gamepad.pause,
                quit: cfg.gamepad.quit,
            },
        }
    }

    /// Definition of the 1-based level `n`, if it exists.
    #[cfg(test)]
    pub fn level(&self, n: usize) -> Option<&LevelDef> {
        n.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/starchase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: config.toml parse error: {e}");
                    eprintln!("Using default settings.");
                    break;
                }
            },
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig { levels: default_levels(), ..TomlConfig::default() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.timing.enemy_tick_ms, 1000);
        assert!(cfg.rules.enemies_blocked_by_exit);
        assert_eq!(cfg.rules.seed, None);
        assert_eq!(cfg.level_count(), 3);
        assert_eq!(cfg.level(2).map(|l| (l.stars, l.enemies)), Some((4, 2)));
        assert_eq!(cfg.gamepad.restart, vec!["Select".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            r#"
            [timing]
            enemy_tick_ms = 250

            [rules]
            enemies_blocked_by_exit = false
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(cfg.timing.enemy_tick_ms, 250);
        assert_eq!(cfg.timing.frame_sleep_ms, 10);
        assert!(!cfg.rules.enemies_blocked_by_exit);
        assert_eq!(cfg.rules.seed, Some(9));
    }

    #[test]
    fn level_table_replaces_defaults() {
        let cfg = GameConfig::parse(
            r#"
            [[levels]]
            width = 4
            height = 4
            enemies = 1

            [[levels]]
            width = 0
            height = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.level_count(), 1);
        assert_eq!(
            cfg.level(1),
            Some(&LevelDef { width: 4, height: 4, walls: 0, stars: 0, enemies: 1 })
        );
        assert_eq!(cfg.level(0), None);
        assert_eq!(cfg.level(2), None);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[timing]\nenemy_tick_ms = \"fast\"").is_err());
    }

    #[test]
    fn zero_tick_is_clamped() {
        let cfg = GameConfig::parse("[timing]\nenemy_tick_ms = 0").unwrap();
        assert_eq!(cfg.timing.enemy_tick_ms, 1);
    }
}
