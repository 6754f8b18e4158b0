/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::clock::TickTimer;
use sim::event::GameEvent;
use sim::level;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_PAUSE, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// HUD messages count down in these steps.
const MESSAGE_STEP: Duration = Duration::from_millis(100);

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn main() {
    let config = GameConfig::load();

    let mut world = match level::new_game(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Level setup failed: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Star Chase!");
    println!(
        "Level reached: {}/{}  Stars collected: {}",
        world.level,
        config.level_count(),
        world.total_score
    );
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let frame_sleep = Duration::from_millis(config.timing.frame_sleep_ms);
    let mut enemy_timer = TickTimer::new(Duration::from_millis(config.timing.enemy_tick_ms));
    let mut message_timer = TickTimer::new(MESSAGE_STEP);
    let now = Instant::now();
    enemy_timer.start(now);
    message_timer.start(now);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        let restart = kb.any_pressed(KEYS_RESTART)
            || gp.restart_pressed()
            || (world.phase.is_terminal() && (kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed()));
        if restart {
            *world = level::new_game(config)?;
            world.set_message("New game!", 20);
            enemy_timer.start(Instant::now());
        } else if !world.phase.is_terminal() && (kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed()) {
            toggle_pause(world, &mut enemy_timer);
        }

        if !world.paused {
            for &dir in kb.moves().iter().chain(gp.moves()) {
                let events = step::move_player(world, dir)?;
                if events.iter().any(|e| matches!(e, GameEvent::LevelCleared { .. })) {
                    // Fresh level: its first tick is a full period away
                    enemy_timer.start(Instant::now());
                }
                process_sound_events(sound, &events);
            }

            if enemy_timer.poll(Instant::now()) {
                let events = step::enemy_tick(world);
                process_sound_events(sound, &events);
            }
        }

        if world.phase.is_terminal() && enemy_timer.is_running() {
            enemy_timer.stop();
        }

        if message_timer.poll(Instant::now()) {
            world.tick_message();
        }

        renderer.render(world)?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn toggle_pause(world: &mut WorldState, timer: &mut TickTimer) {
    world.paused = !world.paused;
    if world.paused {
        timer.stop();
        world.set_message("Paused", 0);
    } else {
        timer.start(Instant::now());
        world.message.clear();
        world.message_timer = 0;
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::StarCollected { .. } => sfx.play_star(),
            GameEvent::ExitOpened { .. } => sfx.play_exit_open(),
            GameEvent::LevelCleared { .. } => sfx.play_level_clear(),
            GameEvent::PlayerCaught { .. } => sfx.play_caught(),
            GameEvent::GameCompleted => sfx.play_complete(),
            GameEvent::EnemyMoved { .. } => {}
        }
    }
}
