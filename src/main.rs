/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_level;
use sim::step;
use sim::world::WorldState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new();
    world.input_order = config.input_order;

    if let Err(e) = load_level(&mut world, 0, &config) {
        eprintln!("Failed to load level: {e}");
        std::process::exit(1);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Fluxcave!");
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Esc]) {
            break;
        }
        handle_meta(world, &kb, config);

        // Intents accumulate between ticks; the simulation drains
        // them only at the start of its own step.
        if !world.paused {
            for dir in kb.movement_intents() {
                world.push_intent(dir);
            }
        }

        // Self-correcting cadence: if the previous tick overran the
        // interval, the next fires immediately. No tick is skipped.
        if last_tick.elapsed() >= tick_rate {
            if world.paused {
                if world.message_timer > 0 {
                    world.message_timer -= 1;
                    if world.message_timer == 0 {
                        world.message.clear();
                    }
                }
            } else {
                let events = step::step(world);
                process_events(world, &events);
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::KeyCollected { .. } = event {
            world.set_message("Key collected — locks open", 45);
        }
    }
}

/// Shell-level keys: pause, restart, level switching.
fn handle_meta(world: &mut WorldState, kb: &InputState, config: &GameConfig) {
    if kb.any_pressed(&[KeyCode::Char('p'), KeyCode::F(1)]) {
        world.paused = !world.paused;
        if world.paused {
            world.set_message("PAUSED  [p] resume", 0);
        } else {
            world.message.clear();
            world.message_timer = 0;
        }
        return;
    }
    if world.paused {
        return;
    }

    if kb.any_pressed(&[KeyCode::Char('r')]) {
        reload(world, world.current_level, config, "Level restarted");
    } else if kb.any_pressed(&[KeyCode::Char('n'), KeyCode::Tab]) {
        let next = (world.current_level + 1) % world.total_levels.max(1);
        reload(world, next, config, "");
    } else if kb.any_pressed(&[KeyCode::Char('b'), KeyCode::BackTab]) {
        let total = world.total_levels.max(1);
        let prev = (world.current_level + total - 1) % total;
        reload(world, prev, config, "");
    }
}

fn reload(world: &mut WorldState, idx: usize, config: &GameConfig, msg: &str) {
    match load_level(world, idx, config) {
        Ok(()) => {
            if !msg.is_empty() {
                world.set_message(msg, 30);
            }
        }
        Err(e) => world.set_message(&format!("Load failed: {e}"), 60),
    }
}
