/// Input state tracker.
///
/// Drains pending terminal events once per frame. Directional keys
/// are edge-triggered: one key press = one queued movement intent.
/// Meta keys (pause, restart, level switching, quit) are also
/// edge-triggered.
///
/// Uses crossterm's non-blocking poll; key Repeat events count as
/// fresh presses so terminals with key auto-repeat keep the player
/// moving while a key is held.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::sim::world::MoveDir;

pub struct InputState {
    /// Press/Repeat events collected during the most recent drain.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events. Call once per frame,
    /// before the simulation tick.
    pub fn drain_events(&mut self) {
        self.presses.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
        }
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    /// Directional intents pressed this frame, in arrival order.
    pub fn movement_intents(&self) -> Vec<MoveDir> {
        self.presses
            .iter()
            .filter_map(|k| match k.code {
                KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(MoveDir::Up),
                KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(MoveDir::Down),
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(MoveDir::Left),
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(MoveDir::Right),
                _ => None,
            })
            .collect()
    }

    /// Check if any event this frame was Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
