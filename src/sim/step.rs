/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Drain queued intents → movement resolution, one at a time
///   2. Gravity sweep, bottom row to top row
///
/// The sweep direction matters: a tile that drops into row y+1 lands
/// in a row the sweep has already visited, so it is not re-evaluated
/// until the next tick. Descent is therefore capped at one row per
/// tick — no tunneling, no double-falls.

use crate::domain::rules::{self, MoveAction};
use crate::domain::tile::{FallState, Tile};
use super::event::GameEvent;
use super::world::{MoveDir, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    while let Some(dir) = world.pop_intent() {
        resolve_move(world, dir, &mut events);
    }
    resolve_gravity(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Movement resolution
// ══════════════════════════════════════════════════════════════

/// Resolve one directional intent. Produces zero or one grid
/// mutation plus a player-position update; blocked intents are
/// silently discarded.
pub fn resolve_move(world: &mut WorldState, dir: MoveDir, events: &mut Vec<GameEvent>) {
    let (dx, dy) = dir.delta();
    let px = world.player_x;
    let py = world.player_y;

    let action = if dy == 0 {
        rules::classify_horizontal(&world.grid.view(), px, py, dx)
    } else {
        rules::classify_vertical(&world.grid.view(), px, py, dy)
    };

    match action {
        MoveAction::Walk => {
            world.move_player_to(px + dx, py + dy);
            events.push(GameEvent::PlayerMoved { x: world.player_x, y: world.player_y });
        }
        MoveAction::Push => {
            // Horizontal only: rules never yield Push for dy != 0.
            let pushed = world.grid.get(px + dx, py);
            world.grid.set(px + 2 * dx, py, pushed);
            world.move_player_to(px + dx, py);
            events.push(GameEvent::TilePushed { from_x: px + dx, to_x: px + 2 * dx, y: py });
            events.push(GameEvent::PlayerMoved { x: world.player_x, y: world.player_y });
        }
        MoveAction::Collect(lock) => {
            world.grid.retain_tiles(|t| !(t.is_lock() && t.lock_id() == Some(lock)));
            world.move_player_to(px + dx, py + dy);
            events.push(GameEvent::KeyCollected { lock, x: world.player_x, y: world.player_y });
            events.push(GameEvent::PlayerMoved { x: world.player_x, y: world.player_y });
        }
        MoveAction::Blocked => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// One full grid sweep, bottom-up, left to right within a row.
///
/// The player's cell reads as Empty in the grid but is not open
/// space for gravity: a stone comes to rest on the player's head
/// instead of dropping into their cell.
fn resolve_gravity(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let height = world.grid.height() as i32;
    let width = world.grid.width() as i32;

    for y in (0..height).rev() {
        for x in 0..width {
            let tile = world.grid.get(x, y);
            let Some(state) = tile.fall_state() else { continue };

            let below_open = world.grid.get(x, y + 1).is_air_like()
                && !(x == world.player_x && y + 1 == world.player_y);
            if below_open {
                // Relocate one row down; re-evaluated next tick.
                world.grid.set(x, y + 1, tile.with_fall_state(FallState::Falling));
                world.grid.set(x, y, Tile::Empty);
                if state == FallState::Resting {
                    events.push(GameEvent::FallStarted { x, y });
                }
            } else if state == FallState::Falling {
                world.grid.set(x, y, tile.with_fall_state(FallState::Resting));
                events.push(GameEvent::Landed { x, y });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::LockId;
    use crate::sim::world::{Grid, InputOrder};

    /// Build a world from a character sketch. '@' marks the player
    /// (stored as Empty in the grid, scalar position set).
    fn world_from(rows: &[&str]) -> WorldState {
        let mut w = WorldState::new();
        let mut player = None;
        let tiles = rows
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .map(|(x, ch)| match ch {
                        '=' => Tile::Unbreakable,
                        '~' => Tile::Flux,
                        'S' => Tile::Stone(FallState::Resting),
                        's' => Tile::Stone(FallState::Falling),
                        'C' => Tile::Crate(FallState::Resting),
                        'c' => Tile::Crate(FallState::Falling),
                        'k' => Tile::Key(LockId::One),
                        'K' => Tile::Key(LockId::Two),
                        'l' => Tile::Lock(LockId::One),
                        'L' => Tile::Lock(LockId::Two),
                        '@' => {
                            player = Some((x as i32, y as i32));
                            Tile::Empty
                        }
                        _ => Tile::Empty,
                    })
                    .collect()
            })
            .collect();
        w.grid = Grid::new(tiles);
        let (px, py) = player.expect("sketch needs a '@' player");
        w.player_x = px;
        w.player_y = py;
        w
    }

    // ── Gravity ──

    #[test]
    fn resting_stone_starts_falling_and_drops_one_row() {
        let mut w = world_from(&[
            "=S=",
            "= =",
            "=@=",
            "===",
        ]);
        step(&mut w);
        assert_eq!(w.grid.get(1, 0), Tile::Empty);
        assert_eq!(w.grid.get(1, 1), Tile::Stone(FallState::Falling));
    }

    #[test]
    fn falling_is_capped_at_one_row_per_tick() {
        let mut w = world_from(&[
            "=S=@",
            "=  =",
            "=  =",
            "====",
        ]);
        step(&mut w);
        assert_eq!(w.grid.get(1, 1), Tile::Stone(FallState::Falling));
        assert_eq!(w.grid.get(1, 2), Tile::Empty);
        step(&mut w);
        assert_eq!(w.grid.get(1, 2), Tile::Stone(FallState::Falling));
        step(&mut w);
        // Bottom reached: settles in place.
        assert_eq!(w.grid.get(1, 2), Tile::Stone(FallState::Resting));
    }

    #[test]
    fn stone_rests_on_the_players_head() {
        let mut w = world_from(&[
            "=S=",
            "=@=",
            "===",
        ]);
        step(&mut w);
        // The player's cell is Empty in the grid but is not open
        // space: the stone must not drop into it.
        assert_eq!(w.grid.get(1, 0), Tile::Stone(FallState::Resting));
        assert_eq!(w.grid.get(1, 1), Tile::Empty);
    }

    #[test]
    fn falling_crate_lands_as_resting() {
        let mut w = world_from(&[
            "=c=@",
            "====",
        ]);
        step(&mut w);
        assert_eq!(w.grid.get(1, 0), Tile::Crate(FallState::Resting));
    }

    #[test]
    fn stacked_stones_each_fall_one_row() {
        let mut w = world_from(&[
            "=S=@",
            "=S =",
            "=  =",
            "====",
        ]);
        step(&mut w);
        // Lower stone moved into row 2; upper stone followed into row 1.
        assert_eq!(w.grid.get(1, 0), Tile::Empty);
        assert_eq!(w.grid.get(1, 1), Tile::Stone(FallState::Falling));
        assert_eq!(w.grid.get(1, 2), Tile::Stone(FallState::Falling));
    }

    #[test]
    fn stone_falls_through_flux() {
        let mut w = world_from(&[
            "=S=@",
            "=~==",
            "====",
        ]);
        step(&mut w);
        // Air-like below includes Flux: the stone drops onto it.
        assert_eq!(w.grid.get(1, 1), Tile::Stone(FallState::Falling));
        assert_eq!(w.grid.get(1, 0), Tile::Empty);
    }

    #[test]
    fn quiescent_grid_is_unchanged_by_tick() {
        let mut w = world_from(&[
            "====",
            "=@S=",
            "====",
        ]);
        let before = w.grid.clone();
        step(&mut w);
        assert_eq!(w.grid, before);
        assert_eq!((w.player_x, w.player_y), (1, 1));
    }

    // ── Walking ──

    #[test]
    fn walk_onto_air_and_flux() {
        let mut w = world_from(&[
            "====",
            "=@~=",
            "====",
        ]);
        w.push_intent(MoveDir::Right);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (2, 1));
        // Flux is consumed by walking over it.
        assert_eq!(w.grid.get(2, 1), Tile::Empty);
    }

    #[test]
    fn blocked_intent_is_discarded() {
        let mut w = world_from(&[
            "===",
            "=@=",
            "===",
        ]);
        w.push_intent(MoveDir::Right);
        w.push_intent(MoveDir::Up);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (1, 1));
        assert!(w.intents.is_empty());
    }

    // ── Pushing ──

    #[test]
    fn push_into_open_cell() {
        let mut w = world_from(&[
            "=====",
            "=@S =",
            "=====",
        ]);
        w.push_intent(MoveDir::Right);
        let events = step(&mut w);
        assert_eq!((w.player_x, w.player_y), (2, 1));
        assert_eq!(w.grid.get(3, 1), Tile::Stone(FallState::Resting));
        assert_eq!(w.grid.get(2, 1), Tile::Empty);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::TilePushed { from_x: 2, to_x: 3, y: 1 })));
    }

    #[test]
    fn pushed_stone_falls_on_following_ticks() {
        let mut w = world_from(&[
            "=====",
            "=@S =",
            "=== =",
            "=====",
        ]);
        w.push_intent(MoveDir::Right);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (2, 1));
        // Stone landed over the pit; gravity (same tick, after the
        // push) starts it falling.
        assert_eq!(w.grid.get(3, 2), Tile::Stone(FallState::Falling));
        step(&mut w);
        assert_eq!(w.grid.get(3, 2), Tile::Stone(FallState::Resting));
    }

    #[test]
    fn push_blocked_by_ungrounded_stone() {
        let mut w = world_from(&[
            "=====",
            "=@S =",
            "== ==",
            "=====",
        ]);
        let before = w.grid.clone();
        w.push_intent(MoveDir::Right);
        step(&mut w);
        // Stone hangs over a pit, so the push is refused...
        // but gravity still takes the stone down this tick.
        assert_eq!((w.player_x, w.player_y), (1, 1));
        assert_ne!(w.grid, before);
        assert_eq!(w.grid.get(2, 2), Tile::Stone(FallState::Falling));
    }

    #[test]
    fn falling_stone_cannot_be_pushed_mid_flight() {
        let mut w = world_from(&[
            "=====",
            "=@s =",
            "== ==",
            "=====",
        ]);
        w.push_intent(MoveDir::Right);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (1, 1));
    }

    // ── Keys and locks ──

    #[test]
    fn collecting_key_opens_all_matching_locks() {
        let mut w = world_from(&[
            "=====",
            "=@k l",
            "=l L=",
            "=====",
        ]);
        let events = step_with(&mut w, MoveDir::Right);
        assert_eq!((w.player_x, w.player_y), (2, 1));
        // Both lock-1 tiles removed grid-wide, lock-2 untouched.
        assert_eq!(w.grid.get(4, 1), Tile::Empty);
        assert_eq!(w.grid.get(1, 2), Tile::Empty);
        assert_eq!(w.grid.get(3, 2), Tile::Lock(LockId::Two));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::KeyCollected { lock: LockId::One, .. })));
    }

    #[test]
    fn vertical_key_pickup_is_symmetric() {
        let mut w = world_from(&[
            "===",
            "=@=",
            "=K=",
            "=L=",
            "===",
        ]);
        step_with(&mut w, MoveDir::Down);
        assert_eq!((w.player_x, w.player_y), (1, 2));
        assert_eq!(w.grid.get(1, 3), Tile::Empty);
    }

    #[test]
    fn key_pickup_leaves_other_keys_alone() {
        let mut w = world_from(&[
            "=====",
            "=@kK=",
            "=====",
        ]);
        step_with(&mut w, MoveDir::Right);
        assert_eq!(w.grid.get(3, 1), Tile::Key(LockId::Two));
    }

    // ── Intent ordering ──

    #[test]
    fn fifo_applies_intents_in_queue_order() {
        let mut w = world_from(&[
            "=====",
            "=@  =",
            "=====",
        ]);
        w.push_intent(MoveDir::Right);
        w.push_intent(MoveDir::Right);
        w.push_intent(MoveDir::Left);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (2, 1));
    }

    #[test]
    fn lifo_replays_legacy_stack_order() {
        let mut w = world_from(&[
            "====",
            "= @=",
            "=~==",
            "====",
        ]);
        w.input_order = InputOrder::Lifo;
        // Queued Left then Down; legacy order handles Down first,
        // which is blocked here, then Left succeeds.
        w.push_intent(MoveDir::Left);
        w.push_intent(MoveDir::Down);
        step(&mut w);
        assert_eq!((w.player_x, w.player_y), (1, 1));
    }

    // ── End-to-end scenario ──

    #[test]
    fn push_over_pit_two_tick_settle() {
        // Integer-coded layout [[2,2,2,2],[2,3,4,2],[2,0,0,2],[2,2,2,2]]:
        // the stone at (2,1) hangs over air, so a Right push is refused
        // by the grounding rule and gravity takes the stone instead.
        let codes: Vec<Vec<u8>> = vec![
            vec![2, 2, 2, 2],
            vec![2, 3, 4, 2],
            vec![2, 0, 0, 2],
            vec![2, 2, 2, 2],
        ];
        let (grid, (px, py)) = crate::sim::level::decode_map(&codes).unwrap();
        let mut w = WorldState::new();
        w.grid = grid;
        w.player_x = px;
        w.player_y = py;

        w.push_intent(MoveDir::Right);
        step(&mut w);
        // Push refused (stone not grounded); stone falls into (2,2).
        assert_eq!((w.player_x, w.player_y), (1, 1));
        assert_eq!(w.grid.get(2, 2), Tile::Stone(FallState::Falling));

        step(&mut w);
        assert_eq!(w.grid.get(2, 2), Tile::Stone(FallState::Resting));
    }

    fn step_with(w: &mut WorldState, dir: MoveDir) -> Vec<GameEvent> {
        w.push_intent(dir);
        step(w)
    }
}
