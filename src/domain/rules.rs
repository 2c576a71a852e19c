/// Movement rules — truth-table driven.
///
/// Pure functions operating on a grid view — no side effects.
/// These encode "what is legal" without performing the action;
/// `sim::step` applies the resulting `MoveAction`.
///
/// ### Horizontal (dx = ±1), target = tile at (px+dx, py)
/// ┌───────────────────────────────┬──────────────────┐
/// │ Target                         │ Action           │
/// ├───────────────────────────────┼──────────────────┤
/// │ air-like (Empty, Flux)         │ Walk             │
/// │ Key(id)                        │ Collect(id)      │
/// │ Resting pushable, far cell     │ Push             │
/// │   air-like, cell below target  │                  │
/// │   NOT air-like (grounded)      │                  │
/// │ anything else                  │ Blocked          │
/// └───────────────────────────────┴──────────────────┘
///
/// ### Vertical (dy = ±1), target = tile at (px, py+dy)
/// ┌───────────────────────────────┬──────────────────┐
/// │ air-like                       │ Walk             │
/// │ Key(id)                        │ Collect(id)      │
/// │ anything else (pushables too)  │ Blocked          │
/// └───────────────────────────────┴──────────────────┘
///
/// Falling pushables never accept a push: their pre-tick state is
/// what counts, so a stone that started dropping this tick still
/// blocks the player.

use super::tile::{LockId, Tile};

/// Immutable view of the tile grid for rule queries.
pub struct GridView<'a> {
    pub tiles: &'a Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,
}

impl<'a> GridView<'a> {
    /// Tile at (x, y); out of bounds reads as solid wall.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Unbreakable;
        }
        self.tiles[y as usize][x as usize]
    }

    pub fn is_air_like(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_air_like()
    }
}

/// What a directional move resolves to. At most one grid mutation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveAction {
    /// Player relocates onto the target cell.
    Walk,
    /// Target tile slides to the far cell, player takes its place.
    Push,
    /// All locks of this family open, player takes the key's cell.
    Collect(LockId),
    /// Intent is silently discarded.
    Blocked,
}

/// Classify a horizontal move (dx ∈ {-1, +1}).
pub fn classify_horizontal(grid: &GridView, px: i32, py: i32, dx: i32) -> MoveAction {
    let target = grid.tile_at(px + dx, py);

    if target.is_air_like() {
        return MoveAction::Walk;
    }
    if let Tile::Key(id) = target {
        return MoveAction::Collect(id);
    }
    if target.is_pushable()
        && target.fall_state().is_some_and(|s| s.can_be_pushed())
        && grid.is_air_like(px + 2 * dx, py)
        && !grid.is_air_like(px + dx, py + 1)
    {
        return MoveAction::Push;
    }
    MoveAction::Blocked
}

/// Classify a vertical move (dy ∈ {-1, +1}). Pushing is never vertical.
pub fn classify_vertical(grid: &GridView, px: i32, py: i32, dy: i32) -> MoveAction {
    let target = grid.tile_at(px, py + dy);

    if target.is_air_like() {
        return MoveAction::Walk;
    }
    if let Tile::Key(id) = target {
        return MoveAction::Collect(id);
    }
    MoveAction::Blocked
}
