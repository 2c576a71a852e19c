/// WorldState: the complete snapshot of a running game.
///
/// ## Player representation
///
/// The player exists ONLY as the scalar `(player_x, player_y)` pair.
/// The grid cell under the player always holds `Tile::Empty`; the
/// renderer overlays the player sprite at the scalar position. This
/// removes the classic desync hazard of keeping a player tile in the
/// grid alongside a coordinate pair.
///
/// ## Intent queue
///
/// Directional intents are buffered between ticks and fully drained
/// at the start of each `step()`. Drain order is FIFO by default;
/// `InputOrder::Lifo` replicates the legacy stack behavior for anyone
/// who wants it (see config.toml `input_order`).

use std::collections::VecDeque;

use crate::domain::rules::GridView;
use crate::domain::tile::Tile;

/// Directional intent produced by the host input layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    /// Unit delta (dx, dy) for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

/// How queued intents are consumed within one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputOrder {
    #[default]
    Fifo,
    /// Legacy behavior: most recently queued intent first.
    Lifo,
}

/// Rectangular tile grid, the sole source of spatial truth.
/// Dimensions are fixed at load time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = if height > 0 { tiles[0].len() } else { 0 };
        Grid { tiles, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at (x, y); out of bounds reads as solid wall.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Unbreakable;
        }
        self.tiles[y as usize][x as usize]
    }

    /// Set a tile; out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.tiles[y as usize][x as usize] = tile;
        }
    }

    /// Keep tiles satisfying `pred`; replace the rest with Empty.
    /// Used for grid-wide lock removal on key pickup.
    pub fn retain_tiles<F>(&mut self, mut pred: F)
    where
        F: FnMut(Tile) -> bool,
    {
        for row in self.tiles.iter_mut() {
            for cell in row.iter_mut() {
                if !pred(*cell) {
                    *cell = Tile::Empty;
                }
            }
        }
    }

    /// Borrow an immutable rule-query view.
    pub fn view(&self) -> GridView<'_> {
        GridView { tiles: &self.tiles, width: self.width, height: self.height }
    }
}

pub struct WorldState {
    // ── Spatial state ──
    pub grid: Grid,
    pub player_x: i32,
    pub player_y: i32,

    // ── Input ──
    pub intents: VecDeque<MoveDir>,
    pub input_order: InputOrder,

    // ── Meta ──
    pub tick: u64,
    pub paused: bool,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            grid: Grid::new(vec![]),
            player_x: 0,
            player_y: 0,
            intents: VecDeque::new(),
            input_order: InputOrder::Fifo,
            tick: 0,
            paused: false,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Queue a directional intent for the next tick.
    pub fn push_intent(&mut self, dir: MoveDir) {
        self.intents.push_back(dir);
    }

    /// Take the next intent according to the configured drain order.
    pub fn pop_intent(&mut self) -> Option<MoveDir> {
        match self.input_order {
            InputOrder::Fifo => self.intents.pop_front(),
            InputOrder::Lifo => self.intents.pop_back(),
        }
    }

    /// The single relocation primitive: the destination cell is
    /// consumed (set to Empty) and the scalar position follows.
    /// Every player movement goes through here.
    pub fn move_player_to(&mut self, x: i32, y: i32) {
        self.grid.set(x, y, Tile::Empty);
        self.player_x = x;
        self.player_y = y;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
