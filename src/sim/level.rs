/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.toml` files, sorted by name)
///   2. Built-in embedded levels
///
/// ## Level format (`.toml`):
///   ```toml
///   name = "First Steps"
///   map = [
///     [2, 2, 2, 2],
///     [2, 3, 0, 2],
///     [2, 2, 2, 2],
///   ]
///   ```
///
/// `map` is a rectangular array of integer tile codes 0..=11
/// (see `Tile::from_code`). Code 3 marks the player start.
///
/// ## Validation (all fatal — no partial grid is ever produced):
///   - every code must be known
///   - every row must have the same width
///   - exactly one player cell
///   - the outermost ring must be Unbreakable (the simulation relies
///     on a solid border; out-of-grid reads are additionally treated
///     as walls)

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::tile::Tile;
use crate::sim::world::{Grid, WorldState};

/// Runtime level data, parsed from TOML or embedded.
#[derive(Deserialize, Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub map: Vec<Vec<u8>>,
}

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LevelError {
    EmptyMap,
    NotRectangular { row: usize, expected: usize, got: usize },
    UnknownTile { x: usize, y: usize, code: u8 },
    NoPlayer,
    MultiplePlayers { first: (usize, usize), second: (usize, usize) },
    MissingBorder { x: usize, y: usize },
    NoSuchLevel { index: usize, available: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::EmptyMap => write!(f, "level map is empty"),
            LevelError::NotRectangular { row, expected, got } => {
                write!(f, "row {row} has {got} cells, expected {expected}")
            }
            LevelError::UnknownTile { x, y, code } => {
                write!(f, "unknown tile code {code} at ({x}, {y})")
            }
            LevelError::NoPlayer => write!(f, "level has no player start (code 3)"),
            LevelError::MultiplePlayers { first, second } => {
                write!(
                    f,
                    "level has more than one player start: {first:?} and {second:?}"
                )
            }
            LevelError::MissingBorder { x, y } => {
                write!(f, "border cell ({x}, {y}) is not unbreakable")
            }
            LevelError::NoSuchLevel { index, available } => {
                write!(f, "level index {index} out of range ({available} available)")
            }
        }
    }
}

impl std::error::Error for LevelError {}

// ══════════════════════════════════════════════════════════════
// Decoding
// ══════════════════════════════════════════════════════════════

/// Decode an integer-coded map into a grid plus player spawn.
/// All-or-nothing: any validation failure leaves no partial state.
pub fn decode_map(map: &[Vec<u8>]) -> Result<(Grid, (i32, i32)), LevelError> {
    if map.is_empty() || map[0].is_empty() {
        return Err(LevelError::EmptyMap);
    }
    let width = map[0].len();
    let height = map.len();

    let mut tiles = vec![vec![Tile::Empty; width]; height];
    let mut player: Option<(usize, usize)> = None;

    for (y, row) in map.iter().enumerate() {
        if row.len() != width {
            return Err(LevelError::NotRectangular { row: y, expected: width, got: row.len() });
        }
        for (x, &code) in row.iter().enumerate() {
            let tile = Tile::from_code(code)
                .map_err(|e| LevelError::UnknownTile { x, y, code: e.0 })?;
            if tile.is_player() {
                if let Some(first) = player {
                    return Err(LevelError::MultiplePlayers { first, second: (x, y) });
                }
                player = Some((x, y));
                // The live grid never stores a player tile.
                tiles[y][x] = Tile::Empty;
            } else {
                tiles[y][x] = tile;
            }
        }
    }

    let (px, py) = player.ok_or(LevelError::NoPlayer)?;

    // Solid border contract
    for x in 0..width {
        for y in [0, height - 1] {
            if tiles[y][x] != Tile::Unbreakable {
                return Err(LevelError::MissingBorder { x, y });
            }
        }
    }
    for y in 0..height {
        for x in [0, width - 1] {
            if tiles[y][x] != Tile::Unbreakable {
                return Err(LevelError::MissingBorder { x, y });
            }
        }
    }

    Ok((Grid::new(tiles), (px as i32, py as i32)))
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load a level into the world state. The world is only mutated
/// after the level decodes cleanly.
pub fn load_level(
    world: &mut WorldState,
    level_idx: usize,
    config: &GameConfig,
) -> Result<(), LevelError> {
    let levels = available_levels(config);
    let def = levels
        .get(level_idx)
        .ok_or(LevelError::NoSuchLevel { index: level_idx, available: levels.len() })?;

    let (grid, (px, py)) = decode_map(&def.map)?;

    world.grid = grid;
    world.player_x = px;
    world.player_y = py;
    world.intents.clear();
    world.tick = 0;
    world.paused = false;
    world.current_level = level_idx;
    world.total_levels = levels.len();
    world.level_name = def.name.clone();
    world.set_message(&def.name, 60);
    Ok(())
}

/// All levels visible to the game: levels/ directory if it has any,
/// otherwise the embedded set.
pub fn available_levels(config: &GameConfig) -> Vec<LevelDef> {
    let from_dir = load_from_directory(&config.levels_dir);
    if !from_dir.is_empty() {
        from_dir
    } else {
        embedded_levels()
    }
}

/// Read `.toml` level files from a directory, sorted by file name.
/// Unreadable or unparseable files are skipped with a warning.
fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let mut paths: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |e| e == "toml"))
            .collect(),
        Err(_) => return vec![],
    };
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<LevelDef>(&text) {
                Ok(def) => levels.push(def),
                Err(e) => eprintln!("Warning: skipping {}: {e}", path.display()),
            },
            Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
        }
    }
    levels
}

/// Built-in levels, always available.
pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        LevelDef {
            name: "The Cave".into(),
            map: vec![
                vec![2, 2, 2, 2, 2, 2, 2, 2],
                vec![2, 3, 0, 1, 1, 2, 0, 2],
                vec![2, 4, 2, 6, 1, 2, 0, 2],
                vec![2, 8, 4, 1, 1, 2, 0, 2],
                vec![2, 4, 1, 1, 1, 9, 0, 2],
                vec![2, 2, 2, 2, 2, 2, 2, 2],
            ],
        },
        LevelDef {
            name: "Two Doors".into(),
            map: vec![
                vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
                vec![2, 3, 1, 1, 10, 0, 0, 8, 2],
                vec![2, 1, 2, 2, 2, 2, 11, 2, 2],
                vec![2, 1, 6, 0, 0, 0, 0, 9, 2],
                vec![2, 1, 1, 4, 1, 1, 0, 0, 2],
                vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
            ],
        },
        LevelDef {
            name: "Rockfall".into(),
            map: vec![
                vec![2, 2, 2, 2, 2, 2, 2],
                vec![2, 0, 4, 0, 4, 0, 2],
                vec![2, 0, 0, 0, 0, 0, 2],
                vec![2, 3, 1, 6, 1, 0, 2],
                vec![2, 1, 1, 1, 1, 1, 2],
                vec![2, 2, 2, 2, 2, 2, 2],
            ],
        },
    ]
}
