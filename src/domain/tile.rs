/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use std::fmt;

/// Which lock family a key opens / a lock belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LockId {
    One,
    Two,
}

/// Gravity sub-state of a pushable tile (Stone, Crate).
///
/// A `Falling` tile is in transit and cannot be pushed; only a
/// `Resting` tile accepts a push. The physics sweep flips the state
/// based on what is directly below the tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FallState {
    Resting,
    Falling,
}

impl FallState {
    /// Only resting tiles accept a push.
    pub fn can_be_pushed(self) -> bool {
        matches!(self, FallState::Resting)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,              // "air"
    Flux,               // walkable soil, consumed when stepped on
    Unbreakable,        // wall
    Player,             // only valid in level data; the live grid stores Empty
    Stone(FallState),   // pushable, falls
    Crate(FallState),   // pushable, falls
    Key(LockId),
    Lock(LockId),
}

impl Tile {
    /// Can the player (or a falling tile) freely move onto this cell?
    pub fn is_air_like(self) -> bool {
        matches!(self, Tile::Empty | Tile::Flux)
    }

    /// Can this tile be displaced by a push (subject to its fall state)?
    pub fn is_pushable(self) -> bool {
        matches!(self, Tile::Stone(_) | Tile::Crate(_))
    }

    /// Is this a key pickup?
    #[allow(dead_code)]
    pub fn is_key(self) -> bool {
        matches!(self, Tile::Key(_))
    }

    /// Is this a lock?
    pub fn is_lock(self) -> bool {
        matches!(self, Tile::Lock(_))
    }

    #[allow(dead_code)]
    pub fn is_unbreakable(self) -> bool {
        matches!(self, Tile::Unbreakable)
    }

    pub fn is_player(self) -> bool {
        matches!(self, Tile::Player)
    }

    /// Lock family for keys and locks; None for everything else.
    pub fn lock_id(self) -> Option<LockId> {
        match self {
            Tile::Key(id) | Tile::Lock(id) => Some(id),
            _ => None,
        }
    }

    /// Fall state for pushable tiles; None for everything else.
    pub fn fall_state(self) -> Option<FallState> {
        match self {
            Tile::Stone(s) | Tile::Crate(s) => Some(s),
            _ => None,
        }
    }

    /// Same tile with its fall state replaced. Non-pushables pass through.
    pub fn with_fall_state(self, state: FallState) -> Tile {
        match self {
            Tile::Stone(_) => Tile::Stone(state),
            Tile::Crate(_) => Tile::Crate(state),
            other => other,
        }
    }

    /// Fill color for the renderer. None = draws nothing
    /// (Empty shows the background, Player is overlaid separately).
    pub fn color(self) -> Option<(u8, u8, u8)> {
        match self {
            Tile::Empty | Tile::Player => None,
            Tile::Flux => Some((0xcc, 0xff, 0xcc)),
            Tile::Unbreakable => Some((0x99, 0x99, 0x99)),
            Tile::Stone(_) => Some((0x00, 0x00, 0xcc)),
            Tile::Crate(_) => Some((0x8b, 0x45, 0x13)),
            Tile::Key(LockId::One) | Tile::Lock(LockId::One) => Some((0xff, 0xcc, 0x00)),
            Tile::Key(LockId::Two) | Tile::Lock(LockId::Two) => Some((0x00, 0xcc, 0xff)),
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

// ── Integer decode (level format) ──

/// Raised when level data contains a tile code outside 0..=11.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UnknownTileCode(pub u8);

impl fmt::Display for UnknownTileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tile code: {}", self.0)
    }
}

impl std::error::Error for UnknownTileCode {}

impl Tile {
    /// Decode one integer tile code from level data.
    ///
    /// Codes 4..=7 carry the initial fall state so levels can start
    /// with objects already in flight.
    pub fn from_code(code: u8) -> Result<Tile, UnknownTileCode> {
        match code {
            0 => Ok(Tile::Empty),
            1 => Ok(Tile::Flux),
            2 => Ok(Tile::Unbreakable),
            3 => Ok(Tile::Player),
            4 => Ok(Tile::Stone(FallState::Resting)),
            5 => Ok(Tile::Stone(FallState::Falling)),
            6 => Ok(Tile::Crate(FallState::Resting)),
            7 => Ok(Tile::Crate(FallState::Falling)),
            8 => Ok(Tile::Key(LockId::One)),
            9 => Ok(Tile::Lock(LockId::One)),
            10 => Ok(Tile::Key(LockId::Two)),
            11 => Ok(Tile::Lock(LockId::Two)),
            other => Err(UnknownTileCode(other)),
        }
    }
}
