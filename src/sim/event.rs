/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages/animation.

use crate::domain::tile::LockId;

#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    PlayerMoved { x: i32, y: i32 },
    TilePushed { from_x: i32, to_x: i32, y: i32 },
    KeyCollected { lock: LockId, x: i32, y: i32 },
    FallStarted { x: i32, y: i32 },
    Landed { x: i32, y: i32 },
}
