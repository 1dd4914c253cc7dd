//! Simulation module
//!
//! All gameplay logic lives here. It is single-threaded and strictly
//! turn-based:
//! - One [`tick`] per frame, phases in a fixed order
//! - Real time only enters through the clocks, sampled once per entity per frame
//! - Obstacles only change between frames
//! - No rendering or platform dependencies

pub mod area;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod geometry;
pub mod path;
pub mod state;
pub mod tick;

pub use area::{Area, AreaId, AreaRegistry, Exits, Obstacle, ObstacleKind};
pub use clock::{ClockRegistry, Elapser, Purpose};
pub use collision::{move_with_collisions, resolve_collision};
pub use combat::{CombatRules, Harmless, HitOutcome, StrikeSource};
pub use geometry::{Aabb, Direction, OVERLAP_EPSILON, overlap_extent};
pub use path::{NextMove, Path, PathStep, Pursuit, project_along_line};
pub use state::{
    Effect, EffectKind, EntityId, GameEvent, GameState, Hostile, HostileKind, Player,
};
pub use tick::{FrameReport, TickInput, tick};
