//! Rift Walk - simulation core of a screen-based 2D action game
//!
//! Core modules:
//! - `sim`: Frame-by-frame simulation (clocks, boxes, routes, collisions, frame order)
//! - `settings`: Data-driven tuning
//! - `error`: Faults a frame can surface
//!
//! Rendering, input devices, level files and damage rules live outside this crate.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;

/// Default tuning values
pub mod consts {
    /// Player speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 180.0;
    /// Hostile speed when a spawn does not set one (pixels/s)
    pub const HOSTILE_SPEED: f32 = 90.0;
    /// Collision sub-steps per frame before steps start growing past the mover's size
    pub const MAX_COLLISION_SUBSTEPS: u32 = 32;

    /// Melee reach, relative to the player's box
    pub const REACH_RATIO: f32 = 1.8;
    pub const ATTACK_COOLDOWN_MS: u64 = 350;
    /// Hunter detection volume, relative to the hunter's box
    pub const AGGRO_RATIO: f32 = 4.0;

    /// Bomb footprint (pixels, square)
    pub const BOMB_SIZE: f32 = 16.0;
    pub const BOMB_FUSE_MS: u64 = 2000;
    /// Blast volume, relative to the bomb's box
    pub const BLAST_RATIO: f32 = 3.0;
}
