//! Simulation tuning
//!
//! Loaded from a JSON file; any missing field keeps its default, and an
//! unreadable file falls back to the defaults entirely.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (avoidance sense choices)
    pub seed: u64,

    // === Movement ===
    /// Player speed (px/s)
    pub player_speed: f32,
    /// Hostile speed when a spawn does not set one (px/s)
    pub hostile_speed: f32,
    /// Upper bound on collision sub-steps per frame
    pub max_collision_substeps: u32,

    // === Combat volumes ===
    /// Melee reach volume, as a multiple of the player's box
    pub reach_ratio: f32,
    /// Minimum time between melee strikes (ms)
    pub attack_cooldown_ms: u64,
    /// Hunter detection volume, as a multiple of the hunter's box
    pub aggro_ratio: f32,
    /// Bomb countdown (ms)
    pub bomb_fuse_ms: u64,
    /// Blast volume, as a multiple of the bomb's box
    pub blast_ratio: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            player_speed: PLAYER_SPEED,
            hostile_speed: HOSTILE_SPEED,
            max_collision_substeps: MAX_COLLISION_SUBSTEPS,
            reach_ratio: REACH_RATIO,
            attack_cooldown_ms: ATTACK_COOLDOWN_MS,
            aggro_ratio: AGGRO_RATIO,
            bomb_fuse_ms: BOMB_FUSE_MS,
            blast_ratio: BLAST_RATIO,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read settings from `path`, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Cannot read settings {}: {err}; using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Invalid settings in {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.attack_cooldown_ms)
    }

    pub fn bomb_fuse(&self) -> Duration {
        Duration::from_millis(self.bomb_fuse_ms)
    }
}
