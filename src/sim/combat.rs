//! Hook into the external combat rules
//!
//! The core decides *that* and *where* something was hit. What a hit means
//! (life points, armour, drops) belongs to whoever implements
//! [`CombatRules`].

use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// What delivered a strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeSource {
    /// The player's melee reach volume
    Melee,
    /// A detonating bomb's blast volume
    Blast,
}

/// How the combat rules interpreted a strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// No effect (invulnerable, already dying, ...)
    Ignored,
    /// Hurt but alive; the hostile turns its route around
    Damaged,
    /// Removed at the end of the frame
    Killed,
}

pub trait CombatRules {
    /// A hostile was caught by a strike volume
    fn on_strike(&mut self, target: EntityId, source: StrikeSource) -> HitOutcome;

    /// A hostile touched the player
    fn on_contact(&mut self, _hostile: EntityId) {}
}

/// Rules under which nothing ever gets hurt
#[derive(Debug, Clone, Copy, Default)]
pub struct Harmless;

impl CombatRules for Harmless {
    fn on_strike(&mut self, _target: EntityId, _source: StrikeSource) -> HitOutcome {
        HitOutcome::Ignored
    }
}
