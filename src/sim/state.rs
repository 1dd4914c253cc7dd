//! Simulation state and entity types
//!
//! Everything a frame needs lives in [`GameState`]: the area registry, the
//! entities, the clocks and the RNG. Nothing is global, so independent
//! simulations can run side by side (and in tests).

use std::time::Instant;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::area::{Area, AreaId, AreaRegistry};
use super::clock::{ClockRegistry, Purpose};
use super::combat::{HitOutcome, StrikeSource};
use super::geometry::{Aabb, Direction};
use super::path::Path;
use crate::consts::BOMB_SIZE;
use crate::error::{SimError, SimResult};
use crate::settings::Settings;

/// Identity of an entity, unique within one simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// The freely steered entity
#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub bbox: Aabb,
    /// Last direction the player moved in
    pub facing: Direction,
}

/// How a hostile reacts to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    /// Walks its route and nothing else
    Patroller,
    /// Leaves its route to chase the player when close enough
    Hunter,
}

/// A route-following non-player entity
#[derive(Debug, Clone)]
pub struct Hostile {
    pub id: EntityId,
    pub kind: HostileKind,
    /// Area the hostile lives in; it only moves while that area is current
    pub area: AreaId,
    pub bbox: Aabb,
    pub path: Path,
    /// Pixels per second
    pub speed: f32,
    /// Cleared when combat rules report a kill; pruned at the end of the frame
    pub alive: bool,
}

impl Hostile {
    /// Turn the route around (called after the hostile takes damage)
    pub fn reverse_path(&mut self) {
        self.path.reverse();
    }

    pub fn pursues(&self) -> bool {
        self.kind == HostileKind::Hunter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Bomb,
}

/// A short-lived entity that expires on its own clock
#[derive(Debug, Clone)]
pub struct Effect {
    pub id: EntityId,
    pub kind: EffectKind,
    pub area: AreaId,
    pub bbox: Aabb,
}

/// Things that happened during a frame, for the layers above the core
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The player's movement was cut short by an obstacle
    PlayerBlocked { at: Vec2 },
    Struck {
        target: EntityId,
        source: StrikeSource,
        outcome: HitOutcome,
        at: Vec2,
    },
    /// A hostile overlaps the player after moving
    HostileContact { hostile: EntityId, at: Vec2 },
    HostileDetoured { hostile: EntityId, waypoint: Vec2 },
    HostileReversed { hostile: EntityId },
    PursuitStarted { hostile: EntityId },
    HostileRemoved { hostile: EntityId },
    BombPlaced { bomb: EntityId, at: Vec2 },
    BombDetonated { bomb: EntityId, at: Vec2 },
    AreaChanged { from: AreaId, to: AreaId },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub areas: AreaRegistry,
    pub current_area: AreaId,
    pub player: Player,
    /// Sorted by id
    pub hostiles: Vec<Hostile>,
    pub effects: Vec<Effect>,
    pub clocks: ClockRegistry,
    /// Frames simulated so far
    pub frame: u64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a simulation with the player at `player_box` in `start_area`
    pub fn new(
        settings: Settings,
        areas: impl IntoIterator<Item = Area>,
        start_area: AreaId,
        player_box: Aabb,
    ) -> SimResult<Self> {
        let areas: AreaRegistry = areas.into_iter().map(|a| (a.id, a)).collect();
        if !areas.contains_key(&start_area) {
            return Err(SimError::UnknownArea(start_area));
        }

        let rng = Pcg32::seed_from_u64(settings.seed);
        let mut state = Self {
            settings,
            areas,
            current_area: start_area,
            player: Player {
                id: EntityId(0),
                bbox: player_box,
                facing: Direction::South,
            },
            hostiles: Vec::new(),
            effects: Vec::new(),
            clocks: ClockRegistry::new(),
            frame: 0,
            rng,
            next_id: 1,
        };
        state.player.id = state.next_entity_id();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// The area the player is in
    pub fn area(&self) -> SimResult<&Area> {
        self.areas
            .get(&self.current_area)
            .ok_or(SimError::UnknownArea(self.current_area))
    }

    /// Add a hostile; `speed` falls back to the configured default
    pub fn spawn_hostile(
        &mut self,
        kind: HostileKind,
        area: AreaId,
        bbox: Aabb,
        path: Path,
        speed: Option<f32>,
    ) -> SimResult<EntityId> {
        if !self.areas.contains_key(&area) {
            return Err(SimError::UnknownArea(area));
        }
        let id = self.next_entity_id();
        self.hostiles.push(Hostile {
            id,
            kind,
            area,
            bbox,
            path,
            speed: speed.unwrap_or(self.settings.hostile_speed),
            alive: true,
        });
        Ok(id)
    }

    /// Drop a bomb centred on the player, with its fuse starting now
    pub fn spawn_bomb(&mut self, now: Instant) -> EntityId {
        let id = self.next_entity_id();
        let size = Vec2::splat(BOMB_SIZE);
        let bbox = Aabb {
            pos: self.player.bbox.center() - size / 2.0,
            size,
        };
        self.effects.push(Effect {
            id,
            kind: EffectKind::Bomb,
            area: self.current_area,
            bbox,
        });
        self.clocks
            .start(id, Purpose::Fuse, Some(self.settings.bomb_fuse()), now);
        id
    }

    pub fn hostile(&self, id: EntityId) -> Option<&Hostile> {
        self.hostiles.iter().find(|h| h.id == id)
    }

    pub fn hostile_mut(&mut self, id: EntityId) -> Option<&mut Hostile> {
        self.hostiles.iter_mut().find(|h| h.id == id)
    }

    /// Reverse a hostile's route after external damage. Returns false for an
    /// unknown id.
    pub fn reverse_hostile_path(&mut self, id: EntityId) -> bool {
        match self.hostile_mut(id) {
            Some(hostile) => {
                hostile.reverse_path();
                true
            }
            None => false,
        }
    }

    /// Stop an entity's clocks so it does not jump when it resumes
    pub fn freeze(&mut self, id: EntityId) {
        self.clocks.reset_owner(id);
    }

    /// Open or close an obstacle. Only call this between frames.
    pub fn set_obstacle_solid(
        &mut self,
        area: AreaId,
        obstacle_id: u32,
        solid: bool,
    ) -> SimResult<bool> {
        let area = self
            .areas
            .get_mut(&area)
            .ok_or(SimError::UnknownArea(area))?;
        Ok(area.set_solid(obstacle_id, solid))
    }
}
