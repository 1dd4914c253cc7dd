//! Rift Walk headless driver
//!
//! Runs a short scripted session on a two-screen demo level and logs what
//! happens each frame. Set `RUST_LOG=debug` to watch the routing decisions.
//!
//! Usage: `rift-walk [settings.json]`

use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::Vec2;

use rift_walk::Settings;
use rift_walk::sim::{
    Aabb, Area, AreaId, CombatRules, EntityId, Exits, GameState, HitOutcome, HostileKind,
    Obstacle, ObstacleKind, Path, StrikeSource, TickInput, tick,
};

const FRAME: Duration = Duration::from_millis(16);
const FRAMES: u32 = 600;
/// Gate toggled by the script
const GATE_ID: u32 = 3;

/// Every hostile takes a fixed number of hits
struct HitPoints {
    remaining: HashMap<EntityId, u32>,
    per_hostile: u32,
}

impl CombatRules for HitPoints {
    fn on_strike(&mut self, target: EntityId, source: StrikeSource) -> HitOutcome {
        let damage = match source {
            StrikeSource::Melee => 1,
            StrikeSource::Blast => 2,
        };
        let hp = self.remaining.entry(target).or_insert(self.per_hostile);
        *hp = hp.saturating_sub(damage);
        if *hp == 0 {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged
        }
    }

    fn on_contact(&mut self, hostile: EntityId) {
        log::info!("Player touched by {hostile:?}");
    }
}

fn demo_level() -> Vec<Area> {
    let screen = Aabb::new(0.0, 0.0, 320.0, 240.0);
    let meadow = Area::new(AreaId(1), screen)
        .with_obstacle(Obstacle::new(
            1,
            ObstacleKind::Wall,
            Aabb::new(150.0, 40.0, 20.0, 80.0),
        ))
        .with_obstacle(Obstacle::new(
            2,
            ObstacleKind::Chest,
            Aabb::new(60.0, 180.0, 16.0, 16.0),
        ))
        .with_obstacle(Obstacle::new(
            GATE_ID,
            ObstacleKind::Gate,
            Aabb::new(300.0, 100.0, 20.0, 40.0),
        ))
        .with_exits(Exits {
            east: Some(AreaId(2)),
            ..Default::default()
        });
    let rift = Area::new(AreaId(2), screen)
        .with_obstacle(Obstacle::new(1, ObstacleKind::Rift, Aabb::new(120.0, 100.0, 40.0, 40.0)))
        .with_exits(Exits {
            west: Some(AreaId(1)),
            ..Default::default()
        });
    vec![meadow, rift]
}

fn build(settings: Settings) -> rift_walk::SimResult<GameState> {
    let player = Aabb::new(40.0, 100.0, 16.0, 16.0);
    let mut state = GameState::new(settings, demo_level(), AreaId(1), player)?;

    let patrol = Path::new(
        [
            Vec2::new(100.0, 60.0),
            Vec2::new(240.0, 60.0),
            Vec2::new(240.0, 160.0),
            Vec2::new(100.0, 160.0),
        ],
        1,
    )?;
    state.spawn_hostile(
        HostileKind::Patroller,
        AreaId(1),
        Aabb::new(100.0, 60.0, 16.0, 16.0),
        patrol,
        None,
    )?;

    let hunt = Path::new([Vec2::new(40.0, 120.0), Vec2::new(260.0, 120.0)], 1)?;
    state.spawn_hostile(
        HostileKind::Hunter,
        AreaId(2),
        Aabb::new(40.0, 120.0, 16.0, 16.0),
        hunt,
        Some(60.0),
    )?;
    Ok(state)
}

/// Scripted input: wander east, swing now and then, open the gate halfway
fn script(frame: u32) -> TickInput {
    let direction = match frame {
        0..=149 => Vec2::new(1.0, 0.3),
        150..=299 => Vec2::new(1.0, -0.2),
        300..=449 => Vec2::new(1.0, 0.0),
        _ => Vec2::new(-0.5, 1.0),
    };
    TickInput {
        direction,
        attack: frame % 45 == 0,
        drop_bomb: frame == 200,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rift Walk (headless) starting...");

    let settings = std::env::args()
        .nth(1)
        .map(Settings::load)
        .unwrap_or_default();

    let mut state = match build(settings) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Demo level is invalid: {err}");
            std::process::exit(1);
        }
    };
    let mut rules = HitPoints {
        remaining: HashMap::new(),
        per_hostile: 3,
    };

    // Frames are FRAME apart on a synthetic clock
    let start = Instant::now();
    for frame in 0..FRAMES {
        if frame == 250 {
            // Gates only change between frames
            if let Err(err) = state.set_obstacle_solid(AreaId(1), GATE_ID, false) {
                log::error!("Cannot open gate: {err}");
            }
        }

        let now = start + FRAME * frame;
        match tick(&mut state, &script(frame), &mut rules, now) {
            Ok(report) => {
                for event in &report.events {
                    log::info!("frame {}: {event:?}", report.frame);
                }
            }
            Err(err) => log::error!("frame {frame} aborted: {err}"),
        }
    }

    log::info!(
        "Finished in area {:?} at {} with {} hostiles left",
        state.current_area,
        state.player.bbox.pos,
        state.hostiles.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser driver; the library is used directly from the host page
}
