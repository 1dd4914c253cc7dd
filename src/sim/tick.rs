//! Per-frame update
//!
//! One call to [`tick`] runs a whole frame in a fixed phase order:
//!
//! 1. the player moves (with collision resolution) and acts
//! 2. hostiles of the current area move and touch the player
//! 3. expired effects detonate, dead entities are pruned
//! 4. leaving the area through an exit switches to the neighbouring area
//!
//! Later phases see what earlier phases did this same frame: a hostile
//! killed by the player's strike in phase 1 no longer moves in phase 2.

use std::time::Instant;

use glam::Vec2;

use super::area::AreaId;
use super::clock::Purpose;
use super::collision::move_with_collisions;
use super::combat::{CombatRules, HitOutcome, StrikeSource};
use super::geometry::{Aabb, Direction};
use super::path::{NextMove, Pursuit};
use super::state::{Effect, GameEvent, GameState, Hostile, HostileKind};
use crate::error::{SimError, SimResult};

/// Player intent for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement; length 1 is full speed, longer vectors are clamped
    pub direction: Vec2,
    /// Swing at everything within reach
    pub attack: bool,
    /// Drop a bomb at the player's feet
    pub drop_bomb: bool,
}

/// What a frame produced
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub events: Vec<GameEvent>,
}

/// Advance the simulation by one frame at wall-clock time `now`
///
/// An unsolvable player collision aborts the frame before any later phase
/// runs; the player keeps its previous position.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    rules: &mut impl CombatRules,
    now: Instant,
) -> SimResult<FrameReport> {
    state.frame += 1;
    log::trace!("frame {} in area {:?}", state.frame, state.current_area);

    let mut events = Vec::new();
    update_player(state, input, rules, now, &mut events)?;
    update_hostiles(state, rules, now, &mut events)?;
    prune(state, rules, now, &mut events);
    check_area_transition(state, &mut events)?;

    Ok(FrameReport {
        frame: state.frame,
        events,
    })
}

/// Phase 1: movement, then melee and bombs
fn update_player(
    state: &mut GameState,
    input: &TickInput,
    rules: &mut impl CombatRules,
    now: Instant,
    events: &mut Vec<GameEvent>,
) -> SimResult<()> {
    let obstacles: Vec<Aabb> = state.area()?.solid_boxes().copied().collect();
    let player_id = state.player.id;

    let distance = state
        .clocks
        .distance(player_id, Purpose::Movement, state.settings.player_speed, now);
    let direction = input.direction.clamp_length_max(1.0);
    if let Some(facing) = Direction::from_vector(direction) {
        state.player.facing = facing;
    }

    let target = state.player.bbox.pos + direction * distance;
    let resolved = move_with_collisions(
        player_id,
        &state.player.bbox,
        target,
        &obstacles,
        state.settings.max_collision_substeps,
    )?;
    if resolved != target {
        events.push(GameEvent::PlayerBlocked { at: resolved });
    }
    state.player.bbox.pos = resolved;

    if input.attack && state.clocks.is_elapsed(player_id, Purpose::AttackCooldown, now) {
        state.clocks.start(
            player_id,
            Purpose::AttackCooldown,
            Some(state.settings.attack_cooldown()),
            now,
        );
        let reach = state.player.bbox.resize_by_ratio(state.settings.reach_ratio);
        strike(
            &mut state.hostiles,
            state.current_area,
            &reach,
            StrikeSource::Melee,
            rules,
            events,
        );
    }

    if input.drop_bomb {
        let bomb = state.spawn_bomb(now);
        events.push(GameEvent::BombPlaced {
            bomb,
            at: state.player.bbox.center(),
        });
    }
    Ok(())
}

/// Phase 2: route following for every live hostile of the current area
fn update_hostiles(
    state: &mut GameState,
    rules: &mut impl CombatRules,
    now: Instant,
    events: &mut Vec<GameEvent>,
) -> SimResult<()> {
    let current = state.current_area;
    let area = state
        .areas
        .get(&current)
        .ok_or(SimError::UnknownArea(current))?;
    let player_box = state.player.bbox;
    let aggro_ratio = state.settings.aggro_ratio;

    for hostile in state
        .hostiles
        .iter_mut()
        .filter(|h| h.alive && h.area == current)
    {
        let distance = state
            .clocks
            .distance(hostile.id, Purpose::Movement, hostile.speed, now);
        let pursuit = (hostile.kind == HostileKind::Hunter).then_some(Pursuit {
            target: player_box,
            detection_ratio: aggro_ratio,
        });

        let step = hostile.path.compute_next_position(
            &hostile.bbox,
            distance,
            area,
            pursuit.as_ref(),
            &mut state.rng,
        );
        match step {
            NextMove::Moved {
                pursuit_started: true,
                ..
            } => events.push(GameEvent::PursuitStarted { hostile: hostile.id }),
            NextMove::Detoured { waypoint } => events.push(GameEvent::HostileDetoured {
                hostile: hostile.id,
                waypoint,
            }),
            NextMove::Reversed => events.push(GameEvent::HostileReversed { hostile: hostile.id }),
            NextMove::Moved { .. } => {}
        }
        hostile.bbox.pos = step.position(hostile.bbox.pos);

        if hostile.bbox.intersects(&player_box) {
            rules.on_contact(hostile.id);
            events.push(GameEvent::HostileContact {
                hostile: hostile.id,
                at: hostile.bbox.center(),
            });
        }
    }
    Ok(())
}

/// Phase 3: detonate expired bombs, drop dead hostiles
fn prune(
    state: &mut GameState,
    rules: &mut impl CombatRules,
    now: Instant,
    events: &mut Vec<GameEvent>,
) {
    let (expired, pending): (Vec<Effect>, Vec<Effect>) = std::mem::take(&mut state.effects)
        .into_iter()
        .partition(|e| state.clocks.is_elapsed(e.id, Purpose::Fuse, now));
    state.effects = pending;

    for bomb in expired {
        let blast = bomb.bbox.resize_by_ratio(state.settings.blast_ratio);
        log::debug!("bomb {:?} detonated at {}", bomb.id, bomb.bbox.center());
        strike(
            &mut state.hostiles,
            bomb.area,
            &blast,
            StrikeSource::Blast,
            rules,
            events,
        );
        events.push(GameEvent::BombDetonated {
            bomb: bomb.id,
            at: bomb.bbox.center(),
        });
    }

    state.hostiles.retain(|h| {
        if !h.alive {
            log::debug!("hostile {:?} removed", h.id);
            events.push(GameEvent::HostileRemoved { hostile: h.id });
        }
        h.alive
    });
}

/// Phase 4: follow an exit when the player's center leaves the area
fn check_area_transition(state: &mut GameState, events: &mut Vec<GameEvent>) -> SimResult<()> {
    let area = state.area()?;
    let Some(side) = area.exit_side(state.player.bbox.center()) else {
        return Ok(());
    };
    let Some(next_id) = area.exits.toward(side) else {
        return Ok(());
    };
    let next = state
        .areas
        .get(&next_id)
        .ok_or(SimError::UnknownArea(next_id))?;

    // Enter through the opposite edge of the new area
    let bounds = next.bounds;
    let size = state.player.bbox.size;
    let mut pos = state.player.bbox.pos;
    match side {
        Direction::West => pos.x = bounds.right() - size.x,
        Direction::East => pos.x = bounds.x(),
        Direction::North => pos.y = bounds.bottom() - size.y,
        _ => pos.y = bounds.y(),
    }
    pos = pos.clamp(bounds.pos, bounds.bottom_right() - size);
    state.player.bbox.pos = pos;

    let previous = state.current_area;
    let left_behind: Vec<_> = state
        .hostiles
        .iter()
        .filter(|h| h.area == previous)
        .map(|h| h.id)
        .collect();
    for id in left_behind {
        state.clocks.reset(id, Purpose::Movement);
    }
    state.clocks.reset(state.player.id, Purpose::Movement);

    state.current_area = next_id;
    log::info!("player left area {previous:?} heading {side:?}, now in {next_id:?}");
    events.push(GameEvent::AreaChanged {
        from: previous,
        to: next_id,
    });
    Ok(())
}

/// Hit every live hostile of `area` overlapping `volume`
fn strike(
    hostiles: &mut [Hostile],
    area: AreaId,
    volume: &Aabb,
    source: StrikeSource,
    rules: &mut impl CombatRules,
    events: &mut Vec<GameEvent>,
) {
    for hostile in hostiles
        .iter_mut()
        .filter(|h| h.alive && h.area == area && volume.intersects(&h.bbox))
    {
        let outcome = rules.on_strike(hostile.id, source);
        match outcome {
            HitOutcome::Damaged => hostile.reverse_path(),
            HitOutcome::Killed => hostile.alive = false,
            HitOutcome::Ignored => {}
        }
        log::debug!("{source:?} hit {:?}: {outcome:?}", hostile.id);
        events.push(GameEvent::Struck {
            target: hostile.id,
            source,
            outcome,
            at: hostile.bbox.center(),
        });
    }
}
