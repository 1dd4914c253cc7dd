//! Collision resolution for the freely steered player
//!
//! The player proposes a position each frame; every solid obstacle gets a
//! chance to push it back flush against a face. Snapping against one
//! obstacle can push the player into another one that was already checked,
//! so the scan restarts after every adjustment until a full pass changes
//! nothing. Positions that were already rejected are remembered, and seeing
//! one again means the obstacles leave no room for the mover.

use glam::Vec2;

use super::geometry::Aabb;
use super::state::EntityId;
use crate::error::{SimError, SimResult};

/// Resolve a single step from `mover.pos` to `proposed`
///
/// Returns the closest position along the way that overlaps no obstacle.
pub fn resolve_collision(
    entity: EntityId,
    mover: &Aabb,
    proposed: Vec2,
    obstacles: &[Aabb],
) -> SimResult<Vec2> {
    let delta = proposed - mover.pos;
    let going_left = (delta.x != 0.0).then_some(delta.x < 0.0);
    let going_up = (delta.y != 0.0).then_some(delta.y < 0.0);

    let mut proposal = proposed;
    let mut rejected: Vec<Vec2> = Vec::new();

    'scan: loop {
        for obstacle in obstacles {
            let candidate = mover.at(proposal);
            let Some(adjusted) =
                obstacle.check_overlap_and_adjust(&candidate, mover, going_left, going_up)
            else {
                continue;
            };

            rejected.push(proposal);
            if rejected.contains(&adjusted) {
                log::error!(
                    "entity {entity:?} cannot move from {} toward {proposed}: stuck at {adjusted}",
                    mover.pos
                );
                return Err(SimError::UnsolvableCollision {
                    entity,
                    position: mover.pos,
                });
            }
            proposal = adjusted;
            continue 'scan;
        }
        return Ok(proposal);
    }
}

/// Move `mover` toward `target`, split into sub-steps no longer than the
/// mover's smaller side so that thin obstacles cannot be skipped over
///
/// `max_substeps` caps the split for very long moves.
pub fn move_with_collisions(
    entity: EntityId,
    mover: &Aabb,
    target: Vec2,
    obstacles: &[Aabb],
    max_substeps: u32,
) -> SimResult<Vec2> {
    let travel = target - mover.pos;
    if travel == Vec2::ZERO {
        return Ok(mover.pos);
    }

    let step_limit = mover.width().min(mover.height());
    let substeps = ((travel.length() / step_limit).ceil() as u32).clamp(1, max_substeps.max(1));
    let step = travel / substeps as f32;

    let mut current = *mover;
    for _ in 0..substeps {
        let resolved = resolve_collision(entity, &current, current.pos + step, obstacles)?;
        current.pos = resolved;
    }
    Ok(current.pos)
}
