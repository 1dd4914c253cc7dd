//! Cyclic waypoint routes with obstacle detours and pursuit
//!
//! A route-following entity asks its [`Path`] once per frame where to go
//! next. The path projects the entity toward the current waypoint and then
//! either lets it move, inserts a temporary waypoint that skirts a single
//! blocking obstacle, or turns the route around when it is boxed in. Hunters
//! can additionally divert toward a target that wanders into their aggro
//! volume.
//!
//! Waypoints come in three flavours. Permanent steps are the authored route
//! and are never removed. Pursue steps chase a target. Anything else is a
//! temporary avoidance step. Only the step under the cursor survives a
//! cleanup among the non-permanent ones.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::area::Area;
use super::geometry::{Aabb, Direction};
use crate::error::{SimError, SimResult};

/// A single waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub point: Vec2,
    /// Authored route step, never removed
    pub permanent: bool,
    /// Chases a moving target; never permanent
    pub pursue: bool,
}

impl PathStep {
    pub fn permanent(point: Vec2) -> Self {
        Self {
            point,
            permanent: true,
            pursue: false,
        }
    }

    pub fn avoidance(point: Vec2) -> Self {
        Self {
            point,
            permanent: false,
            pursue: false,
        }
    }

    pub fn pursue(point: Vec2) -> Self {
        Self {
            point,
            permanent: false,
            pursue: true,
        }
    }

    pub fn is_avoidance(&self) -> bool {
        !self.permanent && !self.pursue
    }
}

/// Target a hunter may divert toward
#[derive(Debug, Clone, Copy)]
pub struct Pursuit {
    pub target: Aabb,
    /// Scale applied to the hunter's box to form its detection volume
    pub detection_ratio: f32,
}

/// Outcome of one frame of route following
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextMove {
    /// The entity moves to `to`
    Moved { to: Vec2, pursuit_started: bool },
    /// An avoidance waypoint was inserted; no movement this frame
    Detoured { waypoint: Vec2 },
    /// The route was turned around; no movement this frame
    Reversed,
}

impl NextMove {
    /// Position the entity ends the frame at
    pub fn position(&self, current: Vec2) -> Vec2 {
        match self {
            NextMove::Moved { to, .. } => *to,
            _ => current,
        }
    }
}

/// Cyclic route with a movement cursor
#[derive(Debug, Clone)]
pub struct Path {
    steps: Vec<PathStep>,
    cursor: usize,
    /// Detour rotation: `Some(true)` is clockwise on screen, `None` undecided
    avoidance_sense: Option<bool>,
}

impl Path {
    /// Build a route of permanent waypoints heading toward `cursor`
    pub fn new(route: impl IntoIterator<Item = Vec2>, cursor: usize) -> SimResult<Self> {
        let steps: Vec<PathStep> = route.into_iter().map(PathStep::permanent).collect();
        if steps.is_empty() {
            return Err(SimError::EmptyRoute);
        }
        let cursor = cursor % steps.len();
        Ok(Self {
            steps,
            cursor,
            avoidance_sense: None,
        })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Waypoint currently being approached
    pub fn current(&self) -> &PathStep {
        &self.steps[self.cursor]
    }

    pub fn avoidance_sense(&self) -> Option<bool> {
        self.avoidance_sense
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reverse the route, keeping the cursor on the same waypoint
    pub fn reverse(&mut self) {
        self.steps.reverse();
        self.cursor = self.steps.len() - 1 - self.cursor;
    }

    /// Reverse and head back toward the waypoint the entity came from
    pub fn turn_around(&mut self) {
        self.reverse();
        self.cursor = (self.cursor + 1) % self.steps.len();
    }

    /// Advance one frame for an entity occupying `owner` that may travel
    /// `distance` pixels
    ///
    /// Only solid obstacles of `area` are considered. `pursuit` is set for
    /// hunters only. `rng` decides the avoidance sense the first time one is
    /// needed.
    pub fn compute_next_position(
        &mut self,
        owner: &Aabb,
        distance: f32,
        area: &Area,
        pursuit: Option<&Pursuit>,
        rng: &mut impl Rng,
    ) -> NextMove {
        let target = self.current().point;
        let next = project_along_line(owner.pos, target, distance);
        let moved = owner.at(next);

        let mut hits = area.solid_boxes().filter(|b| b.intersects(&moved));
        match (hits.next(), hits.next()) {
            (None, _) => {}
            (Some(obstacle), None) => {
                let obstacle = *obstacle;
                if let Some(waypoint) =
                    self.synthesize_avoidance(owner, next, &obstacle, area, rng)
                {
                    self.steps.insert(self.cursor, PathStep::avoidance(waypoint));
                    log::debug!("detour via {waypoint} around obstacle at {}", obstacle.pos);
                    return NextMove::Detoured { waypoint };
                }
                log::debug!("no detour around obstacle at {}, turning back", obstacle.pos);
                self.turn_around();
                return NextMove::Reversed;
            }
            (Some(_), Some(_)) => {
                log::debug!("boxed in at {}, turning back", owner.pos);
                self.turn_around();
                return NextMove::Reversed;
            }
        }

        if owner.point_is_crossed(target, next) {
            self.advance();
        }

        let mut pursuit_started = false;
        if let Some(pursuit) = pursuit
            && moved
                .resize_by_ratio(pursuit.detection_ratio)
                .intersects(&pursuit.target)
        {
            pursuit_started = self.pursue(pursuit.target.pos);
        }

        NextMove::Moved {
            to: next,
            pursuit_started,
        }
    }

    /// Move the cursor past the waypoint just reached
    fn advance(&mut self) {
        let reached = self.steps[self.cursor];
        self.cursor = (self.cursor + 1) % self.steps.len();
        self.remove_transient_steps();

        // Plain travel between authored steps forgets the detour side
        if reached.permanent && self.current().permanent {
            self.avoidance_sense = None;
        }
        log::debug!("waypoint {} reached, heading to {}", reached.point, self.current().point);
    }

    /// Aim at `target` ahead of the route. Returns true if this begins a
    /// pursuit rather than refreshing one.
    fn pursue(&mut self, target: Vec2) -> bool {
        let beginning = !self.current().pursue;
        self.steps.insert(self.cursor, PathStep::pursue(target));
        self.remove_transient_steps();
        if beginning {
            log::debug!("pursuit started toward {target}");
            self.avoidance_sense = None;
        }
        beginning
    }

    /// Drop every non-permanent step except the one under the cursor
    fn remove_transient_steps(&mut self) {
        let current = self.cursor;
        let mut kept = Vec::with_capacity(self.steps.len());
        for (index, step) in std::mem::take(&mut self.steps).into_iter().enumerate() {
            if index == current {
                self.cursor = kept.len();
                kept.push(step);
            } else if step.permanent {
                kept.push(step);
            }
        }
        self.steps = kept;
    }

    /// Pick a corner of `obstacle` to route around it
    ///
    /// Tries the side given by the avoidance sense first, then the other
    /// side. Returns `None` if neither keeps the owner inside the area.
    fn synthesize_avoidance(
        &mut self,
        owner: &Aabb,
        next: Vec2,
        obstacle: &Aabb,
        area: &Area,
        rng: &mut impl Rng,
    ) -> Option<Vec2> {
        let approach = obstacle.direction_of_overlap(owner, next)?;
        let sense = *self.avoidance_sense.get_or_insert_with(|| rng.random());
        let side = approach.collapse(sense);

        for clockwise in [sense, !sense] {
            self.avoidance_sense = Some(clockwise);
            let candidate = detour_corner(obstacle, owner.size, side, clockwise);
            if area.contains(&owner.at(candidate)) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Position that puts a box of `size` just outside a corner of `obstacle`
///
/// The corner is on the `side` the mover approached from, turned clockwise
/// or counter-clockwise around the obstacle.
fn detour_corner(obstacle: &Aabb, size: Vec2, side: Direction, clockwise: bool) -> Vec2 {
    let left = obstacle.x() - size.x;
    let right = obstacle.right();
    let above = obstacle.y() - size.y;
    let below = obstacle.bottom();

    match (side.collapse(clockwise), clockwise) {
        (Direction::West, true) | (Direction::North, false) => Vec2::new(left, above),
        (Direction::North, true) | (Direction::East, false) => Vec2::new(right, above),
        (Direction::East, true) | (Direction::South, false) => Vec2::new(right, below),
        _ => Vec2::new(left, below),
    }
}

/// Point at most `distance` along the line from `start` to `dest`
///
/// Never overshoots `dest`. Degenerate input (no distance, coincident
/// points, non-finite slope) leaves `start` unchanged.
pub fn project_along_line(start: Vec2, dest: Vec2, distance: f32) -> Vec2 {
    if distance <= 0.0 || start == dest {
        return start;
    }
    if distance >= start.distance(dest) {
        return dest;
    }

    // Intersections of the line with a circle of radius `distance` at `start`
    let roots = if dest.x == start.x {
        [
            Vec2::new(start.x, start.y + distance),
            Vec2::new(start.x, start.y - distance),
        ]
    } else {
        let slope = (dest.y - start.y) / (dest.x - start.x);
        let dx = distance / (1.0 + slope * slope).sqrt();
        if !dx.is_finite() {
            return start;
        }
        [
            Vec2::new(start.x + dx, start.y + slope * dx),
            Vec2::new(start.x - dx, start.y - slope * dx),
        ]
    };

    let on_screen_x = prefer(roots.to_vec(), |p| p.x >= 0.0);
    let on_screen = prefer(on_screen_x, |p| p.y >= 0.0);
    on_screen
        .into_iter()
        .min_by(|a, b| a.distance(dest).total_cmp(&b.distance(dest)))
        .unwrap_or(start)
}

/// Keep the candidates matching `keep`, unless that would leave none
fn prefer(candidates: Vec<Vec2>, keep: impl Fn(&Vec2) -> bool) -> Vec<Vec2> {
    let filtered: Vec<Vec2> = candidates.iter().copied().filter(|p| keep(p)).collect();
    if filtered.is_empty() { candidates } else { filtered }
}
