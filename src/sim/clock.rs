//! Wall-clock elapsers
//!
//! Motion is driven by real elapsed time rather than by frame count, so a
//! slow or uneven frame rate never changes how fast things appear to move.
//! Every time-dependent call has an `*_at(now)` form so tests can feed a
//! synthetic clock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::state::EntityId;

/// What a clock is measuring for its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Travel distance sampling
    Movement,
    /// Minimum gap between melee strikes
    AttackCooldown,
    /// Bomb countdown
    Fuse,
}

/// Tracks time since creation and since the last distance sample
#[derive(Debug, Clone)]
pub struct Elapser {
    created: Instant,
    /// `None` means the clock never expires
    lifetime: Option<Duration>,
    last_sample: Option<Instant>,
}

impl Elapser {
    pub fn new(lifetime: Option<Duration>) -> Self {
        Self::new_at(Instant::now(), lifetime)
    }

    pub fn new_at(now: Instant, lifetime: Option<Duration>) -> Self {
        Self {
            created: now,
            lifetime,
            last_sample: None,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.is_elapsed_at(Instant::now())
    }

    pub fn is_elapsed_at(&self, now: Instant) -> bool {
        self.lifetime
            .is_some_and(|lifetime| now.saturating_duration_since(self.created) >= lifetime)
    }

    /// Pixels travelled at `speed` (px/s) since the previous sample
    ///
    /// The first call after creation or [`reset`](Self::reset) only records
    /// the baseline and returns 0.
    pub fn distance(&mut self, speed: f32) -> f32 {
        self.distance_at(Instant::now(), speed)
    }

    pub fn distance_at(&mut self, now: Instant, speed: f32) -> f32 {
        let distance = match self.last_sample {
            Some(last) => {
                let elapsed_ms = now.saturating_duration_since(last).as_secs_f32() * 1000.0;
                elapsed_ms * speed / 1000.0
            }
            None => 0.0,
        };
        self.last_sample = Some(now);
        distance
    }

    /// Forget the last sample so the next distance is 0
    pub fn reset(&mut self) {
        self.last_sample = None;
    }
}

/// All clocks of a simulation, keyed by owner and purpose
#[derive(Debug, Clone, Default)]
pub struct ClockRegistry {
    clocks: HashMap<(EntityId, Purpose), Elapser>,
}

impl ClockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a clock, replacing any previous one for the pair
    pub fn start(
        &mut self,
        owner: EntityId,
        purpose: Purpose,
        lifetime: Option<Duration>,
        now: Instant,
    ) {
        self.clocks
            .insert((owner, purpose), Elapser::new_at(now, lifetime));
    }

    pub fn get(&self, owner: EntityId, purpose: Purpose) -> Option<&Elapser> {
        self.clocks.get(&(owner, purpose))
    }

    /// Travel distance for `owner`, creating an unbounded clock on first use
    pub fn distance(&mut self, owner: EntityId, purpose: Purpose, speed: f32, now: Instant) -> f32 {
        self.clocks
            .entry((owner, purpose))
            .or_insert_with(|| Elapser::new_at(now, None))
            .distance_at(now, speed)
    }

    /// A clock that was never started counts as elapsed
    pub fn is_elapsed(&self, owner: EntityId, purpose: Purpose, now: Instant) -> bool {
        self.get(owner, purpose)
            .is_none_or(|clock| clock.is_elapsed_at(now))
    }

    pub fn reset(&mut self, owner: EntityId, purpose: Purpose) {
        if let Some(clock) = self.clocks.get_mut(&(owner, purpose)) {
            clock.reset();
        }
    }

    /// Reset every clock belonging to `owner` (used when freezing an entity)
    pub fn reset_owner(&mut self, owner: EntityId) {
        self.clocks
            .iter_mut()
            .filter(|((id, _), _)| *id == owner)
            .for_each(|(_, clock)| clock.reset());
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}
