//! Runner physics and collision
//!
//! The runner is a square body of half-size `extents` moving right through
//! the segment chain. Each tick it integrates its motion, then keeps itself
//! inside the aperture of the segment it occupies. When its right edge
//! reaches the end of the current segment it straddles the boundary with the
//! next one; the first tick of that straddle runs a single collision check
//! at the exact transition point. Missing the next aperture destroys the
//! runner.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::interval::Interval;
use super::segment::{Segment, SegmentId, SegmentKind, SegmentPool};
use crate::consts::*;

/// Piecewise-linear curve over `[0, 1]`, sampled by relative speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationCurve {
    /// `(t, value)` keys sorted by `t`
    pub keys: Vec<(f32, f32)>,
}

impl Default for AccelerationCurve {
    fn default() -> Self {
        Self {
            keys: vec![(0.0, RUN_ACCELERATION), (1.0, 0.0)],
        }
    }
}

impl AccelerationCurve {
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let Some(&(first_t, first_v)) = self.keys.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_v;
        }
        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= 0.0 {
                    return v1;
                }
                return v0 + (v1 - v0) * (t - t0) / span;
            }
        }
        self.keys.last().map(|&(_, v)| v).unwrap_or(0.0)
    }

    pub fn is_sorted(&self) -> bool {
        self.keys.windows(2).all(|pair| pair[0].0 <= pair[1].0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Half-size of the body
    pub extents: f32,
    pub start_speed_x: f32,
    pub max_speed_x: f32,
    /// Horizontal acceleration as a function of `speed_x / max_speed_x`
    pub run_acceleration: AccelerationCurve,
    pub gravity: f32,
    pub jump_acceleration: f32,
    /// Shortest and longest jump hold
    pub jump_duration: Interval,
    /// Slack granted at a boundary before a miss counts
    pub collision_epsilon: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            extents: RUNNER_EXTENTS,
            start_speed_x: RUNNER_START_SPEED,
            max_speed_x: RUNNER_MAX_SPEED,
            run_acceleration: AccelerationCurve::default(),
            gravity: GRAVITY,
            jump_acceleration: JUMP_ACCELERATION,
            jump_duration: Interval::new(JUMP_DURATION_MIN, JUMP_DURATION_MAX),
            collision_epsilon: COLLISION_EPSILON,
        }
    }
}

/// Things the presentation layer reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Collision at a boundary; `position` is the transition point
    Destroyed { position: Vec2 },
    /// Slowdown item picked up
    ItemConsumed { segment: SegmentId, position: Vec2 },
    /// Jump began; triggers the spin flourish if none is playing
    JumpStarted,
}

#[derive(Debug, Clone)]
pub struct Runner {
    config: RunnerConfig,
    position: Vec2,
    velocity: Vec2,
    current: Option<SegmentId>,
    /// Straddling `current` and its next, collision already checked
    transitioning: bool,
    grounded: bool,
    jump_time_remaining: f32,
    alive: bool,
    events: Vec<GameEvent>,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            current: None,
            transitioning: false,
            grounded: false,
            jump_time_remaining: 0.0,
            alive: false,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position on the z = 0 plane, for camera tracking
    pub fn focus_point(&self) -> Vec3 {
        self.position.extend(0.0)
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed_x(&self) -> f32 {
        self.velocity.x
    }

    pub fn current_segment(&self) -> Option<SegmentId> {
        self.current
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn jump_time_remaining(&self) -> f32 {
        self.jump_time_remaining
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Reset onto the first segment wide enough to hold the body at x = 0
    pub fn start_new_game(&mut self, first: SegmentId, pool: &SegmentPool) {
        let extents = self.config.extents;
        let mut current = first;
        while pool[current].max_x() < extents {
            match pool[current].next() {
                Some(next) => current = next,
                None => break,
            }
        }

        self.current = Some(current);
        self.position = Vec2::new(0.0, pool[current].aperture_y().min + extents);
        self.velocity = Vec2::new(self.config.start_speed_x, 0.0);
        self.transitioning = false;
        self.grounded = true;
        self.jump_time_remaining = 0.0;
        self.alive = true;
        self.events.clear();
        log::info!("Runner starting at {:?} on segment {:?}", self.position, current);
    }

    pub fn start_jumping(&mut self) {
        if self.grounded {
            self.jump_time_remaining = self.config.jump_duration.max;
            self.events.push(GameEvent::JumpStarted);
        }
    }

    /// Early release cuts the hold down toward the minimum duration
    pub fn end_jumping(&mut self) {
        let cut = self.config.jump_duration.min - self.config.jump_duration.max;
        self.jump_time_remaining = (self.jump_time_remaining + cut).max(0.0);
    }

    /// Advance one step. Returns `false` once the runner is destroyed.
    pub fn tick(&mut self, dt: f32, pool: &mut SegmentPool) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        if !self.alive {
            return false;
        }

        self.integrate(dt);

        let extents = self.config.extents;
        let max_x = pool[current].max_x();
        if self.position.x + extents < max_x {
            self.constrain_y(pool[current].aperture_y());
            self.check_proximity(current, &mut pool[current]);
            return true;
        }

        let still_inside = self.position.x - extents < max_x;
        if still_inside {
            self.constrain_y(pool[current].aperture_y());
        }

        let Some(next) = pool[current].next() else {
            log::warn!("Runner reached the end of the chain at x={:.2}", self.position.x);
            return true;
        };
        let next_aperture = pool[next].aperture_y();

        if !self.transitioning {
            if !self.check_collision(max_x, next_aperture) {
                return false;
            }
            self.transitioning = true;
        }

        self.constrain_y(next_aperture);

        if !still_inside {
            log::trace!("Runner entered segment {:?} at x={:.2}", next, self.position.x);
            self.current = Some(next);
            self.transitioning = false;
        }
        true
    }

    fn integrate(&mut self, dt: f32) {
        let start_velocity = self.velocity;

        if self.jump_time_remaining > 0.0 {
            let consumed = dt.min(self.jump_time_remaining);
            self.jump_time_remaining -= consumed;
            self.velocity.y += self.config.jump_acceleration * consumed;
        } else {
            self.velocity.y -= self.config.gravity * dt;
        }

        if self.grounded {
            let max_speed = self.config.max_speed_x;
            let acceleration = self.config.run_acceleration.evaluate(self.velocity.x / max_speed);
            self.velocity.x = (self.velocity.x + acceleration * dt).min(max_speed);
            self.grounded = false;
        }

        // Mean velocity is exact for constant acceleration over the step
        self.position += (start_velocity + self.velocity) * 0.5 * dt;
    }

    fn constrain_y(&mut self, aperture: Interval) {
        let extents = self.config.extents;
        if self.position.y - extents <= aperture.min {
            self.position.y = aperture.min + extents;
            self.velocity.y = self.velocity.y.max(0.0);
            self.jump_time_remaining = 0.0;
            self.grounded = true;
        } else if self.position.y + extents >= aperture.max {
            self.position.y = aperture.max - extents;
            self.velocity.y = self.velocity.y.min(0.0);
        }
    }

    /// Rewind to where the body's right edge met `boundary_x` and test the
    /// body against `next_aperture` there. Destroys the runner on a miss.
    fn check_collision(&mut self, boundary_x: f32, next_aperture: Interval) -> bool {
        let extents = self.config.extents;
        let transition_x = boundary_x - extents;
        let transition_y = if self.velocity.x.abs() > f32::EPSILON {
            self.position.y - self.velocity.y * (self.position.x - transition_x) / self.velocity.x
        } else {
            self.position.y
        };

        let shrunk = extents - self.config.collision_epsilon;
        if transition_y - shrunk < next_aperture.min || transition_y + shrunk > next_aperture.max {
            self.position = Vec2::new(transition_x, transition_y);
            self.velocity = Vec2::ZERO;
            self.alive = false;
            self.events.push(GameEvent::Destroyed {
                position: self.position,
            });
            log::info!(
                "Runner destroyed at ({:.2}, {:.2}), aperture [{:.2}, {:.2}]",
                transition_x,
                transition_y,
                next_aperture.min,
                next_aperture.max
            );
            return false;
        }
        true
    }

    fn check_proximity(&mut self, id: SegmentId, segment: &mut Segment) {
        let placement = segment.placement().truncate();
        let SegmentKind::Hazard(hazard) = segment.kind_mut() else {
            return;
        };
        if !hazard.item_active {
            return;
        }

        let item = placement + hazard.item_offset;
        if item.distance_squared(self.position) < hazard.radius * hazard.radius {
            hazard.item_active = false;
            self.velocity.x *= hazard.speed_factor;
            self.events.push(GameEvent::ItemConsumed {
                segment: id,
                position: item,
            });
            log::debug!("Slowdown item consumed, speed now {:.2}", self.velocity.x);
        }
    }
}
