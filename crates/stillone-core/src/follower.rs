//! Follower agents: wander, dance around signs, flee the pursuer, and spawn
//! offspring when a dance reaches the sign's centre.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FollowerConfig, WorldBounds};
use crate::perception::SpatialQuery;
use crate::{
    EntityRef, FollowerId, Position, PursuerId, SignId, Tag, ease_heading, heading_of,
    random_in_disc, sample_count, sample_span,
};

/// Primary behaviour of a follower.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FollowerState {
    #[default]
    Idle,
    Moving,
    Dancing,
    Fleeing,
}

/// Orbit around a claimed sign.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dance {
    sign: SignId,
    radius: f32,
    angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Behavior {
    /// `dwell` is rolled on the first idle tick after entry.
    Idle { elapsed: f32, dwell: Option<f32> },
    Moving,
    Dancing(Dance),
    Fleeing,
}

impl Behavior {
    const fn idle() -> Self {
        Self::Idle {
            elapsed: 0.0,
            dwell: None,
        }
    }
}

/// Emitted when a dancer reaches the centre of its sign. The dancer is
/// already terminated when this is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct DanceCompletion {
    pub sign: SignId,
    pub offspring: Vec<Position>,
}

/// Read-only snapshot handed to hosts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FollowerView {
    pub position: Position,
    pub heading: f32,
    pub state: FollowerState,
    pub in_cooldown: bool,
    pub dancing_at: Option<SignId>,
    pub dance_radius: Option<f32>,
}

/// A crowd member.
#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    id: FollowerId,
    position: Position,
    heading: f32,
    velocity: (f32, f32),
    target_point: Position,
    behavior: Behavior,
    cooldown_remaining: f32,
    pursuer: Option<PursuerId>,
    terminated: bool,
}

impl Follower {
    /// New followers start idle and in cooldown.
    #[must_use]
    pub fn new(
        id: FollowerId,
        position: Position,
        pursuer: Option<PursuerId>,
        config: &FollowerConfig,
    ) -> Self {
        Self {
            id,
            position,
            heading: 0.0,
            velocity: (0.0, 0.0),
            target_point: position,
            behavior: Behavior::idle(),
            cooldown_remaining: config.spawn_cooldown,
            pursuer,
            terminated: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> FollowerId {
        self.id
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    #[must_use]
    pub const fn state(&self) -> FollowerState {
        match self.behavior {
            Behavior::Idle { .. } => FollowerState::Idle,
            Behavior::Moving => FollowerState::Moving,
            Behavior::Dancing(_) => FollowerState::Dancing,
            Behavior::Fleeing => FollowerState::Fleeing,
        }
    }

    #[must_use]
    pub const fn is_dancing(&self) -> bool {
        matches!(self.behavior, Behavior::Dancing(_))
    }

    /// Sign claimed by the current dance.
    #[must_use]
    pub const fn dancing_at(&self) -> Option<SignId> {
        match self.behavior {
            Behavior::Dancing(dance) => Some(dance.sign),
            _ => None,
        }
    }

    #[must_use]
    pub const fn dance_radius(&self) -> Option<f32> {
        match self.behavior {
            Behavior::Dancing(dance) => Some(dance.radius),
            _ => None,
        }
    }

    #[must_use]
    pub fn in_cooldown(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    #[must_use]
    pub const fn pursuer(&self) -> Option<PursuerId> {
        self.pursuer
    }

    /// Point this follower at a different pursuer (or none).
    pub fn set_pursuer(&mut self, pursuer: Option<PursuerId>) {
        self.pursuer = pursuer;
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Stop all further behaviour. Removal is up to the owning registry.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Abandon a dance because its sign started disappearing.
    pub fn on_sign_disappearing(&mut self) {
        if let Behavior::Dancing(dance) = self.behavior {
            debug!(follower = ?self.id, sign = ?dance.sign, "sign vanishing; dance abandoned");
            self.behavior = Behavior::idle();
        }
    }

    /// Add an instantaneous velocity change.
    pub fn apply_impulse(&mut self, direction: (f32, f32), magnitude: f32) {
        self.velocity.0 += direction.0 * magnitude;
        self.velocity.1 += direction.1 * magnitude;
    }

    /// Advance one tick. Returns the completion event when this tick's
    /// dance reached the sign.
    pub fn update(
        &mut self,
        dt: f32,
        space: &dyn SpatialQuery,
        bounds: &WorldBounds,
        config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) -> Option<DanceCompletion> {
        if self.terminated {
            return None;
        }
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);

        let completion = match self.behavior {
            Behavior::Idle { elapsed, dwell } => {
                self.handle_idle(elapsed + dt, dwell, space, bounds, config, rng);
                None
            }
            Behavior::Moving => {
                self.handle_moving(dt, config);
                None
            }
            Behavior::Dancing(dance) => self.handle_dancing(dance, dt, space, config, rng),
            Behavior::Fleeing => {
                self.handle_fleeing(dt, space, config);
                None
            }
        };

        if !self.terminated {
            self.integrate_velocity(dt, config);
            self.position = space.clamp_to_bounds(self.position);
        }
        completion
    }

    fn handle_idle(
        &mut self,
        elapsed: f32,
        dwell: Option<f32>,
        space: &dyn SpatialQuery,
        bounds: &WorldBounds,
        config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) {
        let dwell =
            dwell.unwrap_or_else(|| sample_span(rng, config.min_idle_time, config.max_idle_time));
        if elapsed < dwell {
            self.behavior = Behavior::Idle {
                elapsed,
                dwell: Some(dwell),
            };
            return;
        }
        if self.check_environment(space, config) {
            return;
        }
        self.target_point = bounds.sample(rng);
        self.behavior = Behavior::Moving;
    }

    fn handle_moving(&mut self, dt: f32, config: &FollowerConfig) {
        self.step_towards(self.target_point, config.move_speed * dt, config.rotation_speed * dt);
        if self.position.distance_to(self.target_point) < config.arrival_epsilon {
            self.behavior = Behavior::idle();
        }
    }

    fn handle_dancing(
        &mut self,
        mut dance: Dance,
        dt: f32,
        space: &dyn SpatialQuery,
        config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) -> Option<DanceCompletion> {
        let sign_pos = match space.position_of(EntityRef::Sign(dance.sign)) {
            Some(pos) if space.sign_accepts_dancers(dance.sign) => pos,
            _ => {
                debug!(follower = ?self.id, sign = ?dance.sign, "sign gone; back to idle");
                self.behavior = Behavior::idle();
                return None;
            }
        };

        if let Some(threat) = self.pursuer_position(space)
            && space.distance(self.position, threat) <= config.detection_range
            && rng.random_bool(config.dance_escape_chance)
        {
            debug!(follower = ?self.id, "dance broken off to flee");
            self.behavior = Behavior::Fleeing;
            return None;
        }

        dance.radius =
            (dance.radius - config.dance_radius_decrease_rate * dt).max(config.min_dance_radius);
        dance.angle += config.dance_speed * dt;
        let orbit = Position::new(
            sign_pos.x + dance.angle.cos() * dance.radius + config.pivot_offset.0,
            sign_pos.y + dance.angle.sin() * dance.radius + config.pivot_offset.1,
        );
        let direction = self.position.direction_to(orbit);
        self.position = self.position.offset(direction, config.move_speed * dt);
        if direction != (0.0, 0.0) {
            self.heading = ease_heading(
                self.heading,
                heading_of(direction),
                config.rotation_speed * dt,
            );
        }
        self.behavior = Behavior::Dancing(dance);

        if space.distance(self.position, sign_pos) < config.dance_completion_distance {
            return Some(self.complete_dance(dance.sign, space, config, rng));
        }
        None
    }

    fn complete_dance(
        &mut self,
        sign: SignId,
        space: &dyn SpatialQuery,
        config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) -> DanceCompletion {
        let count = sample_count(rng, config.min_spawn_count, config.max_spawn_count);
        let offspring = (0..count)
            .map(|_| space.clamp_to_bounds(random_in_disc(rng, self.position, config.offspring_scatter)))
            .collect();
        debug!(follower = ?self.id, ?sign, count, "dance completed");
        self.terminated = true;
        DanceCompletion { sign, offspring }
    }

    fn handle_fleeing(&mut self, dt: f32, space: &dyn SpatialQuery, config: &FollowerConfig) {
        let Some(threat) = self.pursuer_position(space) else {
            self.behavior = Behavior::idle();
            return;
        };
        let mut away = threat.direction_to(self.position);
        if away == (0.0, 0.0) {
            away = (self.heading.cos(), self.heading.sin());
        }
        self.position = self.position.offset(away, config.flee_speed * dt);
        self.heading = ease_heading(self.heading, heading_of(away), config.rotation_speed * dt);

        if space.distance(self.position, threat) > config.detection_range * config.flee_release_factor
        {
            debug!(follower = ?self.id, "escaped pursuer");
            self.behavior = Behavior::idle();
        }
    }

    /// Look around and pick Fleeing or Dancing when warranted. Suppressed
    /// while in cooldown. Returns whether a transition happened.
    pub fn check_environment(&mut self, space: &dyn SpatialQuery, config: &FollowerConfig) -> bool {
        if self.in_cooldown() {
            return false;
        }

        if let Some(threat) = self.pursuer_position(space)
            && space.distance(self.position, threat) <= config.detection_range
        {
            debug!(follower = ?self.id, "pursuer spotted; fleeing");
            self.behavior = Behavior::Fleeing;
            return true;
        }

        for candidate in space.query_by_tag(self.position, config.detection_range, Tag::Sign) {
            let EntityRef::Sign(sign) = candidate else {
                continue;
            };
            if !space.sign_accepts_dancers(sign) {
                continue;
            }
            let Some(sign_pos) = space.position_of(candidate) else {
                continue;
            };
            let crowd = space
                .query_followers(sign_pos, config.detection_range)
                .iter()
                .any(|other| other.id != self.id && other.dancing_at == Some(sign));
            if crowd {
                debug!(follower = ?self.id, ?sign, "joining dance");
                self.start_dance(sign, config);
                return true;
            }
            if !self.is_dancing() {
                debug!(follower = ?self.id, ?sign, "starting new dance");
                self.start_dance(sign, config);
                return true;
            }
        }
        false
    }

    fn start_dance(&mut self, sign: SignId, config: &FollowerConfig) {
        self.behavior = Behavior::Dancing(Dance {
            sign,
            radius: config.initial_dance_radius,
            angle: 0.0,
        });
    }

    fn pursuer_position(&self, space: &dyn SpatialQuery) -> Option<Position> {
        self.pursuer
            .and_then(|id| space.position_of(EntityRef::Pursuer(id)))
    }

    fn step_towards(&mut self, target: Position, max_step: f32, turn: f32) {
        let direction = self.position.direction_to(target);
        if direction == (0.0, 0.0) {
            return;
        }
        self.heading = ease_heading(self.heading, heading_of(direction), turn);
        let step = max_step.min(self.position.distance_to(target));
        self.position = self.position.offset(direction, step);
    }

    fn integrate_velocity(&mut self, dt: f32, config: &FollowerConfig) {
        if self.velocity == (0.0, 0.0) {
            return;
        }
        self.position.x += self.velocity.0 * dt;
        self.position.y += self.velocity.1 * dt;
        let keep = (1.0 - config.linear_damping * dt).max(0.0);
        self.velocity.0 *= keep;
        self.velocity.1 *= keep;
        if self.velocity.0.abs() < 1e-4 && self.velocity.1.abs() < 1e-4 {
            self.velocity = (0.0, 0.0);
        }
    }

    #[must_use]
    pub fn view(&self) -> FollowerView {
        FollowerView {
            position: self.position,
            heading: self.heading,
            state: self.state(),
            in_cooldown: self.in_cooldown(),
            dancing_at: self.dancing_at(),
            dance_radius: self.dance_radius(),
        }
    }
}
