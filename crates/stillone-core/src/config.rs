//! Tunable parameters for the ecosystem and their validation.

use rand::{RngCore, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::Position;
use crate::world::WorldError;

/// Playable rectangle. Every agent is kept inside it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_x: -16.0,
            max_x: 16.0,
            min_y: -9.0,
            max_y: 9.0,
        }
    }
}

impl WorldBounds {
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Clamp a position into the rectangle.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.min_x, self.max_x),
            pos.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Whether `pos` lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_y..=self.max_y).contains(&pos.y)
    }

    /// Uniformly sample a point inside the rectangle.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Position {
        Position::new(
            crate::sample_span(rng, self.min_x, self.max_x),
            crate::sample_span(rng, self.min_y, self.max_y),
        )
    }

    fn validate(&self) -> Result<(), WorldError> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(WorldError::InvalidConfig("bounds must be finite"));
        }
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(WorldError::InvalidConfig("bounds minimum exceeds maximum"));
        }
        Ok(())
    }
}

/// Spawn cadence and caps owned by the population manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    /// Followers spawned when the world is created.
    pub initial_follower_count: usize,
    /// Time units between timed follower spawns.
    pub follower_spawn_interval: f32,
    /// Hard cap on live followers.
    pub max_follower_count: usize,
    /// Signs spawned when the world is created.
    pub initial_sign_count: usize,
    /// Time units between timed sign spawns.
    pub sign_spawn_interval: f32,
    /// Hard cap on live signs.
    pub max_sign_count: usize,
    /// Preferred clearance between a new entity and every live follower/sign.
    pub min_spawn_distance: f32,
    /// Rejection-sampling budget before accepting the last sample.
    pub spawn_attempts: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_follower_count: 10,
            follower_spawn_interval: 2.0,
            max_follower_count: 50,
            initial_sign_count: 3,
            sign_spawn_interval: 5.0,
            max_sign_count: 8,
            min_spawn_distance: 3.0,
            spawn_attempts: 10,
        }
    }
}

/// Follower movement, dance, and reproduction parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FollowerConfig {
    pub move_speed: f32,
    /// Fraction of the heading gap closed per time unit.
    pub rotation_speed: f32,
    /// Range for noticing the pursuer and nearby signs.
    pub detection_range: f32,
    /// Angular speed (radians per time unit) of the dance orbit.
    pub dance_speed: f32,
    pub flee_speed: f32,
    /// Time after creation during which dance/flee triggers are ignored.
    pub spawn_cooldown: f32,
    /// Constant offset added to every orbit target.
    pub pivot_offset: (f32, f32),
    pub min_idle_time: f32,
    pub max_idle_time: f32,
    pub initial_dance_radius: f32,
    pub min_dance_radius: f32,
    /// Orbit radius lost per time unit while dancing.
    pub dance_radius_decrease_rate: f32,
    /// Per-tick chance to abandon a dance while the pursuer is in range.
    pub dance_escape_chance: f64,
    /// Distance to the sign centre that completes the ritual.
    pub dance_completion_distance: f32,
    /// Distance at which a wander target counts as reached.
    pub arrival_epsilon: f32,
    /// Offspring count is drawn from `[min_spawn_count, max_spawn_count)`.
    pub min_spawn_count: u32,
    pub max_spawn_count: u32,
    /// Radius of the disc offspring are scattered into.
    pub offspring_scatter: f32,
    /// Fleeing ends once the pursuer is farther than this many detection ranges.
    pub flee_release_factor: f32,
    /// Collision radius used for follower-follower pushes.
    pub body_radius: f32,
    /// Impulse applied to each follower of an overlapping pair.
    pub collision_force: f32,
    /// Fraction of velocity shed per time unit.
    pub linear_damping: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            rotation_speed: 5.0,
            detection_range: 10.0,
            dance_speed: 3.0,
            flee_speed: 12.0,
            spawn_cooldown: 7.0,
            pivot_offset: (0.0, 0.0),
            min_idle_time: 0.3,
            max_idle_time: 1.5,
            initial_dance_radius: 5.0,
            min_dance_radius: 1.0,
            dance_radius_decrease_rate: 0.1,
            dance_escape_chance: 0.1,
            dance_completion_distance: 0.5,
            arrival_epsilon: 0.1,
            min_spawn_count: 1,
            max_spawn_count: 3,
            offspring_scatter: 2.0,
            flee_release_factor: 1.5,
            body_radius: 0.5,
            collision_force: 5.0,
            linear_damping: 4.0,
        }
    }
}

/// Pursuer movement and lifecycle parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PursuerConfig {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub chase_speed: f32,
    pub detection_range: f32,
    /// Centre distance at which a follower counts as touched.
    pub attack_range: f32,
    pub wander_arrival_distance: f32,
    /// Radius of the disc the split clone appears in.
    pub spawn_offset: f32,
    /// Follower contacts that trigger a split.
    pub collision_threshold: u32,
    pub death_duration: f32,
    pub still_duration: f32,
    pub ritual_duration: f32,
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 2.0,
            chase_speed: 8.0,
            detection_range: 20.0,
            attack_range: 1.0,
            wander_arrival_distance: 1.0,
            spawn_offset: 2.0,
            collision_threshold: 10,
            death_duration: 20.0,
            still_duration: 5.0,
            ritual_duration: 10.0,
        }
    }
}

/// Sign fade-out rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignConfig {
    /// Degrees per time unit while disappearing.
    pub rotation_speed: f32,
    pub shrink_speed: f32,
    pub fade_speed: f32,
    /// Centre distance at which the pursuer touches the sign.
    pub touch_radius: f32,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 180.0,
            shrink_speed: 1.0,
            fade_speed: 1.0,
            touch_radius: 1.0,
        }
    }
}

/// Static configuration for an ecosystem world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EcosystemConfig {
    pub bounds: WorldBounds,
    /// Optional RNG seed; `None` draws one from entropy.
    pub rng_seed: Option<u64>,
    /// Maximum number of recent tick summaries retained in memory.
    pub history_capacity: usize,
    /// Pursuers placed when the world is created.
    pub initial_pursuer_count: usize,
    pub population: PopulationConfig,
    pub follower: FollowerConfig,
    pub pursuer: PursuerConfig,
    pub sign: SignConfig,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            rng_seed: None,
            history_capacity: 256,
            initial_pursuer_count: 1,
            population: PopulationConfig::default(),
            follower: FollowerConfig::default(),
            pursuer: PursuerConfig::default(),
            sign: SignConfig::default(),
        }
    }
}

fn positive(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite() && *v > 0.0)
}

fn non_negative(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite() && *v >= 0.0)
}

impl EcosystemConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), WorldError> {
        self.bounds.validate()?;

        let pop = &self.population;
        if !positive(&[pop.follower_spawn_interval, pop.sign_spawn_interval]) {
            return Err(WorldError::InvalidConfig("spawn intervals must be positive"));
        }
        if !non_negative(&[pop.min_spawn_distance]) {
            return Err(WorldError::InvalidConfig(
                "min_spawn_distance must be non-negative",
            ));
        }
        if pop.spawn_attempts == 0 {
            return Err(WorldError::InvalidConfig("spawn_attempts must be non-zero"));
        }

        let f = &self.follower;
        if !positive(&[
            f.move_speed,
            f.rotation_speed,
            f.detection_range,
            f.flee_speed,
            f.dance_completion_distance,
            f.arrival_epsilon,
            f.flee_release_factor,
        ]) {
            return Err(WorldError::InvalidConfig(
                "follower speeds, ranges and thresholds must be positive",
            ));
        }
        if !non_negative(&[
            f.dance_speed,
            f.spawn_cooldown,
            f.min_idle_time,
            f.max_idle_time,
            f.initial_dance_radius,
            f.min_dance_radius,
            f.dance_radius_decrease_rate,
            f.offspring_scatter,
            f.body_radius,
            f.collision_force,
            f.linear_damping,
        ]) || !f.pivot_offset.0.is_finite()
            || !f.pivot_offset.1.is_finite()
        {
            return Err(WorldError::InvalidConfig(
                "follower timings, radii and forces must be non-negative",
            ));
        }
        if f.min_idle_time > f.max_idle_time {
            return Err(WorldError::InvalidConfig(
                "min_idle_time cannot exceed max_idle_time",
            ));
        }
        if f.min_dance_radius > f.initial_dance_radius {
            return Err(WorldError::InvalidConfig(
                "min_dance_radius cannot exceed initial_dance_radius",
            ));
        }
        if f.min_spawn_count > f.max_spawn_count {
            return Err(WorldError::InvalidConfig(
                "min_spawn_count cannot exceed max_spawn_count",
            ));
        }
        if !(0.0..=1.0).contains(&f.dance_escape_chance) {
            return Err(WorldError::InvalidConfig(
                "dance_escape_chance must be within [0, 1]",
            ));
        }

        let p = &self.pursuer;
        if !positive(&[
            p.move_speed,
            p.rotation_speed,
            p.chase_speed,
            p.detection_range,
            p.attack_range,
            p.wander_arrival_distance,
            p.death_duration,
        ]) || !non_negative(&[p.spawn_offset, p.still_duration, p.ritual_duration])
        {
            return Err(WorldError::InvalidConfig(
                "pursuer speeds, ranges and durations must be positive",
            ));
        }
        if p.collision_threshold == 0 {
            return Err(WorldError::InvalidConfig(
                "collision_threshold must be non-zero",
            ));
        }

        let s = &self.sign;
        if !positive(&[s.touch_radius])
            || !non_negative(&[s.rotation_speed.abs(), s.shrink_speed, s.fade_speed])
        {
            return Err(WorldError::InvalidConfig(
                "sign touch radius must be positive and fade rates non-negative",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG, drawing a seed from entropy if absent.
    pub(crate) fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EcosystemConfig::default().validate().expect("defaults");
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = EcosystemConfig {
            bounds: WorldBounds::new(5.0, -5.0, 0.0, 1.0),
            ..EcosystemConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn escape_chance_must_be_a_probability() {
        let mut config = EcosystemConfig::default();
        config.follower.dance_escape_chance = 1.5;
        assert!(config.validate().is_err());
        config.follower.dance_escape_chance = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_collision_threshold_is_rejected() {
        let mut config = EcosystemConfig::default();
        config.pursuer.collision_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: EcosystemConfig =
            serde_json::from_str(r#"{"population": {"max_follower_count": 12}}"#)
                .expect("parse");
        assert_eq!(config.population.max_follower_count, 12);
        assert_eq!(config.population.max_sign_count, 8);
        assert_eq!(config.follower, FollowerConfig::default());
    }

    #[test]
    fn clamp_and_sample_stay_inside_bounds() {
        use rand::SeedableRng;
        let bounds = WorldBounds::new(-2.0, 2.0, -1.0, 1.0);
        assert_eq!(
            bounds.clamp(Position::new(10.0, -10.0)),
            Position::new(2.0, -1.0)
        );
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            assert!(bounds.contains(bounds.sample(&mut rng)));
        }
    }
}
