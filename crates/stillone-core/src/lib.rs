//! Core types for the Still One ecosystem: followers that dance around signs,
//! the pursuer that hunts them, and the population manager that keeps both
//! bounded.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

pub mod config;
pub mod control;
pub mod follower;
pub mod perception;
pub mod population;
pub mod pursuer;
pub mod sign;
pub mod world;

pub use config::{
    EcosystemConfig, FollowerConfig, PopulationConfig, PursuerConfig, SignConfig, WorldBounds,
};
pub use control::{ControlCommand, apply_control_command};
pub use follower::{DanceCompletion, Follower, FollowerState, FollowerView};
pub use perception::{Perception, SpatialQuery};
pub use population::{PopulationManager, SpawnError, SpawnReport};
pub use pursuer::{ContactOutcome, Pursuer, PursuerState, PursuerView};
pub use sign::{Sign, SignView};
pub use world::{EcosystemWorld, TickEffects, TickSummary, WorldError, WorldSnapshot};

new_key_type! {
    /// Generational handle for follower agents.
    pub struct FollowerId;
    /// Generational handle for sign markers.
    pub struct SignId;
    /// Generational handle for pursuer agents.
    pub struct PursuerId;
}

const FULL_TURN: f32 = std::f32::consts::TAU;
const HALF_TURN: f32 = std::f32::consts::PI;

fn wrap_signed_angle(mut angle: f32) -> f32 {
    if angle.is_nan() {
        return 0.0;
    }
    while angle <= -HALF_TURN {
        angle += FULL_TURN;
    }
    while angle > HALF_TURN {
        angle -= FULL_TURN;
    }
    angle
}

/// Rotate `current` toward `target` by `factor` of the shortest arc.
/// `factor` is clamped to `[0, 1]`; 1 snaps to the target.
#[must_use]
pub fn ease_heading(current: f32, target: f32, factor: f32) -> f32 {
    let delta = wrap_signed_angle(target - current);
    wrap_signed_angle(current + delta * factor.clamp(0.0, 1.0))
}

/// Simulation clock (ticks processed since the world was created).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Point on the simulation plane.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        stillone_index::distance(self.into(), other.into())
    }

    /// Unit vector pointing from `self` toward `target`, or zero when the
    /// points coincide.
    #[must_use]
    pub fn direction_to(self, target: Self) -> (f32, f32) {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            (0.0, 0.0)
        } else {
            (dx / len, dy / len)
        }
    }

    /// Translate by `direction * amount`.
    #[must_use]
    pub fn offset(self, direction: (f32, f32), amount: f32) -> Self {
        Self::new(self.x + direction.0 * amount, self.y + direction.1 * amount)
    }

    /// Returns true when both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Position> for (f32, f32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

/// Heading (radians) of a direction vector.
#[must_use]
pub fn heading_of(direction: (f32, f32)) -> f32 {
    direction.1.atan2(direction.0)
}

/// Category label used by tag queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Follower,
    Sign,
    Pursuer,
}

/// Non-owning reference to any simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Follower(FollowerId),
    Sign(SignId),
    Pursuer(PursuerId),
}

/// Uniform sample from `[lo, hi)`; collapses to `lo` when the span is empty.
pub(crate) fn sample_span(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform sample from the integer range `[lo, hi)`; yields `lo` when empty.
pub(crate) fn sample_count(rng: &mut dyn RngCore, lo: u32, hi: u32) -> u32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Uniform point inside a disc of `radius` centred on `center`.
pub(crate) fn random_in_disc(rng: &mut dyn RngCore, center: Position, radius: f32) -> Position {
    if radius <= 0.0 {
        return center;
    }
    let angle = rng.random_range(0.0..FULL_TURN);
    let dist = radius * rng.random::<f32>().sqrt();
    Position::new(center.x + dist * angle.cos(), center.y + dist * angle.sin())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_heading_takes_the_short_way_round() {
        let current = 3.0;
        let target = -3.0;
        let eased = ease_heading(current, target, 0.5);
        assert!(eased.abs() > 3.0, "expected to cross pi, got {eased}");
        assert!((ease_heading(0.2, 1.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn direction_to_handles_coincident_points() {
        let p = Position::new(1.0, 1.0);
        assert_eq!(p.direction_to(p), (0.0, 0.0));
        let (dx, dy) = p.direction_to(Position::new(4.0, 5.0));
        assert!((dx - 0.6).abs() < 1e-6 && (dy - 0.8).abs() < 1e-6);
    }

    #[test]
    fn empty_spans_collapse_to_lower_bound() {
        let mut rng = test_support::ScriptedRng::always_high();
        assert_eq!(sample_count(&mut rng, 2, 2), 2);
        assert_eq!(sample_span(&mut rng, 0.7, 0.7), 0.7);
    }
}
