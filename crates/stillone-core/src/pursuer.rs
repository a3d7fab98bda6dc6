//! The pursuer: wanders, chases followers, and splits into a fresh clone
//! after enough contacts before fading out.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PursuerConfig, WorldBounds};
use crate::perception::SpatialQuery;
use crate::{EntityRef, FollowerId, Position, ease_heading, heading_of, random_in_disc};

/// Reported pursuer state. `Dying` overrides the behavioural state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PursuerState {
    #[default]
    Wandering,
    Chasing,
    Still,
    Ritual,
    Dying,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Behavior {
    Wandering,
    Chasing(FollowerId),
    Still { elapsed: f32 },
    Ritual { elapsed: f32 },
}

/// Result of touching a follower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// Dying pursuers do not count contacts.
    Ignored,
    Counted(u32),
    /// Threshold reached: a clone belongs at `clone_at` and this pursuer has
    /// started dying.
    Split { clone_at: Position },
}

/// Read-only snapshot handed to hosts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PursuerView {
    pub position: Position,
    pub heading: f32,
    pub state: PursuerState,
    pub target: Option<FollowerId>,
    pub collision_count: u32,
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pursuer {
    position: Position,
    heading: f32,
    behavior: Behavior,
    wander_point: Option<Position>,
    collision_count: u32,
    death_elapsed: Option<f32>,
    destroyed: bool,
}

impl Pursuer {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            heading: 0.0,
            behavior: Behavior::Wandering,
            wander_point: None,
            collision_count: 0,
            death_elapsed: None,
            destroyed: false,
        }
    }

    /// A fresh pursuer at `position` sharing this one's heading, with its
    /// contact counter and death overlay cleared.
    #[must_use]
    pub fn spawn_clone(&self, position: Position) -> Self {
        Self {
            heading: self.heading,
            ..Self::new(position)
        }
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
    pub const fn state(&self) -> PursuerState {
        if self.death_elapsed.is_some() {
            return PursuerState::Dying;
        }
        match self.behavior {
            Behavior::Wandering => PursuerState::Wandering,
            Behavior::Chasing(_) => PursuerState::Chasing,
            Behavior::Still { .. } => PursuerState::Still,
            Behavior::Ritual { .. } => PursuerState::Ritual,
        }
    }

    /// Follower currently being chased.
    #[must_use]
    pub const fn target(&self) -> Option<FollowerId> {
        match self.behavior {
            Behavior::Chasing(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn collision_count(&self) -> u32 {
        self.collision_count
    }

    #[must_use]
    pub const fn is_dying(&self) -> bool {
        self.death_elapsed.is_some()
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Remaining visual fraction: 1 while alive, falling linearly to 0 over
    /// the death duration.
    #[must_use]
    pub fn fade(&self, config: &PursuerConfig) -> f32 {
        match self.death_elapsed {
            Some(elapsed) => (1.0 - elapsed / config.death_duration).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Pause in place for the configured still duration.
    pub fn enter_still(&mut self) -> bool {
        if self.is_dying() {
            return false;
        }
        self.behavior = Behavior::Still { elapsed: 0.0 };
        true
    }

    /// Hold the ritual pose for the configured ritual duration.
    pub fn begin_ritual(&mut self) -> bool {
        if self.is_dying() {
            return false;
        }
        self.behavior = Behavior::Ritual { elapsed: 0.0 };
        true
    }

    /// Count a follower contact. Splits once, on the contact that reaches
    /// the threshold; afterwards the pursuer is dying and ignores contacts.
    pub fn register_contact(
        &mut self,
        config: &PursuerConfig,
        rng: &mut dyn RngCore,
    ) -> ContactOutcome {
        if self.is_dying() || self.destroyed {
            return ContactOutcome::Ignored;
        }
        self.collision_count += 1;
        if self.collision_count < config.collision_threshold {
            return ContactOutcome::Counted(self.collision_count);
        }
        let clone_at = random_in_disc(rng, self.position, config.spawn_offset);
        self.death_elapsed = Some(0.0);
        debug!(contacts = self.collision_count, "pursuer splitting");
        ContactOutcome::Split { clone_at }
    }

    /// Advance one tick. Returns `true` exactly once, when the death fade
    /// completes.
    pub fn update(
        &mut self,
        dt: f32,
        space: &dyn SpatialQuery,
        bounds: &WorldBounds,
        config: &PursuerConfig,
        rng: &mut dyn RngCore,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        if let Some(elapsed) = self.death_elapsed {
            let elapsed = elapsed + dt;
            self.death_elapsed = Some(elapsed);
            if elapsed >= config.death_duration {
                self.destroyed = true;
                return true;
            }
            return false;
        }

        match self.behavior {
            Behavior::Wandering => self.handle_wandering(dt, space, bounds, config, rng),
            Behavior::Chasing(target) => self.handle_chasing(target, dt, space, config),
            Behavior::Still { elapsed } => {
                let elapsed = elapsed + dt;
                self.behavior = if elapsed >= config.still_duration {
                    Behavior::Wandering
                } else {
                    Behavior::Still { elapsed }
                };
            }
            Behavior::Ritual { elapsed } => {
                let elapsed = elapsed + dt;
                self.behavior = if elapsed >= config.ritual_duration {
                    Behavior::Wandering
                } else {
                    Behavior::Ritual { elapsed }
                };
            }
        }
        false
    }

    fn handle_wandering(
        &mut self,
        dt: f32,
        space: &dyn SpatialQuery,
        bounds: &WorldBounds,
        config: &PursuerConfig,
        rng: &mut dyn RngCore,
    ) {
        if let Some(prey) = space
            .query_followers(self.position, config.detection_range)
            .first()
        {
            debug!(prey = ?prey.id, "pursuer acquired target");
            self.behavior = Behavior::Chasing(prey.id);
        }

        let wander_point = *self.wander_point.get_or_insert_with(|| bounds.sample(rng));
        self.steer(wander_point, config.move_speed * dt, config.rotation_speed * dt, space);
        if space.distance(self.position, wander_point) < config.wander_arrival_distance {
            self.wander_point = Some(bounds.sample(rng));
        }
    }

    fn handle_chasing(
        &mut self,
        target: FollowerId,
        dt: f32,
        space: &dyn SpatialQuery,
        config: &PursuerConfig,
    ) {
        let Some(prey) = space.position_of(EntityRef::Follower(target)) else {
            debug!(prey = ?target, "target vanished; wandering");
            self.behavior = Behavior::Wandering;
            return;
        };
        self.steer(prey, config.chase_speed * dt, config.rotation_speed * dt, space);
        if space.distance(self.position, prey) > config.detection_range {
            debug!(prey = ?target, "target escaped; wandering");
            self.behavior = Behavior::Wandering;
        }
    }

    fn steer(&mut self, goal: Position, max_step: f32, turn: f32, space: &dyn SpatialQuery) {
        let direction = self.position.direction_to(goal);
        if direction == (0.0, 0.0) {
            return;
        }
        self.heading = ease_heading(self.heading, heading_of(direction), turn);
        let step = max_step.min(self.position.distance_to(goal));
        self.position = space.clamp_to_bounds(self.position.offset(direction, step));
    }

    #[must_use]
    pub fn view(&self, config: &PursuerConfig) -> PursuerView {
        let fade = self.fade(config);
        PursuerView {
            position: self.position,
            heading: self.heading,
            state: self.state(),
            target: self.target(),
            collision_count: self.collision_count,
            scale: fade,
            opacity: fade,
        }
    }
}
