//! The ecosystem world: owns every agent and runs the staged tick pipeline.

use std::collections::{HashSet, VecDeque};

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use stillone_index::{BruteForceIndex, ProximityIndex};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EcosystemConfig;
use crate::follower::{DanceCompletion, FollowerView};
use crate::perception::Perception;
use crate::population::{PopulationManager, SpawnError, log_spawn};
use crate::pursuer::{ContactOutcome, Pursuer, PursuerView};
use crate::sign::SignView;
use crate::{FollowerId, Position, PursuerId, SignId, Tick};

/// Errors raised when constructing or reconfiguring a world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Side effects gathered while agents update, applied once every agent has
/// finished reading the tick's perception.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickEffects {
    /// Dancers that reached their sign, with the offspring they produced.
    pub completions: Vec<(FollowerId, DanceCompletion)>,
    /// Followers touched by a pursuer.
    pub caught: Vec<FollowerId>,
    /// Pursuers that reached their contact threshold and where their clone goes.
    pub splits: Vec<(PursuerId, Position)>,
    /// Signs a live pursuer overlapped.
    pub touched_signs: Vec<SignId>,
    /// Separation pushes between overlapping followers.
    pub impulses: Vec<(FollowerId, (f32, f32), f32)>,
    /// Pursuers whose death fade completed.
    pub expired_pursuers: Vec<PursuerId>,
}

/// Summary of one processed tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: Tick,
    pub followers: usize,
    pub signs: usize,
    pub pursuers: usize,
    /// Followers registered this tick (offspring plus timed spawns).
    pub births: usize,
    /// Followers retired this tick (completed dances plus pursuer contacts).
    pub deaths: usize,
    pub splits: usize,
    pub signs_dissolved: usize,
}

/// Serializable picture of every live entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub followers: Vec<(FollowerId, FollowerView)>,
    pub signs: Vec<(SignId, SignView)>,
    pub pursuers: Vec<(PursuerId, PursuerView)>,
}

/// Simulation state container.
#[derive(Debug)]
pub struct EcosystemWorld {
    config: EcosystemConfig,
    tick: Tick,
    rng: SmallRng,
    population: PopulationManager,
    pursuers: SlotMap<PursuerId, Pursuer>,
    history: VecDeque<TickSummary>,
}

impl EcosystemWorld {
    /// Validate `config` and seed the initial population: pursuers first so
    /// every initial follower is born tracking the lead pursuer, then signs,
    /// then followers.
    pub fn new(config: EcosystemConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let rng = config.seeded_rng();
        let mut world = Self {
            population: PopulationManager::new(config.population.clone()),
            pursuers: SlotMap::with_key(),
            history: VecDeque::with_capacity(config.history_capacity),
            tick: Tick::default(),
            rng,
            config,
        };

        for _ in 0..world.config.initial_pursuer_count {
            let position = world.config.bounds.sample(&mut world.rng);
            world.spawn_pursuer_at(position);
        }
        for _ in 0..world.config.population.initial_sign_count {
            log_spawn(world.spawn_sign(), "sign");
        }
        for _ in 0..world.config.population.initial_follower_count {
            log_spawn(world.spawn_follower(), "follower");
        }

        info!(
            followers = world.population.follower_count(),
            signs = world.population.sign_count(),
            pursuers = world.pursuers.len(),
            "ecosystem initialised"
        );
        Ok(world)
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    /// Swap in a new configuration. The RNG keeps its current stream; the
    /// seed only applies at construction.
    pub fn update_config(&mut self, config: EcosystemConfig) -> Result<(), WorldError> {
        config.validate()?;
        let (followers, signs) = self.population.set_config(config.population.clone());
        if followers > 0 || signs > 0 {
            info!(followers, signs, "lowered caps retired live entities");
        }
        while self.history.len() > config.history_capacity {
            self.history.pop_front();
        }
        self.config = config;
        info!("configuration updated");
        Ok(())
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    #[must_use]
    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    /// Mutable access for hosts that place entities directly.
    pub fn population_mut(&mut self) -> &mut PopulationManager {
        &mut self.population
    }

    #[must_use]
    pub fn pursuer(&self, id: PursuerId) -> Option<&Pursuer> {
        self.pursuers.get(id)
    }

    pub fn pursuer_mut(&mut self, id: PursuerId) -> Option<&mut Pursuer> {
        self.pursuers.get_mut(id)
    }

    pub fn pursuers(&self) -> impl Iterator<Item = (PursuerId, &Pursuer)> + '_ {
        self.pursuers.iter()
    }

    #[must_use]
    pub fn pursuer_count(&self) -> usize {
        self.pursuers.len()
    }

    /// Iterate over retained tick summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }

    /// Place a pursuer. It becomes the lead pursuer when there is none.
    pub fn spawn_pursuer_at(&mut self, position: Position) -> PursuerId {
        let position = self.config.bounds.clamp(position);
        let id = self.pursuers.insert(Pursuer::new(position));
        if self
            .population
            .lead_pursuer()
            .is_none_or(|lead| !self.pursuers.contains_key(lead))
        {
            self.population.set_lead_pursuer(Some(id));
            let adopted = self.population.assign_untracked(id);
            if adopted > 0 {
                debug!(pursuer = ?id, adopted, "untracked followers assigned to new lead");
            }
        }
        debug!(pursuer = ?id, x = position.x, y = position.y, "spawned pursuer");
        id
    }

    /// Spawn a follower at a sampled position.
    pub fn spawn_follower(&mut self) -> Result<FollowerId, SpawnError> {
        self.population
            .spawn_follower(&self.config.bounds, &self.config.follower, &mut self.rng)
    }

    /// Spawn a sign at a sampled position.
    pub fn spawn_sign(&mut self) -> Result<SignId, SpawnError> {
        self.population.spawn_sign(&self.config.bounds, &mut self.rng)
    }

    /// Read-only views of every live entity.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            followers: self
                .population
                .followers()
                .map(|(id, f)| (id, f.view()))
                .collect(),
            signs: self
                .population
                .signs()
                .map(|(id, s)| (id, s.view()))
                .collect(),
            pursuers: self
                .pursuers
                .iter()
                .map(|(id, p)| (id, p.view(&self.config.pursuer)))
                .collect(),
        }
    }

    /// Execute one tick of `dt` time units.
    pub fn step(&mut self, dt: f32) -> TickSummary {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "ignoring invalid time delta");
            0.0
        };
        let mut summary = TickSummary::default();
        let mut effects = TickEffects::default();

        let perception = self.stage_perceive();
        self.stage_followers(dt, &perception, &mut effects);
        self.stage_pursuers(dt, &perception, &mut effects);
        self.stage_contacts(&mut effects);
        self.stage_apply_effects(effects, &mut summary);
        self.stage_sign_fade(dt, &mut summary);
        self.stage_population(dt, &mut summary);

        self.tick = self.tick.next();
        summary.tick = self.tick;
        summary.followers = self.population.follower_count();
        summary.signs = self.population.sign_count();
        summary.pursuers = self.pursuers.len();
        self.record(summary);
        summary
    }

    fn stage_perceive(&self) -> Perception {
        Perception::capture(
            self.config.bounds,
            self.population.followers(),
            self.population.signs(),
            self.pursuers.iter().filter(|(_, p)| !p.is_destroyed()),
        )
    }

    fn stage_followers(&mut self, dt: f32, perception: &Perception, effects: &mut TickEffects) {
        let bounds = self.config.bounds;
        for (id, follower) in self.population.followers_mut() {
            if let Some(completion) =
                follower.update(dt, perception, &bounds, &self.config.follower, &mut self.rng)
            {
                effects.completions.push((id, completion));
            }
        }
    }

    fn stage_pursuers(&mut self, dt: f32, perception: &Perception, effects: &mut TickEffects) {
        let bounds = self.config.bounds;
        for (id, pursuer) in &mut self.pursuers {
            if pursuer.update(dt, perception, &bounds, &self.config.pursuer, &mut self.rng) {
                effects.expired_pursuers.push(id);
            }
        }
    }

    /// Resolve overlaps using post-movement positions.
    fn stage_contacts(&mut self, effects: &mut TickEffects) {
        let followers: Vec<(FollowerId, Position)> = self
            .population
            .followers()
            .filter(|(_, f)| !f.is_terminated())
            .map(|(id, f)| (id, f.position()))
            .collect();
        let signs: Vec<(SignId, Position)> = self
            .population
            .signs()
            .filter(|(_, s)| s.accepts_dancers())
            .map(|(id, s)| (id, s.position()))
            .collect();

        let mut follower_index = BruteForceIndex::with_capacity(followers.len());
        let positions: Vec<(f32, f32)> = followers.iter().map(|(_, p)| (*p).into()).collect();
        if let Err(err) = follower_index.rebuild(&positions) {
            warn!(?err, "contact index rebuild failed; skipping contacts");
            return;
        }

        let mut caught: HashSet<FollowerId> = HashSet::new();
        let mut touched: HashSet<SignId> = HashSet::new();
        for (pursuer_id, pursuer) in &mut self.pursuers {
            if pursuer.is_destroyed() {
                continue;
            }
            let here = pursuer.position();
            for (sign, at) in &signs {
                if here.distance_to(*at) <= self.config.sign.touch_radius && touched.insert(*sign) {
                    effects.touched_signs.push(*sign);
                }
            }
            for (slot, _) in follower_index.within_sorted(here.into(), self.config.pursuer.attack_range)
            {
                let prey = followers[slot].0;
                if !caught.insert(prey) {
                    continue;
                }
                effects.caught.push(prey);
                if let ContactOutcome::Split { clone_at } =
                    pursuer.register_contact(&self.config.pursuer, &mut self.rng)
                {
                    effects.splits.push((pursuer_id, clone_at));
                    break;
                }
            }
        }

        let reach = 2.0 * self.config.follower.body_radius;
        if reach <= 0.0 || self.config.follower.collision_force <= 0.0 {
            return;
        }
        for (id, position) in &followers {
            if caught.contains(id) {
                continue;
            }
            for (slot, distance) in follower_index.within_sorted((*position).into(), reach) {
                let (other, other_pos) = followers[slot];
                if other == *id || distance.into_inner() >= reach {
                    continue;
                }
                let away = other_pos.direction_to(*position);
                if away != (0.0, 0.0) {
                    effects
                        .impulses
                        .push((*id, away, self.config.follower.collision_force));
                }
            }
        }
    }

    fn stage_apply_effects(&mut self, effects: TickEffects, summary: &mut TickSummary) {
        for (parent, completion) in effects.completions {
            if self.population.notify_follower_destroyed(parent) {
                summary.deaths += 1;
            }
            for position in completion.offspring {
                let spawned = self
                    .population
                    .spawn_follower_at(position, &self.config.follower);
                if log_spawn(spawned, "offspring").is_some() {
                    summary.births += 1;
                }
            }
        }

        for prey in effects.caught {
            if self.population.notify_follower_destroyed(prey) {
                debug!(follower = ?prey, "follower caught by pursuer");
                summary.deaths += 1;
            }
        }

        for (original, clone_at) in effects.splits {
            let Some(parent) = self.pursuers.get(original) else {
                continue;
            };
            let clone = parent.spawn_clone(self.config.bounds.clamp(clone_at));
            let clone_id = self.pursuers.insert(clone);
            let moved = self.population.hand_off_pursuer(original, clone_id);
            info!(?original, clone = ?clone_id, followers = moved, "pursuer split");
            summary.splits += 1;
        }

        for sign in effects.touched_signs {
            let started = self
                .population
                .sign_mut(sign)
                .is_some_and(|s| s.begin_disappearing());
            if started {
                let released = self.population.release_dancers(sign);
                debug!(?sign, released, "sign touched by pursuer");
            }
        }

        for (follower, direction, magnitude) in effects.impulses {
            if let Some(follower) = self.population.follower_mut(follower) {
                follower.apply_impulse(direction, magnitude);
            }
        }

        for expired in effects.expired_pursuers {
            self.retire_pursuer(expired);
        }
    }

    fn retire_pursuer(&mut self, id: PursuerId) {
        if self.pursuers.remove(id).is_none() {
            return;
        }
        if self.population.lead_pursuer() == Some(id) {
            let successor = self
                .pursuers
                .iter()
                .find(|(_, p)| !p.is_dying())
                .map(|(id, _)| id);
            self.population.set_lead_pursuer(successor);
        }
        info!(pursuer = ?id, remaining = self.pursuers.len(), "pursuer faded out");
    }

    fn stage_sign_fade(&mut self, dt: f32, summary: &mut TickSummary) {
        let dissolved: Vec<SignId> = self
            .population
            .signs_mut()
            .filter_map(|(id, sign)| sign.update(dt, &self.config.sign).then_some(id))
            .collect();
        for sign in dissolved {
            self.population.release_dancers(sign);
            if self.population.notify_sign_destroyed(sign) {
                debug!(?sign, "sign dissolved");
                summary.signs_dissolved += 1;
            }
        }
    }

    fn stage_population(&mut self, dt: f32, summary: &mut TickSummary) {
        let report = self.population.tick(
            dt,
            &self.config.bounds,
            &self.config.follower,
            &mut self.rng,
        );
        if report.follower.is_some() {
            summary.births += 1;
        }
    }

    fn record(&mut self, summary: TickSummary) {
        if self.config.history_capacity == 0 {
            return;
        }
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;
    use crate::follower::FollowerState;
    use crate::pursuer::PursuerState;

    /// Seeded world with nothing in it and timed spawning pushed far out.
    fn empty_config() -> EcosystemConfig {
        EcosystemConfig {
            rng_seed: Some(7),
            initial_pursuer_count: 0,
            population: PopulationConfig {
                initial_follower_count: 0,
                initial_sign_count: 0,
                follower_spawn_interval: 1_000.0,
                sign_spawn_interval: 1_000.0,
                ..PopulationConfig::default()
            },
            ..EcosystemConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EcosystemConfig::default();
        config.population.spawn_attempts = 0;
        assert!(matches!(
            EcosystemWorld::new(config),
            Err(WorldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn initial_population_tracks_the_lead_pursuer() {
        let config = EcosystemConfig {
            rng_seed: Some(11),
            ..EcosystemConfig::default()
        };
        let world = EcosystemWorld::new(config).expect("world");
        assert_eq!(world.population().follower_count(), 10);
        assert_eq!(world.population().sign_count(), 3);
        assert_eq!(world.pursuer_count(), 1);
        let lead = world.population().lead_pursuer().expect("lead");
        assert!(
            world
                .population()
                .followers()
                .all(|(_, f)| f.pursuer() == Some(lead))
        );
    }

    #[test]
    fn step_advances_tick_and_bounds_history() {
        let config = EcosystemConfig {
            history_capacity: 3,
            ..empty_config()
        };
        let mut world = EcosystemWorld::new(config).expect("world");
        for _ in 0..5 {
            world.step(0.1);
        }
        assert_eq!(world.tick(), Tick(5));
        let ticks: Vec<u64> = world.history().map(|s| s.tick.0).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn pursuer_contact_retires_the_follower() {
        let mut world = EcosystemWorld::new(empty_config()).expect("world");
        let pursuer = world.spawn_pursuer_at(Position::new(0.0, 0.0));
        let follower_config = world.config.follower.clone();
        let prey = world
            .population
            .spawn_follower_at(Position::new(0.2, 0.0), &follower_config)
            .expect("prey");

        let summary = world.step(0.01);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.followers, 0);
        assert!(world.population().follower(prey).is_none());
        assert_eq!(world.pursuer(pursuer).expect("pursuer").collision_count(), 1);
    }

    #[test]
    fn threshold_contact_splits_and_hands_off_trackers() {
        let mut config = empty_config();
        config.pursuer.collision_threshold = 1;
        let mut world = EcosystemWorld::new(config).expect("world");
        let original = world.spawn_pursuer_at(Position::new(0.0, 0.0));
        let follower_config = world.config.follower.clone();
        world
            .population
            .spawn_follower_at(Position::new(0.1, 0.0), &follower_config)
            .expect("prey");
        let bystander = world
            .population
            .spawn_follower_at(Position::new(12.0, 6.0), &follower_config)
            .expect("bystander");

        let summary = world.step(0.01);
        assert_eq!(summary.splits, 1);
        assert_eq!(summary.pursuers, 2);
        assert_eq!(
            world.pursuer(original).expect("original").state(),
            PursuerState::Dying
        );

        let clone = world.population().lead_pursuer().expect("lead");
        assert_ne!(clone, original);
        let clone_ref = world.pursuer(clone).expect("clone");
        assert_eq!(clone_ref.collision_count(), 0);
        assert!(!clone_ref.is_dying());
        assert!(clone_ref.position().distance_to(Position::new(0.0, 0.0)) <= 2.1);
        assert_eq!(
            world.population().follower(bystander).expect("bystander").pursuer(),
            Some(clone)
        );

        // The split fires once; the dying original ignores later contacts.
        let summary = world.step(0.01);
        assert_eq!(summary.splits, 0);
    }

    #[test]
    fn dying_pursuer_fades_out_and_is_removed() {
        let mut config = empty_config();
        config.pursuer.collision_threshold = 1;
        config.pursuer.death_duration = 0.5;
        let mut world = EcosystemWorld::new(config).expect("world");
        let original = world.spawn_pursuer_at(Position::new(0.0, 0.0));
        let follower_config = world.config.follower.clone();
        world
            .population
            .spawn_follower_at(Position::new(0.1, 0.0), &follower_config)
            .expect("prey");

        world.step(0.01);
        for _ in 0..10 {
            world.step(0.1);
        }
        assert!(world.pursuer(original).is_none());
        assert_eq!(world.pursuer_count(), 1);
        assert!(world.population().lead_pursuer().is_some());
    }

    #[test]
    fn pursuer_touch_releases_dancers_and_dissolves_the_sign() {
        let mut config = empty_config();
        config.follower.spawn_cooldown = 0.0;
        let mut world = EcosystemWorld::new(config).expect("world");
        let follower_config = world.config.follower.clone();
        let sign = world
            .population
            .spawn_sign_at(Position::new(0.0, 0.0))
            .expect("sign");
        let dancer = world
            .population
            .spawn_follower_at(Position::new(4.0, 0.0), &follower_config)
            .expect("dancer");
        let space = world.stage_perceive();
        assert!(
            world
                .population
                .follower_mut(dancer)
                .expect("dancer")
                .check_environment(&space, &follower_config)
        );

        world.spawn_pursuer_at(Position::new(0.3, 0.0));
        world.step(0.01);
        let follower = world.population().follower(dancer).expect("dancer");
        assert_ne!(follower.state(), FollowerState::Dancing);
        assert!(world.population().sign(sign).expect("sign").is_disappearing());

        let mut dissolved = 0;
        for _ in 0..20 {
            dissolved += world.step(0.1).signs_dissolved;
        }
        assert_eq!(dissolved, 1);
        assert!(world.population().sign(sign).is_none());
    }

    #[test]
    fn overlapping_followers_are_pushed_apart() {
        let mut world = EcosystemWorld::new(empty_config()).expect("world");
        let follower_config = world.config.follower.clone();
        let a = world
            .population
            .spawn_follower_at(Position::new(0.0, 0.0), &follower_config)
            .expect("a");
        let b = world
            .population
            .spawn_follower_at(Position::new(0.5, 0.0), &follower_config)
            .expect("b");

        world.step(0.05);
        world.step(0.05);
        let gap = world
            .population()
            .follower(a)
            .expect("a")
            .position()
            .distance_to(world.population().follower(b).expect("b").position());
        assert!(gap > 0.5, "gap {gap}");
    }

    #[test]
    fn non_finite_dt_is_treated_as_zero() {
        let mut world = EcosystemWorld::new(empty_config()).expect("world");
        let summary = world.step(f32::NAN);
        assert_eq!(summary.tick, Tick(1));
    }

    #[test]
    fn update_config_validates_and_trims_history() {
        let mut world = EcosystemWorld::new(empty_config()).expect("world");
        for _ in 0..4 {
            world.step(0.1);
        }
        let mut config = world.config().clone();
        config.history_capacity = 2;
        world.update_config(config.clone()).expect("valid");
        assert_eq!(world.history().count(), 2);

        config.sign.touch_radius = 0.0;
        assert!(world.update_config(config).is_err());
        assert_eq!(world.config().history_capacity, 2);
    }

    #[test]
    fn dying_pursuer_still_catches_and_touches() {
        let mut config = empty_config();
        config.pursuer.collision_threshold = 1;
        let mut world = EcosystemWorld::new(config).expect("world");
        let original = world.spawn_pursuer_at(Position::new(0.0, 0.0));
        let follower_config = world.config.follower.clone();
        world
            .population
            .spawn_follower_at(Position::new(0.1, 0.0), &follower_config)
            .expect("prey");
        assert_eq!(world.step(0.01).splits, 1);

        // Leave the fading original alone on the plane.
        let clone = world.population().lead_pursuer().expect("clone");
        world.retire_pursuer(clone);
        assert_eq!(world.pursuer_count(), 1);

        let sign = world
            .population
            .spawn_sign_at(Position::new(0.0, 0.5))
            .expect("sign");
        let late = world
            .population
            .spawn_follower_at(Position::new(0.3, 0.0), &follower_config)
            .expect("late");

        let summary = world.step(0.01);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.splits, 0);
        assert!(world.population().follower(late).is_none());
        assert!(world.population().sign(sign).expect("sign").is_disappearing());
        let dying = world.pursuer(original).expect("original");
        assert_eq!(dying.state(), PursuerState::Dying);
        assert_eq!(dying.collision_count(), 1);
    }

    #[test]
    fn lowering_caps_holds_the_population_under_them() {
        let config = EcosystemConfig {
            rng_seed: Some(5),
            ..EcosystemConfig::default()
        };
        let mut world = EcosystemWorld::new(config).expect("world");
        assert_eq!(world.population().follower_count(), 10);

        let mut lowered = world.config().clone();
        lowered.population.max_follower_count = 2;
        lowered.population.max_sign_count = 1;
        world.update_config(lowered).expect("valid");
        assert_eq!(world.population().follower_count(), 2);
        assert_eq!(world.population().sign_count(), 1);

        for _ in 0..60 {
            let summary = world.step(0.1);
            assert!(summary.followers <= 2, "followers {}", summary.followers);
            assert!(summary.signs <= 1, "signs {}", summary.signs);
        }
    }

    #[test]
    fn first_pursuer_adopts_untracked_followers() {
        let mut world = EcosystemWorld::new(empty_config()).expect("world");
        let follower_config = world.config.follower.clone();
        let follower = world
            .population
            .spawn_follower_at(Position::new(6.0, 0.0), &follower_config)
            .expect("follower");
        assert_eq!(world.population().follower(follower).expect("f").pursuer(), None);

        let lead = world.spawn_pursuer_at(Position::new(0.0, 0.0));
        assert_eq!(world.population().lead_pursuer(), Some(lead));
        assert_eq!(
            world.population().follower(follower).expect("f").pursuer(),
            Some(lead)
        );

        world.spawn_pursuer_at(Position::new(-6.0, 0.0));
        assert_eq!(world.population().lead_pursuer(), Some(lead));
        assert_eq!(
            world.population().follower(follower).expect("f").pursuer(),
            Some(lead)
        );
    }
}
