//! Bounded registries of followers and signs plus their timed spawning.
//!
//! Destruction is two-phase: `notify_*_destroyed` retires a handle at once
//! (it stops counting toward caps and disappears from every lookup), and
//! `prune` physically drops retired entries. Agents can therefore report
//! their own destruction mid-tick without disturbing any iteration.

use std::collections::BTreeSet;

use rand::RngCore;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::config::{FollowerConfig, PopulationConfig, WorldBounds};
use crate::follower::Follower;
use crate::sign::Sign;
use crate::{FollowerId, Position, PursuerId, SignId};

/// Reasons a spawn request produced no entity.
#[derive(Debug, Error, PartialEq)]
pub enum SpawnError {
    /// The registry already holds its configured maximum.
    #[error("population cap of {cap} reached")]
    AtCapacity { cap: usize },
    /// The requested position cannot be placed in the world.
    #[error("spawn position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f32, y: f32 },
}

/// Handles spawned by one `tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnReport {
    pub follower: Option<FollowerId>,
    pub sign: Option<SignId>,
}

/// Owner of every follower and sign.
#[derive(Debug)]
pub struct PopulationManager {
    config: PopulationConfig,
    followers: SlotMap<FollowerId, Follower>,
    signs: SlotMap<SignId, Sign>,
    retired_followers: BTreeSet<FollowerId>,
    retired_signs: BTreeSet<SignId>,
    follower_spawn_timer: f32,
    sign_spawn_timer: f32,
    lead_pursuer: Option<PursuerId>,
}

impl PopulationManager {
    #[must_use]
    pub fn new(config: PopulationConfig) -> Self {
        Self {
            followers: SlotMap::with_capacity_and_key(config.max_follower_count),
            signs: SlotMap::with_capacity_and_key(config.max_sign_count),
            config,
            retired_followers: BTreeSet::new(),
            retired_signs: BTreeSet::new(),
            follower_spawn_timer: 0.0,
            sign_spawn_timer: 0.0,
            lead_pursuer: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Swap in new caps and intervals. Live entities above a lowered cap are
    /// retired from the end of registry order. Returns `(followers, signs)`
    /// retired.
    pub fn set_config(&mut self, config: PopulationConfig) -> (usize, usize) {
        self.config = config;

        let surplus = self
            .follower_count()
            .saturating_sub(self.config.max_follower_count);
        let live: Vec<FollowerId> = self.followers().map(|(id, _)| id).collect();
        for &id in live.iter().rev().take(surplus) {
            self.notify_follower_destroyed(id);
        }

        let sign_surplus = self.sign_count().saturating_sub(self.config.max_sign_count);
        let live: Vec<SignId> = self.signs().map(|(id, _)| id).collect();
        for &id in live.iter().rev().take(sign_surplus) {
            self.release_dancers(id);
            self.notify_sign_destroyed(id);
        }

        if surplus > 0 || sign_surplus > 0 {
            debug!(
                followers = surplus,
                signs = sign_surplus,
                "retired entities above lowered caps"
            );
        }
        (surplus, sign_surplus)
    }

    /// Pursuer handed to newly registered followers.
    #[must_use]
    pub const fn lead_pursuer(&self) -> Option<PursuerId> {
        self.lead_pursuer
    }

    pub fn set_lead_pursuer(&mut self, pursuer: Option<PursuerId>) {
        self.lead_pursuer = pursuer;
    }

    /// Number of live (non-retired) followers.
    #[must_use]
    pub fn follower_count(&self) -> usize {
        self.followers.len() - self.retired_followers.len()
    }

    /// Number of live (non-retired) signs.
    #[must_use]
    pub fn sign_count(&self) -> usize {
        self.signs.len() - self.retired_signs.len()
    }

    #[must_use]
    pub fn follower(&self, id: FollowerId) -> Option<&Follower> {
        if self.retired_followers.contains(&id) {
            return None;
        }
        self.followers.get(id)
    }

    #[must_use]
    pub fn follower_mut(&mut self, id: FollowerId) -> Option<&mut Follower> {
        if self.retired_followers.contains(&id) {
            return None;
        }
        self.followers.get_mut(id)
    }

    #[must_use]
    pub fn sign(&self, id: SignId) -> Option<&Sign> {
        if self.retired_signs.contains(&id) {
            return None;
        }
        self.signs.get(id)
    }

    #[must_use]
    pub fn sign_mut(&mut self, id: SignId) -> Option<&mut Sign> {
        if self.retired_signs.contains(&id) {
            return None;
        }
        self.signs.get_mut(id)
    }

    /// Live followers in registry order.
    pub fn followers(&self) -> impl Iterator<Item = (FollowerId, &Follower)> + '_ {
        self.followers
            .iter()
            .filter(|(id, _)| !self.retired_followers.contains(id))
    }

    /// Mutable access to live followers in registry order.
    pub fn followers_mut(&mut self) -> impl Iterator<Item = (FollowerId, &mut Follower)> + '_ {
        let retired = &self.retired_followers;
        self.followers
            .iter_mut()
            .filter(move |(id, _)| !retired.contains(id))
    }

    /// Live signs in registry order.
    pub fn signs(&self) -> impl Iterator<Item = (SignId, &Sign)> + '_ {
        self.signs
            .iter()
            .filter(|(id, _)| !self.retired_signs.contains(id))
    }

    /// Mutable access to live signs in registry order.
    pub fn signs_mut(&mut self) -> impl Iterator<Item = (SignId, &mut Sign)> + '_ {
        let retired = &self.retired_signs;
        self.signs
            .iter_mut()
            .filter(move |(id, _)| !retired.contains(id))
    }

    /// Draw a spawn point, preferring one at least `min_spawn_distance` from
    /// every live follower and sign. After the attempt budget is spent the
    /// last sample is accepted as is.
    pub fn spawn_position(&self, bounds: &WorldBounds, rng: &mut dyn RngCore) -> Position {
        let min_distance = self.config.min_spawn_distance;
        let attempts = self.config.spawn_attempts.max(1);
        let mut candidate = bounds.sample(rng);
        for attempt in 1..=attempts {
            if attempt > 1 {
                candidate = bounds.sample(rng);
            }
            let clear_of_followers = self
                .followers()
                .all(|(_, f)| f.position().distance_to(candidate) >= min_distance);
            let clear_of_signs = self
                .signs()
                .all(|(_, s)| s.position().distance_to(candidate) >= min_distance);
            if clear_of_followers && clear_of_signs {
                return candidate;
            }
        }
        debug!(attempts, "no clear spawn point found; using last sample");
        candidate
    }

    /// Spawn a follower at a sampled position.
    pub fn spawn_follower(
        &mut self,
        bounds: &WorldBounds,
        follower_config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) -> Result<FollowerId, SpawnError> {
        self.ensure_follower_capacity()?;
        let position = self.spawn_position(bounds, rng);
        self.spawn_follower_at(position, follower_config)
    }

    /// Register a follower at an explicit position (offspring, commands).
    pub fn spawn_follower_at(
        &mut self,
        position: Position,
        follower_config: &FollowerConfig,
    ) -> Result<FollowerId, SpawnError> {
        self.ensure_follower_capacity()?;
        ensure_finite(position)?;
        let pursuer = self.lead_pursuer;
        let id = self
            .followers
            .insert_with_key(|id| Follower::new(id, position, pursuer, follower_config));
        debug!(follower = ?id, total = self.follower_count(), "spawned follower");
        Ok(id)
    }

    /// Spawn a sign at a sampled position.
    pub fn spawn_sign(
        &mut self,
        bounds: &WorldBounds,
        rng: &mut dyn RngCore,
    ) -> Result<SignId, SpawnError> {
        self.ensure_sign_capacity()?;
        let position = self.spawn_position(bounds, rng);
        self.spawn_sign_at(position)
    }

    /// Register a sign at an explicit position.
    pub fn spawn_sign_at(&mut self, position: Position) -> Result<SignId, SpawnError> {
        self.ensure_sign_capacity()?;
        ensure_finite(position)?;
        let id = self.signs.insert(Sign::new(position));
        debug!(sign = ?id, total = self.sign_count(), "spawned sign");
        Ok(id)
    }

    fn ensure_follower_capacity(&self) -> Result<(), SpawnError> {
        let cap = self.config.max_follower_count;
        if self.follower_count() >= cap {
            return Err(SpawnError::AtCapacity { cap });
        }
        Ok(())
    }

    fn ensure_sign_capacity(&self) -> Result<(), SpawnError> {
        let cap = self.config.max_sign_count;
        if self.sign_count() >= cap {
            return Err(SpawnError::AtCapacity { cap });
        }
        Ok(())
    }

    /// Retire a follower. Unknown or already retired handles are ignored.
    /// Returns whether this call retired it.
    pub fn notify_follower_destroyed(&mut self, id: FollowerId) -> bool {
        let Some(follower) = self.followers.get_mut(id) else {
            return false;
        };
        if !self.retired_followers.insert(id) {
            return false;
        }
        follower.terminate();
        true
    }

    /// Retire a sign. Unknown or already retired handles are ignored.
    /// Returns whether this call retired it.
    pub fn notify_sign_destroyed(&mut self, id: SignId) -> bool {
        if !self.signs.contains_key(id) {
            return false;
        }
        self.retired_signs.insert(id)
    }

    /// Release every live follower dancing around `sign`. Returns how many
    /// were released.
    pub fn release_dancers(&mut self, sign: SignId) -> usize {
        let mut released = 0;
        for (_, follower) in self.followers_mut() {
            if follower.dancing_at() == Some(sign) {
                follower.on_sign_disappearing();
                released += 1;
            }
        }
        released
    }

    /// Re-point followers tracking `from` at `to`, and make `to` the lead
    /// pursuer if `from` was.
    pub fn hand_off_pursuer(&mut self, from: PursuerId, to: PursuerId) -> usize {
        if self.lead_pursuer == Some(from) {
            self.lead_pursuer = Some(to);
        }
        let mut moved = 0;
        for follower in self.followers.values_mut() {
            if follower.pursuer() == Some(from) {
                follower.set_pursuer(Some(to));
                moved += 1;
            }
        }
        moved
    }

    /// Point every live follower that tracks no pursuer at `pursuer`.
    pub fn assign_untracked(&mut self, pursuer: PursuerId) -> usize {
        let mut assigned = 0;
        for (_, follower) in self.followers_mut() {
            if follower.pursuer().is_none() {
                follower.set_pursuer(Some(pursuer));
                assigned += 1;
            }
        }
        assigned
    }

    /// Physically drop retired entries. Returns `(followers, signs)` removed.
    pub fn prune(&mut self) -> (usize, usize) {
        let followers = std::mem::take(&mut self.retired_followers);
        for &id in &followers {
            self.followers.remove(id);
        }
        let signs = std::mem::take(&mut self.retired_signs);
        for &id in &signs {
            self.signs.remove(id);
        }
        (followers.len(), signs.len())
    }

    /// Prune, advance the spawn timers, and spawn at most one follower and
    /// one sign when their intervals have elapsed and caps allow.
    pub fn tick(
        &mut self,
        dt: f32,
        bounds: &WorldBounds,
        follower_config: &FollowerConfig,
        rng: &mut dyn RngCore,
    ) -> SpawnReport {
        self.prune();
        self.follower_spawn_timer += dt;
        self.sign_spawn_timer += dt;

        let mut report = SpawnReport::default();
        if self.follower_spawn_timer >= self.config.follower_spawn_interval
            && self.follower_count() < self.config.max_follower_count
        {
            self.follower_spawn_timer = 0.0;
            report.follower = log_spawn(self.spawn_follower(bounds, follower_config, rng), "follower");
        }
        if self.sign_spawn_timer >= self.config.sign_spawn_interval
            && self.sign_count() < self.config.max_sign_count
        {
            self.sign_spawn_timer = 0.0;
            report.sign = log_spawn(self.spawn_sign(bounds, rng), "sign");
        }
        report
    }
}

fn ensure_finite(position: Position) -> Result<(), SpawnError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(SpawnError::NonFinitePosition {
            x: position.x,
            y: position.y,
        })
    }
}

/// Cap rejections are routine; anything else is an abandoned spawn.
pub(crate) fn log_spawn<K>(result: Result<K, SpawnError>, kind: &'static str) -> Option<K> {
    match result {
        Ok(id) => Some(id),
        Err(err @ SpawnError::AtCapacity { .. }) => {
            debug!(kind, %err, "spawn dropped");
            None
        }
        Err(err) => {
            tracing::warn!(kind, %err, "spawn abandoned");
            None
        }
    }
}
