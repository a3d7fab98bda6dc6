//! Start-of-tick snapshot that answers every proximity question agents ask.
//!
//! Agents never see each other's in-progress updates: the world captures a
//! `Perception` before any agent runs, so the outcome of a tick does not
//! depend on which agent updated first.

use stillone_index::{BruteForceIndex, ProximityIndex};
use tracing::warn;

use crate::config::WorldBounds;
use crate::follower::Follower;
use crate::pursuer::Pursuer;
use crate::sign::Sign;
use crate::{EntityRef, FollowerId, Position, PursuerId, SignId, Tag};

/// What other agents can observe about a follower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerSense {
    pub id: FollowerId,
    pub position: Position,
    /// Sign this follower is dancing around, if any.
    pub dancing_at: Option<SignId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SignSense {
    id: SignId,
    position: Position,
    accepts_dancers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PursuerSense {
    id: PursuerId,
    position: Position,
}

/// Proximity and lookup operations the agents depend on. Implementations
/// must not assume any particular spatial structure.
pub trait SpatialQuery {
    /// Distance between two points.
    fn distance(&self, a: Position, b: Position) -> f32 {
        a.distance_to(b)
    }

    /// Entities carrying `tag` within `radius` of `point`, nearest first.
    fn query_by_tag(&self, point: Position, radius: f32, tag: Tag) -> Vec<EntityRef>;

    /// Follower components within `radius` of `point`, nearest first.
    fn query_followers(&self, point: Position, radius: f32) -> Vec<FollowerSense>;

    /// Current position of a live entity.
    fn position_of(&self, entity: EntityRef) -> Option<Position>;

    /// Whether `sign` is live and not disappearing.
    fn sign_accepts_dancers(&self, sign: SignId) -> bool;

    /// Clamp `position` into the playable rectangle.
    fn clamp_to_bounds(&self, position: Position) -> Position;
}

/// Brute-force snapshot of every live entity.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    bounds: WorldBounds,
    followers: Vec<FollowerSense>,
    follower_index: BruteForceIndex,
    signs: Vec<SignSense>,
    sign_index: BruteForceIndex,
    pursuers: Vec<PursuerSense>,
    pursuer_index: BruteForceIndex,
}

fn rebuild_or_clear(index: &mut BruteForceIndex, positions: &[(f32, f32)], what: &str) {
    if let Err(err) = index.rebuild(positions) {
        warn!(?err, what, "proximity index rebuild failed; entities hidden this tick");
        let _ = index.rebuild(&[]);
    }
}

impl Perception {
    /// Snapshot the supplied entities. Entities with non-finite positions are
    /// left out.
    pub fn capture<'a>(
        bounds: WorldBounds,
        followers: impl Iterator<Item = (FollowerId, &'a Follower)>,
        signs: impl Iterator<Item = (SignId, &'a Sign)>,
        pursuers: impl Iterator<Item = (PursuerId, &'a Pursuer)>,
    ) -> Self {
        let followers: Vec<FollowerSense> = followers
            .filter(|(_, f)| f.position().is_finite())
            .map(|(id, f)| FollowerSense {
                id,
                position: f.position(),
                dancing_at: f.dancing_at(),
            })
            .collect();
        let signs: Vec<SignSense> = signs
            .filter(|(_, s)| !s.is_destroyed() && s.position().is_finite())
            .map(|(id, s)| SignSense {
                id,
                position: s.position(),
                accepts_dancers: s.accepts_dancers(),
            })
            .collect();
        let pursuers: Vec<PursuerSense> = pursuers
            .filter(|(_, p)| p.position().is_finite())
            .map(|(id, p)| PursuerSense {
                id,
                position: p.position(),
            })
            .collect();

        let mut perception = Self {
            bounds,
            follower_index: BruteForceIndex::with_capacity(followers.len()),
            sign_index: BruteForceIndex::with_capacity(signs.len()),
            pursuer_index: BruteForceIndex::with_capacity(pursuers.len()),
            followers,
            signs,
            pursuers,
        };
        let positions: Vec<(f32, f32)> =
            perception.followers.iter().map(|f| f.position.into()).collect();
        rebuild_or_clear(&mut perception.follower_index, &positions, "followers");
        let positions: Vec<(f32, f32)> =
            perception.signs.iter().map(|s| s.position.into()).collect();
        rebuild_or_clear(&mut perception.sign_index, &positions, "signs");
        let positions: Vec<(f32, f32)> =
            perception.pursuers.iter().map(|p| p.position.into()).collect();
        rebuild_or_clear(&mut perception.pursuer_index, &positions, "pursuers");
        perception
    }
}

impl SpatialQuery for Perception {
    fn query_by_tag(&self, point: Position, radius: f32, tag: Tag) -> Vec<EntityRef> {
        let point = point.into();
        match tag {
            Tag::Follower => self
                .follower_index
                .within_sorted(point, radius)
                .into_iter()
                .map(|(slot, _)| EntityRef::Follower(self.followers[slot].id))
                .collect(),
            Tag::Sign => self
                .sign_index
                .within_sorted(point, radius)
                .into_iter()
                .map(|(slot, _)| EntityRef::Sign(self.signs[slot].id))
                .collect(),
            Tag::Pursuer => self
                .pursuer_index
                .within_sorted(point, radius)
                .into_iter()
                .map(|(slot, _)| EntityRef::Pursuer(self.pursuers[slot].id))
                .collect(),
        }
    }

    fn query_followers(&self, point: Position, radius: f32) -> Vec<FollowerSense> {
        self.follower_index
            .within_sorted(point.into(), radius)
            .into_iter()
            .map(|(slot, _)| self.followers[slot])
            .collect()
    }

    fn position_of(&self, entity: EntityRef) -> Option<Position> {
        match entity {
            EntityRef::Follower(id) => self
                .followers
                .iter()
                .find(|f| f.id == id)
                .map(|f| f.position),
            EntityRef::Sign(id) => self.signs.iter().find(|s| s.id == id).map(|s| s.position),
            EntityRef::Pursuer(id) => self
                .pursuers
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.position),
        }
    }

    fn sign_accepts_dancers(&self, sign: SignId) -> bool {
        self.signs
            .iter()
            .any(|s| s.id == sign && s.accepts_dancers)
    }

    fn clamp_to_bounds(&self, position: Position) -> Position {
        self.bounds.clamp(position)
    }
}
