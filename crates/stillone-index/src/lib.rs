//! Proximity indexing abstractions for neighbor queries over entity positions.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors emitted by proximity index implementations.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// A position handed to `rebuild` contained NaN or infinite coordinates.
    #[error("position at slot {0} is not finite")]
    NonFinitePosition(usize),
}

/// Common behaviour exposed by proximity indices.
pub trait ProximityIndex {
    /// Rebuild internal structures from entity positions. Slot `i` of the
    /// index refers to `positions[i]`.
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError>;

    /// Visit every slot whose position lies within `radius` of `point`
    /// (inclusive), passing the slot and its distance.
    fn visit_within(
        &self,
        point: (f32, f32),
        radius: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    );

    /// Number of indexed slots.
    fn len(&self) -> usize;

    /// Returns true when nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots within `radius` of `point`, nearest first. Ties keep slot order.
    fn within_sorted(&self, point: (f32, f32), radius: f32) -> Vec<(usize, OrderedFloat<f32>)> {
        let mut hits = Vec::new();
        self.visit_within(point, radius, &mut |slot, dist| hits.push((slot, dist)));
        hits.sort_by_key(|&(slot, dist)| (dist, slot));
        hits
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Linear scan over a flat position list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BruteForceIndex {
    #[serde(skip)]
    positions: Vec<(f32, f32)>,
}

impl BruteForceIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with reserved capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
        }
    }
}

impl ProximityIndex for BruteForceIndex {
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError> {
        if let Some(bad) = positions
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(IndexError::NonFinitePosition(bad));
        }
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        Ok(())
    }

    fn visit_within(
        &self,
        point: (f32, f32),
        radius: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    ) {
        if radius.is_nan() || radius < 0.0 {
            return;
        }
        for (slot, &pos) in self.positions.iter().enumerate() {
            let dist = distance(point, pos);
            if dist <= radius {
                visitor(slot, OrderedFloat(dist));
            }
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}
