//! Transient waypoints followers dance around.

use serde::{Deserialize, Serialize};

use crate::config::SignConfig;
use crate::Position;

/// A sign marker. Once disappearing it never recovers.
#[derive(Debug, Clone, PartialEq)]
pub struct Sign {
    position: Position,
    disappearing: bool,
    destroyed: bool,
    /// Degrees.
    rotation: f32,
    scale: f32,
    opacity: f32,
}

/// Read-only snapshot handed to hosts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SignView {
    pub position: Position,
    pub disappearing: bool,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Sign {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            disappearing: false,
            destroyed: false,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub const fn is_disappearing(&self) -> bool {
        self.disappearing
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether new dancers may still claim this sign.
    #[must_use]
    pub const fn accepts_dancers(&self) -> bool {
        !self.disappearing && !self.destroyed
    }

    /// Flip into the fade-out sequence. Returns `true` only on the call that
    /// performed the transition, so the caller notifies dancers once.
    pub fn begin_disappearing(&mut self) -> bool {
        if self.disappearing || self.destroyed {
            return false;
        }
        self.disappearing = true;
        true
    }

    /// Advance the fade. Returns `true` exactly once, on the tick the sign
    /// runs out of scale or opacity.
    pub fn update(&mut self, dt: f32, config: &SignConfig) -> bool {
        if !self.disappearing || self.destroyed {
            return false;
        }
        self.rotation = (self.rotation + config.rotation_speed * dt).rem_euclid(360.0);
        self.scale -= config.shrink_speed * dt;
        self.opacity -= config.fade_speed * dt;
        if self.scale <= 0.0 || self.opacity <= 0.0 {
            self.scale = self.scale.max(0.0);
            self.opacity = self.opacity.max(0.0);
            self.destroyed = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn view(&self) -> SignView {
        SignView {
            position: self.position,
            disappearing: self.disappearing,
            rotation: self.rotation,
            scale: self.scale,
            opacity: self.opacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_sign_does_not_fade() {
        let mut sign = Sign::new(Position::new(1.0, 2.0));
        assert!(!sign.update(10.0, &SignConfig::default()));
        assert_eq!(sign.view().opacity, 1.0);
        assert!(sign.accepts_dancers());
    }

    #[test]
    fn begin_disappearing_is_irreversible_and_reports_once() {
        let mut sign = Sign::new(Position::default());
        assert!(sign.begin_disappearing());
        assert!(!sign.begin_disappearing());
        assert!(sign.is_disappearing());
        assert!(!sign.accepts_dancers());
    }

    #[test]
    fn fade_destroys_exactly_once() {
        let config = SignConfig {
            shrink_speed: 0.5,
            fade_speed: 1.0,
            ..SignConfig::default()
        };
        let mut sign = Sign::new(Position::default());
        sign.begin_disappearing();

        let mut completions = 0;
        for _ in 0..20 {
            if sign.update(0.25, &config) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(sign.is_destroyed());
        let view = sign.view();
        assert_eq!(view.opacity, 0.0);
        assert!(view.scale > 0.0, "opacity runs out first at these rates");
    }
}
