//! Guidance bias: the steering that walks a free-falling ball into its slot
//!
//! Strength ramps in three tiers by depth so the top of the board looks
//! peg-driven and the bottom reliably converges.

use serde::{Deserialize, Serialize};

/// Which part of the board the ball is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceTier {
    Light,
    Moderate,
    Strong,
}

/// Three-tier guidance curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceCurve {
    /// Depth fraction where the moderate tier starts
    pub moderate_from: f32,
    /// Depth fraction where the strong tier starts
    pub strong_from: f32,
    /// Spring gain per tier (1/s², applied to horizontal pixel distance)
    pub light_gain: f32,
    pub moderate_gain: f32,
    pub strong_gain: f32,
    /// Horizontal velocity damping per tier (1/s)
    pub light_damping: f32,
    pub moderate_damping: f32,
    pub strong_damping: f32,
}

impl Default for GuidanceCurve {
    fn default() -> Self {
        Self {
            moderate_from: 0.35,
            strong_from: 0.7,
            light_gain: 2.0,
            moderate_gain: 8.0,
            strong_gain: 40.0,
            light_damping: 0.0,
            moderate_damping: 1.5,
            strong_damping: 10.0,
        }
    }
}

impl GuidanceCurve {
    /// No steering at all (pure physics, for comparisons)
    pub fn disabled() -> Self {
        Self {
            light_gain: 0.0,
            moderate_gain: 0.0,
            strong_gain: 0.0,
            light_damping: 0.0,
            moderate_damping: 0.0,
            strong_damping: 0.0,
            ..Self::default()
        }
    }

    pub fn tier(&self, depth: f32) -> GuidanceTier {
        if depth >= self.strong_from {
            GuidanceTier::Strong
        } else if depth >= self.moderate_from {
            GuidanceTier::Moderate
        } else {
            GuidanceTier::Light
        }
    }

    /// Spring gain at `depth` (0 = first peg row, 1 = landing line)
    pub fn gain(&self, depth: f32) -> f32 {
        match self.tier(depth) {
            GuidanceTier::Light => self.light_gain,
            GuidanceTier::Moderate => self.moderate_gain,
            GuidanceTier::Strong => self.strong_gain,
        }
    }

    pub fn damping(&self, depth: f32) -> f32 {
        match self.tier(depth) {
            GuidanceTier::Light => self.light_damping,
            GuidanceTier::Moderate => self.moderate_damping,
            GuidanceTier::Strong => self.strong_damping,
        }
    }

    /// New horizontal velocity after one step of steering toward a target
    /// `dx` pixels away.
    pub fn steer(&self, depth: f32, dx: f32, vx: f32, dt: f32) -> f32 {
        let pushed = vx + dx * self.gain(depth) * dt;
        pushed * (1.0 - self.damping(depth) * dt).max(0.0)
    }
}
