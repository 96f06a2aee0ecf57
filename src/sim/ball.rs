//! Ball state for the physics animation
//!
//! Owned by exactly one in-flight drop and discarded when it lands.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lifecycle of a simulated ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallPhase {
    /// Spawned, not yet stepped
    Initializing,
    /// Falling through the pegs
    Falling,
    /// Crossed the landing line; slot resolved
    Landed,
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 20;

/// Pixel-space ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsBall {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub radius: f32,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: VecDeque<TrailPoint>,
}

impl PhysicsBall {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Record where the ball is drawn to the trail (call each tick while falling)
    pub fn record_trail(&mut self, drawn: Vec2) {
        let speed = self.vel.length();
        self.trail.push_front(TrailPoint { pos: drawn, speed });
        self.trail.truncate(TRAIL_LENGTH);
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Bring the ball to rest at `pos`
    pub fn settle(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }
}
