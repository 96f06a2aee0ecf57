//! Shared interface for anything that animates a ball into its slot

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A ball touched a peg (for hit flashes and sounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Index into `Board::pegs`
    pub peg: usize,
    pub row: u32,
    pub col: u32,
    /// Contact point on the peg surface
    pub point: Vec2,
    /// Simulation tick the contact happened on
    pub tick: u32,
}

/// A ball animation driven by host frame deltas.
///
/// Implementations never decide the outcome: they are handed the slot up
/// front and only choose how the ball gets there.
pub trait BallAnimation {
    /// Advance by one host frame (seconds). No-op once landed.
    fn step(&mut self, frame_dt: f32);

    fn is_landed(&self) -> bool;

    /// Slot the ball came to rest in, once landed
    fn resolved_slot(&self) -> Option<usize>;

    /// Current ball center in board pixels
    fn position(&self) -> Vec2;

    /// Take the collision events recorded since the last call
    fn drain_events(&mut self) -> Vec<CollisionEvent>;

    /// Recent positions, newest first, for drawing a motion trail
    fn trail(&self) -> Vec<Vec2> {
        Vec::new()
    }

    /// Whether the free motion ended far from the slot it was steered to
    fn diverged(&self) -> bool {
        false
    }
}
