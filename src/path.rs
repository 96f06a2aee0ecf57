//! Lattice paths from the top peg to a chosen slot
//!
//! A path has one entry per row boundary (`rows + 1` entries). Entry `k` is the
//! fractional column of the ball after `k` rows, on the same scale as slot
//! indices: the walk starts at `rows / 2` and ends exactly on the target slot.

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// One lattice step (a peg bounce to the left or right)
pub const HALF_STEP: f32 = 0.5;

/// Per-step drift above which the goal-biased walk always heads for the target
const STEER_THRESHOLD: f32 = 0.25;

/// Random spread added to the step probabilities of the collision-directed walk
const DIRECTION_JITTER: f64 = 0.2;

/// Path synthesis algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathStrategy {
    /// Deterministic walk that steps toward the target whenever it is behind
    #[default]
    GoalBiased,
    /// Randomised bounce directions, corrected afterwards to hit the target
    CollisionDirected,
}

impl PathStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStrategy::GoalBiased => "goal-biased",
            PathStrategy::CollisionDirected => "collision-directed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "goal-biased" | "goal" | "simple" => Some(PathStrategy::GoalBiased),
            "collision-directed" | "collision" | "physics" => Some(PathStrategy::CollisionDirected),
            _ => None,
        }
    }
}

/// Starting lattice position for a board
#[inline]
pub fn start_position(rows: u32) -> f32 {
    rows as f32 / 2.0
}

/// Build a path to `target_slot` (clamped to the board) with `strategy`
pub fn synthesize_path<R: RandomSource + ?Sized>(
    rows: u32,
    target_slot: usize,
    strategy: PathStrategy,
    rng: &mut R,
) -> Vec<f32> {
    match strategy {
        PathStrategy::GoalBiased => goal_biased_path(rows, target_slot),
        PathStrategy::CollisionDirected => collision_directed_path(rows, target_slot, rng),
    }
}

/// Goal-biased walk.
///
/// Each step compares the drift still needed per remaining row with
/// [`STEER_THRESHOLD`]: above it the ball moves a half step toward the target,
/// below it the ball still closes any gap and holds position once on target.
/// The final entry is set to the target, absorbing any rounding.
pub fn goal_biased_path(rows: u32, target_slot: usize) -> Vec<f32> {
    let max = rows as f32;
    let target = (target_slot as f32).min(max);
    let mut current = start_position(rows);
    let mut path = Vec::with_capacity(rows as usize + 1);
    path.push(current);

    for row in 1..=rows {
        let remaining = rows - row;
        let diff = target - current;

        if remaining == 0 {
            current = target;
        } else {
            let ideal = diff / remaining as f32;
            if ideal > STEER_THRESHOLD {
                current += HALF_STEP;
            } else if ideal < -STEER_THRESHOLD {
                current -= HALF_STEP;
            } else if diff > 0.0 {
                current += HALF_STEP;
            } else if diff < 0.0 {
                current -= HALF_STEP;
            }
        }

        current = current.clamp(0.0, max);
        path.push(current);
    }

    force_arrival(&mut path, target);
    path
}

/// Collision-directed walk.
///
/// Picks a ±half-step direction per row, biased toward the step that would
/// arrive on time plus bounded noise, then flips the latest wrong-way
/// directions until the walk sums to the target.
pub fn collision_directed_path<R: RandomSource + ?Sized>(
    rows: u32,
    target_slot: usize,
    rng: &mut R,
) -> Vec<f32> {
    let max = rows as f32;
    let target = (target_slot as f32).min(max);
    let start = start_position(rows);

    let mut directions = Vec::with_capacity(rows as usize);
    let mut current = start;
    for row in 0..rows {
        let remaining = (rows - row) as f32;
        let ideal = (target - current) / remaining;
        // A right step with probability p drifts by (p - 0.5) per row on average
        let p_right = (0.5 + ideal as f64 + rng.centered() * DIRECTION_JITTER).clamp(0.05, 0.95);
        let dir = if rng.chance(p_right) { HALF_STEP } else { -HALF_STEP };
        directions.push(dir);
        current += dir;
    }

    // Each flip moves the arrival point by one whole column
    let arrival: f32 = start + directions.iter().sum::<f32>();
    let mut residual = (target - arrival).round() as i32;
    for dir in directions.iter_mut().rev() {
        if residual == 0 {
            break;
        }
        if residual > 0 && *dir < 0.0 {
            *dir = HALF_STEP;
            residual -= 1;
        } else if residual < 0 && *dir > 0.0 {
            *dir = -HALF_STEP;
            residual += 1;
        }
    }

    let mut path = Vec::with_capacity(rows as usize + 1);
    let mut current = start;
    path.push(current);
    for dir in directions {
        current = (current + dir).clamp(0.0, max);
        path.push(current);
    }

    force_arrival(&mut path, target);
    path
}

/// Unbiased ±half-step walk (attract mode, no predetermined slot)
pub fn random_walk_path<R: RandomSource + ?Sized>(rows: u32, rng: &mut R) -> Vec<f32> {
    let max = rows as f32;
    let mut current = start_position(rows);
    let mut path = Vec::with_capacity(rows as usize + 1);
    path.push(current);
    for _ in 0..rows {
        let dir = if rng.chance(0.5) { HALF_STEP } else { -HALF_STEP };
        current = (current + dir).clamp(0.0, max);
        path.push(current);
    }
    path
}

fn force_arrival(path: &mut [f32], target: f32) {
    if let Some(last) = path.last_mut() {
        if (*last - target).abs() > f32::EPSILON {
            log::debug!("Correcting path arrival from {} to {}", last, target);
        }
        *last = target;
    }
}

/// True when `path` has `rows + 1` entries, each a half step from the last
pub fn validate_path(path: &[f32], rows: u32) -> bool {
    if path.len() != rows as usize + 1 {
        return false;
    }
    path.windows(2)
        .all(|w| ((w[1] - w[0]).abs() - HALF_STEP).abs() < 1e-4)
}

/// Fractional `(row, column)` at `progress` in `[0, 1]` along the path
pub fn interpolate_path(path: &[f32], progress: f32) -> (f32, f32) {
    let Some(&last) = path.last() else {
        return (0.0, 0.0);
    };
    let total_steps = path.len() - 1;
    let position = progress.clamp(0.0, 1.0) * total_steps as f32;
    let step = position.floor() as usize;

    if step >= total_steps {
        return (total_steps as f32, last);
    }

    let t = position - step as f32;
    let col = path[step] + (path[step + 1] - path[step]) * t;
    (position, col)
}

/// Slot containing a lattice position
pub fn slot_from_position(position: f32, rows: u32) -> usize {
    if !position.is_finite() {
        return 0;
    }
    (position.floor().max(0.0) as usize).min(rows as usize)
}

/// Target slot encoded by a path, or `None` when the path is malformed
pub fn target_from_path(path: &[f32], rows: u32) -> Option<usize> {
    if path.len() != rows as usize + 1 {
        return None;
    }
    let last = *path.last()?;
    if !last.is_finite() || last < -HALF_STEP || last > rows as f32 + HALF_STEP {
        return None;
    }
    Some((last.round().max(0.0) as usize).min(rows as usize))
}
