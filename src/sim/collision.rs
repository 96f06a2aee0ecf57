//! Collision detection and response for ball vs peg and lattice walls

use glam::Vec2;

use super::board::Peg;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the obstacle surface (if hit)
    pub point: Vec2,
    /// Surface normal at contact (pointing toward ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a round peg.
///
/// Touching counts as a hit (`distance <= r_ball + r_peg`). A ball centered
/// exactly on the peg is pushed straight up.
pub fn ball_peg_collision(ball_pos: Vec2, ball_radius: f32, peg: &Peg) -> CollisionResult {
    let offset = ball_pos - peg.pos;
    let distance = offset.length();
    let reach = ball_radius + peg.radius;

    if distance > reach {
        return CollisionResult::miss();
    }

    let normal = if distance > 1e-4 {
        offset / distance
    } else {
        Vec2::new(0.0, -1.0)
    };

    CollisionResult {
        hit: true,
        point: peg.pos + normal * peg.radius,
        normal,
        penetration: reach - distance,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce with restitution: the normal component is reversed and scaled by
/// `restitution`, the tangential component is kept. Separating velocities
/// are returned unchanged.
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let along = velocity.dot(normal);
    if along >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * along * normal
}

/// Check the ball against the vertical walls `lo`/`hi` (lattice boundary)
pub fn ball_wall_collision(ball_pos: Vec2, ball_radius: f32, lo: f32, hi: f32) -> CollisionResult {
    if ball_pos.x - ball_radius < lo {
        return CollisionResult {
            hit: true,
            point: Vec2::new(lo, ball_pos.y),
            normal: Vec2::X,
            penetration: lo - (ball_pos.x - ball_radius),
        };
    }
    if ball_pos.x + ball_radius > hi {
        return CollisionResult {
            hit: true,
            point: Vec2::new(hi, ball_pos.y),
            normal: Vec2::NEG_X,
            penetration: ball_pos.x + ball_radius - hi,
        };
    }
    CollisionResult::miss()
}
