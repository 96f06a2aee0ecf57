//! Guided peg physics
//!
//! Simulates a ball falling through the pegs at a fixed timestep while a
//! guidance force walks it into the slot chosen by the sampler. Whatever the
//! physics does, the reported slot is the target slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::animation::{BallAnimation, CollisionEvent};
use super::ball::{BallPhase, PhysicsBall};
use super::board::Board;
use super::collision::{ball_peg_collision, ball_wall_collision, bounce_velocity, reflect_velocity};
use super::guidance::GuidanceCurve;
use crate::consts::*;
use crate::rng::{RandomSource, SeededRng};

/// Tunable physics constants (pixels and seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Exponential velocity decay rate (1/s)
    pub drag: f32,
    /// Fraction of normal speed kept after a peg bounce
    pub restitution: f32,
    /// Max horizontal kick added on each peg bounce (px/s, ±half applied)
    pub collision_jitter: f32,
    /// Horizontal speed kept after bouncing off the lattice edge
    pub wall_damping: f32,
    /// Initial downward speed (px/s)
    pub spawn_speed: f32,
    /// Max random initial horizontal speed (px/s, ±half applied)
    pub spawn_spread: f32,
    /// Share of the distance to the target applied as spawn offset
    pub spawn_bias: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 900.0,
            drag: 0.35,
            restitution: 0.55,
            collision_jitter: 40.0,
            wall_damping: 0.7,
            spawn_speed: 60.0,
            spawn_spread: 20.0,
            spawn_bias: 0.05,
        }
    }
}

/// One ball falling through the pegs toward a predetermined slot
#[derive(Debug, Clone)]
pub struct PhysicsReconciler {
    board: Board,
    target: Option<usize>,
    ball: PhysicsBall,
    phase: BallPhase,
    params: PhysicsParams,
    guidance: GuidanceCurve,
    rng: SeededRng,
    accumulator: f32,
    ticks: u32,
    events: Vec<CollisionEvent>,
    resolved: Option<usize>,
    physics_slot: Option<usize>,
    diverged: bool,
}

impl PhysicsReconciler {
    /// `target` is `None` when no valid target could be derived; the ball
    /// then falls freely and lands wherever the physics puts it.
    pub fn new(
        board: Board,
        target: Option<usize>,
        params: PhysicsParams,
        guidance: GuidanceCurve,
        rng: SeededRng,
    ) -> Self {
        let target = target.map(|t| t.min(board.rows as usize));
        let ball = PhysicsBall::new(
            Vec2::new(board.center_x(), board.spawn_y()),
            Vec2::ZERO,
            board.ball_radius,
        );
        Self {
            board,
            target,
            ball,
            phase: BallPhase::Initializing,
            params,
            guidance,
            rng,
            accumulator: 0.0,
            ticks: 0,
            events: Vec::new(),
            resolved: None,
            physics_slot: None,
            diverged: false,
        }
    }

    pub fn phase(&self) -> BallPhase {
        self.phase
    }

    pub fn ball(&self) -> &PhysicsBall {
        &self.ball
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Slot under the ball at the moment it crossed the landing line
    pub fn physics_slot(&self) -> Option<usize> {
        self.physics_slot
    }

    fn target_x(&self) -> Option<f32> {
        self.target.map(|slot| self.board.slot_center_x(slot))
    }

    /// Where the ball is drawn. Past the second-to-last peg row the drawn x
    /// glides from the physics x to the target slot center, reaching it at
    /// the landing line.
    pub fn drawn_position(&self) -> Vec2 {
        let pos = self.ball.pos;
        let Some(tx) = self.target_x() else {
            return pos;
        };
        if self.phase != BallPhase::Falling {
            return pos;
        }
        let glide_from = self.board.row_y(self.board.rows.saturating_sub(2));
        let span = self.board.landing_y() - glide_from;
        if span <= 0.0 || pos.y <= glide_from {
            return pos;
        }
        let t = ((pos.y - glide_from) / span).clamp(0.0, 1.0);
        Vec2::new(pos.x + (tx - pos.x) * t, pos.y)
    }

    /// Place the ball above the first row with a slight lean toward the target
    fn spawn(&mut self) {
        let center = self.board.center_x();
        let max_bias = self.board.slot_width() * 0.25;
        let bias = self
            .target_x()
            .map(|tx| ((tx - center) * self.params.spawn_bias).clamp(-max_bias, max_bias))
            .unwrap_or(0.0);
        let vx = self.rng.centered() as f32 * self.params.spawn_spread;

        self.ball.pos = Vec2::new(center + bias, self.board.spawn_y());
        self.ball.vel = Vec2::new(vx, self.params.spawn_speed);
        self.ball.clear_trail();
        self.phase = BallPhase::Falling;
    }

    /// Advance the simulation by exactly one fixed timestep
    pub fn tick(&mut self, dt: f32) {
        match self.phase {
            BallPhase::Landed => return,
            BallPhase::Initializing => self.spawn(),
            BallPhase::Falling => {}
        }
        self.ticks += 1;

        let depth = self.board.depth_fraction(self.ball.pos.y);
        if let Some(tx) = self.target_x() {
            let dx = tx - self.ball.pos.x;
            self.ball.vel.x = self.guidance.steer(depth, dx, self.ball.vel.x, dt);
        }

        self.ball.vel.y += self.params.gravity * dt;
        self.ball.vel *= (-self.params.drag * dt).exp();
        self.ball.pos += self.ball.vel * dt;

        self.collide_pegs();
        self.collide_walls();
        let drawn = self.drawn_position();
        self.ball.record_trail(drawn);

        if self.ball.pos.y >= self.board.landing_y() {
            self.land();
        } else if self.ticks >= MAX_SIM_TICKS {
            log::warn!(
                "Ball still falling after {} ticks at ({:.1}, {:.1}), forcing landing",
                self.ticks,
                self.ball.pos.x,
                self.ball.pos.y
            );
            self.land();
        }
    }

    fn collide_pegs(&mut self) {
        let reach = self.ball.radius + self.board.peg_radius;
        for row in self.board.rows_near(self.ball.pos.y, reach) {
            for idx in self.board.row_range(row) {
                let peg = self.board.pegs[idx];
                let hit = ball_peg_collision(self.ball.pos, self.ball.radius, &peg);
                if !hit.hit {
                    continue;
                }

                self.ball.pos += hit.normal * hit.penetration;
                let approaching = self.ball.vel.dot(hit.normal) < 0.0;
                self.ball.vel = bounce_velocity(self.ball.vel, hit.normal, self.params.restitution);

                if approaching {
                    self.ball.vel.x += self.rng.centered() as f32 * self.params.collision_jitter;
                    self.events.push(CollisionEvent {
                        peg: idx,
                        row: peg.row,
                        col: peg.col,
                        point: hit.point,
                        tick: self.ticks,
                    });
                }
            }
        }
    }

    /// Keep the ball inside the triangle traced by the outer pegs
    fn collide_walls(&mut self) {
        let (lo, hi) = self.board.lattice_bounds(self.ball.pos.y);
        let hit = ball_wall_collision(self.ball.pos, self.ball.radius, lo, hi);
        if !hit.hit {
            return;
        }
        self.ball.pos.x += hit.normal.x * hit.penetration;
        if self.ball.vel.dot(hit.normal) < 0.0 {
            self.ball.vel = reflect_velocity(self.ball.vel, hit.normal);
            self.ball.vel.x *= self.params.wall_damping;
        }
    }

    fn land(&mut self) {
        let physics_slot = self.board.slot_at(self.ball.pos.x);
        self.physics_slot = Some(physics_slot);

        let slot = match self.target {
            Some(target) => {
                if physics_slot.abs_diff(target) > 1 {
                    log::warn!(
                        "Physics landed in slot {} but target is {} ({} rows), reporting target",
                        physics_slot,
                        target,
                        self.board.rows
                    );
                    self.diverged = true;
                }
                target
            }
            None => physics_slot,
        };

        self.ball
            .settle(Vec2::new(self.board.slot_center_x(slot), self.board.landing_y()));
        self.resolved = Some(slot);
        self.phase = BallPhase::Landed;
        log::debug!("Ball landed in slot {} after {} ticks", slot, self.ticks);
    }
}

impl BallAnimation for PhysicsReconciler {
    fn step(&mut self, frame_dt: f32) {
        if self.phase == BallPhase::Landed {
            return;
        }
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            if self.phase == BallPhase::Landed {
                self.accumulator = 0.0;
                break;
            }
        }
        // Behind by more than a frame's worth of substeps: drop the backlog
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
    }

    fn is_landed(&self) -> bool {
        self.phase == BallPhase::Landed
    }

    fn resolved_slot(&self) -> Option<usize> {
        self.resolved
    }

    fn position(&self) -> Vec2 {
        self.drawn_position()
    }

    fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    fn trail(&self) -> Vec<Vec2> {
        self.ball.trail.iter().map(|p| p.pos).collect()
    }

    fn diverged(&self) -> bool {
        self.diverged
    }
}
