//! Simple mode: play a synthesized path back at a constant pace

use glam::Vec2;

use super::animation::{BallAnimation, CollisionEvent};
use super::board::Board;
use crate::path::{interpolate_path, slot_from_position, target_from_path};

/// Interpolates a lattice path into pixels over a fixed duration
#[derive(Debug, Clone)]
pub struct PathAnimation {
    board: Board,
    path: Vec<f32>,
    target: Option<usize>,
    duration: f32,
    elapsed: f32,
    /// Peg rows already passed (one event each)
    rows_passed: u32,
    frames: u32,
    events: Vec<CollisionEvent>,
    resolved: Option<usize>,
}

impl PathAnimation {
    /// `step_secs` is the time spent per peg row
    pub fn new(board: Board, path: Vec<f32>, step_secs: f32) -> Self {
        let target = target_from_path(&path, board.rows);
        if target.is_none() {
            log::warn!(
                "Path of {} entries is malformed for {} rows, landing where it ends",
                path.len(),
                board.rows
            );
        }
        let step_secs = if step_secs.is_finite() { step_secs.max(0.0) } else { 0.0 };
        let duration = step_secs * board.rows as f32;
        Self {
            board,
            path,
            target,
            duration,
            elapsed: 0.0,
            rows_passed: 0,
            frames: 0,
            events: Vec::new(),
            resolved: None,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn path(&self) -> &[f32] {
        &self.path
    }

    fn point_at(&self, progress: f32) -> Vec2 {
        let (_, col) = interpolate_path(&self.path, progress);
        let top = self.board.spawn_y();
        let bottom = self.board.landing_y();
        Vec2::new(self.board.lattice_to_x(col), top + (bottom - top) * progress)
    }

    fn emit_row_events(&mut self, progress: f32) {
        let rows = self.board.rows;
        let reached = ((progress * rows as f32).floor() as u32).min(rows);
        while self.rows_passed < reached {
            let row = self.rows_passed;
            let x = self.point_at((row + 1) as f32 / rows as f32).x;
            if let Some(peg) = self.board.nearest_peg(row, x) {
                let p = self.board.pegs[peg];
                self.events.push(CollisionEvent {
                    peg,
                    row: p.row,
                    col: p.col,
                    point: p.pos,
                    tick: self.frames,
                });
            }
            self.rows_passed += 1;
        }
    }

    fn land(&mut self) {
        let slot = self.target.unwrap_or_else(|| {
            let last = self.path.last().copied().unwrap_or(0.0);
            slot_from_position(last, self.board.rows)
        });
        self.resolved = Some(slot);
        log::debug!("Path animation landed in slot {}", slot);
    }
}

impl BallAnimation for PathAnimation {
    fn step(&mut self, frame_dt: f32) {
        if self.resolved.is_some() {
            return;
        }
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.elapsed += frame_dt;
        }
        self.frames += 1;

        let progress = self.progress();
        self.emit_row_events(progress);
        if progress >= 1.0 {
            self.land();
        }
    }

    fn is_landed(&self) -> bool {
        self.resolved.is_some()
    }

    fn resolved_slot(&self) -> Option<usize> {
        self.resolved
    }

    fn position(&self) -> Vec2 {
        match self.resolved {
            Some(slot) => Vec2::new(self.board.slot_center_x(slot), self.board.landing_y()),
            None => self.point_at(self.progress()),
        }
    }

    fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }
}
