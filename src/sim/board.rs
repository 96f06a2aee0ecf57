//! Peg board geometry
//!
//! Pixel-space layout derived from `(rows, width, height)`:
//! - Row `r` (0-based) holds `r + 3` pegs, centered, one slot width apart
//! - The bottom row spans the full width, so its `rows + 1` gaps are the slots
//! - The outer pegs of each row lie on the triangular lattice boundary

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::slot_count;

/// A fixed peg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
    pub row: u32,
    pub col: u32,
}

/// Board layout for one drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub rows: u32,
    pub width: f32,
    pub height: f32,
    /// Y of the first peg row
    pub top_margin: f32,
    /// Distance from the landing line to the bottom edge (slot area)
    pub bottom_margin: f32,
    pub peg_radius: f32,
    pub ball_radius: f32,
    pub pegs: Vec<Peg>,
}

impl Board {
    pub fn new(rows: u32, width: f32, height: f32) -> Self {
        let rows = rows.max(1);
        let width = width.max(1.0);
        let height = height.max(1.0);
        let slot_width = width / slot_count(rows) as f32;

        let peg_radius = (slot_width * PEG_RADIUS_FACTOR).clamp(PEG_RADIUS_MIN, PEG_RADIUS_MAX);
        let ball_radius = (slot_width * BALL_RADIUS_FACTOR).clamp(BALL_RADIUS_MIN, BALL_RADIUS_MAX);
        let top_margin = (slot_width).min(height * 0.25);
        let bottom_margin = (height * 0.08).max(slot_width * 0.6).min(height * 0.25);

        let mut board = Self {
            rows,
            width,
            height,
            top_margin,
            bottom_margin,
            peg_radius,
            ball_radius,
            pegs: Vec::new(),
        };
        board.pegs = board.generate_pegs();
        board
    }

    fn generate_pegs(&self) -> Vec<Peg> {
        let center = self.center_x();
        let spacing = self.slot_width();
        let mut pegs = Vec::new();
        for row in 0..self.rows {
            let count = row + 3;
            let half_span = (count - 1) as f32 / 2.0;
            let y = self.row_y(row);
            for col in 0..count {
                pegs.push(Peg {
                    pos: Vec2::new(center + (col as f32 - half_span) * spacing, y),
                    radius: self.peg_radius,
                    row,
                    col,
                });
            }
        }
        pegs
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Width of one landing slot (also the horizontal peg spacing)
    #[inline]
    pub fn slot_width(&self) -> f32 {
        self.width / slot_count(self.rows) as f32
    }

    /// Vertical distance between peg rows
    #[inline]
    pub fn row_spacing(&self) -> f32 {
        (self.landing_y() - self.top_margin) / self.rows as f32
    }

    /// Y of peg row `row`
    #[inline]
    pub fn row_y(&self, row: u32) -> f32 {
        self.top_margin + row as f32 * self.row_spacing()
    }

    /// Y at which a ball counts as landed
    #[inline]
    pub fn landing_y(&self) -> f32 {
        self.height - self.bottom_margin
    }

    /// Spawn height, half a row above the first pegs
    #[inline]
    pub fn spawn_y(&self) -> f32 {
        (self.top_margin - self.row_spacing() * 0.5).max(self.ball_radius)
    }

    /// Pixel x of the center of `slot`
    #[inline]
    pub fn slot_center_x(&self, slot: usize) -> f32 {
        (slot as f32 + 0.5) * self.slot_width()
    }

    /// Slot under pixel `x`, clamped to the board
    pub fn slot_at(&self, x: f32) -> usize {
        if !x.is_finite() {
            return 0;
        }
        let slot = (x / self.slot_width()).floor().max(0.0) as usize;
        slot.min(self.rows as usize)
    }

    /// Convert a lattice position (slot scale) to pixel x
    #[inline]
    pub fn lattice_to_x(&self, position: f32) -> f32 {
        (position + 0.5) * self.slot_width()
    }

    /// Progress down the board: 0 at the first peg row, 1 at the landing line
    pub fn depth_fraction(&self, y: f32) -> f32 {
        let span = self.landing_y() - self.top_margin;
        if span <= 0.0 {
            return 1.0;
        }
        ((y - self.top_margin) / span).clamp(0.0, 1.0)
    }

    /// Horizontal extent of the triangular lattice at height `y`.
    ///
    /// The boundary runs through the outer pegs: one slot width either side of
    /// center at the first row, the full board width at the last row, and
    /// stays at full width below it.
    pub fn lattice_bounds(&self, y: f32) -> (f32, f32) {
        let first = self.row_y(0);
        let last = self.row_y(self.rows - 1);
        let top_half = self.slot_width();
        let bottom_half = self.width / 2.0;
        let t = if last > first {
            ((y - first) / (last - first)).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let half = top_half + (bottom_half - top_half) * t;
        let center = self.center_x();
        ((center - half).max(0.0), (center + half).min(self.width))
    }

    /// Index of the first peg of `row` in `pegs` (rows are stored in order)
    #[inline]
    pub fn row_offset(&self, row: u32) -> usize {
        let row = row as usize;
        row * (row + 5) / 2
    }

    /// Peg index range covering `row`, empty past the last row
    pub fn row_range(&self, row: u32) -> std::ops::Range<usize> {
        if row >= self.rows {
            return self.pegs.len()..self.pegs.len();
        }
        let start = self.row_offset(row);
        start..(start + row as usize + 3).min(self.pegs.len())
    }

    /// Rows whose pegs could touch something at height `y` within `reach`
    pub fn rows_near(&self, y: f32, reach: f32) -> std::ops::RangeInclusive<u32> {
        let spacing = self.row_spacing().max(f32::EPSILON);
        let last = self.rows as i64 - 1;
        let lo = (((y - reach - self.top_margin) / spacing).floor() as i64).clamp(0, last);
        let hi = (((y + reach - self.top_margin) / spacing).ceil() as i64).clamp(0, last);
        lo as u32..=hi as u32
    }

    /// Index of the peg in `row` closest to pixel `x`
    pub fn nearest_peg(&self, row: u32, x: f32) -> Option<usize> {
        self.row_range(row)
            .min_by(|&a, &b| {
                (self.pegs[a].pos.x - x)
                    .abs()
                    .partial_cmp(&(self.pegs[b].pos.x - x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
