//! Drop controller
//!
//! Owns every in-flight ball. A drop is decided in full before anything
//! moves: the slot is sampled from the table snapshot, a path is synthesized
//! to it, and only then is an animation created and steered there.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_ROWS, MIN_ROWS};
use crate::overrides::OverrideStore;
use crate::path::{synthesize_path, target_from_path};
use crate::result::{DropResult, compile_result};
use crate::rng::{RandomSource, SeededRng};
use crate::sampler::sample_slot;
use crate::settings::{AnimationMode, EngineSettings};
use crate::sim::{BallAnimation, Board, CollisionEvent, PathAnimation, PhysicsReconciler};
use crate::tables::{RiskLevel, TableProvider, TableSnapshot};

/// Board size used until the host reports its own
pub const DEFAULT_BOARD_WIDTH: f32 = 800.0;
pub const DEFAULT_BOARD_HEIGHT: f32 = 700.0;

/// Why a drop request was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DropError {
    #[error("{rows} rows is outside the supported range {min}..={max}")]
    RowsOutOfRange { rows: u32, min: u32, max: u32 },
    #[error("bet must be a positive amount, got {0}")]
    InvalidBet(f64),
    #[error("a ball is already in flight")]
    BallInFlight,
    #[error("{limit} balls are already in flight")]
    TooManyBalls { limit: usize },
}

/// What the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub rows: u32,
    pub risk: RiskLevel,
    pub bet: f64,
}

impl Wager {
    pub fn new(rows: u32, risk: RiskLevel, bet: f64) -> Self {
        Self { rows, risk, bet }
    }

    pub fn validate(&self) -> Result<(), DropError> {
        if !crate::rows_supported(self.rows) {
            return Err(DropError::RowsOutOfRange {
                rows: self.rows,
                min: MIN_ROWS,
                max: MAX_ROWS,
            });
        }
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(DropError::InvalidBet(self.bet));
        }
        Ok(())
    }
}

/// Handle for an in-flight drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DropTicket(pub u64);

/// Everything decided about a drop before it is animated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPlan {
    pub wager: Wager,
    pub final_slot: usize,
    pub path: Vec<f32>,
    pub tables: TableSnapshot,
    /// Seed for the animation's own randomness (bounce jitter)
    pub animation_seed: u64,
}

impl DropPlan {
    /// Result of this plan, with the slot it was sampled for
    pub fn compile(&self) -> DropResult {
        compile_result(
            self.final_slot,
            self.path.clone(),
            self.wager.rows,
            self.wager.risk,
            self.wager.bet,
            &self.tables.payouts,
        )
    }
}

struct InFlight {
    ticket: DropTicket,
    plan: DropPlan,
    animation: Box<dyn BallAnimation>,
}

/// Entry point for the host: request drops, drive frames, collect results
pub struct DropController<S: OverrideStore> {
    tables: TableProvider<S>,
    settings: EngineSettings,
    rng: SeededRng,
    board_width: f32,
    board_height: f32,
    in_flight: Vec<InFlight>,
    next_id: u64,
    events: Vec<(DropTicket, CollisionEvent)>,
    divergences: u64,
}

impl<S: OverrideStore> DropController<S> {
    pub fn new(store: S, settings: EngineSettings) -> Self {
        Self::with_rng(store, settings, SeededRng::from_entropy())
    }

    /// Controller with a fixed random source (replays, tests)
    pub fn with_rng(store: S, settings: EngineSettings, rng: SeededRng) -> Self {
        Self {
            tables: TableProvider::new(store),
            settings,
            rng,
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
            in_flight: Vec::new(),
            next_id: 1,
            events: Vec::new(),
            divergences: 0,
        }
    }

    pub fn tables(&self) -> &TableProvider<S> {
        &self.tables
    }

    /// Override edits take effect on the next drop; in-flight drops keep
    /// the tables they were planned with.
    pub fn tables_mut(&mut self) -> &mut TableProvider<S> {
        &mut self.tables
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    /// Board pixel size for new drops
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring invalid board size {}x{}", width, height);
            return;
        }
        self.board_width = width;
        self.board_height = height;
    }

    pub fn board_size(&self) -> (f32, f32) {
        (self.board_width, self.board_height)
    }

    /// Board geometry a new drop with `rows` would use
    pub fn board(&self, rows: u32) -> Board {
        Board::new(rows, self.board_width, self.board_height)
    }

    /// Decide slot and path for a wager without animating it
    pub fn plan_drop(&mut self, wager: Wager) -> Result<DropPlan, DropError> {
        wager.validate()?;
        let tables = self.tables.snapshot(wager.rows, wager.risk);
        let final_slot = sample_slot(&tables.distribution, &mut self.rng);
        let path = synthesize_path(
            wager.rows,
            final_slot,
            self.settings.path_strategy,
            &mut self.rng,
        );
        let animation_seed = self.rng.next_u64();
        Ok(DropPlan {
            wager,
            final_slot,
            path,
            tables,
            animation_seed,
        })
    }

    /// Start a drop; the result arrives from [`Self::advance`] when it lands
    pub fn request_drop(&mut self, wager: Wager) -> Result<DropTicket, DropError> {
        wager.validate()?;
        if !self.settings.allow_concurrent_balls && !self.in_flight.is_empty() {
            return Err(DropError::BallInFlight);
        }
        let limit = self.settings.ball_limit();
        if self.in_flight.len() >= limit {
            return Err(DropError::TooManyBalls { limit });
        }

        let plan = self.plan_drop(wager)?;
        let animation = self.animate(&plan);
        let ticket = DropTicket(self.next_id);
        self.next_id += 1;

        log::info!(
            "Drop {} planned: {} rows, {} risk, slot {}",
            ticket.0,
            wager.rows,
            wager.risk.as_str(),
            plan.final_slot
        );
        self.in_flight.push(InFlight {
            ticket,
            plan,
            animation,
        });
        Ok(ticket)
    }

    /// Settle a wager immediately with no animation
    pub fn resolve_instant(&mut self, wager: Wager) -> Result<DropResult, DropError> {
        let plan = self.plan_drop(wager)?;
        let mut result = plan.compile();
        result.id = self.next_id;
        self.next_id += 1;
        Ok(result)
    }

    fn animate(&self, plan: &DropPlan) -> Box<dyn BallAnimation> {
        let board = self.board(plan.wager.rows);
        match self.settings.animation {
            AnimationMode::Simple => Box::new(PathAnimation::new(
                board,
                plan.path.clone(),
                self.settings.path_step_secs,
            )),
            AnimationMode::Realistic => Box::new(PhysicsReconciler::new(
                board,
                target_from_path(&plan.path, plan.wager.rows),
                self.settings.physics,
                self.settings.guidance,
                SeededRng::new(plan.animation_seed),
            )),
        }
    }

    /// Per-frame callback: step every ball and return the drops that landed
    pub fn advance(&mut self, frame_dt: f32) -> Vec<DropResult> {
        for ball in &mut self.in_flight {
            ball.animation.step(frame_dt);
            let ticket = ball.ticket;
            self.events
                .extend(ball.animation.drain_events().into_iter().map(|e| (ticket, e)));
        }

        let mut results = Vec::new();
        let mut i = 0;
        while i < self.in_flight.len() {
            if !self.in_flight[i].animation.is_landed() {
                i += 1;
                continue;
            }
            let done = self.in_flight.remove(i);
            results.push(self.finish(done));
        }
        results
    }

    fn finish(&mut self, done: InFlight) -> DropResult {
        let InFlight {
            ticket,
            plan,
            animation,
        } = done;

        if animation.diverged() {
            self.divergences += 1;
        }
        if animation.resolved_slot() != Some(plan.final_slot) {
            log::warn!(
                "Drop {} animation resolved {:?}, keeping sampled slot {}",
                ticket.0,
                animation.resolved_slot(),
                plan.final_slot
            );
        }

        let mut result = plan.compile();
        result.id = ticket.0;
        log::info!(
            "Drop {} landed in slot {} ({}x)",
            ticket.0,
            result.final_slot,
            result.payout_multiplier
        );
        result
    }

    /// Pixel positions of all balls still in flight
    pub fn ball_positions(&self) -> Vec<(DropTicket, Vec2)> {
        self.in_flight
            .iter()
            .map(|b| (b.ticket, b.animation.position()))
            .collect()
    }

    /// Recent drawn positions of an in-flight ball, newest first
    pub fn trail(&self, ticket: DropTicket) -> Option<Vec<Vec2>> {
        self.in_flight
            .iter()
            .find(|b| b.ticket == ticket)
            .map(|b| b.animation.trail())
    }

    /// Peg hits since the last call, tagged with their drop
    pub fn drain_events(&mut self) -> Vec<(DropTicket, CollisionEvent)> {
        std::mem::take(&mut self.events)
    }

    /// Tear down one drop; it produces no result. Returns false if unknown.
    pub fn cancel(&mut self, ticket: DropTicket) -> bool {
        let before = self.in_flight.len();
        self.in_flight.retain(|b| b.ticket != ticket);
        self.events.retain(|(t, _)| *t != ticket);
        let cancelled = self.in_flight.len() != before;
        if cancelled {
            log::info!("Drop {} cancelled", ticket.0);
        }
        cancelled
    }

    /// Tear down every drop (unmount). Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.in_flight.len();
        self.in_flight.clear();
        self.events.clear();
        if count > 0 {
            log::info!("Cancelled {} in-flight drops", count);
        }
        count
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Plan of an in-flight drop
    pub fn plan(&self, ticket: DropTicket) -> Option<&DropPlan> {
        self.in_flight
            .iter()
            .find(|b| b.ticket == ticket)
            .map(|b| &b.plan)
    }

    /// Landed drops whose free physics ended more than one slot off target
    pub fn divergences(&self) -> u64 {
        self.divergences
    }
}
