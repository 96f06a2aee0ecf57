//! Plinko Drop - outcome-first Plinko engine
//!
//! Core modules:
//! - `tables`: Built-in drop distributions and payout tables, with overrides
//! - `sampler`: Picks the landing slot before anything moves
//! - `path`: Lattice paths from the top peg to a chosen slot
//! - `sim`: Peg physics that is steered into the chosen slot
//! - `engine`: Drop requests, in-flight balls, frame driving
//! - `result`: Drop results and payout helpers
//! - `stats`: Totals and streaks over landed drops
//! - `autobet`: Automatic drop sessions with bet strategies
//! - `web`: Browser bindings (wasm only)

pub mod autobet;
pub mod engine;
pub mod overrides;
pub mod path;
pub mod platform;
pub mod result;
pub mod rng;
pub mod sampler;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tables;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use autobet::{AutoBetConfig, AutoBetSession, BetStrategy, StopReason};
pub use engine::{DropController, DropError, DropPlan, DropTicket, Wager};
pub use overrides::{MemoryStore, OverrideError, OverrideStore};
pub use path::PathStrategy;
pub use result::{DropResult, InvalidResult, validate_result};
pub use rng::{RandomSource, ScriptedSource, SeededRng};
pub use settings::{AnimationMode, EngineSettings};
pub use stats::{History, ResultStats, Streaks};
pub use tables::{RiskLevel, TableProvider, TableSnapshot};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted from the host (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Hard stop for a single ball (20 seconds of simulated time)
    pub const MAX_SIM_TICKS: u32 = 20 * 120;

    /// Supported board sizes
    pub const MIN_ROWS: u32 = 8;
    pub const MAX_ROWS: u32 = 16;

    /// Distributions are expressed in percent
    pub const PERCENT_SCALE: f64 = 100.0;

    /// Peg and ball sizes relative to the slot width
    pub const PEG_RADIUS_FACTOR: f32 = 0.1;
    pub const BALL_RADIUS_FACTOR: f32 = 0.22;
    pub const PEG_RADIUS_MIN: f32 = 2.0;
    pub const PEG_RADIUS_MAX: f32 = 8.0;
    pub const BALL_RADIUS_MIN: f32 = 3.0;
    pub const BALL_RADIUS_MAX: f32 = 12.0;
}

/// Number of landing slots for a board with `rows` peg rows
#[inline]
pub fn slot_count(rows: u32) -> usize {
    rows as usize + 1
}

/// Whether `rows` is a board size the engine accepts drops for
#[inline]
pub fn rows_supported(rows: u32) -> bool {
    (consts::MIN_ROWS..=consts::MAX_ROWS).contains(&rows)
}
