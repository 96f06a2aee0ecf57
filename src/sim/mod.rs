//! Ball animation
//!
//! Everything that moves a ball lives here. The slot is always decided before
//! a ball is created, so this module is deterministic given its inputs:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Pixel geometry derived from the board size
//! - No rendering or platform dependencies

pub mod animation;
pub mod ball;
pub mod board;
pub mod collision;
pub mod guidance;
pub mod path_anim;
pub mod reconciler;

pub use animation::{BallAnimation, CollisionEvent};
pub use ball::{BallPhase, PhysicsBall, TRAIL_LENGTH, TrailPoint};
pub use board::{Board, Peg};
pub use collision::{CollisionResult, ball_peg_collision, bounce_velocity, reflect_velocity};
pub use guidance::{GuidanceCurve, GuidanceTier};
pub use path_anim::PathAnimation;
pub use reconciler::{PhysicsParams, PhysicsReconciler};
