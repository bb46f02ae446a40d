//! Deterministic shot simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (the host advances the `Scheduler`)
//! - No randomness
//! - No rendering or platform dependencies

pub mod basket;
pub mod clock;
pub mod geometry;
pub mod score;
pub mod session;
pub mod shot;
pub mod timers;
pub mod trajectory;

pub use basket::BasketMotion;
pub use clock::GameClock;
pub use geometry::{ArenaLayout, Rect};
pub use score::{HitAward, ScoreKeeper, ScoreState};
pub use session::{GameSession, SessionTimer};
pub use shot::{
    Launch, Resolution, ShotContext, ShotId, ShotOutcome, ShotPhase, ShotResolver, ShotTimer,
    ShotUpdate, hits_hoop,
};
pub use timers::{Scheduler, TimerId};
pub use trajectory::{ShotPath, Trajectory, TrajectoryPlanner};
