//! Hoop Shot - A drag-and-release arcade basketball game
//!
//! Core modules:
//! - `sim`: Deterministic shot simulation (trajectory, hit test, scoring, timers)
//! - `renderer`: Effect port the presentation layer implements
//! - `persistence`: Top score storage
//! - `input`: Pointer normalization and drag power
//! - `config`: Data-driven game balance

pub mod config;
pub mod error;
pub mod input;
pub mod persistence;
pub mod renderer;
pub mod sim;

pub use config::{Band, GameConfig, LevelConfig};
pub use error::{ConfigError, StorageError};
pub use renderer::{RecordingRenderer, RenderEvent, Renderer};
pub use sim::GameSession;

/// Game tuning constants (defaults for `GameConfig`)
pub mod consts {
    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 120;
    /// Clock tick period (one second)
    pub const CLOCK_TICK_MS: u64 = 1000;
    /// Basket oscillation tick period
    pub const BASKET_TICK_MS: u64 = 25;
    /// In-flight boundary sampling period
    pub const BOUNDARY_SAMPLE_MS: u64 = 30;
    /// Power charge tick while the ball is held
    pub const POWER_CHARGE_TICK_MS: u64 = 60;
    pub const POWER_CHARGE_STEP: f32 = 1.0;

    /// Drags at or below this distance (px) don't launch
    pub const MIN_DRAG_DISTANCE: f32 = 20.0;
    /// Power = min(MAX_POWER, drag distance / POWER_DIVISOR)
    pub const POWER_DIVISOR: f32 = 2.0;
    pub const MAX_POWER: f32 = 100.0;
    /// Launch target is the drag vector inverted and scaled by this
    pub const TARGET_SCALE: f32 = 2.0;
    /// Launch targets are clamped this far inside the container edges
    pub const TARGET_EDGE_INSET: f32 = 50.0;

    /// Flight time clamp band (ms)
    pub const FLIGHT_TIME_MIN_MS: f32 = 800.0;
    pub const FLIGHT_TIME_MAX_MS: f32 = 1500.0;
    /// Arc peak height clamp band (px)
    pub const PEAK_HEIGHT_MIN: f32 = 100.0;
    pub const PEAK_HEIGHT_MAX: f32 = 300.0;

    /// Slack around the container before a ball counts as out of bounds
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 20.0;
    /// Vertical rim tolerance as a fraction of hoop height
    pub const HIT_TOLERANCE_FRACTION: f32 = 0.2;
    /// Range radius for levels missing from the table
    pub const FALLBACK_RANGE_RADIUS: f32 = 240.0;
    /// Level 1 plays on a bigger hoop
    pub const LEVEL_ONE_HOOP_SCALE: f32 = 1.2;

    /// Hits closer together than this extend the combo
    pub const COMBO_WINDOW_MS: u64 = 3000;
    /// Base points when power scaling is disabled
    pub const FLAT_HIT_POINTS: u32 = 2;

    /// Direct drop animation length
    pub const DIRECT_DROP_MS: u64 = 800;
    /// Delay from resolution until the ball is back at its origin
    pub const HIT_SETTLE_MS: u64 = 1800;
    pub const MISS_SETTLE_MS: u64 = 1000;
    pub const DIRECT_DROP_SETTLE_MS: u64 = 400;
    pub const OUT_OF_BOUNDS_SETTLE_MS: u64 = 200;
}
