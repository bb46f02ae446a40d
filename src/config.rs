//! Game balance configuration
//!
//! Defaults come from `crate::consts`; a JSON document can override any subset.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Inclusive clamp band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-level tuning row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Score needed to leave this level (None = final level)
    pub advance_at: Option<u32>,
    /// Basket offset change per tick (percent of hoop width)
    pub basket_speed: f32,
    /// Basket offset turnaround point (percent of hoop width)
    pub basket_range: f32,
    /// Max distance from target to basket center for a real shot
    pub range_radius: f32,
    /// Hoop size relative to the measured rest box
    #[serde(default = "unit_scale")]
    pub hoop_scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

/// Default level table
pub const DEFAULT_LEVELS: [LevelConfig; 3] = [
    LevelConfig {
        advance_at: Some(15),
        basket_speed: 0.0,
        basket_range: 0.0,
        range_radius: 350.0,
        hoop_scale: LEVEL_ONE_HOOP_SCALE,
    },
    LevelConfig {
        advance_at: Some(35),
        basket_speed: 0.6,
        basket_range: 15.0,
        range_radius: 250.0,
        hoop_scale: 1.0,
    },
    LevelConfig {
        advance_at: None,
        basket_speed: 0.9,
        basket_range: 25.0,
        range_radius: 200.0,
        hoop_scale: 1.0,
    },
];

/// Complete game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    pub session_seconds: u32,
    pub clock_tick_ms: u64,
    pub basket_tick_ms: u64,
    pub boundary_sample_ms: u64,

    // === Gesture ===
    pub min_drag_distance: f32,
    pub power_divisor: f32,
    pub max_power: f32,
    pub power_charge_tick_ms: u64,
    pub power_charge_step: f32,
    pub target_scale: f32,
    pub target_edge_inset: f32,

    // === Flight ===
    pub flight_time_ms: Band,
    pub peak_height: Band,
    pub out_of_bounds_margin: f32,
    pub hit_tolerance_fraction: f32,
    pub fallback_range_radius: f32,
    pub direct_drop_ms: u64,

    // === Settle delays (resolution -> ball back at origin) ===
    pub hit_settle_ms: u64,
    pub miss_settle_ms: u64,
    pub direct_drop_settle_ms: u64,
    pub out_of_bounds_settle_ms: u64,

    // === Scoring ===
    /// Derive base points from power; otherwise award `flat_hit_points`
    pub power_scoring: bool,
    pub flat_hit_points: u32,
    pub combo_window_ms: u64,

    /// Level table, index 0 = level 1
    pub levels: Vec<LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_seconds: SESSION_SECONDS,
            clock_tick_ms: CLOCK_TICK_MS,
            basket_tick_ms: BASKET_TICK_MS,
            boundary_sample_ms: BOUNDARY_SAMPLE_MS,

            min_drag_distance: MIN_DRAG_DISTANCE,
            power_divisor: POWER_DIVISOR,
            max_power: MAX_POWER,
            power_charge_tick_ms: POWER_CHARGE_TICK_MS,
            power_charge_step: POWER_CHARGE_STEP,
            target_scale: TARGET_SCALE,
            target_edge_inset: TARGET_EDGE_INSET,

            flight_time_ms: Band::new(FLIGHT_TIME_MIN_MS, FLIGHT_TIME_MAX_MS),
            peak_height: Band::new(PEAK_HEIGHT_MIN, PEAK_HEIGHT_MAX),
            out_of_bounds_margin: OUT_OF_BOUNDS_MARGIN,
            hit_tolerance_fraction: HIT_TOLERANCE_FRACTION,
            fallback_range_radius: FALLBACK_RANGE_RADIUS,
            direct_drop_ms: DIRECT_DROP_MS,

            hit_settle_ms: HIT_SETTLE_MS,
            miss_settle_ms: MISS_SETTLE_MS,
            direct_drop_settle_ms: DIRECT_DROP_SETTLE_MS,
            out_of_bounds_settle_ms: OUT_OF_BOUNDS_SETTLE_MS,

            power_scoring: true,
            flat_hit_points: FLAT_HIT_POINTS,
            combo_window_ms: COMBO_WINDOW_MS,

            levels: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON override document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunings the simulation can't run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        let ticks = [
            ("clock_tick_ms", self.clock_tick_ms),
            ("basket_tick_ms", self.basket_tick_ms),
            ("boundary_sample_ms", self.boundary_sample_ms),
            ("power_charge_tick_ms", self.power_charge_tick_ms),
        ];
        for (field, value) in ticks {
            if value == 0 {
                return Err(ConfigError::OutOfRange { field, value: 0.0 });
            }
        }

        if self.session_seconds == 0 {
            return Err(ConfigError::OutOfRange {
                field: "session_seconds",
                value: 0.0,
            });
        }
        if !(self.power_divisor > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "power_divisor",
                value: self.power_divisor as f64,
            });
        }
        if !(self.hit_tolerance_fraction >= 0.0 && self.hit_tolerance_fraction < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "hit_tolerance_fraction",
                value: self.hit_tolerance_fraction as f64,
            });
        }

        let bands = [
            ("flight_time_ms", self.flight_time_ms),
            ("peak_height", self.peak_height),
        ];
        for (field, band) in bands {
            if !(band.min > 0.0 && band.min <= band.max) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: band.min as f64,
                });
            }
        }

        for level in &self.levels {
            if !(level.range_radius > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field: "range_radius",
                    value: level.range_radius as f64,
                });
            }
            if !(level.hoop_scale > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field: "hoop_scale",
                    value: level.hoop_scale as f64,
                });
            }
            if level.basket_speed < 0.0 || level.basket_range < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "basket_speed",
                    value: level.basket_speed as f64,
                });
            }
        }

        for (index, pair) in self.levels.windows(2).enumerate() {
            if pair[1].range_radius >= pair[0].range_radius {
                return Err(ConfigError::RangeNotNarrowing {
                    level: (index + 2).min(u8::MAX as usize) as u8,
                });
            }
        }

        Ok(())
    }

    /// Tuning row for a 1-based level
    pub fn level(&self, level: u8) -> Option<&LevelConfig> {
        (level as usize)
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
    }

    /// Hoop scale for a level (1.0 for unknown levels)
    pub fn hoop_scale(&self, level: u8) -> f32 {
        self.level(level).map_or(1.0, |l| l.hoop_scale)
    }

    /// Basket (speed, range) for a level; unknown or static levels use level 2's
    pub fn basket_motion(&self, level: u8) -> (f32, f32) {
        match self.level(level) {
            Some(l) if l.basket_speed > 0.0 => (l.basket_speed, l.basket_range),
            _ => {
                let fallback = self.level(2).copied().unwrap_or(DEFAULT_LEVELS[1]);
                (fallback.basket_speed, fallback.basket_range)
            }
        }
    }
}
