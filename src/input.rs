//! Drag input: pointer normalization, power, and release -> launch target
//!
//! Mouse and touch are both reduced to a `PointerEvent` in container-local
//! pixels before they reach the session.

use glam::Vec2;

use crate::config::GameConfig;

/// Normalized pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

/// A held drag, from pointer-down to pointer-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub start: Vec2,
    pub current: Vec2,
    /// 0..=max_power
    pub power: f32,
}

/// How a finished drag should be handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Too short; put the ball back
    Cancelled,
    /// Launch toward `target` with `power`
    Shoot { target: Vec2, power: f32 },
}

impl DragGesture {
    pub fn begin(start: Vec2) -> Self {
        Self {
            start,
            current: start,
            power: 0.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.start.distance(self.current)
    }

    /// Pointer moved: power tracks drag length
    pub fn update(&mut self, position: Vec2, config: &GameConfig) -> f32 {
        self.current = position;
        self.power = (self.distance() / config.power_divisor).min(config.max_power);
        self.power
    }

    /// Held without moving: power creeps up
    pub fn charge(&mut self, config: &GameConfig) -> f32 {
        self.power = (self.power + config.power_charge_step).min(config.max_power);
        self.power
    }

    /// Pointer released at `position` inside a container of `container` size
    pub fn release(mut self, position: Vec2, container: Vec2, config: &GameConfig) -> Release {
        self.current = position;
        let delta = self.current - self.start;
        if delta.length() <= config.min_drag_distance {
            return Release::Cancelled;
        }

        // Pull back to shoot forward
        let raw = self.start - delta * config.target_scale;
        let inset = Vec2::splat(config.target_edge_inset);
        let max = (container - inset).max(inset);
        Release::Shoot {
            target: raw.clamp(inset, max),
            power: self.power,
        }
    }
}
