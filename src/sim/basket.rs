//! Basket oscillation (level 2 and up)
//!
//! Offset is in percent of the hoop's width; `ArenaLayout::hoop_at` turns it
//! into pixels. The session owns the 25 ms tick timer and only arms it when
//! `start` reports a fresh start.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketMotion {
    offset: f32,
    direction: f32,
    speed: f32,
    range: f32,
    running: bool,
}

impl Default for BasketMotion {
    fn default() -> Self {
        Self {
            offset: 0.0,
            direction: 1.0,
            speed: 0.0,
            range: 0.0,
            running: false,
        }
    }
}

impl BasketMotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin oscillating. Returns true only when motion was stopped before;
    /// a call while running keeps the current tick and just adopts the new
    /// speed/range.
    pub fn start(&mut self, speed: f32, range: f32) -> bool {
        self.speed = speed;
        self.range = range;
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Advance one tick, returning the new offset
    pub fn tick(&mut self) -> f32 {
        if !self.running {
            return self.offset;
        }
        self.offset += self.direction * self.speed;
        if self.offset >= self.range {
            self.direction = -1.0;
        } else if self.offset <= -self.range {
            self.direction = 1.0;
        }
        self.offset
    }

    /// Halt and return to neutral
    pub fn stop(&mut self) {
        self.running = false;
        self.offset = 0.0;
        self.direction = 1.0;
    }
}
