//! Session countdown

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    session_seconds: u32,
    time_left: u32,
}

impl GameClock {
    pub fn new(session_seconds: u32) -> Self {
        Self {
            session_seconds,
            time_left: session_seconds,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_expired(&self) -> bool {
        self.time_left == 0
    }

    /// One-second tick. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.time_left == 0 {
            return false;
        }
        self.time_left -= 1;
        self.time_left == 0
    }

    pub fn reset(&mut self) {
        self.time_left = self.session_seconds;
    }
}
