//! Score, combo streak and level progression

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Scoring state for one session (top score survives resets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u32,
    pub top_score: u32,
    pub consecutive_hits: u32,
    /// Virtual time (ms) of the previous hit
    pub last_hit_ms: Option<u64>,
    pub current_level: u8,
}

impl ScoreState {
    fn new(top_score: u32) -> Self {
        Self {
            score: 0,
            top_score,
            consecutive_hits: 0,
            last_hit_ms: None,
            current_level: 1,
        }
    }
}

/// Result of a scored hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitAward {
    pub points: u32,
    pub combo: u32,
}

#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    state: ScoreState,
    /// Score needed to leave each level, index 0 = level 1
    thresholds: Vec<Option<u32>>,
    combo_window_ms: u64,
    flat_hit_points: u32,
}

impl ScoreKeeper {
    pub fn new(config: &GameConfig, top_score: u32) -> Self {
        Self {
            state: ScoreState::new(top_score),
            thresholds: config.levels.iter().map(|l| l.advance_at).collect(),
            combo_window_ms: config.combo_window_ms,
            flat_hit_points: config.flat_hit_points,
        }
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn level(&self) -> u8 {
        self.state.current_level
    }

    pub fn combo(&self) -> u32 {
        self.state.consecutive_hits
    }

    /// Points for a hit at the current combo/level
    fn points_for(&self, power: Option<f32>) -> u32 {
        let base = match power {
            Some(p) => (p.max(0.0) / 8.0).floor() as u32 + 2,
            None => self.flat_hit_points,
        };
        let combo_bonus = self.state.consecutive_hits.saturating_sub(1) * 3;
        let level_bonus = (self.state.current_level as u32).saturating_sub(1) * 2;
        base + combo_bonus + level_bonus
    }

    /// Register a hit at `now_ms`. `power` is None for flat scoring.
    pub fn on_hit(&mut self, power: Option<f32>, now_ms: u64) -> HitAward {
        let in_window = self
            .state
            .last_hit_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.combo_window_ms);
        self.state.consecutive_hits = if in_window {
            self.state.consecutive_hits + 1
        } else {
            1
        };
        self.state.last_hit_ms = Some(now_ms);

        let points = self.points_for(power);
        self.state.score += points;

        HitAward {
            points,
            combo: self.state.consecutive_hits,
        }
    }

    pub fn on_miss(&mut self) {
        self.state.consecutive_hits = 0;
    }

    /// Advance one level if the score reached this level's threshold.
    /// Returns the new level.
    pub fn check_level_up(&mut self) -> Option<u8> {
        let index = (self.state.current_level as usize).checked_sub(1)?;
        let threshold = (*self.thresholds.get(index)?)?;
        if self.state.score < threshold || index + 1 >= self.thresholds.len() {
            return None;
        }
        self.state.current_level += 1;
        log::info!(
            "Level up: {} (score {})",
            self.state.current_level,
            self.state.score
        );
        Some(self.state.current_level)
    }

    /// Record a new best if this session beat it
    pub fn update_top_score(&mut self) -> bool {
        if self.state.score > self.state.top_score {
            self.state.top_score = self.state.score;
            return true;
        }
        false
    }

    /// Start-of-session reset (keeps the top score)
    pub fn reset(&mut self) {
        self.state = ScoreState::new(self.state.top_score);
    }
}
