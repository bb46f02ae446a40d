//! Presentation boundary
//!
//! The simulation reports what happened through `Renderer`; it never touches
//! DOM or drawing state. Every method defaults to a no-op so a presenter only
//! implements what it shows.

pub mod effects;

use glam::Vec2;

use crate::sim::{ShotOutcome, ShotPath};

pub trait Renderer {
    fn on_shot_launched(&mut self, _path: &ShotPath, _power: f32) {}
    fn on_ball_position_update(&mut self, _pos: Vec2) {}
    fn on_shot_resolved(&mut self, _outcome: ShotOutcome, _position: Vec2) {}
    /// Ball is back at its origin and can be dragged again
    fn on_ball_reset(&mut self, _origin: Vec2) {}
    fn on_power_changed(&mut self, _power: f32) {}
    fn on_score_changed(&mut self, _score: u32, _points_awarded: u32) {}
    fn on_combo_changed(&mut self, _combo: u32) {}
    fn on_level_up(&mut self, _level: u8) {}
    /// Current level and its hoop scale; sent on level-up, start and reset
    fn on_level_changed(&mut self, _level: u8, _hoop_scale: f32) {}
    /// Basket offset in percent of hoop width (0 = centered)
    fn on_basket_moved(&mut self, _offset: f32) {}
    fn on_time_changed(&mut self, _seconds_left: u32) {}
    fn on_session_ended(&mut self, _final_score: u32, _top_score: u32, _is_new_record: bool) {}
}

/// One renderer notification, as recorded by `RecordingRenderer`
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    ShotLaunched { path: ShotPath, power: f32 },
    BallMoved(Vec2),
    ShotResolved { outcome: ShotOutcome, position: Vec2 },
    BallReset(Vec2),
    PowerChanged(f32),
    ScoreChanged { score: u32, points: u32 },
    ComboChanged(u32),
    LevelUp(u8),
    LevelChanged { level: u8, hoop_scale: f32 },
    BasketMoved(f32),
    TimeChanged(u32),
    SessionEnded {
        final_score: u32,
        top_score: u32,
        is_new_record: bool,
    },
}

/// Headless presenter that keeps every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
    /// Skip the high-frequency position/basket/power streams
    pub quiet: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that drops ball/basket/power streams
    pub fn quiet() -> Self {
        Self {
            events: Vec::new(),
            quiet: true,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn outcomes(&self) -> Vec<ShotOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::ShotResolved { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn push(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn on_shot_launched(&mut self, path: &ShotPath, power: f32) {
        self.push(RenderEvent::ShotLaunched { path: *path, power });
    }

    fn on_ball_position_update(&mut self, pos: Vec2) {
        if !self.quiet {
            self.push(RenderEvent::BallMoved(pos));
        }
    }

    fn on_shot_resolved(&mut self, outcome: ShotOutcome, position: Vec2) {
        self.push(RenderEvent::ShotResolved { outcome, position });
    }

    fn on_ball_reset(&mut self, origin: Vec2) {
        self.push(RenderEvent::BallReset(origin));
    }

    fn on_power_changed(&mut self, power: f32) {
        if !self.quiet {
            self.push(RenderEvent::PowerChanged(power));
        }
    }

    fn on_score_changed(&mut self, score: u32, points_awarded: u32) {
        self.push(RenderEvent::ScoreChanged {
            score,
            points: points_awarded,
        });
    }

    fn on_combo_changed(&mut self, combo: u32) {
        self.push(RenderEvent::ComboChanged(combo));
    }

    fn on_level_up(&mut self, level: u8) {
        self.push(RenderEvent::LevelUp(level));
    }

    fn on_level_changed(&mut self, level: u8, hoop_scale: f32) {
        self.push(RenderEvent::LevelChanged { level, hoop_scale });
    }

    fn on_basket_moved(&mut self, offset: f32) {
        if !self.quiet {
            self.push(RenderEvent::BasketMoved(offset));
        }
    }

    fn on_time_changed(&mut self, seconds_left: u32) {
        self.push(RenderEvent::TimeChanged(seconds_left));
    }

    fn on_session_ended(&mut self, final_score: u32, top_score: u32, is_new_record: bool) {
        self.push(RenderEvent::SessionEnded {
            final_score,
            top_score,
            is_new_record,
        });
    }
}
