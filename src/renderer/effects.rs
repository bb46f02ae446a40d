//! Ball animations that follow a resolved shot
//!
//! Pure keyframe stepping so the browser presenter only applies styles.

use glam::Vec2;

/// One keyframe of the hit "sink" sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkFrame {
    /// Offset from the start of the sequence
    pub delay_ms: f64,
    /// Ball center x
    pub x: f32,
    /// Ball center y, None keeps the current height
    pub y: Option<f32>,
    pub scale: f32,
    pub rotation: f32,
    pub opacity: Option<f32>,
}

/// (delay, drop below the arrival point, scale, rotation, opacity)
const SINK_STEPS: [(f64, Option<f32>, f32, f32, Option<f32>); 6] = [
    (0.0, Some(0.0), 0.9, 360.0, None),
    (300.0, None, 0.8, 540.0, None),
    (500.0, Some(100.0), 0.7, 720.0, None),
    (900.0, Some(140.0), 0.6, 900.0, Some(0.8)),
    (1200.0, None, 0.7, 1080.0, None),
    (1400.0, None, 0.6, 1080.0, Some(0.9)),
];

/// Length of the sink sequence
pub fn sink_duration_ms() -> f64 {
    SINK_STEPS[SINK_STEPS.len() - 1].0
}

/// Ball dropping through the net after a hit at `at`
#[derive(Debug, Clone, PartialEq)]
pub struct SinkAnimation {
    at: Vec2,
    started: Option<f64>,
    next: usize,
}

impl SinkAnimation {
    pub fn new(at: Vec2) -> Self {
        Self {
            at,
            started: None,
            next: 0,
        }
    }

    /// Frames that became due by `time` (ms, any monotonic clock).
    /// The first call anchors the sequence.
    pub fn advance(&mut self, time: f64) -> Vec<SinkFrame> {
        let started = *self.started.get_or_insert(time);
        let mut frames = Vec::new();
        while let Some(&(delay_ms, drop, scale, rotation, opacity)) = SINK_STEPS.get(self.next) {
            if time - started < delay_ms {
                break;
            }
            frames.push(SinkFrame {
                delay_ms,
                x: self.at.x,
                y: drop.map(|d| self.at.y + d),
                scale,
                rotation,
                opacity,
            });
            self.next += 1;
        }
        frames
    }

    pub fn is_finished(&self) -> bool {
        self.next >= SINK_STEPS.len()
    }
}

/// Where a missed ball comes to rest: straight down onto the floor line
pub fn miss_landing(position: Vec2, floor_y: f32) -> Vec2 {
    Vec2::new(position.x, floor_y)
}
