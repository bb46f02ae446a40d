//! Shot planning: range gate, flight timing and the arc the ball follows
//!
//! Deterministic and stateless. The arc is a stylized curve, not ballistics:
//! the ball always arrives exactly on the requested target.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{Band, GameConfig};

/// Flight plan for one parabolic shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub flight_time_ms: f32,
    pub peak_height: f32,
    /// Control point of the arc: halfway across, `peak_height` above the higher end
    pub midpoint: Vec2,
}

/// Tuning for the planner, lifted out of `GameConfig`
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPlanner {
    flight_time: Band,
    peak_height: Band,
    /// Range radius per level, index 0 = level 1
    range_radii: Vec<f32>,
    fallback_radius: f32,
}

impl TrajectoryPlanner {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            flight_time: config.flight_time_ms,
            peak_height: config.peak_height,
            range_radii: config.levels.iter().map(|l| l.range_radius).collect(),
            fallback_radius: config.fallback_range_radius,
        }
    }

    pub fn range_radius(&self, level: u8) -> f32 {
        (level as usize)
            .checked_sub(1)
            .and_then(|i| self.range_radii.get(i))
            .copied()
            .unwrap_or(self.fallback_radius)
    }

    /// Admissibility gate: is `target` close enough to the basket to be a real shot?
    pub fn is_within_range(&self, target: Vec2, basket_center: Vec2, level: u8) -> bool {
        target.distance(basket_center) <= self.range_radius(level)
    }

    /// Plan the flight from `start` to `target`
    pub fn plan_trajectory(&self, start: Vec2, target: Vec2, power: f32, distance: f32) -> Trajectory {
        let flight_time_ms = self.flight_time.clamp(distance * 2.0 + power * 5.0);
        let peak_height = self.peak_height.clamp(power * 2.0 + distance * 0.5);

        Trajectory {
            flight_time_ms,
            peak_height,
            midpoint: Vec2::new(
                start.x + (target.x - start.x) * 0.5,
                start.y.min(target.y) - peak_height,
            ),
        }
    }
}

/// Ease-out quad: fast release, slowing into the target
#[inline]
pub fn ease_out(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}

/// Point on the quadratic curve start -> control -> end
#[inline]
pub fn quadratic_point(start: Vec2, control: Vec2, end: Vec2, u: f32) -> Vec2 {
    let v = 1.0 - u;
    start * (v * v) + control * (2.0 * u * v) + end * (u * u)
}

/// Path the ball follows for one shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShotPath {
    /// In-range shot along the planned arc
    Arc {
        start: Vec2,
        target: Vec2,
        trajectory: Trajectory,
    },
    /// Out-of-range shot: short straight fall to the floor under the target
    Drop { from: Vec2, to: Vec2, duration_ms: u64 },
}

impl ShotPath {
    pub fn duration_ms(&self) -> u64 {
        match self {
            ShotPath::Arc { trajectory, .. } => trajectory.flight_time_ms.ceil() as u64,
            ShotPath::Drop { duration_ms, .. } => *duration_ms,
        }
    }

    /// Where the path ends
    pub fn end(&self) -> Vec2 {
        match self {
            ShotPath::Arc { target, .. } => *target,
            ShotPath::Drop { to, .. } => *to,
        }
    }

    /// Ball center `elapsed_ms` after launch
    pub fn position_at(&self, elapsed_ms: u64) -> Vec2 {
        let duration = self.duration_ms().max(1) as f32;
        let progress = (elapsed_ms as f32 / duration).min(1.0);
        match self {
            ShotPath::Arc {
                start,
                target,
                trajectory,
            } => quadratic_point(*start, trajectory.midpoint, *target, ease_out(progress)),
            ShotPath::Drop { from, to, .. } => from.lerp(*to, progress * progress),
        }
    }
}
