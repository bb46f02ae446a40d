//! Arena geometry supplied by the presentation layer
//!
//! All coordinates are container-local pixels, y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            size: self.size,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Same center, every side multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self::from_center(self.center(), self.size * factor)
    }

    /// Grow (or shrink, if negative) every edge by `margin`
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            size: self.size + Vec2::splat(margin * 2.0),
        }
    }
}

/// Layout snapshot measured by the presentation layer.
///
/// The hoop rect is the basket at rest; the simulation applies the
/// oscillation offset itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Container size (origin is the container's top-left)
    pub container: Vec2,
    /// Ball center at rest
    pub ball_origin: Vec2,
    /// Hoop rim box at zero offset
    pub hoop: Rect,
    /// Y of the surface balls fall onto
    pub floor_y: f32,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            container: Vec2::new(400.0, 600.0),
            ball_origin: Vec2::new(200.0, 420.0),
            hoop: Rect::from_center(Vec2::new(200.0, 150.0), Vec2::new(100.0, 40.0)),
            floor_y: 540.0,
        }
    }
}

impl ArenaLayout {
    pub fn bounds(&self) -> Rect {
        Rect {
            min: Vec2::ZERO,
            size: self.container,
        }
    }

    /// Hoop box shifted by `offset_pct` percent of its rest width, then
    /// scaled by `scale` about its own center
    pub fn hoop_at(&self, offset_pct: f32, scale: f32) -> Rect {
        self.hoop
            .translated(Vec2::new(offset_pct / 100.0 * self.hoop.width(), 0.0))
            .scaled(scale)
    }

    /// Past the container edges by more than `margin`
    pub fn is_out_of_bounds(&self, p: Vec2, margin: f32) -> bool {
        !self.bounds().inflate(margin).contains(p)
    }
}
