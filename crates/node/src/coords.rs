//! Typed canvas coordinates.
//!
//! Every node stores its geometry in absolute canvas space. Distinct
//! types for points, sizes and deltas keep them from being mixed up.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// Position in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint(pub Vec2);

/// Size in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasSize(pub Vec2);

/// Movement/offset in canvas space (not a position).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasDelta(pub Vec2);

// === CanvasPoint ===

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }
}

impl From<Vec2> for CanvasPoint {
    fn from(v: Vec2) -> Self {
        Self(v)
    }
}

impl From<CanvasPoint> for Vec2 {
    fn from(p: CanvasPoint) -> Self {
        p.0
    }
}

impl Add<CanvasDelta> for CanvasPoint {
    type Output = CanvasPoint;

    fn add(self, delta: CanvasDelta) -> Self::Output {
        CanvasPoint(self.0 + delta.0)
    }
}

impl AddAssign<CanvasDelta> for CanvasPoint {
    fn add_assign(&mut self, delta: CanvasDelta) {
        self.0 += delta.0;
    }
}

impl Sub for CanvasPoint {
    type Output = CanvasDelta;

    /// Subtracting two points gives a delta.
    fn sub(self, other: CanvasPoint) -> Self::Output {
        CanvasDelta(self.0 - other.0)
    }
}

// === CanvasSize ===

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self(Vec2::new(width, height))
    }

    pub fn width(&self) -> f32 {
        self.0.x
    }

    pub fn height(&self) -> f32 {
        self.0.y
    }
}

impl From<Vec2> for CanvasSize {
    fn from(v: Vec2) -> Self {
        Self(v)
    }
}

// === CanvasDelta ===

impl CanvasDelta {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }
}

impl From<Vec2> for CanvasDelta {
    fn from(v: Vec2) -> Self {
        Self(v)
    }
}

/// Axis-aligned bounding box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: CanvasPoint,
    pub max: CanvasPoint,
}

impl Bounds {
    pub fn from_origin_size(origin: CanvasPoint, size: CanvasSize) -> Self {
        Self {
            min: origin,
            max: CanvasPoint(origin.0 + size.0),
        }
    }

    /// Smallest box containing both.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: CanvasPoint(self.min.0.min(other.min.0)),
            max: CanvasPoint(self.max.0.max(other.max.0)),
        }
    }

    /// Union of every box in the iterator, `None` when it is empty.
    pub fn union_all(iter: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        iter.into_iter().reduce(Bounds::union)
    }

    pub fn origin(&self) -> CanvasPoint {
        self.min
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize(self.max.0 - self.min.0)
    }

    pub fn contains_point(&self, point: CanvasPoint) -> bool {
        point.x() >= self.min.x()
            && point.x() <= self.max.x()
            && point.y() >= self.min.y()
            && point.y() <= self.max.y()
    }
}
