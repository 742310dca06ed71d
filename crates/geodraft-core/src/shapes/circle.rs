//! Circle (ellipse inscribed in its bounding box).

use super::{ShapeId, ShapeTrait};
use crate::config::CIRCLE_SEGMENTS;
use kurbo::{Line, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use uuid::Uuid;

/// A circle drawn by dragging its bounding box. Not transformable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Bounding box of the ellipse.
    pub bounds: Rect,
}

impl Circle {
    /// Create a new circle.
    pub fn new(bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            bounds: bounds.abs(),
        }
    }

    /// Horizontal and vertical radii.
    pub fn radii(&self) -> Vec2 {
        Vec2::new(self.bounds.width() / 2.0, self.bounds.height() / 2.0)
    }

    /// Top, bottom, left and right extremes.
    pub fn cardinal_points(&self) -> [Point; 4] {
        let c = self.bounds.center();
        let r = self.bounds;
        [
            Point::new(c.x, r.y0),
            Point::new(c.x, r.y1),
            Point::new(r.x0, c.y),
            Point::new(r.x1, c.y),
        ]
    }

    /// Point on the ellipse in the direction of `toward` from the center.
    pub fn point_on_ellipse(&self, toward: Point) -> Point {
        let c = self.bounds.center();
        let Vec2 { x: rx, y: ry } = self.radii();
        let d = toward - c;
        let k = ((d.x / rx).powi(2) + (d.y / ry).powi(2)).sqrt();
        if k == 0.0 || !k.is_finite() {
            return Point::new(c.x + rx, c.y);
        }
        c + d / k
    }

    /// Closest outline point when `p` lies within `tolerance` of the average
    /// radius.
    pub fn outline_point_near(&self, p: Point, tolerance: f64) -> Option<Point> {
        let Vec2 { x: rx, y: ry } = self.radii();
        let avg = (rx + ry) / 2.0;
        let d = (p - self.bounds.center()).hypot();
        ((d - avg).abs() <= tolerance).then(|| self.point_on_ellipse(p))
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn vertices(&self) -> Vec<Point> {
        Vec::new()
    }

    fn edges(&self) -> Vec<Line> {
        let c = self.bounds.center();
        let Vec2 { x: rx, y: ry } = self.radii();
        let at = |i: usize| {
            let a = i as f64 * TAU / CIRCLE_SEGMENTS as f64;
            Point::new(c.x + rx * a.cos(), c.y + ry * a.sin())
        };
        (0..CIRCLE_SEGMENTS).map(|i| Line::new(at(i), at(i + 1))).collect()
    }

    fn center(&self) -> Point {
        self.bounds.center()
    }

    fn contains(&self, point: Point) -> bool {
        let Vec2 { x: rx, y: ry } = self.radii();
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let d = point - self.bounds.center();
        (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
    }
}
