//! Shape definitions for the editor.

mod circle;
mod rectangle;
mod triangle;

pub use circle::Circle;
pub use rectangle::{Rectangle, RectangleForm};
pub use triangle::{Triangle, TriangleForm};

use crate::error::GeometryError;
use crate::geometry::{closest_point_on_segment, distance};
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Polygon vertices in winding order. Empty for circles.
    fn vertices(&self) -> Vec<Point>;

    /// Outline segments (consecutive vertex pairs, wrapping).
    fn edges(&self) -> Vec<Line>;

    /// Center snap point (centroid for polygons).
    fn center(&self) -> Point;

    /// Whether `point` lies inside the shape.
    fn contains(&self, point: Point) -> bool;
}

/// Discriminant of [`Shape`], used by drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Triangle,
    Rectangle,
}

/// Role of a shape snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapRole {
    /// Vertex with its index (circle cardinal points count as vertices).
    Vertex(usize),
    Center,
}

/// A snap-worthy location on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSnapPoint {
    pub position: Point,
    pub role: SnapRole,
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Triangle(Triangle),
    Rectangle(Rectangle),
}

impl Shape {
    /// Build a shape from a drag gesture. With `regular` the drag end is
    /// squared off first. Both box dimensions must reach `min_size`.
    pub fn from_drag(
        kind: ShapeKind,
        start: Point,
        end: Point,
        regular: bool,
        min_size: f64,
    ) -> Result<Self, GeometryError> {
        let end = if regular {
            regular_drag_end(start, end)
        } else {
            end
        };
        let bounds = Rect::from_points(start, end);
        if bounds.width() < min_size || bounds.height() < min_size {
            return Err(GeometryError::ShapeTooSmall {
                width: bounds.width(),
                height: bounds.height(),
                min: min_size,
            });
        }
        Ok(match kind {
            ShapeKind::Circle => Shape::Circle(Circle::new(bounds)),
            ShapeKind::Triangle => Shape::Triangle(Triangle::new(bounds)),
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle::new(bounds)),
        })
    }

    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Circle(s) => s.id(),
            Shape::Triangle(s) => s.id(),
            Shape::Rectangle(s) => s.id(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Triangle(_) => ShapeKind::Triangle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Circle(s) => s.bounds(),
            Shape::Triangle(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
        }
    }

    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Shape::Circle(s) => s.vertices(),
            Shape::Triangle(s) => s.vertices(),
            Shape::Rectangle(s) => s.vertices(),
        }
    }

    pub fn edges(&self) -> Vec<Line> {
        match self {
            Shape::Circle(s) => s.edges(),
            Shape::Triangle(s) => s.edges(),
            Shape::Rectangle(s) => s.edges(),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            Shape::Circle(s) => s.center(),
            Shape::Triangle(s) => s.center(),
            Shape::Rectangle(s) => s.center(),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Shape::Circle(s) => s.contains(point),
            Shape::Triangle(s) => s.contains(point),
            Shape::Rectangle(s) => s.contains(point),
        }
    }

    pub fn is_transformed(&self) -> bool {
        match self {
            Shape::Circle(_) => false,
            Shape::Triangle(s) => s.is_transformed(),
            Shape::Rectangle(s) => s.is_transformed(),
        }
    }

    /// Only triangles and rectangles accept vertex drags.
    pub fn is_transformable(&self) -> bool {
        !matches!(self, Shape::Circle(_))
    }

    /// Center followed by the vertices (cardinal points for circles).
    pub fn snap_points(&self) -> Vec<ShapeSnapPoint> {
        let center = ShapeSnapPoint {
            position: self.center(),
            role: SnapRole::Center,
        };
        let vertices = match self {
            Shape::Circle(c) => c.cardinal_points().to_vec(),
            _ => self.vertices(),
        };
        std::iter::once(center)
            .chain(vertices.into_iter().enumerate().map(|(i, position)| ShapeSnapPoint {
                position,
                role: SnapRole::Vertex(i),
            }))
            .collect()
    }

    /// Closest point on the outline if it lies within `tolerance` of `p`.
    ///
    /// Circles use the radial test against the average radius and return the
    /// exact ellipse point; polygons take the nearest edge.
    pub fn closest_outline_point(&self, p: Point, tolerance: f64) -> Option<Point> {
        match self {
            Shape::Circle(c) => c.outline_point_near(p, tolerance),
            _ => {
                let mut best: Option<(Point, f64)> = None;
                for edge in self.edges() {
                    let q = closest_point_on_segment(p, edge.p0, edge.p1).point;
                    let d = distance(p, q);
                    if d <= tolerance && best.is_none_or(|(_, bd)| d < bd) {
                        best = Some((q, d));
                    }
                }
                best.map(|(q, _)| q)
            }
        }
    }

    /// Copy of this shape with explicit vertices. The bounding box becomes
    /// the vertices' extent with each dimension floored at `min_size`.
    /// Circles and vertex lists of the wrong length return `None`.
    pub fn with_vertices(&self, vertices: &[Point], min_size: f64) -> Option<Shape> {
        let bounds = vertex_bounds(vertices, min_size)?;
        match self {
            Shape::Circle(_) => None,
            Shape::Triangle(t) => {
                let vs: [Point; 3] = vertices.try_into().ok()?;
                Some(Shape::Triangle(t.transformed(vs, bounds)))
            }
            Shape::Rectangle(r) => {
                let vs: [Point; 4] = vertices.try_into().ok()?;
                Some(Shape::Rectangle(r.transformed(vs, bounds)))
            }
        }
    }
}

/// Axis-aligned extent of `vertices`, each dimension at least `min_size`.
pub fn vertex_bounds(vertices: &[Point], min_size: f64) -> Option<Rect> {
    let first = vertices.first()?;
    let extent = vertices
        .iter()
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
    Some(Rect::new(
        extent.x0,
        extent.y0,
        extent.x0 + extent.width().max(min_size),
        extent.y0 + extent.height().max(min_size),
    ))
}

/// Square off a drag: both extents become the smaller one, keeping the drag
/// direction.
pub fn regular_drag_end(start: Point, current: Point) -> Point {
    let dx = current.x - start.x;
    let dy = current.y - start.y;
    let size = dx.abs().min(dy.abs());
    Point::new(
        start.x + size.copysign(dx),
        start.y + size.copysign(dy),
    )
}

/// `Rect::contains` excludes the far edges; hit tests include them.
pub(crate) fn rect_contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_drag_rejects_small() {
        let result = Shape::from_drag(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 10.0),
            false,
            20.0,
        );
        assert!(matches!(result, Err(GeometryError::ShapeTooSmall { .. })));
    }

    #[test]
    fn test_from_drag_regular() {
        let shape = Shape::from_drag(
            ShapeKind::Triangle,
            Point::new(100.0, 100.0),
            Point::new(40.0, 180.0),
            true,
            20.0,
        )
        .unwrap();
        let b = shape.bounds();
        assert_eq!(shape.kind(), ShapeKind::Triangle);
        assert!((b.x0 - 40.0).abs() < f64::EPSILON);
        assert!((b.width() - 60.0).abs() < f64::EPSILON);
        assert!((b.height() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_regular_drag_end_keeps_direction() {
        let end = regular_drag_end(Point::new(0.0, 0.0), Point::new(-50.0, 30.0));
        assert_eq!(end, Point::new(-30.0, 30.0));
    }

    #[test]
    fn test_snap_points() {
        let shape = Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 50.0)));
        let pts = shape.snap_points();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0].role, SnapRole::Center);
        assert_eq!(pts[0].position, Point::new(50.0, 25.0));
        assert_eq!(pts[2].role, SnapRole::Vertex(1));
        assert_eq!(pts[2].position, Point::new(100.0, 0.0));

        let circle = Shape::Circle(Circle::new(Rect::new(0.0, 0.0, 40.0, 40.0)));
        assert_eq!(circle.snap_points().len(), 5);
        assert!(!circle.is_transformable());
    }

    #[test]
    fn test_closest_outline_point() {
        let shape = Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let q = shape.closest_outline_point(Point::new(40.0, 6.0), 8.0).unwrap();
        assert_eq!(q, Point::new(40.0, 0.0));
        assert!(shape.closest_outline_point(Point::new(40.0, 9.0), 8.0).is_none());
    }

    #[test]
    fn test_with_vertices_floors_bounds() {
        let shape = Shape::Triangle(Triangle::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let flat = shape
            .with_vertices(
                &[Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(50.0, 5.0)],
                20.0,
            )
            .unwrap();
        assert!(flat.is_transformed());
        assert_eq!(flat.id(), shape.id());
        assert!((flat.bounds().height() - 20.0).abs() < f64::EPSILON);
        assert!(shape.with_vertices(&[Point::ZERO], 20.0).is_none());
    }
}
