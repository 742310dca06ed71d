//! Hit-testing for deletion and measurement target acquisition.

use crate::config::MeasureConfig;
use crate::geometry::{distance, distance_to_segment};
use crate::lines::{LineId, LineSegment};
use crate::points::{GeometryPoint, PointId};
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;

/// Whether `p` is inside `shape`.
///
/// Transformed polygons use ray casting, regular ones their bounding box
/// (approximate for triangles), circles the ellipse equation.
pub fn point_in_shape(p: Point, shape: &Shape) -> bool {
    shape.contains(p)
}

/// Clamped distance from `p` to a line segment.
pub fn distance_to_line(p: Point, line: &LineSegment) -> f64 {
    distance_to_segment(p, line.start.position, line.end.position)
}

/// What a delete click hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Line(LineId),
    Point(PointId),
    Shape(ShapeId),
}

/// Line within the pick tolerance, most recent first.
pub fn line_at(p: Point, lines: &[LineSegment], tolerance: f64) -> Option<&LineSegment> {
    lines.iter().rev().find(|l| distance_to_line(p, l) <= tolerance)
}

/// Point within the pick radius.
pub fn point_at(p: Point, points: &[GeometryPoint], radius: f64) -> Option<&GeometryPoint> {
    points.iter().find(|gp| distance(p, gp.position) <= radius)
}

/// Topmost (last drawn) shape containing `p`.
pub fn shape_at(p: Point, shapes: &[Shape]) -> Option<&Shape> {
    shapes.iter().rev().find(|s| point_in_shape(p, s))
}

/// Delete-tool priority: line, then point, then topmost shape.
pub fn hit_test(
    p: Point,
    shapes: &[Shape],
    points: &[GeometryPoint],
    lines: &[LineSegment],
    config: &MeasureConfig,
) -> Option<HitTarget> {
    line_at(p, lines, config.line_pick_tolerance)
        .map(|l| HitTarget::Line(l.id()))
        .or_else(|| point_at(p, points, config.point_pick_radius).map(|gp| HitTarget::Point(gp.id())))
        .or_else(|| shape_at(p, shapes).map(|s| HitTarget::Shape(s.id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{Anchor, LineEndpoint};
    use crate::points::PointKind;
    use crate::shapes::{Circle, Rectangle};
    use kurbo::Rect;

    #[test]
    fn test_point_in_shape() {
        let rect = Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert!(point_in_shape(Point::new(50.0, 25.0), &rect));
        assert!(!point_in_shape(Point::new(150.0, 25.0), &rect));
        let circle = Shape::Circle(Circle::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!point_in_shape(Point::new(3.0, 3.0), &circle));
    }

    #[test]
    fn test_hit_priority() {
        let config = MeasureConfig::default();
        let bottom = Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 200.0, 200.0)));
        let top = Shape::Circle(Circle::new(Rect::new(50.0, 50.0, 150.0, 150.0)));
        let point = GeometryPoint::new(Point::new(100.0, 150.0), "A", top.id(), PointKind::Vertex(1));
        let line = LineSegment::new(
            LineEndpoint::new(Point::new(0.0, 0.0), Anchor::Vertex { shape_id: bottom.id(), index: 0 }),
            LineEndpoint::free(Point::new(200.0, 0.0)),
        )
        .unwrap();
        let shapes = [bottom.clone(), top.clone()];
        let points = [point.clone()];
        let lines = [line.clone()];

        assert_eq!(
            hit_test(Point::new(100.0, 3.0), &shapes, &points, &lines, &config),
            Some(HitTarget::Line(line.id()))
        );
        assert_eq!(
            hit_test(Point::new(104.0, 146.0), &shapes, &points, &lines, &config),
            Some(HitTarget::Point(point.id()))
        );
        assert_eq!(
            hit_test(Point::new(100.0, 100.0), &shapes, &points, &lines, &config),
            Some(HitTarget::Shape(top.id()))
        );
        assert_eq!(
            hit_test(Point::new(10.0, 190.0), &shapes, &points, &lines, &config),
            Some(HitTarget::Shape(bottom.id()))
        );
        assert_eq!(hit_test(Point::new(500.0, 500.0), &shapes, &points, &lines, &config), None);
    }

    #[test]
    fn test_distance_to_line_clamps() {
        let line = LineSegment::new(
            LineEndpoint::new(Point::new(0.0, 0.0), Anchor::Point(uuid::Uuid::new_v4())),
            LineEndpoint::free(Point::new(100.0, 0.0)),
        )
        .unwrap();
        assert!((distance_to_line(Point::new(50.0, 4.0), &line) - 4.0).abs() < 1e-9);
        assert!((distance_to_line(Point::new(103.0, 4.0), &line) - 5.0).abs() < 1e-9);
    }
}
