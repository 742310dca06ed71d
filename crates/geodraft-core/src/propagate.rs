//! Dependent geometry propagation.
//!
//! After a shape is transformed, every point and line endpoint anchored to
//! it is re-derived from the new vertices: vertex points by index, centers by
//! centroid, outline points by (edge, ratio) and interior points by
//! barycentric coordinates. References to other shapes and endpoints of kind
//! point, line or free pass through untouched.

use crate::geometry::{
    Barycentric, barycentric, barycentric_to_point, locate_on_edges, point_at_edge,
};
use crate::lines::{Anchor, LineEndpoint, LineSegment};
use crate::points::{GeometryPoint, PointId, PointKind};
use crate::shapes::Shape;
use kurbo::Point;

/// Points farther than this from the outline are treated as interior.
pub const OUTLINE_SLACK: f64 = 0.5;

/// Outcome of one propagation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Propagation {
    /// All input points, with anchored ones moved.
    pub points: Vec<GeometryPoint>,
    /// All input lines, with shape-anchored endpoints moved.
    pub lines: Vec<LineSegment>,
    /// Ids of the points whose position changed.
    pub moved: Vec<PointId>,
}

/// Re-derive points and lines anchored to `original` against `transformed`.
///
/// `original` and `transformed` must be the same shape (same id); anything
/// else is a no-op.
pub fn propagate(
    original: &Shape,
    transformed: &Shape,
    points: &[GeometryPoint],
    lines: &[LineSegment],
) -> Propagation {
    if original.id() != transformed.id() {
        log::warn!("propagate called with two different shapes");
        return Propagation {
            points: points.to_vec(),
            lines: lines.to_vec(),
            moved: Vec::new(),
        };
    }
    let shape_id = original.id();
    let mut moved = Vec::new();

    let points = points
        .iter()
        .map(|p| {
            if p.shape_id != shape_id {
                return p.clone();
            }
            match relocate_point(p, original, transformed) {
                Some(position) if position != p.position => {
                    moved.push(p.id());
                    p.moved_to(position)
                }
                _ => p.clone(),
            }
        })
        .collect();

    let lines = lines
        .iter()
        .map(|line| LineSegment {
            start: relocate_endpoint(line.start, original, transformed),
            end: relocate_endpoint(line.end, original, transformed),
            ..line.clone()
        })
        .collect();

    Propagation {
        points,
        lines,
        moved,
    }
}

/// New position for an anchored point, or `None` to leave it in place.
pub fn relocate_point(point: &GeometryPoint, original: &Shape, transformed: &Shape) -> Option<Point> {
    match point.kind {
        PointKind::Center => Some(transformed.center()),
        PointKind::Vertex(index) => transformed.vertices().get(index).copied(),
        PointKind::Edge => {
            map_interior(point.position, original, transformed)
                .or_else(|| map_on_outline(point.position, original, transformed))
        }
    }
}

fn relocate_endpoint(endpoint: LineEndpoint, original: &Shape, transformed: &Shape) -> LineEndpoint {
    let shape_id = original.id();
    let position = match endpoint.anchor {
        Anchor::Edge { shape_id: id } if id == shape_id => {
            map_on_outline(endpoint.position, original, transformed)
        }
        Anchor::Vertex { shape_id: id, index } if id == shape_id => {
            transformed.vertices().get(index).copied()
        }
        Anchor::Center { shape_id: id } if id == shape_id => Some(transformed.center()),
        _ => None,
    };
    match position {
        Some(position) => LineEndpoint { position, ..endpoint },
        None => endpoint,
    }
}

/// Edge-relative mapping: nearest edge and ratio on `original`, evaluated on
/// `transformed`. Skips shapes without polygon edges and topology changes.
pub fn map_on_outline(p: Point, original: &Shape, transformed: &Shape) -> Option<Point> {
    let from = crate::geometry::polygon_edges(&original.vertices());
    let to = crate::geometry::polygon_edges(&transformed.vertices());
    if from.is_empty() || from.len() != to.len() {
        return None;
    }
    let location = locate_on_edges(p, &from)?;
    let edge = from.get(location.edge)?;
    if edge.p0 == edge.p1 {
        return None;
    }
    point_at_edge(&to, location.edge, location.ratio)
}

/// Barycentric mapping for points off the outline. Triangles map directly;
/// quads use the fan triangles (0, 1, 2) and (0, 2, 3).
pub fn map_interior(p: Point, original: &Shape, transformed: &Shape) -> Option<Point> {
    let from = original.vertices();
    let to = transformed.vertices();
    if from.len() < 3 || from.len() != to.len() {
        return None;
    }
    let edges = crate::geometry::polygon_edges(&from);
    if locate_on_edges(p, &edges)?.distance <= OUTLINE_SLACK {
        return None;
    }
    let (fan, coeffs) = locate_in_fan(p, &from)?;
    let [a, b, c] = fan;
    Some(barycentric_to_point(coeffs, to[a], to[b], to[c]))
}

fn locate_in_fan(p: Point, vertices: &[Point]) -> Option<([usize; 3], Barycentric)> {
    (1..vertices.len() - 1)
        .map(|i| [0, i, i + 1])
        .find_map(|fan @ [a, b, c]| {
            barycentric(p, vertices[a], vertices[b], vertices[c]).map(|coeffs| (fan, coeffs))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::shapes::{Rectangle, Triangle};
    use crate::transform::transform_vertex;
    use kurbo::Rect;
    use uuid::Uuid;

    fn square() -> Shape {
        Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_edge_point_follows_midpoint() {
        let shape = square();
        let point = GeometryPoint::new(Point::new(50.0, 0.0), "A", shape.id(), PointKind::Edge);
        let moved = transform_vertex(&shape, 1, Point::new(120.0, -20.0), false, &TransformConfig::default());
        let result = propagate(&shape, &moved, &[point.clone()], &[]);
        assert!(close(result.points[0].position, Point::new(60.0, -10.0)));
        assert_eq!(result.moved, vec![point.id()]);
    }

    #[test]
    fn test_vertex_and_center_points() {
        let shape = square();
        let vertex = GeometryPoint::new(Point::new(100.0, 0.0), "A", shape.id(), PointKind::Vertex(1));
        let center = GeometryPoint::new(Point::new(50.0, 50.0), "B", shape.id(), PointKind::Center);
        let stale = GeometryPoint::new(Point::new(1.0, 1.0), "C", shape.id(), PointKind::Vertex(9));
        let moved = transform_vertex(&shape, 1, Point::new(140.0, 0.0), false, &TransformConfig::default());
        let result = propagate(&shape, &moved, &[vertex, center, stale.clone()], &[]);
        assert!(close(result.points[0].position, Point::new(140.0, 0.0)));
        assert!(close(result.points[1].position, Point::new(60.0, 50.0)));
        assert_eq!(result.points[2], stale);
    }

    #[test]
    fn test_identity_is_noop() {
        let shape = Shape::Triangle(Triangle::new(Rect::new(0.0, 0.0, 120.0, 80.0)));
        let points = vec![
            GeometryPoint::new(Point::new(30.0, 40.0), "A", shape.id(), PointKind::Edge),
            GeometryPoint::new(Point::new(60.0, 50.0), "B", shape.id(), PointKind::Edge),
            GeometryPoint::new(shape.center(), "C", shape.id(), PointKind::Center),
        ];
        let start = LineEndpoint::new(Point::new(0.0, 80.0), Anchor::Vertex { shape_id: shape.id(), index: 1 });
        let end = LineEndpoint::new(Point::new(60.0, 80.0), Anchor::Edge { shape_id: shape.id() });
        let line = LineSegment::new(start, end).unwrap();

        let result = propagate(&shape, &shape, &points, &[line.clone()]);
        for (before, after) in points.iter().zip(&result.points) {
            assert!((before.position - after.position).hypot() < 1e-9);
        }
        assert!((result.lines[0].end.position - line.end.position).hypot() < 1e-9);
        assert!((result.lines[0].start.position - line.start.position).hypot() < 1e-9);
    }

    #[test]
    fn test_line_endpoints_by_kind() {
        let shape = square();
        let other = Uuid::new_v4();
        let start = LineEndpoint::new(Point::new(0.0, 0.0), Anchor::Point(other));
        let end = LineEndpoint::new(Point::new(50.0, 0.0), Anchor::Edge { shape_id: shape.id() });
        let line = LineSegment::new(start, end).unwrap();
        let free_end = LineSegment::new(
            LineEndpoint::new(Point::new(0.0, 0.0), Anchor::Center { shape_id: other }),
            LineEndpoint::free(Point::new(100.0, 0.0)),
        )
        .unwrap();

        let moved = transform_vertex(&shape, 1, Point::new(120.0, -20.0), false, &TransformConfig::default());
        let result = propagate(&shape, &moved, &[], &[line.clone(), free_end.clone()]);
        assert_eq!(result.lines[0].start, line.start);
        assert!(close(result.lines[0].end.position, Point::new(60.0, -10.0)));
        assert_eq!(result.lines[1], free_end);
    }

    #[test]
    fn test_interior_point_barycentric() {
        let shape = square();
        let inside = GeometryPoint::new(Point::new(25.0, 25.0), "A", shape.id(), PointKind::Edge);
        let moved = shape
            .with_vertices(
                &[
                    Point::new(0.0, 0.0),
                    Point::new(200.0, 0.0),
                    Point::new(200.0, 200.0),
                    Point::new(0.0, 200.0),
                ],
                20.0,
            )
            .unwrap();
        let result = propagate(&shape, &moved, &[inside], &[]);
        assert!(close(result.points[0].position, Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_other_shape_untouched() {
        let shape = square();
        let foreign = GeometryPoint::new(Point::new(50.0, 0.0), "A", Uuid::new_v4(), PointKind::Edge);
        let moved = transform_vertex(&shape, 1, Point::new(120.0, -20.0), false, &TransformConfig::default());
        let result = propagate(&shape, &moved, &[foreign.clone()], &[]);
        assert_eq!(result.points[0], foreign);
        assert!(result.moved.is_empty());
    }
}
