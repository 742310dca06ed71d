//! Snap target resolution.
//!
//! Decides what the cursor is attached to. While the second endpoint of a
//! line is being placed the order is: point-to-point, perpendicular
//! correction, perpendicular preview, then the basic resolver. Without a
//! line start only the basic resolver runs: existing point, shape
//! vertex/center, shape edge, line interior, free space.

use crate::config::SnapConfig;
use crate::geometry::{
    closest_point_on_segment, distance, is_perpendicular, project_point_on_line,
};
use crate::lines::{Anchor, EndpointKind, LineEndpoint, LineSegment};
use crate::points::GeometryPoint;
use crate::shapes::{Shape, SnapRole};
use kurbo::{Line, Point};
use serde::{Deserialize, Serialize};

/// A snap result attaches to the same things a line endpoint can.
pub type SnapTarget = Anchor;

/// How a snap result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapHint {
    /// Ordinary nearest-target snap.
    #[default]
    None,
    /// Landed on another concrete point while drawing a line.
    PointToPoint,
    /// Cursor was near an edge/line and the line meets it at a right angle;
    /// the point is the exact foot.
    Perpendicular,
    /// Foot of the perpendicular from the line start onto some edge/line,
    /// independent of the cursor.
    PerpendicularPreview,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    pub target: SnapTarget,
    pub hint: SnapHint,
    /// Edge or line the perpendicular is dropped onto.
    pub edge: Option<Line>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self::at(point, Anchor::Free)
    }

    fn at(point: Point, target: SnapTarget) -> Self {
        Self {
            point,
            target,
            hint: SnapHint::None,
            edge: None,
        }
    }

    pub fn kind(&self) -> EndpointKind {
        self.target.kind()
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.target != Anchor::Free
    }

    pub fn is_perpendicular(&self) -> bool {
        self.hint == SnapHint::Perpendicular
    }

    pub fn is_perpendicular_preview(&self) -> bool {
        self.hint == SnapHint::PerpendicularPreview
    }

    pub fn is_point_to_point(&self) -> bool {
        self.hint == SnapHint::PointToPoint
    }

    /// Whether the result is acceptable as the first endpoint of a line.
    pub fn is_valid_line_start(&self) -> bool {
        self.kind().is_valid_start()
    }

    /// Line endpoint for this result. A committed preview becomes a free
    /// endpoint; its right angle is recorded on the line instead.
    pub fn endpoint(&self) -> LineEndpoint {
        match self.hint {
            SnapHint::PerpendicularPreview => LineEndpoint::free(self.point),
            _ => LineEndpoint::new(self.point, self.target),
        }
    }
}

/// Resolve the snap target for `cursor`.
///
/// `line_start` is the first endpoint of a line being drawn; it enables the
/// point-to-point and perpendicular stages.
pub fn resolve_snap(
    cursor: Point,
    shapes: &[Shape],
    points: &[GeometryPoint],
    lines: &[LineSegment],
    line_start: Option<Point>,
    config: &SnapConfig,
) -> SnapResult {
    let result = match line_start {
        Some(start) => point_to_point(cursor, start, shapes, points, config)
            .or_else(|| perpendicular_correction(cursor, start, shapes, lines, config))
            .or_else(|| perpendicular_preview(start, shapes, lines, config))
            .unwrap_or_else(|| resolve_basic(cursor, shapes, points, lines, config)),
        None => resolve_basic(cursor, shapes, points, lines, config),
    };
    log::trace!(
        "snap {:?} -> {:?} {:?} at ({:.1}, {:.1})",
        cursor,
        result.kind(),
        result.hint,
        result.point.x,
        result.point.y
    );
    result
}

/// Baseline resolver. Each stage takes the nearest match within its
/// tolerance; the first stage with a match wins.
pub fn resolve_basic(
    cursor: Point,
    shapes: &[Shape],
    points: &[GeometryPoint],
    lines: &[LineSegment],
    config: &SnapConfig,
) -> SnapResult {
    if let Some(p) = nearest_point(cursor, points, config.tolerance, |_| true) {
        return SnapResult::at(p.position, Anchor::Point(p.id()));
    }
    if let Some((position, anchor, _)) =
        nearest_shape_snap(cursor, shapes, config.tolerance, |_| true)
    {
        return SnapResult::at(position, anchor);
    }
    if let Some((position, anchor)) = nearest_outline(cursor, shapes, config.edge_tolerance) {
        return SnapResult::at(position, anchor);
    }
    if let Some((position, line, _)) = nearest_line(cursor, lines, config.tolerance) {
        return SnapResult::at(position, Anchor::Line(line.id()));
    }
    SnapResult::none(cursor)
}

/// Placement of a new geometry point: shape vertex/center within the snap
/// tolerance, else a shape outline within the edge tolerance.
pub fn resolve_placement(cursor: Point, shapes: &[Shape], config: &SnapConfig) -> Option<SnapResult> {
    nearest_shape_snap(cursor, shapes, config.tolerance, |_| true)
        .map(|(position, anchor, _)| SnapResult::at(position, anchor))
        .or_else(|| {
            nearest_outline(cursor, shapes, config.edge_tolerance)
                .map(|(position, anchor)| SnapResult::at(position, anchor))
        })
}

/// Existing points and shape snap points within the point-to-point
/// tolerance, excluding anything on top of the line start. Existing points
/// win ties.
pub fn point_to_point(
    cursor: Point,
    line_start: Point,
    shapes: &[Shape],
    points: &[GeometryPoint],
    config: &SnapConfig,
) -> Option<SnapResult> {
    let away_from_start = |p: Point| distance(p, line_start) > config.start_coincidence;
    let tolerance = config.point_to_point_tolerance;

    let existing = nearest_point(cursor, points, tolerance, away_from_start)
        .map(|p| (p.position, Anchor::Point(p.id()), distance(cursor, p.position)));
    let on_shape = nearest_shape_snap(cursor, shapes, tolerance, away_from_start);

    let (position, anchor, _) = match (existing, on_shape) {
        (Some(e), Some(s)) if s.2 < e.2 => s,
        (Some(e), _) => e,
        (None, Some(s)) => s,
        (None, None) => return None,
    };
    Some(SnapResult {
        hint: SnapHint::PointToPoint,
        ..SnapResult::at(position, anchor)
    })
}

/// Snap onto the edge or line nearest the cursor. When the segment from
/// `line_start` to that spot is perpendicular to it, the result is moved to
/// the exact (unclamped) foot.
pub fn perpendicular_correction(
    cursor: Point,
    line_start: Point,
    shapes: &[Shape],
    lines: &[LineSegment],
    config: &SnapConfig,
) -> Option<SnapResult> {
    // Outlines use the tighter edge tolerance so a cursor 15 units off an
    // edge still reaches the perpendicular preview.
    let shape_hit = nearest_outline_with_shape(cursor, shapes, config.edge_tolerance);
    let line_hit = nearest_line(cursor, lines, config.tolerance);

    let use_line = match (&shape_hit, &line_hit) {
        (Some((q, _)), Some((lq, _, _))) => distance(cursor, *lq) < distance(cursor, *q),
        (None, Some(_)) => true,
        (_, None) => false,
    };

    if use_line {
        let (closest, line, _) = line_hit?;
        let seg = line.segment();
        let anchor = Anchor::Line(line.id());
        if is_perpendicular(closest - line_start, seg.p1 - seg.p0, config.perpendicular_dot_tolerance) {
            let foot = project_point_on_line(line_start, seg.p0, seg.p1).point;
            return Some(perpendicular(foot, anchor, seg));
        }
        return Some(SnapResult::at(closest, anchor));
    }

    let (outline_point, shape) = shape_hit?;
    let anchor = Anchor::Edge { shape_id: shape.id() };
    for edge in shape.edges() {
        let on_edge = distance(
            outline_point,
            closest_point_on_segment(outline_point, edge.p0, edge.p1).point,
        ) <= config.perpendicular_edge_slack;
        if on_edge
            && is_perpendicular(
                outline_point - line_start,
                edge.p1 - edge.p0,
                config.perpendicular_dot_tolerance,
            )
        {
            let foot = project_point_on_line(line_start, edge.p0, edge.p1).point;
            return Some(perpendicular(foot, anchor, edge));
        }
    }
    Some(SnapResult::at(outline_point, anchor))
}

fn perpendicular(foot: Point, target: SnapTarget, edge: Line) -> SnapResult {
    SnapResult {
        point: foot,
        target,
        hint: SnapHint::Perpendicular,
        edge: Some(edge),
    }
}

/// Shortest perpendicular from `line_start` onto any shape edge or line,
/// provided the foot lies on the segment (within the configured slack) and
/// its length is inside the preview band.
pub fn perpendicular_preview(
    line_start: Point,
    shapes: &[Shape],
    lines: &[LineSegment],
    config: &SnapConfig,
) -> Option<SnapResult> {
    let candidates = shapes
        .iter()
        .flat_map(|shape| {
            let anchor = Anchor::Edge { shape_id: shape.id() };
            shape.edges().into_iter().map(move |edge| (edge, anchor))
        })
        .chain(lines.iter().map(|line| (line.segment(), Anchor::Line(line.id()))));

    let mut best: Option<(SnapResult, f64)> = None;
    for (edge, anchor) in candidates {
        let foot = project_point_on_line(line_start, edge.p0, edge.p1).point;
        let off_segment = distance(foot, closest_point_on_segment(foot, edge.p0, edge.p1).point);
        if off_segment > config.preview_segment_slack {
            continue;
        }
        let d = distance(line_start, foot);
        if d < config.preview_min_distance || d > config.preview_max_distance {
            continue;
        }
        if best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            let result = SnapResult {
                point: foot,
                target: anchor,
                hint: SnapHint::PerpendicularPreview,
                edge: Some(edge),
            };
            best = Some((result, d));
        }
    }
    best.map(|(result, _)| result)
}

fn nearest_point(
    cursor: Point,
    points: &[GeometryPoint],
    tolerance: f64,
    accept: impl Fn(Point) -> bool,
) -> Option<&GeometryPoint> {
    let mut best: Option<(&GeometryPoint, f64)> = None;
    for p in points.iter().filter(|p| accept(p.position)) {
        let d = distance(cursor, p.position);
        if d <= tolerance && best.is_none_or(|(_, bd)| d < bd) {
            best = Some((p, d));
        }
    }
    best.map(|(p, _)| p)
}

/// Nearest shape vertex or center within `tolerance`.
fn nearest_shape_snap(
    cursor: Point,
    shapes: &[Shape],
    tolerance: f64,
    accept: impl Fn(Point) -> bool,
) -> Option<(Point, Anchor, f64)> {
    let mut best: Option<(Point, Anchor, f64)> = None;
    for shape in shapes {
        let shape_id = shape.id();
        for snap in shape.snap_points() {
            if !accept(snap.position) {
                continue;
            }
            let d = distance(cursor, snap.position);
            if d <= tolerance && best.is_none_or(|(_, _, bd)| d < bd) {
                let anchor = match snap.role {
                    SnapRole::Vertex(index) => Anchor::Vertex { shape_id, index },
                    SnapRole::Center => Anchor::Center { shape_id },
                };
                best = Some((snap.position, anchor, d));
            }
        }
    }
    best
}

fn nearest_outline_with_shape<'a>(
    cursor: Point,
    shapes: &'a [Shape],
    tolerance: f64,
) -> Option<(Point, &'a Shape)> {
    let mut best: Option<(Point, &Shape, f64)> = None;
    for shape in shapes {
        if let Some(q) = shape.closest_outline_point(cursor, tolerance) {
            let d = distance(cursor, q);
            if best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((q, shape, d));
            }
        }
    }
    best.map(|(q, shape, _)| (q, shape))
}

fn nearest_outline(cursor: Point, shapes: &[Shape], tolerance: f64) -> Option<(Point, Anchor)> {
    nearest_outline_with_shape(cursor, shapes, tolerance)
        .map(|(q, shape)| (q, Anchor::Edge { shape_id: shape.id() }))
}

fn nearest_line(
    cursor: Point,
    lines: &[LineSegment],
    tolerance: f64,
) -> Option<(Point, &LineSegment, f64)> {
    let mut best: Option<(Point, &LineSegment, f64)> = None;
    for line in lines {
        let q = closest_point_on_segment(cursor, line.start.position, line.end.position).point;
        let d = distance(cursor, q);
        if d <= tolerance && best.is_none_or(|(_, _, bd)| d < bd) {
            best = Some((q, line, d));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::PointKind;
    use crate::shapes::Rectangle;
    use kurbo::Rect;

    fn square() -> Shape {
        Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
    }

    fn free_line(a: Point, b: Point) -> LineSegment {
        let start = LineEndpoint::new(a, Anchor::Point(uuid::Uuid::new_v4()));
        LineSegment::new(start, LineEndpoint::free(b)).unwrap()
    }

    #[test]
    fn test_free_space() {
        let config = SnapConfig::default();
        let result = resolve_snap(Point::new(500.0, 500.0), &[square()], &[], &[], None, &config);
        assert_eq!(result.kind(), EndpointKind::Free);
        assert_eq!(result.point, Point::new(500.0, 500.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_existing_point_beats_edge() {
        let config = SnapConfig::default();
        let shape = square();
        let point = GeometryPoint::new(Point::new(50.0, 0.0), "A", shape.id(), PointKind::Edge);
        let result = resolve_snap(Point::new(53.0, 2.0), &[shape], &[point.clone()], &[], None, &config);
        assert_eq!(result.target, Anchor::Point(point.id()));
        assert_eq!(result.point, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_vertex_beats_edge() {
        let config = SnapConfig::default();
        let shape = square();
        let result = resolve_snap(Point::new(96.0, 3.0), &[shape.clone()], &[], &[], None, &config);
        assert_eq!(result.target, Anchor::Vertex { shape_id: shape.id(), index: 1 });
        assert_eq!(result.point, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_edge_then_line() {
        let config = SnapConfig::default();
        let shape = square();
        let edge = resolve_snap(Point::new(40.0, 6.0), &[shape.clone()], &[], &[], None, &config);
        assert_eq!(edge.target, Anchor::Edge { shape_id: shape.id() });
        assert_eq!(edge.point, Point::new(40.0, 0.0));

        let line = free_line(Point::new(200.0, 0.0), Point::new(200.0, 100.0));
        let result = resolve_snap(Point::new(210.0, 50.0), &[shape], &[], &[line.clone()], None, &config);
        assert_eq!(result.target, Anchor::Line(line.id()));
        assert_eq!(result.point, Point::new(200.0, 50.0));
    }

    #[test]
    fn test_point_to_point_skips_line_start() {
        let config = SnapConfig::default();
        let shape = square();
        // Start on the top-left vertex; the cursor is near it but the only
        // other candidate within 20 is the center at (50, 50) (too far).
        let result = point_to_point(Point::new(3.0, 3.0), Point::new(0.0, 0.0), &[shape.clone()], &[], &config);
        assert!(result.is_none());

        let result = point_to_point(Point::new(88.0, 5.0), Point::new(0.0, 0.0), &[shape.clone()], &[], &config)
            .unwrap();
        assert!(result.is_point_to_point());
        assert_eq!(result.target, Anchor::Vertex { shape_id: shape.id(), index: 1 });
    }

    #[test]
    fn test_point_to_point_prefers_existing_on_tie() {
        let config = SnapConfig::default();
        let shape = square();
        let on_vertex = GeometryPoint::new(Point::new(100.0, 100.0), "C", shape.id(), PointKind::Vertex(2));
        let result = point_to_point(
            Point::new(95.0, 95.0),
            Point::new(0.0, 0.0),
            &[shape],
            &[on_vertex.clone()],
            &config,
        )
        .unwrap();
        assert_eq!(result.target, Anchor::Point(on_vertex.id()));
    }

    #[test]
    fn test_perpendicular_correction_onto_line() {
        let config = SnapConfig::default();
        let line = free_line(Point::new(0.0, 100.0), Point::new(200.0, 100.0));
        let start = Point::new(80.0, 20.0);
        // Cursor 4 units off the line, right below the start.
        let result = resolve_snap(Point::new(80.0, 96.0), &[], &[], &[line.clone()], Some(start), &config);
        assert!(result.is_perpendicular());
        assert_eq!(result.target, Anchor::Line(line.id()));
        assert!((result.point.x - 80.0).abs() < 1e-9);
        assert!((result.point.y - 100.0).abs() < 1e-9);
        assert_eq!(result.edge, Some(line.segment()));
    }

    #[test]
    fn test_perpendicular_correction_onto_edge() {
        let config = SnapConfig::default();
        let shape = square();
        let start = Point::new(40.0, -100.0);
        let result = resolve_snap(Point::new(40.0, 5.0), &[shape.clone()], &[], &[], Some(start), &config);
        assert_eq!(result.hint, SnapHint::Perpendicular);
        assert_eq!(result.target, Anchor::Edge { shape_id: shape.id() });
        assert!((result.point.x - 40.0).abs() < 1e-9);
        assert!(result.point.y.abs() < 1e-9);
        assert_eq!(result.edge, Some(Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))));
    }

    #[test]
    fn test_non_perpendicular_edge_snap() {
        let config = SnapConfig::default();
        let shape = square();
        let start = Point::new(-200.0, -150.0);
        let result = resolve_snap(Point::new(40.0, 5.0), &[shape.clone()], &[], &[], Some(start), &config);
        assert_eq!(result.target, Anchor::Edge { shape_id: shape.id() });
        assert_eq!(result.hint, SnapHint::None);
        assert_eq!(result.point, Point::new(40.0, 0.0));
    }

    #[test]
    fn test_perpendicular_preview_band() {
        let config = SnapConfig::default();
        let line = free_line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));

        // 10 units away: below the band.
        assert!(perpendicular_preview(Point::new(50.0, 10.0), &[], &[line.clone()], &config).is_none());
        // 400 units away: above the band.
        assert!(perpendicular_preview(Point::new(50.0, 400.0), &[], &[line.clone()], &config).is_none());
        // Foot off the segment by more than the slack.
        assert!(perpendicular_preview(Point::new(110.0, 50.0), &[], &[line.clone()], &config).is_none());

        let result = perpendicular_preview(Point::new(50.0, 60.0), &[], &[line.clone()], &config).unwrap();
        assert!(result.is_perpendicular_preview());
        assert_eq!(result.point, Point::new(50.0, 0.0));
        assert_eq!(result.endpoint().kind(), EndpointKind::Free);
    }

    #[test]
    fn test_preview_picks_shortest() {
        let config = SnapConfig::default();
        let near = free_line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let far = free_line(Point::new(0.0, 200.0), Point::new(100.0, 200.0));
        let result =
            perpendicular_preview(Point::new(50.0, 150.0), &[], &[near, far.clone()], &config).unwrap();
        assert_eq!(result.target, Anchor::Line(far.id()));
    }

    #[test]
    fn test_placement() {
        let config = SnapConfig::default();
        let shape = square();
        let center = resolve_placement(Point::new(52.0, 48.0), &[shape.clone()], &config).unwrap();
        assert_eq!(center.target, Anchor::Center { shape_id: shape.id() });
        let edge = resolve_placement(Point::new(0.0, 40.0), &[shape.clone()], &config).unwrap();
        assert_eq!(edge.kind(), EndpointKind::Edge);
        assert!(resolve_placement(Point::new(30.0, 30.0), &[shape], &config).is_none());
    }

    #[test]
    fn test_valid_line_start() {
        assert!(!SnapResult::none(Point::ZERO).is_valid_line_start());
        let vertex = SnapResult::at(Point::ZERO, Anchor::Vertex { shape_id: uuid::Uuid::new_v4(), index: 0 });
        assert!(vertex.is_valid_line_start());
    }
}
