//! Line segments drawn between snap targets.

use crate::error::GeometryError;
use crate::points::PointId;
use crate::shapes::ShapeId;
use kurbo::{Line, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for line segments.
pub type LineId = Uuid;

/// Flat endpoint classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    Point,
    Vertex,
    Center,
    Edge,
    Line,
    Free,
}

impl EndpointKind {
    /// Kinds a line may start on.
    pub fn is_valid_start(self) -> bool {
        matches!(self, EndpointKind::Point | EndpointKind::Vertex | EndpointKind::Center)
    }
}

/// What a line endpoint is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// An existing geometry point; position is read live from the point.
    Point(PointId),
    Vertex { shape_id: ShapeId, index: usize },
    Center { shape_id: ShapeId },
    /// Somewhere on a shape outline.
    Edge { shape_id: ShapeId },
    /// The interior of another line.
    Line(LineId),
    Free,
}

impl Anchor {
    pub fn kind(&self) -> EndpointKind {
        match self {
            Anchor::Point(_) => EndpointKind::Point,
            Anchor::Vertex { .. } => EndpointKind::Vertex,
            Anchor::Center { .. } => EndpointKind::Center,
            Anchor::Edge { .. } => EndpointKind::Edge,
            Anchor::Line(_) => EndpointKind::Line,
            Anchor::Free => EndpointKind::Free,
        }
    }

    /// Id of the referenced point, shape or line.
    pub fn reference(&self) -> Option<Uuid> {
        match *self {
            Anchor::Point(id) | Anchor::Line(id) => Some(id),
            Anchor::Vertex { shape_id, .. }
            | Anchor::Center { shape_id }
            | Anchor::Edge { shape_id } => Some(shape_id),
            Anchor::Free => None,
        }
    }

    /// The shape this endpoint follows directly, if any.
    pub fn shape_id(&self) -> Option<ShapeId> {
        match *self {
            Anchor::Vertex { shape_id, .. }
            | Anchor::Center { shape_id }
            | Anchor::Edge { shape_id } => Some(shape_id),
            _ => None,
        }
    }
}

/// One end of a line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineEndpoint {
    pub position: Point,
    pub anchor: Anchor,
}

impl LineEndpoint {
    pub fn new(position: Point, anchor: Anchor) -> Self {
        Self { position, anchor }
    }

    pub fn free(position: Point) -> Self {
        Self::new(position, Anchor::Free)
    }

    pub fn kind(&self) -> EndpointKind {
        self.anchor.kind()
    }
}

/// A drawn line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub(crate) id: LineId,
    pub start: LineEndpoint,
    pub end: LineEndpoint,
    /// The end was placed as a perpendicular foot onto `right_angle_target`.
    #[serde(default)]
    pub is_right_angle: bool,
    #[serde(default)]
    pub right_angle_target: Option<Line>,
}

impl LineSegment {
    /// Create a line. The start must be a point, vertex or center, and the
    /// endpoints must not coincide.
    pub fn new(start: LineEndpoint, end: LineEndpoint) -> Result<Self, GeometryError> {
        if !start.kind().is_valid_start() {
            return Err(GeometryError::InvalidLineStart(start.kind()));
        }
        if start.position == end.position {
            return Err(GeometryError::DegenerateLine);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            start,
            end,
            is_right_angle: false,
            right_angle_target: None,
        })
    }

    /// Mark the end as the foot of a perpendicular onto `target`.
    pub fn with_right_angle(mut self, target: Line) -> Self {
        self.is_right_angle = true;
        self.right_angle_target = Some(target);
        self
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn segment(&self) -> Line {
        Line::new(self.start.position, self.end.position)
    }

    /// Whether either endpoint references `id` (shape, point or line).
    pub fn references(&self, id: Uuid) -> bool {
        self.start.anchor.reference() == Some(id) || self.end.anchor.reference() == Some(id)
    }

    /// Same line with start and end exchanged.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_kind_validation() {
        let shape = Uuid::new_v4();
        let end = LineEndpoint::free(Point::new(100.0, 0.0));
        let edge_start = LineEndpoint::new(Point::ZERO, Anchor::Edge { shape_id: shape });
        assert_eq!(
            LineSegment::new(edge_start, end),
            Err(GeometryError::InvalidLineStart(EndpointKind::Edge))
        );
        assert!(LineSegment::new(LineEndpoint::free(Point::ZERO), end).is_err());

        let vertex_start = LineEndpoint::new(Point::ZERO, Anchor::Vertex { shape_id: shape, index: 0 });
        let line = LineSegment::new(vertex_start, end).unwrap();
        assert!(line.references(shape));
        assert!(!line.is_right_angle);
    }

    #[test]
    fn test_degenerate_line() {
        let p = LineEndpoint::new(Point::ZERO, Anchor::Point(Uuid::new_v4()));
        assert_eq!(LineSegment::new(p, p), Err(GeometryError::DegenerateLine));
    }

    #[test]
    fn test_anchor_reference() {
        let id = Uuid::new_v4();
        assert_eq!(Anchor::Line(id).reference(), Some(id));
        assert_eq!(Anchor::Center { shape_id: id }.shape_id(), Some(id));
        assert_eq!(Anchor::Point(id).shape_id(), None);
        assert_eq!(Anchor::Free.reference(), None);
    }

    #[test]
    fn test_reversed_keeps_identity() {
        let start = LineEndpoint::new(Point::ZERO, Anchor::Point(Uuid::new_v4()));
        let line = LineSegment::new(start, LineEndpoint::free(Point::new(5.0, 0.0))).unwrap();
        let rev = line.reversed();
        assert_eq!(rev.id(), line.id());
        assert_eq!(rev.start, line.end);
        assert_eq!(rev.end, line.start);
    }
}
