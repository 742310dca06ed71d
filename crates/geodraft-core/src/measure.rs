//! Length and angle measurements.

use crate::error::GeometryError;
use crate::geometry::{angle_at, distance};
use crate::lines::{LineId, LineSegment};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for measurements.
pub type MeasurementId = Uuid;

/// Endpoints closer than this are the same vertex.
pub const EXACT_VERTEX_EPSILON: f64 = 0.001;

/// Length of a line segment.
pub fn line_length(line: &LineSegment) -> f64 {
    distance(line.start.position, line.end.position)
}

/// Length formatted with one decimal and an optional unit suffix.
pub fn length_label(length: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{length:.1} {unit}"),
        None => format!("{length:.1}"),
    }
}

/// A length annotation attached to a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthMeasurement {
    pub(crate) id: MeasurementId,
    pub line_id: LineId,
    pub value: f64,
    pub label: String,
}

impl LengthMeasurement {
    pub fn new(line: &LineSegment, unit: Option<&str>) -> Self {
        let value = line_length(line);
        Self {
            id: Uuid::new_v4(),
            line_id: line.id(),
            value,
            label: length_label(value, unit),
        }
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    /// Re-measure after the line moved.
    pub fn refresh(&mut self, line: &LineSegment, unit: Option<&str>) {
        self.value = line_length(line);
        self.label = length_label(self.value, unit);
    }
}

/// Which end of a line touches an angle's vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnd {
    Start,
    End,
}

impl LineEnd {
    fn of(self, line: &LineSegment) -> Point {
        match self {
            LineEnd::Start => line.start.position,
            LineEnd::End => line.end.position,
        }
    }

    fn opposite(self) -> Self {
        match self {
            LineEnd::Start => LineEnd::End,
            LineEnd::End => LineEnd::Start,
        }
    }
}

/// Shared vertex of two lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonVertex {
    pub position: Point,
    pub ends: [LineEnd; 2],
}

/// Find the vertex two lines share: an exact endpoint match first, else the
/// nearest pair of endpoints within `tolerance`.
pub fn find_common_vertex(a: &LineSegment, b: &LineSegment, tolerance: f64) -> Option<CommonVertex> {
    let pairs = [
        (LineEnd::Start, LineEnd::Start),
        (LineEnd::Start, LineEnd::End),
        (LineEnd::End, LineEnd::Start),
        (LineEnd::End, LineEnd::End),
    ];
    let gap = |(ea, eb): (LineEnd, LineEnd)| distance(ea.of(a), eb.of(b));

    let exact = pairs.iter().copied().find(|&pair| gap(pair) < EXACT_VERTEX_EPSILON);
    let pair = exact.or_else(|| {
        pairs
            .iter()
            .copied()
            .filter(|&pair| gap(pair) <= tolerance)
            .min_by(|&p, &q| gap(p).total_cmp(&gap(q)))
    })?;
    Some(CommonVertex {
        position: pair.0.of(a),
        ends: [pair.0, pair.1],
    })
}

/// Copy of `line` oriented to start at `end`.
pub fn oriented_from(line: &LineSegment, end: LineEnd) -> LineSegment {
    match end {
        LineEnd::Start => line.clone(),
        LineEnd::End => line.reversed(),
    }
}

/// An angle between two lines meeting at a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub(crate) id: MeasurementId,
    pub line_ids: [LineId; 2],
    /// Which end of each line sits at the vertex.
    pub ends: [LineEnd; 2],
    /// Degrees, 0..=180.
    pub value: f64,
    pub vertex: Point,
}

impl Angle {
    /// Measure the angle between two lines sharing a vertex.
    pub fn between(a: &LineSegment, b: &LineSegment, tolerance: f64) -> Result<Self, GeometryError> {
        let common = find_common_vertex(a, b, tolerance).ok_or(GeometryError::NoCommonVertex)?;
        let ray_a = oriented_from(a, common.ends[0]);
        let ray_b = oriented_from(b, common.ends[1]);
        let value = angle_at(common.position, ray_a.end.position, ray_b.end.position)
            .ok_or(GeometryError::DegenerateLine)?;
        Ok(Self {
            id: Uuid::new_v4(),
            line_ids: [a.id(), b.id()],
            ends: common.ends,
            value,
            vertex: common.position,
        })
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    /// Follow the lines after they moved. The vertex always tracks the first
    /// line's end; the value is only re-derived when `recompute` is set.
    pub fn refresh(&mut self, a: &LineSegment, b: &LineSegment, recompute: bool) {
        self.vertex = self.ends[0].of(a);
        if recompute {
            let far_a = self.ends[0].opposite().of(a);
            let far_b = self.ends[1].opposite().of(b);
            if let Some(value) = angle_at(self.vertex, far_a, far_b) {
                self.value = value;
            }
        }
    }

    pub fn references(&self, line_id: LineId) -> bool {
        self.line_ids.contains(&line_id)
    }
}

/// Refresh every angle whose lines still exist.
pub fn refresh_angles(angles: &mut [Angle], lines: &[LineSegment], recompute: bool) {
    let find = |id: LineId| lines.iter().find(|l| l.id() == id);
    for angle in angles.iter_mut() {
        if let (Some(a), Some(b)) = (find(angle.line_ids[0]), find(angle.line_ids[1])) {
            angle.refresh(a, b, recompute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{Anchor, LineEndpoint};

    fn line(a: Point, b: Point) -> LineSegment {
        let start = LineEndpoint::new(a, Anchor::Point(Uuid::new_v4()));
        LineSegment::new(start, LineEndpoint::free(b)).unwrap()
    }

    #[test]
    fn test_right_angle() {
        let a = line(Point::new(50.0, 50.0), Point::new(50.0, 0.0));
        let b = line(Point::new(50.0, 50.0), Point::new(100.0, 50.0));
        let angle = Angle::between(&a, &b, 10.0).unwrap();
        assert!((angle.value - 90.0).abs() < 1e-9);
        assert_eq!(angle.vertex, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_reversed_orientation() {
        // Second line ends at the shared vertex.
        let a = line(Point::new(50.0, 50.0), Point::new(0.0, 50.0));
        let b = line(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        let angle = Angle::between(&a, &b, 10.0).unwrap();
        assert_eq!(angle.ends, [LineEnd::Start, LineEnd::End]);
        assert!((angle.value - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_near_vertex_fallback() {
        let a = line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let b = line(Point::new(104.0, 3.0), Point::new(104.0, 80.0));
        let common = find_common_vertex(&a, &b, 10.0).unwrap();
        assert_eq!(common.position, Point::new(100.0, 0.0));
        assert_eq!(common.ends, [LineEnd::End, LineEnd::Start]);
    }

    #[test]
    fn test_no_common_vertex() {
        let a = line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let b = line(Point::new(0.0, 50.0), Point::new(100.0, 50.0));
        assert_eq!(Angle::between(&a, &b, 10.0), Err(GeometryError::NoCommonVertex));
    }

    #[test]
    fn test_refresh_freezes_value_by_default() {
        let a = line(Point::new(50.0, 50.0), Point::new(50.0, 0.0));
        let b = line(Point::new(50.0, 50.0), Point::new(100.0, 50.0));
        let mut angle = Angle::between(&a, &b, 10.0).unwrap();

        let mut moved_a = a.clone();
        moved_a.start.position = Point::new(0.0, 50.0);
        let mut moved_b = b.clone();
        moved_b.start.position = Point::new(0.0, 50.0);

        angle.refresh(&moved_a, &moved_b, false);
        assert_eq!(angle.vertex, Point::new(0.0, 50.0));
        assert!((angle.value - 90.0).abs() < 1e-9);

        refresh_angles(std::slice::from_mut(&mut angle), &[moved_a, moved_b], true);
        assert!((angle.value - 90.0).abs() > 1.0);
    }

    #[test]
    fn test_length_label() {
        let l = line(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        let m = LengthMeasurement::new(&l, Some("cm"));
        assert!((m.value - 50.0).abs() < 1e-9);
        assert_eq!(m.label, "50.0 cm");
        assert_eq!(length_label(12.345, None), "12.3");
    }
}
