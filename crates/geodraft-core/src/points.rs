//! Labeled points anchored to shapes.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for geometry points.
pub type PointId = Uuid;

/// Distance between a point and its label.
pub const LABEL_OFFSET: f64 = 15.0;

/// Where on its shape a point is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    /// Polygon vertex (or circle cardinal point) by index.
    Vertex(usize),
    Center,
    /// On the outline, or interior once re-mapped barycentrically.
    Edge,
}

/// A labeled point placed on a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPoint {
    pub(crate) id: PointId,
    pub position: Point,
    pub label: String,
    /// Owning shape (looked up by id; may be missing).
    pub shape_id: ShapeId,
    pub kind: PointKind,
}

impl GeometryPoint {
    pub fn new(position: Point, label: impl Into<String>, shape_id: ShapeId, kind: PointKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            label: label.into(),
            shape_id,
            kind,
        }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    /// Vertex index for vertex-anchored points.
    pub fn vertex_index(&self) -> Option<usize> {
        match self.kind {
            PointKind::Vertex(i) => Some(i),
            _ => None,
        }
    }

    /// Copy at a new position, keeping identity and label.
    pub fn moved_to(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// First unused single letter among the points of `shape_id`, or the first
/// free `A{n}` once all 26 are taken (`n` counts up from the number of
/// points on the shape).
pub fn next_label<'a>(points: impl IntoIterator<Item = &'a GeometryPoint>, shape_id: ShapeId) -> String {
    let used: Vec<&str> = points
        .into_iter()
        .filter(|p| p.shape_id == shape_id)
        .map(|p| p.label.as_str())
        .collect();
    let free = |candidate: &String| !used.contains(&candidate.as_str());
    ('A'..='Z')
        .map(String::from)
        .find(free)
        .or_else(|| (used.len()..).map(|n| format!("A{n}")).find(free))
        .unwrap_or_default()
}

/// Label anchor: `LABEL_OFFSET` away from the point, pointing away from the
/// shape's box center (straight up when the point is the center).
pub fn label_position(point: Point, shape: &Shape) -> Point {
    let away = point - shape.bounds().center();
    let len = away.hypot();
    if len == 0.0 {
        return point - Vec2::new(0.0, LABEL_OFFSET);
    }
    point + away * (LABEL_OFFSET / len)
}
