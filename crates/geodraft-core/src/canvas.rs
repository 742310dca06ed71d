//! Canvas document and state management.

use crate::collision::{self, HitTarget};
use crate::config::{EditorConfig, MeasureConfig};
use crate::error::{GeometryError, GeometryResult};
use crate::input::InputEvent;
use crate::lines::{Anchor, LineId, LineSegment};
use crate::measure::{Angle, LengthMeasurement, MeasurementId, refresh_angles};
use crate::points::{GeometryPoint, PointId};
use crate::propagate::propagate;
use crate::shapes::{Shape, ShapeId};
use crate::tools::{CursorKind, ToolKind, ToolManager};
use crate::transform::transform_vertex;
use kurbo::Point;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Copy of everything that depends on shapes, taken when a drag begins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependentSnapshot {
    pub points: Vec<GeometryPoint>,
    pub lines: Vec<LineSegment>,
    pub angles: Vec<Angle>,
    pub lengths: Vec<LengthMeasurement>,
}

/// The scene: shapes in draw order (last is topmost) plus the points,
/// lines and measurements that refer to them.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    pub shapes: Vec<Shape>,
    pub points: Vec<GeometryPoint>,
    pub lines: Vec<LineSegment>,
    pub angles: Vec<Angle>,
    pub lengths: Vec<LengthMeasurement>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            shapes: Vec::new(),
            points: Vec::new(),
            lines: Vec::new(),
            angles: Vec::new(),
            lengths: Vec::new(),
        }
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        log::debug!("add {:?} shape {id}", shape.kind());
        self.shapes.push(shape);
        id
    }

    /// Add a point. Its shape must exist.
    pub fn add_point(&mut self, point: GeometryPoint) -> GeometryResult<PointId> {
        if self.shape(point.shape_id).is_none() {
            return Err(GeometryError::UnknownShape(point.shape_id.to_string()));
        }
        let id = point.id();
        log::debug!("add point {} ({id})", point.label);
        self.points.push(point);
        Ok(id)
    }

    pub fn add_line(&mut self, line: LineSegment) -> LineId {
        let id = line.id();
        log::debug!(
            "add line {id}: {:?} -> {:?}",
            line.start.kind(),
            line.end.kind()
        );
        self.lines.push(line);
        id
    }

    /// Add an angle. Both of its lines must exist.
    pub fn add_angle(&mut self, angle: Angle) -> GeometryResult<MeasurementId> {
        if let Some(missing) = angle.line_ids.iter().find(|id| self.line(**id).is_none()) {
            return Err(GeometryError::UnknownLine(missing.to_string()));
        }
        let id = angle.id();
        log::debug!("add angle {:.1} at {:?}", angle.value, angle.vertex);
        self.angles.push(angle);
        Ok(id)
    }

    pub fn add_length(&mut self, length: LengthMeasurement) -> GeometryResult<MeasurementId> {
        if self.line(length.line_id).is_none() {
            return Err(GeometryError::UnknownLine(length.line_id.to_string()));
        }
        let id = length.id();
        self.lengths.push(length);
        Ok(id)
    }

    /// Get a shape by ID.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn point(&self, id: PointId) -> Option<&GeometryPoint> {
        self.points.iter().find(|p| p.id() == id)
    }

    pub fn line(&self, id: LineId) -> Option<&LineSegment> {
        self.lines.iter().find(|l| l.id() == id)
    }

    /// Current endpoint positions; point-anchored ends read the point.
    pub fn resolved_endpoints(&self, line: &LineSegment) -> (Point, Point) {
        let resolve = |anchor: Anchor, fallback: Point| match anchor {
            Anchor::Point(id) => self.point(id).map_or(fallback, |p| p.position),
            _ => fallback,
        };
        (
            resolve(line.start.anchor, line.start.position),
            resolve(line.end.anchor, line.end.position),
        )
    }

    /// Copy live point positions into point-anchored line endpoints.
    pub fn sync_point_endpoints(&mut self) {
        let resolved: Vec<(Point, Point)> =
            self.lines.iter().map(|l| self.resolved_endpoints(l)).collect();
        for (line, (start, end)) in self.lines.iter_mut().zip(resolved) {
            line.start.position = start;
            line.end.position = end;
        }
    }

    /// Remove a line and the measurements on it.
    pub fn remove_line(&mut self, id: LineId) -> Option<LineSegment> {
        let index = self.lines.iter().position(|l| l.id() == id)?;
        self.angles.retain(|a| !a.references(id));
        self.lengths.retain(|m| m.line_id != id);
        Some(self.lines.remove(index))
    }

    /// Remove a point and every line anchored to it.
    pub fn remove_point(&mut self, id: PointId) -> Option<GeometryPoint> {
        let index = self.points.iter().position(|p| p.id() == id)?;
        let removed = self.points.remove(index);
        self.remove_lines_where(|l| l.references(id));
        Some(removed)
    }

    /// Remove a shape with its points, the lines referencing either, and the
    /// measurements on those lines.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        let removed = self.shapes.remove(index);
        let point_ids: HashSet<PointId> = self
            .points
            .iter()
            .filter(|p| p.shape_id == id)
            .map(|p| p.id())
            .collect();
        self.points.retain(|p| p.shape_id != id);
        self.remove_lines_where(|l| {
            l.references(id)
                || [l.start.anchor, l.end.anchor]
                    .iter()
                    .any(|a| matches!(a, Anchor::Point(pid) if point_ids.contains(pid)))
        });
        log::debug!("removed shape {id} with {} points", point_ids.len());
        Some(removed)
    }

    fn remove_lines_where(&mut self, pred: impl Fn(&LineSegment) -> bool) {
        let doomed: Vec<LineId> = self.lines.iter().filter(|l| pred(l)).map(|l| l.id()).collect();
        for id in doomed {
            self.remove_line(id);
        }
    }

    /// Clear everything.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.points.clear();
        self.lines.clear();
        self.angles.clear();
        self.lengths.clear();
    }

    /// What a delete click at `p` would remove.
    pub fn hit_test(&self, p: Point, config: &MeasureConfig) -> Option<HitTarget> {
        collision::hit_test(p, &self.shapes, &self.points, &self.lines, config)
    }

    /// Delete the line, point or topmost shape at `p`.
    pub fn delete_at(&mut self, p: Point, config: &MeasureConfig) -> Option<HitTarget> {
        let target = self.hit_test(p, config)?;
        match target {
            HitTarget::Line(id) => {
                self.remove_line(id);
            }
            HitTarget::Point(id) => {
                self.remove_point(id);
            }
            HitTarget::Shape(id) => {
                self.remove_shape(id);
            }
        }
        Some(target)
    }

    /// Get shape IDs containing `point`, topmost first.
    pub fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| collision::point_in_shape(point, s))
            .map(|s| s.id())
            .collect()
    }

    /// Snapshot of the shape-dependent state.
    pub fn snapshot_dependents(&self) -> DependentSnapshot {
        DependentSnapshot {
            points: self.points.clone(),
            lines: self.lines.clone(),
            angles: self.angles.clone(),
            lengths: self.lengths.clone(),
        }
    }

    /// Put `shape` back and restore the dependents from `snapshot`.
    pub fn restore(&mut self, shape: Shape, snapshot: DependentSnapshot) {
        self.replace_shape(shape);
        self.points = snapshot.points;
        self.lines = snapshot.lines;
        self.angles = snapshot.angles;
        self.lengths = snapshot.lengths;
    }

    fn replace_shape(&mut self, shape: Shape) -> bool {
        match self.shapes.iter_mut().find(|s| s.id() == shape.id()) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => false,
        }
    }

    /// Replace `original` by `transformed` and re-derive its dependents from
    /// `base` in one step.
    pub fn apply_shape_transform(
        &mut self,
        original: &Shape,
        transformed: Shape,
        base: &DependentSnapshot,
        config: &MeasureConfig,
    ) {
        let propagation = propagate(original, &transformed, &base.points, &base.lines);
        if !self.replace_shape(transformed) {
            log::warn!("transform of missing shape {}", original.id());
            return;
        }
        self.points = propagation.points;
        self.lines = propagation.lines;
        self.sync_point_endpoints();

        self.angles = base.angles.clone();
        refresh_angles(&mut self.angles, &self.lines, config.recompute_angles_on_transform);
        self.lengths = base.lengths.clone();
        let unit = config.length_unit.as_deref();
        for length in &mut self.lengths {
            if let Some(line) = self.lines.iter().find(|l| l.id() == length.line_id) {
                length.refresh(line, unit);
            }
        }
    }

    /// Move one vertex of a shape and update everything anchored to it.
    pub fn transform_shape(
        &mut self,
        shape_id: ShapeId,
        vertex_index: usize,
        position: Point,
        constrained: bool,
        config: &EditorConfig,
    ) -> GeometryResult<()> {
        let original = self
            .shape(shape_id)
            .cloned()
            .ok_or_else(|| GeometryError::UnknownShape(shape_id.to_string()))?;
        let transformed = transform_vertex(&original, vertex_index, position, constrained, &config.transform);
        let base = self.snapshot_dependents();
        self.apply_shape_transform(&original, transformed, &base, &config.measure);
        Ok(())
    }

    /// Serialize the scene for an external renderer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.lines.is_empty()
    }
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Tool manager.
    pub tool_manager: ToolManager,
    pub config: EditorConfig,
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.cancel(&mut self.document);
        self.tool_manager.set_tool(tool);
    }

    /// Route an event to the active tool.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => {
                self.tool_manager
                    .handle_pointer(pointer, &mut self.document, &self.config)
            }
            InputEvent::Key(key) => {
                if key.is_escape() {
                    self.tool_manager.cancel(&mut self.document);
                }
            }
        }
    }

    /// Cursor the host should display.
    pub fn cursor(&self) -> CursorKind {
        self.tool_manager.cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::LineEndpoint;
    use crate::points::PointKind;
    use crate::shapes::{Circle, Rectangle};
    use kurbo::Rect;

    fn square() -> Shape {
        Shape::Rectangle(Rectangle::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert!(!doc.id.is_empty());
    }

    #[test]
    fn test_add_point_requires_shape() {
        let mut doc = CanvasDocument::new();
        let orphan = GeometryPoint::new(Point::ZERO, "A", Uuid::new_v4(), PointKind::Center);
        assert!(matches!(doc.add_point(orphan), Err(GeometryError::UnknownShape(_))));
    }

    #[test]
    fn test_measurement_requires_line() {
        let mut doc = CanvasDocument::new();
        let line = LineSegment::new(
            LineEndpoint::new(Point::ZERO, Anchor::Point(Uuid::new_v4())),
            LineEndpoint::free(Point::new(10.0, 0.0)),
        )
        .unwrap();
        let length = LengthMeasurement::new(&line, None);
        assert!(matches!(doc.add_length(length.clone()), Err(GeometryError::UnknownLine(_))));
        doc.add_line(line);
        assert_eq!(doc.add_length(length.clone()), Ok(length.id()));
    }

    #[test]
    fn test_remove_shape_cascades() {
        let mut doc = CanvasDocument::new();
        let shape = square();
        let other = Shape::Circle(Circle::new(Rect::new(300.0, 0.0, 400.0, 100.0)));
        let shape_id = doc.add_shape(shape);
        let other_id = doc.add_shape(other);

        let a = GeometryPoint::new(Point::new(50.0, 0.0), "A", shape_id, PointKind::Edge);
        let a_id = doc.add_point(a).unwrap();
        let line = LineSegment::new(
            LineEndpoint::new(Point::new(50.0, 0.0), Anchor::Point(a_id)),
            LineEndpoint::new(Point::new(350.0, 50.0), Anchor::Center { shape_id: other_id }),
        )
        .unwrap();
        let line_id = doc.add_line(line.clone());
        doc.add_length(LengthMeasurement::new(&line, None)).unwrap();
        let unrelated = LineSegment::new(
            LineEndpoint::new(Point::new(350.0, 50.0), Anchor::Center { shape_id: other_id }),
            LineEndpoint::free(Point::new(500.0, 50.0)),
        )
        .unwrap();
        doc.add_line(unrelated);

        assert!(doc.remove_shape(shape_id).is_some());
        assert!(doc.points.is_empty());
        assert!(doc.line(line_id).is_none());
        assert!(doc.lengths.is_empty());
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.shapes.len(), 1);
    }

    #[test]
    fn test_resolved_endpoints_read_points() {
        let mut doc = CanvasDocument::new();
        let shape_id = doc.add_shape(square());
        let a_id = doc
            .add_point(GeometryPoint::new(Point::new(100.0, 0.0), "A", shape_id, PointKind::Vertex(1)))
            .unwrap();
        let line = LineSegment::new(
            LineEndpoint::new(Point::new(100.0, 0.0), Anchor::Point(a_id)),
            LineEndpoint::free(Point::new(200.0, 0.0)),
        )
        .unwrap();
        doc.add_line(line.clone());

        doc.transform_shape(shape_id, 1, Point::new(120.0, -20.0), false, &EditorConfig::default())
            .unwrap();
        let (start, end) = doc.resolved_endpoints(&doc.lines[0]);
        assert_eq!(start, Point::new(120.0, -20.0));
        assert_eq!(end, Point::new(200.0, 0.0));
        assert_eq!(doc.lines[0].start.position, start);
    }

    #[test]
    fn test_delete_at_priority() {
        let mut doc = CanvasDocument::new();
        let shape_id = doc.add_shape(square());
        let config = MeasureConfig::default();
        assert_eq!(doc.delete_at(Point::new(50.0, 50.0), &config), Some(HitTarget::Shape(shape_id)));
        assert!(doc.shapes.is_empty());
        assert_eq!(doc.delete_at(Point::new(50.0, 50.0), &config), None);
    }

    #[test]
    fn test_shapes_at_point_topmost_first() {
        let mut doc = CanvasDocument::new();
        let bottom = doc.add_shape(square());
        let top = doc.add_shape(Shape::Circle(Circle::new(Rect::new(25.0, 25.0, 75.0, 75.0))));
        assert_eq!(doc.shapes_at_point(Point::new(50.0, 50.0)), vec![top, bottom]);
    }

    #[test]
    fn test_restore_after_transform() {
        let mut doc = CanvasDocument::new();
        let shape = square();
        let shape_id = doc.add_shape(shape.clone());
        doc.add_point(GeometryPoint::new(Point::new(50.0, 0.0), "A", shape_id, PointKind::Edge))
            .unwrap();
        let snapshot = doc.snapshot_dependents();
        doc.transform_shape(shape_id, 1, Point::new(120.0, -20.0), false, &EditorConfig::default())
            .unwrap();
        assert_ne!(doc.points[0].position, Point::new(50.0, 0.0));

        doc.restore(shape.clone(), snapshot);
        assert_eq!(doc.shape(shape_id), Some(&shape));
        assert_eq!(doc.points[0].position, Point::new(50.0, 0.0));
    }
}
