//! Tool system for the editor.

use crate::canvas::CanvasDocument;
use crate::collision::line_at;
use crate::config::EditorConfig;
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::lines::{Anchor, LineEndpoint, LineId, LineSegment};
use crate::measure::{Angle, LengthMeasurement};
use crate::points::{GeometryPoint, PointKind, next_label};
use crate::shapes::{Shape, ShapeKind};
use crate::snap::{SnapResult, resolve_placement, resolve_snap};
use crate::transform::{TransformState, VertexDrag, VertexHandle, find_nearest_vertex, transform_vertex};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Circle,
    Triangle,
    Rectangle,
    Point,
    Line,
    Length,
    Angle,
    Transform,
    Delete,
    Clear,
}

impl ToolKind {
    /// Shape drawn by this tool, if it is a shape tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            _ => None,
        }
    }
}

/// Cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CursorKind {
    #[default]
    Default,
    Crosshair,
    /// Over a draggable vertex.
    Pointer,
    /// Dragging a vertex.
    Move,
    NotAllowed,
}

/// Cursor for the active tool and transform hover state.
pub fn cursor_for(tool: ToolKind, transform: &TransformState) -> CursorKind {
    match tool {
        ToolKind::Transform => match transform {
            TransformState::Dragging(_) => CursorKind::Move,
            TransformState::Hover(_) => CursorKind::Pointer,
            TransformState::Idle => CursorKind::Default,
        },
        ToolKind::Circle
        | ToolKind::Triangle
        | ToolKind::Rectangle
        | ToolKind::Point
        | ToolKind::Line
        | ToolKind::Length
        | ToolKind::Angle => CursorKind::Crosshair,
        ToolKind::Delete => CursorKind::NotAllowed,
        ToolKind::Select | ToolKind::Clear => CursorKind::Default,
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Drag-to-draw of a shape.
    DrawingShape {
        kind: ShapeKind,
        start: Point,
        current: Point,
        /// Square the bounding box (Shift held).
        regular: bool,
    },
    /// First line endpoint placed; `preview` follows the cursor.
    DrawingLine {
        start: LineEndpoint,
        preview: Option<SnapResult>,
    },
    /// First line of an angle picked.
    AngleFirst(LineId),
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Vertex hover / drag state of the transform tool.
    pub transform: TransformState,
    /// Latest snap under the cursor, for snap indicators.
    pub last_snap: Option<SnapResult>,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
        self.transform = TransformState::Idle;
        self.last_snap = None;
    }

    /// Check if a tool interaction is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle) || self.transform.is_transforming()
    }

    pub fn cursor(&self) -> CursorKind {
        cursor_for(self.current_tool, &self.transform)
    }

    /// Route a pointer event. Only the left button draws.
    pub fn handle_pointer(&mut self, event: &PointerEvent, doc: &mut CanvasDocument, config: &EditorConfig) {
        match *event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_down(position, modifiers, doc, config),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_up(position, modifiers, doc, config),
            PointerEvent::Move { position, modifiers } => self.pointer_move(position, modifiers, doc, config),
            _ => {}
        }
    }

    pub fn pointer_down(
        &mut self,
        position: Point,
        modifiers: Modifiers,
        doc: &mut CanvasDocument,
        config: &EditorConfig,
    ) {
        match self.current_tool {
            ToolKind::Circle | ToolKind::Triangle | ToolKind::Rectangle => {
                if let Some(kind) = self.current_tool.shape_kind() {
                    self.state = ToolState::DrawingShape {
                        kind,
                        start: position,
                        current: position,
                        regular: modifiers.shift,
                    };
                }
            }
            ToolKind::Point => place_point(position, doc, config),
            ToolKind::Line => self.line_click(position, doc, config),
            ToolKind::Length => {
                match line_at(position, &doc.lines, config.measure.line_pick_tolerance) {
                    Some(line) => {
                        let length = LengthMeasurement::new(line, config.measure.length_unit.as_deref());
                        log::debug!("length {} on line {}", length.label, line.id());
                        if let Err(err) = doc.add_length(length) {
                            log::warn!("length not added: {err}");
                        }
                    }
                    None => log::debug!("no line under {position:?} to measure"),
                }
            }
            ToolKind::Angle => self.angle_click(position, doc, config),
            ToolKind::Transform => self.begin_drag(position, doc, config),
            ToolKind::Delete => match doc.delete_at(position, &config.measure) {
                Some(target) => log::debug!("deleted {target:?}"),
                None => log::debug!("nothing to delete at {position:?}"),
            },
            ToolKind::Clear => {
                log::info!("clearing scene");
                doc.clear();
                self.state = ToolState::Idle;
            }
            ToolKind::Select => {}
        }
    }

    pub fn pointer_move(
        &mut self,
        position: Point,
        modifiers: Modifiers,
        doc: &mut CanvasDocument,
        config: &EditorConfig,
    ) {
        match &mut self.state {
            ToolState::DrawingShape { current, regular, .. } => {
                *current = position;
                *regular = modifiers.shift;
                return;
            }
            ToolState::DrawingLine { start, preview } => {
                let snap = resolve_snap(
                    position,
                    &doc.shapes,
                    &doc.points,
                    &doc.lines,
                    Some(start.position),
                    &config.snap,
                );
                *preview = Some(snap);
                self.last_snap = Some(snap);
                return;
            }
            _ => {}
        }

        match self.current_tool {
            ToolKind::Transform => self.drag_to(position, modifiers.shift, doc, config),
            ToolKind::Line => {
                let snap = resolve_snap(position, &doc.shapes, &doc.points, &doc.lines, None, &config.snap);
                self.last_snap = Some(snap);
            }
            ToolKind::Point => {
                self.last_snap = resolve_placement(position, &doc.shapes, &config.snap);
            }
            _ => {}
        }
    }

    pub fn pointer_up(
        &mut self,
        position: Point,
        modifiers: Modifiers,
        doc: &mut CanvasDocument,
        config: &EditorConfig,
    ) {
        if let ToolState::DrawingShape { kind, start, .. } = self.state {
            self.state = ToolState::Idle;
            match Shape::from_drag(kind, start, position, modifiers.shift, config.transform.min_size) {
                Ok(shape) => {
                    doc.add_shape(shape);
                }
                Err(err) => log::debug!("shape discarded: {err}"),
            }
            return;
        }

        if self.transform.is_transforming() {
            self.drag_to(position, modifiers.shift, doc, config);
            if let TransformState::Dragging(drag) = &self.transform {
                log::debug!(
                    "vertex {} of shape {} released at {position:?}",
                    drag.handle.vertex_index,
                    drag.handle.shape_id
                );
            }
            self.transform = TransformState::Idle;
        }
    }

    /// Abort the current interaction. An in-progress vertex drag restores
    /// the shape and its dependents as they were at drag start.
    pub fn cancel(&mut self, doc: &mut CanvasDocument) {
        if let TransformState::Dragging(drag) = std::mem::take(&mut self.transform) {
            log::debug!("vertex drag cancelled");
            let VertexDrag { original, snapshot, .. } = *drag;
            doc.restore(original, snapshot);
        }
        self.state = ToolState::Idle;
        self.last_snap = None;
    }

    /// Shape under construction.
    pub fn preview_shape(&self) -> Option<Shape> {
        match self.state {
            ToolState::DrawingShape {
                kind,
                start,
                current,
                regular,
            } => Shape::from_drag(kind, start, current, regular, 0.0).ok(),
            _ => None,
        }
    }

    fn line_click(&mut self, position: Point, doc: &mut CanvasDocument, config: &EditorConfig) {
        match self.state {
            ToolState::DrawingLine { start, .. } => {
                let snap = resolve_snap(
                    position,
                    &doc.shapes,
                    &doc.points,
                    &doc.lines,
                    Some(start.position),
                    &config.snap,
                );
                match LineSegment::new(start, snap.endpoint()) {
                    Ok(line) => {
                        let line = match snap.edge {
                            Some(edge) if snap.is_perpendicular() || snap.is_perpendicular_preview() => {
                                line.with_right_angle(edge)
                            }
                            _ => line,
                        };
                        doc.add_line(line);
                        self.state = ToolState::Idle;
                        self.last_snap = None;
                    }
                    Err(err) => log::debug!("line end rejected: {err}"),
                }
            }
            _ => {
                let snap = resolve_snap(position, &doc.shapes, &doc.points, &doc.lines, None, &config.snap);
                if snap.is_valid_line_start() {
                    self.state = ToolState::DrawingLine {
                        start: snap.endpoint(),
                        preview: None,
                    };
                } else {
                    log::debug!("line cannot start on {:?}", snap.kind());
                }
            }
        }
    }

    fn angle_click(&mut self, position: Point, doc: &mut CanvasDocument, config: &EditorConfig) {
        let Some(picked) = line_at(position, &doc.lines, config.measure.line_pick_tolerance) else {
            log::debug!("no line under {position:?}");
            return;
        };
        let picked_id = picked.id();
        match self.state {
            ToolState::AngleFirst(first_id) if first_id != picked_id => {
                self.state = ToolState::Idle;
                let Some(first) = doc.line(first_id) else {
                    return;
                };
                match Angle::between(first, picked, config.measure.angle_vertex_tolerance) {
                    Ok(angle) => {
                        if let Err(err) = doc.add_angle(angle) {
                            log::warn!("angle not added: {err}");
                        }
                    }
                    Err(err) => log::debug!("angle not measured: {err}"),
                }
            }
            ToolState::AngleFirst(_) => {}
            _ => self.state = ToolState::AngleFirst(picked_id),
        }
    }

    fn begin_drag(&mut self, position: Point, doc: &CanvasDocument, config: &EditorConfig) {
        let Some(handle) = vertex_under(position, doc, config) else {
            self.transform = TransformState::Idle;
            return;
        };
        let Some(shape) = doc.shape(handle.shape_id) else {
            return;
        };
        log::debug!("dragging vertex {} of shape {}", handle.vertex_index, handle.shape_id);
        self.transform = TransformState::Dragging(Box::new(VertexDrag {
            handle,
            original: shape.clone(),
            snapshot: doc.snapshot_dependents(),
        }));
    }

    /// Re-derive the dragged shape and its dependents from the drag-start
    /// state, or track hover when not dragging.
    fn drag_to(&mut self, position: Point, constrained: bool, doc: &mut CanvasDocument, config: &EditorConfig) {
        if let TransformState::Dragging(drag) = &self.transform {
            let transformed = transform_vertex(
                &drag.original,
                drag.handle.vertex_index,
                position,
                constrained,
                &config.transform,
            );
            doc.apply_shape_transform(&drag.original, transformed, &drag.snapshot, &config.measure);
            return;
        }
        self.transform = match vertex_under(position, doc, config) {
            Some(handle) => TransformState::Hover(handle),
            None => TransformState::Idle,
        };
    }
}

/// Vertex of the topmost transformable shape within the vertex tolerance.
fn vertex_under(position: Point, doc: &CanvasDocument, config: &EditorConfig) -> Option<VertexHandle> {
    doc.shapes
        .iter()
        .rev()
        .filter(|s| s.is_transformable())
        .find_map(|shape| {
            find_nearest_vertex(position, shape, config.transform.vertex_tolerance).map(|vertex_index| VertexHandle {
                shape_id: shape.id(),
                vertex_index,
            })
        })
}

/// Drop a labeled point on the nearest shape vertex, center or outline.
fn place_point(position: Point, doc: &mut CanvasDocument, config: &EditorConfig) {
    let Some(snap) = resolve_placement(position, &doc.shapes, &config.snap) else {
        log::debug!("no shape near {position:?} for a point");
        return;
    };
    let (shape_id, kind) = match snap.target {
        Anchor::Vertex { shape_id, index } => (shape_id, PointKind::Vertex(index)),
        Anchor::Center { shape_id } => (shape_id, PointKind::Center),
        Anchor::Edge { shape_id } => (shape_id, PointKind::Edge),
        other => {
            log::warn!("unexpected placement target {other:?}");
            return;
        }
    };
    let label = next_label(&doc.points, shape_id);
    if let Err(err) = doc.add_point(GeometryPoint::new(snap.point, label, shape_id, kind)) {
        log::warn!("point not placed: {err}");
    }
}
