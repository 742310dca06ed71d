//! Vertex transform engine.
//!
//! Turns a drag of one triangle/rectangle vertex into a new shape. With the
//! constraint modifier held, triangles snap to the nearest right-angle
//! configuration and rectangles stay horizontal parallelograms.

use crate::canvas::DependentSnapshot;
use crate::config::TransformConfig;
use crate::geometry::{distance, project_point_on_line};
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Vec2};

/// Move vertex `vertex_index` of `shape` to `new_position`.
///
/// Circles and out-of-range indices return the shape unchanged.
pub fn transform_vertex(
    shape: &Shape,
    vertex_index: usize,
    new_position: Point,
    constrained: bool,
    config: &TransformConfig,
) -> Shape {
    let mut vertices = shape.vertices();
    if vertex_index >= vertices.len() {
        return shape.clone();
    }

    match shape {
        Shape::Triangle(_) if constrained => {
            vertices[vertex_index] = right_angle_position(&vertices, vertex_index, new_position);
        }
        Shape::Rectangle(_) if constrained => {
            vertices[vertex_index] = new_position;
            if let Ok(quad) = <[Point; 4]>::try_from(vertices.as_slice()) {
                if let Some(adjusted) = parallelogram(quad, vertex_index, new_position, config) {
                    vertices = adjusted.to_vec();
                }
            }
        }
        _ => vertices[vertex_index] = new_position,
    }

    shape
        .with_vertices(&vertices, config.min_size)
        .unwrap_or_else(|| shape.clone())
}

/// Index of the vertex nearest `point` within `tolerance`.
pub fn find_nearest_vertex(point: Point, shape: &Shape, tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in shape.vertices().into_iter().enumerate() {
        let d = distance(point, v);
        if d <= tolerance && best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Position for the dragged triangle vertex that gives the triangle a right
/// angle, nearest to `target`. Falls back to `target` when no candidate
/// exists.
pub fn right_angle_position(vertices: &[Point], dragged: usize, target: Point) -> Point {
    if vertices.len() != 3 || dragged >= 3 {
        return target;
    }
    let a = vertices[(dragged + 1) % 3];
    let b = vertices[(dragged + 2) % 3];

    right_angle_candidates(a, b, target)
        .into_iter()
        .flatten()
        .min_by(|p, q| distance(*p, target).total_cmp(&distance(*q, target)))
        .unwrap_or(target)
}

/// Right angle at `a`, at `b`, and at the moving vertex itself.
fn right_angle_candidates(a: Point, b: Point, target: Point) -> [Option<Point>; 3] {
    let ab = b - a;
    if ab.hypot2() == 0.0 {
        return [None, None, None];
    }
    let normal = Vec2::new(-ab.y, ab.x);
    let at_a = project_point_on_line(target, a, a + normal).point;
    let at_b = project_point_on_line(target, b, b + normal).point;

    // Thales: a right angle at the moving vertex puts it on the circle with
    // diameter ab.
    let center = a.midpoint(b);
    let radius = ab.hypot() / 2.0;
    let offset = target - center;
    let at_moving = (offset.hypot2() > 0.0).then(|| center + offset * (radius / offset.hypot()));

    [Some(at_a), Some(at_b), at_moving]
}

/// Adjust one non-dragged vertex so the quad is a horizontal parallelogram
/// (top edge 0-1 and bottom edge 3-2 horizontal and of equal width). Of the
/// valid adjustments the one whose adjusted vertex lies nearest `target`
/// wins.
pub fn parallelogram(
    quad: [Point; 4],
    dragged: usize,
    target: Point,
    config: &TransformConfig,
) -> Option<[Point; 4]> {
    (0..4)
        .filter(|&i| i != dragged)
        .filter_map(|i| {
            let adjusted = adjust_for_parallelogram(quad, i);
            is_horizontal_parallelogram(&adjusted, config).then_some((adjusted, i))
        })
        .min_by(|(p, i), (q, j)| distance(p[*i], target).total_cmp(&distance(q[*j], target)))
        .map(|(adjusted, _)| adjusted)
}

fn adjust_for_parallelogram(quad: [Point; 4], index: usize) -> [Point; 4] {
    let [v0, v1, v2, v3] = quad;
    let bottom_width = v2.x - v3.x;
    let top_width = v1.x - v0.x;
    let mut out = quad;
    match index {
        0 => out[0] = Point::new(v1.x - bottom_width, v1.y),
        1 => out[1] = Point::new(v0.x + bottom_width, v0.y),
        2 => out[2] = Point::new(v3.x + top_width, v3.y),
        _ => out[3] = Point::new(v2.x - top_width, v2.y),
    }
    out
}

/// Whether the quad satisfies the horizontal-parallelogram invariant.
pub fn is_horizontal_parallelogram(quad: &[Point; 4], config: &TransformConfig) -> bool {
    let [v0, v1, v2, v3] = *quad;
    let eps = config.parallelogram_epsilon;
    if (v1.y - v0.y).abs() >= eps || (v2.y - v3.y).abs() >= eps {
        return false;
    }
    let top = (v1.x - v0.x).abs();
    let bottom = (v2.x - v3.x).abs();
    if (top - bottom).abs() > eps {
        return false;
    }
    top >= config.parallelogram_min_edge && (v0.y - v3.y).abs() >= config.parallelogram_min_edge
}

/// A vertex under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexHandle {
    pub shape_id: ShapeId,
    pub vertex_index: usize,
}

/// One pointer-down..up drag of a vertex.
#[derive(Debug, Clone)]
pub struct VertexDrag {
    pub handle: VertexHandle,
    /// Shape as it was when the drag began.
    pub original: Shape,
    /// Dependent points, lines and angles at drag start.
    pub snapshot: DependentSnapshot,
}

/// Ephemeral transform-tool interaction state.
#[derive(Debug, Clone, Default)]
pub enum TransformState {
    /// Not dragging; `hover` is only used for cursor feedback.
    #[default]
    Idle,
    Hover(VertexHandle),
    Dragging(Box<VertexDrag>),
}

impl TransformState {
    pub fn is_transforming(&self) -> bool {
        matches!(self, TransformState::Dragging(_))
    }

    pub fn selected_shape(&self) -> Option<ShapeId> {
        match self {
            TransformState::Dragging(drag) => Some(drag.handle.shape_id),
            _ => None,
        }
    }

    pub fn selected_vertex(&self) -> Option<usize> {
        match self {
            TransformState::Dragging(drag) => Some(drag.handle.vertex_index),
            _ => None,
        }
    }

    pub fn hover_vertex(&self) -> Option<usize> {
        match self {
            TransformState::Hover(handle) => Some(handle.vertex_index),
            _ => None,
        }
    }
}
