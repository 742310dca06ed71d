//! Triangle shape.

use super::{ShapeId, ShapeTrait};
use crate::geometry::{self, point_in_polygon};
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a triangle's vertices are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriangleForm {
    /// Vertices derived from the bounding box.
    Regular,
    /// Explicit vertices set by the transform engine.
    Transformed { vertices: [Point; 3] },
}

/// A triangle. Regular triangles are isosceles with the apex at the top
/// center of the box; a square box yields an equilateral triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    pub bounds: Rect,
    pub form: TriangleForm,
}

impl Triangle {
    /// Create a new regular triangle.
    pub fn new(bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            bounds: bounds.abs(),
            form: TriangleForm::Regular,
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self.form, TriangleForm::Transformed { .. })
    }

    /// The three vertices in order apex, bottom-left, bottom-right (or the
    /// stored order once transformed).
    pub fn vertex_array(&self) -> [Point; 3] {
        match self.form {
            TriangleForm::Transformed { vertices } => vertices,
            TriangleForm::Regular => regular_vertices(self.bounds),
        }
    }

    /// Copy of this triangle with explicit vertices and the given bounds.
    pub(crate) fn transformed(&self, vertices: [Point; 3], bounds: Rect) -> Self {
        Self {
            id: self.id,
            bounds,
            form: TriangleForm::Transformed { vertices },
        }
    }
}

fn regular_vertices(r: Rect) -> [Point; 3] {
    let (w, h) = (r.width(), r.height());
    if (w - h).abs() < f64::EPSILON {
        let eq_height = w * 3f64.sqrt() / 2.0;
        let top = r.y0 + (h - eq_height) / 2.0;
        [
            Point::new(r.x0 + w / 2.0, top),
            Point::new(r.x0, top + eq_height),
            Point::new(r.x1, top + eq_height),
        ]
    } else {
        [
            Point::new(r.x0 + w / 2.0, r.y0),
            Point::new(r.x0, r.y1),
            Point::new(r.x1, r.y1),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn vertices(&self) -> Vec<Point> {
        self.vertex_array().to_vec()
    }

    fn edges(&self) -> Vec<Line> {
        geometry::polygon_edges(&self.vertex_array())
    }

    fn center(&self) -> Point {
        let [a, b, c] = self.vertex_array();
        Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    fn contains(&self, point: Point) -> bool {
        match self.form {
            TriangleForm::Transformed { vertices } => point_in_polygon(point, &vertices),
            // Approximate on purpose: regular triangles hit-test their box.
            TriangleForm::Regular => super::rect_contains_inclusive(self.bounds, point),
        }
    }
}
