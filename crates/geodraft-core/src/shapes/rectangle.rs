//! Rectangle shape.

use super::{ShapeId, ShapeTrait};
use crate::geometry::{self, point_in_polygon};
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a rectangle's vertices are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RectangleForm {
    /// Corners of the bounding box.
    Regular,
    /// Explicit quadrilateral set by the transform engine.
    Transformed { vertices: [Point; 4] },
}

/// A rectangle, or the quadrilateral it became after vertex drags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    pub bounds: Rect,
    pub form: RectangleForm,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            bounds: bounds.abs(),
            form: RectangleForm::Regular,
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self.form, RectangleForm::Transformed { .. })
    }

    /// Vertices in winding order: top-left, top-right, bottom-right,
    /// bottom-left.
    pub fn vertex_array(&self) -> [Point; 4] {
        match self.form {
            RectangleForm::Transformed { vertices } => vertices,
            RectangleForm::Regular => {
                let r = self.bounds;
                [
                    Point::new(r.x0, r.y0),
                    Point::new(r.x1, r.y0),
                    Point::new(r.x1, r.y1),
                    Point::new(r.x0, r.y1),
                ]
            }
        }
    }

    pub(crate) fn transformed(&self, vertices: [Point; 4], bounds: Rect) -> Self {
        Self {
            id: self.id,
            bounds,
            form: RectangleForm::Transformed { vertices },
        }
    }
}

impl ShapeTrait for Rectangle {
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
        match self.form {
            RectangleForm::Regular => self.bounds.center(),
            RectangleForm::Transformed { vertices } => {
                geometry::centroid(&vertices).unwrap_or_else(|| self.bounds.center())
            }
        }
    }

    fn contains(&self, point: Point) -> bool {
        match self.form {
            RectangleForm::Transformed { vertices } => point_in_polygon(point, &vertices),
            RectangleForm::Regular => super::rect_contains_inclusive(self.bounds, point),
        }
    }
}
