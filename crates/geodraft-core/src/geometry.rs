//! Geometry kernel: distances, projections, point-in-polygon and
//! barycentric coordinates.
//!
//! Everything here is a pure function over `kurbo` values. Degenerate input
//! (zero-length segments, zero-area triangles) yields a sentinel instead of
//! NaN so callers can treat it as "no target".

use kurbo::{Line, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Projection of a point onto the infinite line through a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Unclamped parameter along `start -> end` (0 at start, 1 at end).
    pub param: f64,
    /// The projected point for `param`.
    pub point: Point,
}

/// Project `p` onto the line through `a` and `b` without clamping.
///
/// A zero-length segment projects everything onto `a` with `param = 0`.
pub fn project_point_on_line(p: Point, a: Point, b: Point) -> Projection {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return Projection { param: 0.0, point: a };
    }
    let param = (p - a).dot(ab) / len_sq;
    Projection {
        param,
        point: a + ab * param,
    }
}

/// Closest point to `p` on the segment `a -> b`, with its clamped parameter.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Projection {
    let proj = project_point_on_line(p, a, b);
    let param = proj.param.clamp(0.0, 1.0);
    Projection {
        param,
        point: a.lerp(b, param),
    }
}

/// Distance from a point to a segment (clamped).
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    distance(p, closest_point_on_segment(p, a, b).point)
}

/// Even-odd ray casting test. Vertex order does not matter.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y)
            && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Barycentric weights of a point with respect to a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barycentric {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((b - a).cross(c - a) / 2.0).abs()
}

/// Barycentric coordinates via sub-triangle area ratios.
///
/// Returns `None` for a zero-area triangle, or when the weights do not sum to
/// 1 within 0.01 (the point lies outside the triangle).
pub fn barycentric(p: Point, v1: Point, v2: Point, v3: Point) -> Option<Barycentric> {
    let total = triangle_area(v1, v2, v3);
    if total == 0.0 {
        return None;
    }
    let u = triangle_area(p, v2, v3) / total;
    let v = triangle_area(v1, p, v3) / total;
    let w = triangle_area(v1, v2, p) / total;
    if (u + v + w - 1.0).abs() > 0.01 {
        return None;
    }
    Some(Barycentric { u, v, w })
}

/// Inverse of [`barycentric`].
pub fn barycentric_to_point(coeffs: Barycentric, v1: Point, v2: Point, v3: Point) -> Point {
    Point::new(
        coeffs.u * v1.x + coeffs.v * v2.x + coeffs.w * v3.x,
        coeffs.u * v1.y + coeffs.v * v2.y + coeffs.w * v3.y,
    )
}

/// Unit vector along `v`, or `None` when `v` has zero length.
pub fn normalized(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    (len > 0.0).then(|| v / len)
}

/// Whether two directions are perpendicular: |cos θ| ≤ `tolerance`.
///
/// A zero-length direction is never perpendicular.
pub fn is_perpendicular(a: Vec2, b: Vec2, tolerance: f64) -> bool {
    match (normalized(a), normalized(b)) {
        (Some(a), Some(b)) => a.dot(b).abs() <= tolerance,
        _ => false,
    }
}

/// Interior angle at `vertex` between rays towards `a` and `b`, in degrees
/// (0..=180). Zero-length rays give `None`.
pub fn angle_at(vertex: Point, a: Point, b: Point) -> Option<f64> {
    let da = normalized(a - vertex)?;
    let db = normalized(b - vertex)?;
    Some(da.dot(db).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Mean of a vertex list.
pub fn centroid(vertices: &[Point]) -> Option<Point> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let sum = vertices
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    Some((sum / n).to_point())
}

/// Edges of a closed polygon as consecutive, wrapping vertex pairs.
pub fn polygon_edges(vertices: &[Point]) -> Vec<Line> {
    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect()
}

/// Position on an outline expressed as (edge index, ratio along that edge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeLocation {
    pub edge: usize,
    pub ratio: f64,
    /// Distance from the located point to the outline.
    pub distance: f64,
}

/// Nearest edge of `edges` to `p` and the clamped ratio along it.
pub fn locate_on_edges(p: Point, edges: &[Line]) -> Option<EdgeLocation> {
    let mut best: Option<EdgeLocation> = None;
    for (i, edge) in edges.iter().enumerate() {
        let proj = closest_point_on_segment(p, edge.p0, edge.p1);
        let d = distance(p, proj.point);
        if best.is_none_or(|b| d < b.distance) {
            best = Some(EdgeLocation {
                edge: i,
                ratio: proj.param,
                distance: d,
            });
        }
    }
    best
}

/// Evaluate an edge location against an edge list.
pub fn point_at_edge(edges: &[Line], edge: usize, ratio: f64) -> Option<Point> {
    edges.get(edge).map(|e| e.p0.lerp(e.p1, ratio))
}
