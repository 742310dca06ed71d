//! Editor configuration: snap tolerances, transform limits and measurement
//! options.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Minimum bounding box dimension for drawn and transformed shapes.
pub const MIN_SHAPE_SIZE: f64 = 20.0;
/// Rendered radius of a geometry point.
pub const POINT_RADIUS: f64 = 4.0;
/// General snap distance (world units).
pub const SNAP_DISTANCE: f64 = 15.0;
/// Number of chords approximating a circle outline.
pub const CIRCLE_SEGMENTS: usize = 16;

/// Tolerances used by the snap target resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Existing points, shape vertices/centers and line interiors.
    pub tolerance: f64,
    /// Shape outlines.
    pub edge_tolerance: f64,
    /// Point-to-point search radius while drawing a line.
    pub point_to_point_tolerance: f64,
    /// Candidates this close to the line start are the start itself.
    pub start_coincidence: f64,
    /// Maximum |cos| between the two directions to count as perpendicular.
    pub perpendicular_dot_tolerance: f64,
    /// How close an outline point must be to an edge to test that edge.
    pub perpendicular_edge_slack: f64,
    /// How close a perpendicular foot must be to the segment itself.
    pub preview_segment_slack: f64,
    /// Shortest accepted source-to-foot distance for a preview.
    pub preview_min_distance: f64,
    /// Longest accepted source-to-foot distance for a preview.
    pub preview_max_distance: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance: SNAP_DISTANCE,
            edge_tolerance: 8.0,
            point_to_point_tolerance: 20.0,
            start_coincidence: 5.0,
            perpendicular_dot_tolerance: 0.05,
            perpendicular_edge_slack: 5.0,
            preview_segment_slack: 3.0,
            preview_min_distance: 20.0,
            preview_max_distance: 300.0,
        }
    }
}

/// Limits used by the vertex transform engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Pick radius around a vertex to start a drag.
    pub vertex_tolerance: f64,
    /// Floor applied to each bounding box dimension after a transform.
    pub min_size: f64,
    /// Equality tolerance for the horizontal-parallelogram check.
    pub parallelogram_epsilon: f64,
    /// Shortest edge a constrained rectangle may have.
    pub parallelogram_min_edge: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            vertex_tolerance: 10.0,
            min_size: MIN_SHAPE_SIZE,
            parallelogram_epsilon: 0.001,
            parallelogram_min_edge: 10.0,
        }
    }
}

/// Hit-testing and measurement options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Click distance that picks a line.
    pub line_pick_tolerance: f64,
    /// Click distance that picks a point.
    pub point_pick_radius: f64,
    /// Endpoint distance accepted as a shared angle vertex.
    pub angle_vertex_tolerance: f64,
    /// Unit appended to length labels (label only, no conversion).
    pub length_unit: Option<String>,
    /// Recompute angle values when a transform moves their vertex.
    pub recompute_angles_on_transform: bool,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            line_pick_tolerance: 5.0,
            point_pick_radius: POINT_RADIUS + 5.0,
            angle_vertex_tolerance: 10.0,
            length_unit: None,
            recompute_angles_on_transform: false,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub transform: TransformConfig,
    pub measure: MeasureConfig,
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tolerance is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("snap.tolerance", self.snap.tolerance),
            ("snap.edge_tolerance", self.snap.edge_tolerance),
            ("snap.point_to_point_tolerance", self.snap.point_to_point_tolerance),
            ("transform.vertex_tolerance", self.transform.vertex_tolerance),
            ("transform.min_size", self.transform.min_size),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }
        if self.snap.preview_min_distance > self.snap.preview_max_distance {
            return Err(ConfigError::Invalid {
                field: "snap.preview_min_distance",
                reason: "must not exceed snap.preview_max_distance".to_string(),
            });
        }
        Ok(())
    }
}
