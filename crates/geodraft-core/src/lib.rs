//! GeoDraft Core Library
//!
//! Platform-agnostic geometry core for the GeoDraft editor: snap target
//! resolution, constrained vertex transforms and propagation of dependent
//! points and lines. Rendering and UI live outside this crate.

pub mod canvas;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lines;
pub mod measure;
pub mod points;
pub mod propagate;
pub mod shapes;
pub mod snap;
pub mod tools;
pub mod transform;

pub use canvas::{Canvas, CanvasDocument};
pub use collision::{distance_to_line, point_in_shape};
pub use config::EditorConfig;
pub use error::{ConfigError, GeometryError};
pub use input::{InputEvent, KeyEvent, Modifiers, PointerEvent};
pub use lines::{Anchor, EndpointKind, LineEndpoint, LineId, LineSegment};
pub use measure::{Angle, LengthMeasurement};
pub use points::{GeometryPoint, PointId, PointKind};
pub use propagate::{Propagation, propagate};
pub use shapes::{Shape, ShapeId, ShapeKind};
pub use snap::{SnapHint, SnapResult, SnapTarget, resolve_snap};
pub use tools::{CursorKind, ToolKind, ToolManager, cursor_for};
pub use transform::{TransformState, transform_vertex};
