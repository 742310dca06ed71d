//! Error types.
//!
//! Missing snap targets, degenerate edges and orphaned references are not
//! errors: they resolve to `SnapTarget::Free` or `None` at the call site.
//! These enums only cover factory validation and configuration parsing.

use crate::lines::EndpointKind;
use thiserror::Error;

/// Rejected geometric input to a factory or scene command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Shape too small: {width}x{height} (minimum {min})")]
    ShapeTooSmall { width: f64, height: f64, min: f64 },
    #[error("A line cannot start on a {0:?} target")]
    InvalidLineStart(EndpointKind),
    #[error("Line endpoints coincide")]
    DegenerateLine,
    #[error("Unknown shape: {0}")]
    UnknownShape(String),
    #[error("Unknown line: {0}")]
    UnknownLine(String),
    #[error("Lines share no common vertex")]
    NoCommonVertex,
}

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for scene commands.
pub type GeometryResult<T> = Result<T, GeometryError>;
