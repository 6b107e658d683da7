//! Error type used by the crate.

use thiserror::Error;

/// Error produced when a geometry cannot be built from its source representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// The source feature has no geometry at all.
    #[error("feature has no geometry")]
    Missing,
    /// Geometry type that the viewer does not render.
    #[error("unsupported geometry type: {0}")]
    Unsupported(String),
}
