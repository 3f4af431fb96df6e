//! Error types for the tour pipeline.

use thiserror::Error;

/// Result type used throughout the crate.
pub type TourResult<T> = Result<T, TourError>;

/// Errors that can occur while fetching geometry, building the frame plan,
/// or rendering frames.
#[derive(Debug, Error)]
pub enum TourError {
    /// Network or HTTP failure while retrieving a geometry collection.
    /// Fatal: the whole run aborts.
    #[error("fetch failed for {what}: {message}")]
    Fetch { what: String, message: String },

    /// A requested focus-target name has no matching bounding box.
    /// Aborts frame-plan construction; no partial plan is produced.
    #[error("unknown focus target: {name}")]
    UnknownTarget { name: String },

    /// A single frame failed to render or save. The render loop logs the
    /// failure and continues; the missing file is the detectable gap.
    #[error("frame {frame} failed to render: {message}")]
    Render { frame: u32, message: String },

    /// A required rendering resource (the label font) could not be located.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A geometry collection parsed but is unusable (empty, wrong geometry
    /// types, missing name attributes).
    #[error("invalid {layer} layer: {message}")]
    Geometry { layer: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TourError {
    /// Create a fetch failure error.
    pub fn fetch(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a per-frame render failure error.
    pub fn render(frame: u32, message: impl Into<String>) -> Self {
        Self::Render {
            frame,
            message: message.into(),
        }
    }

    /// Create an invalid-layer error.
    pub fn geometry(layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Geometry {
            layer: layer.into(),
            message: message.into(),
        }
    }
}
