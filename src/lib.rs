//! # Permitmap
//!
//! An overlay engine that places live, geocoded building-permit data onto a
//! large pre-rendered oblique city raster displayed through a deep-zoom tiled
//! image viewer.
//!
//! The crate owns the calibrated geodetic-to-pixel projection for the oblique
//! raster, the viewport coordinate adapter for the host viewer, a
//! level-of-detail label controller that tracks continuous pan/zoom, and the
//! permit data boundary (normalization, snapshot refresh, categories). The
//! viewer itself, its tile pyramid, and the remote permit APIs are external
//! collaborators reached through the seams in [`traits`].

pub mod calibrate;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::{CameraConfig, ImageDimensions},
    engine::OverlayEngine,
    geo::{LatLng, Point},
    projection::ObliqueProjection,
    viewport::ViewportAdapter,
};

pub use layers::{
    labels::{LabelDef, LabelEntity, LabelSet, LabelTier},
    lod::LodLabelController,
    markers::MarkerOverlay,
};

pub use data::{Permit, PermitCategory};

pub use calibrate::{CalibrationFit, CalibrationPoint, CalibrationSession};

pub use input::events::ViewerEvent;

pub use traits::{ScreenTransform, ViewerHost, ViewportSnapshot};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid camera configuration: {0}")]
    InvalidCamera(String),

    #[error("Invalid image dimensions: {0}")]
    InvalidImage(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Calibration error: {0}")]
    Calibration(String),

    #[error("Data source error: {0}")]
    Source(String),
}

/// Error type alias for convenience
pub type Error = OverlayError;
