//! Prelude module for common permitmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use permitmap::prelude::*;`

pub use crate::core::{
    camera::{CameraConfig, ImageDimensions},
    config::{LodThresholds, OverlayConfig, RefreshConfig},
    engine::OverlayEngine,
    geo::{LatLng, Point},
    projection::ObliqueProjection,
    viewport::ViewportAdapter,
};

pub use crate::layers::{
    labels::{LabelDef, LabelEntity, LabelSet, LabelTier},
    lod::LodLabelController,
    markers::{MarkerOverlay, PermitMarker},
};

pub use crate::data::{
    normalize::{normalize_batch, normalize_filing, normalize_legacy_permit},
    refresh::{DatasetCache, EntitySnapshot, EntityStore, RefreshCoordinator, RefreshTicket},
    Permit, PermitCategory,
};

pub use crate::calibrate::{
    CalibrationFit, CalibrationPoint, CalibrationRecord, CalibrationSession,
};

pub use crate::input::events::ViewerEvent;

pub use crate::traits::{
    Clock, PermitSource, ScreenTransform, SystemClock, ViewerHost, ViewportSnapshot,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::data::refresh::RefreshScheduler;

pub use crate::{Error as OverlayError, Result};

pub use std::{
    sync::Arc,
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
