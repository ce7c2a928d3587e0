pub mod normalize;
pub mod refresh;

use crate::core::geo::LatLng;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Work categories for permit markers.
///
/// Unknown category codes fall back to [`PermitCategory::Other`]; bad input
/// data is recovered locally and never surfaced as a user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermitCategory {
    NewBuilding,
    Demolition,
    Alteration,
    Plumbing,
    Electrical,
    Scaffold,
    Other,
}

static CATEGORY_CODES: Lazy<HashMap<&'static str, PermitCategory>> = Lazy::new(|| {
    HashMap::from([
        ("NB", PermitCategory::NewBuilding),
        ("DM", PermitCategory::Demolition),
        ("A1", PermitCategory::Alteration),
        ("A2", PermitCategory::Alteration),
        ("A3", PermitCategory::Alteration),
        ("ALT", PermitCategory::Alteration),
        ("PL", PermitCategory::Plumbing),
        ("EL", PermitCategory::Electrical),
        ("SF", PermitCategory::Scaffold),
        ("SH", PermitCategory::Scaffold),
    ])
});

impl PermitCategory {
    /// Maps a raw source category code to a category, defaulting to `Other`.
    pub fn from_code(code: &str) -> Self {
        CATEGORY_CODES
            .get(code.trim().to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(PermitCategory::Other)
    }

    /// Marker fill color for this category. `Other` carries its own defined
    /// visual rather than being hidden.
    pub fn marker_color(&self) -> &'static str {
        match self {
            PermitCategory::NewBuilding => "#2e7d32",
            PermitCategory::Demolition => "#c62828",
            PermitCategory::Alteration => "#1565c0",
            PermitCategory::Plumbing => "#6a1b9a",
            PermitCategory::Electrical => "#ef6c00",
            PermitCategory::Scaffold => "#795548",
            PermitCategory::Other => "#607d8b",
        }
    }
}

/// A permit normalized to the common shape, whichever source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
    /// Source record identifier (job or filing number).
    pub id: String,
    /// Geocoded location.
    pub position: LatLng,
    pub category: PermitCategory,
    /// Canonical issued date; see `normalize` for how the two sources map
    /// onto this field.
    pub issued_date: Option<String>,
    /// Street address, when the source provides one.
    pub address: Option<String>,
}

pub use normalize::{normalize_batch, normalize_filing, normalize_legacy_permit};
pub use refresh::{DatasetCache, EntitySnapshot, EntityStore, RefreshCoordinator, RefreshTicket};
