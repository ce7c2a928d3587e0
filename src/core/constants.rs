//! Engine-wide constants for the oblique overlay.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Meters per degree of latitude in the equirectangular city-scale
/// approximation. Also the base for the longitude scale before the
/// `cos(seed latitude)` correction.
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Zoom threshold (viewer native units) where mid-tier labels appear.
pub const DEFAULT_MID_TIER_ZOOM: f64 = 1.5;

/// Zoom threshold where fine-tier labels appear.
pub const DEFAULT_FINE_TIER_ZOOM: f64 = 4.0;

/// Default interval between permit data refreshes, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Default time-to-live for the cached dataset vintage, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Great-circle distance from the seed point (meters) beyond which the
/// flat-earth approximation is no longer trusted for calibration input.
pub const CALIBRATION_RANGE_WARN_METERS: f64 = 50_000.0;

/// Minimum zoom requested when flying to a single permit marker.
pub const DEFAULT_PERMIT_FOCUS_ZOOM: f64 = 4.0;
