//! Configuration for overlay behavior tuning
//!
//! Plain value structs with defaults; the engine treats every threshold as
//! an opaque cut point rather than a computed value.

use crate::core::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_FINE_TIER_ZOOM, DEFAULT_MID_TIER_ZOOM,
    DEFAULT_REFRESH_INTERVAL_SECS,
};
use std::time::Duration;

/// Zoom cut points for the label tiers, in the viewer's native zoom units.
/// Lower bounds are inclusive: `zoom >= fine` is the fine tier,
/// `mid <= zoom < fine` the mid tier, everything below is coarse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodThresholds {
    pub mid: f64,
    pub fine: f64,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            mid: DEFAULT_MID_TIER_ZOOM,
            fine: DEFAULT_FINE_TIER_ZOOM,
        }
    }
}

/// Data refresh cadence and cache lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshConfig {
    /// Interval between refresh triggers.
    pub interval: Duration,
    /// How long a cached dataset vintage stays fresh.
    pub cache_ttl: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub lod: LodThresholds,
    /// Whether the label layer starts enabled.
    pub labels_enabled: bool,
    pub refresh: RefreshConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lod: LodThresholds::default(),
            labels_enabled: true,
            refresh: RefreshConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = OverlayConfig::default();
        assert_eq!(config.lod.mid, 1.5);
        assert_eq!(config.lod.fine, 4.0);
        assert!(config.labels_enabled);
        assert_eq!(config.refresh.interval, Duration::from_secs(300));
    }
}
