use crate::{core::geo::LatLng, OverlayError, Result};
use serde::{Deserialize, Serialize};

/// Calibrated camera model for the pre-rendered oblique raster.
///
/// All fields describe how the raster was generated and are fitted offline
/// against ground-truth calibration points; they are immutable once
/// constructed. The fit compensates for unknown details of the real rendering
/// pipeline, so the constants must be carried exactly as calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Geodetic reference location anchoring the projection.
    pub seed_lat_lng: LatLng,
    /// Camera yaw in degrees, in (-180, 180].
    pub azimuth_deg: f64,
    /// Camera downward tilt in degrees, in (-90, 0].
    pub elevation_deg: f64,
    /// Ground footprint width of the reference view, in meters.
    pub view_width_meters: f64,
    /// Ground footprint height of the reference view, in meters.
    pub view_height_meters: f64,
    /// Pixel width of the reference view.
    pub reference_pixel_width: u32,
    /// Pixel height of the reference view.
    pub reference_pixel_height: u32,
    /// Tile advance fraction used when the raster was assembled. Not
    /// consumed by projection; carried because it is part of the calibrated
    /// raster description.
    pub tile_step: f64,
}

impl CameraConfig {
    /// Creates a validated camera configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed_lat_lng: LatLng,
        azimuth_deg: f64,
        elevation_deg: f64,
        view_width_meters: f64,
        view_height_meters: f64,
        reference_pixel_width: u32,
        reference_pixel_height: u32,
        tile_step: f64,
    ) -> Result<Self> {
        let config = Self {
            seed_lat_lng,
            azimuth_deg,
            elevation_deg,
            view_width_meters,
            view_height_meters,
            reference_pixel_width,
            reference_pixel_height,
            tile_step,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.seed_lat_lng.is_valid() {
            return Err(Box::new(OverlayError::InvalidCamera(format!(
                "seed point out of range: {:?}",
                self.seed_lat_lng
            ))));
        }
        if self.azimuth_deg <= -180.0 || self.azimuth_deg > 180.0 {
            return Err(Box::new(OverlayError::InvalidCamera(format!(
                "azimuth {} outside (-180, 180]",
                self.azimuth_deg
            ))));
        }
        if self.elevation_deg <= -90.0 || self.elevation_deg > 0.0 {
            return Err(Box::new(OverlayError::InvalidCamera(format!(
                "elevation {} outside (-90, 0]",
                self.elevation_deg
            ))));
        }
        if self.view_width_meters <= 0.0
            || self.view_height_meters <= 0.0
            || self.tile_step <= 0.0
            || self.reference_pixel_width == 0
            || self.reference_pixel_height == 0
        {
            return Err(Box::new(OverlayError::InvalidCamera(
                "meter, pixel and tile-step fields must be positive".to_string(),
            )));
        }
        Ok(())
    }

    /// Meters per raster pixel along the X axis.
    ///
    /// Kept independent from the Y constant: the projected ground footprint
    /// is anisotropic even though source tiles are square.
    pub fn meters_per_pixel_x(&self) -> f64 {
        self.view_width_meters / self.reference_pixel_width as f64
    }

    /// Meters per raster pixel along the Y axis.
    pub fn meters_per_pixel_y(&self) -> f64 {
        self.view_height_meters / self.reference_pixel_height as f64
    }
}

/// Full raster size in pixels. Constant for the lifetime of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Box::new(OverlayError::InvalidImage(format!(
                "raster dimensions must be positive, got {}x{}",
                width, height
            ))));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CameraConfig {
        CameraConfig::new(
            LatLng::new(40.7484, -73.9857),
            -15.0,
            -45.0,
            1200.0,
            900.0,
            2048,
            2048,
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_camera() {
        let config = base_config();
        assert!((config.meters_per_pixel_x() - 1200.0 / 2048.0).abs() < 1e-12);
        assert!((config.meters_per_pixel_y() - 900.0 / 2048.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_angles() {
        let mut config = base_config();
        config.azimuth_deg = -180.0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.elevation_deg = 10.0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.elevation_deg = -90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_fields() {
        let mut config = base_config();
        config.view_width_meters = 0.0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.tile_step = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_dimensions() {
        assert!(ImageDimensions::new(0, 100).is_err());
        let image = ImageDimensions::new(51200, 49408).unwrap();
        assert_eq!(image.width, 51200);
        assert_eq!(image.height, 49408);
    }
}
