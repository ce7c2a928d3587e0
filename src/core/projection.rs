use crate::core::{
    camera::CameraConfig,
    constants::METERS_PER_DEGREE,
    geo::{LatLng, Point},
};

/// Calibrated geodetic-to-pixel projection for the oblique raster.
///
/// Pairs the immutable [`CameraConfig`] with the fitted seed pixel — the
/// image-pixel location of the camera's seed point. Projection is a rigid
/// rotation plus a one-axis foreshortening: an orthographic camera yawed by
/// the azimuth and tilted by the elevation, which is the right model for a
/// fixed, far-field oblique rendering. It is exact at the seed point and
/// affine in ground displacements from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObliqueProjection {
    camera: CameraConfig,
    seed_pixel: Point,
}

impl ObliqueProjection {
    pub fn new(camera: CameraConfig, seed_pixel: Point) -> Self {
        Self { camera, seed_pixel }
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    /// The image-pixel location of the camera's seed point.
    pub fn seed_pixel(&self) -> Point {
        self.seed_pixel
    }

    /// Projects a geographical coordinate into image-pixel space.
    ///
    /// Never fails: coordinates outside the raster project to out-of-bounds
    /// pixels, and bounds checking is the caller's responsibility. Accuracy
    /// holds at metro scale; the flat-earth offsets degrade far (>100 km)
    /// from the seed.
    pub fn project(&self, position: &LatLng) -> Point {
        self.seed_pixel.add(&self.pixel_offset(position))
    }

    /// Pixel offset from the seed pixel for a coordinate.
    ///
    /// Depends only on the camera, never on the seed pixel, which is what
    /// lets the calibration solver treat the seed pixel as the sole free
    /// parameter.
    pub(crate) fn pixel_offset(&self, position: &LatLng) -> Point {
        let meters = self.camera_plane_offset(position);
        Point::new(
            meters.x / self.camera.meters_per_pixel_x(),
            meters.y / self.camera.meters_per_pixel_y(),
        )
    }

    /// Ground displacement from the seed expressed in image axes, in meters:
    /// `x` along the camera's right axis, `y` down the image rows.
    pub(crate) fn camera_plane_offset(&self, position: &LatLng) -> Point {
        let seed = self.camera.seed_lat_lng;

        // Equirectangular planar offsets; valid at city scale (<50 km).
        let north = (position.lat - seed.lat) * METERS_PER_DEGREE;
        let east = (position.lng - seed.lng) * METERS_PER_DEGREE * seed.lat.to_radians().cos();

        // Rotate (east, north) by the negative of the camera azimuth to
        // align with the camera's right/forward axes.
        let az = (-self.camera.azimuth_deg).to_radians();
        let right = east * az.cos() - north * az.sin();
        let forward = east * az.sin() + north * az.cos();

        // Elevation foreshortens the forward axis only; camera roll is
        // assumed zero, so the right axis is unaffected.
        let elevation = self.camera.elevation_deg.to_radians();
        let vertical_shift = -forward * elevation.sin();

        // Image rows grow downward, so "up" in camera space decreases y.
        Point::new(right, -vertical_shift)
    }
}
