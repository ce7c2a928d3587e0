//! Offline calibration solver for the oblique camera model.
//!
//! The projection is affine in the seed pixel: for a fixed [`CameraConfig`]
//! every ground-truth point predicts `recorded = seed + offset(lat, lng)`,
//! so fitting the seed is linear least squares in two unknowns. With the
//! stacked-identity design matrix the normal equations collapse to the mean
//! of `recorded - offset` over all points. The solver reports RMS and max
//! pixel residuals as quality metrics and leaves acceptability to the
//! operator; it never enforces a threshold and never mutates the camera.

use crate::{
    core::{
        camera::{CameraConfig, ImageDimensions},
        constants::CALIBRATION_RANGE_WARN_METERS,
        geo::{LatLng, Point},
        projection::ObliqueProjection,
        viewport::ViewportAdapter,
    },
    Result,
};
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// One ground-truth correspondence between a geodetic location and its
/// image pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationPoint {
    pub label: String,
    pub position: LatLng,
    pub image_pixel: Point,
}

/// Export/import record shape: a flat list of these is the interchange
/// format for calibration sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub image_pixel_x: f64,
    pub image_pixel_y: f64,
}

impl From<&CalibrationPoint> for CalibrationRecord {
    fn from(point: &CalibrationPoint) -> Self {
        Self {
            label: point.label.clone(),
            lat: point.position.lat,
            lng: point.position.lng,
            image_pixel_x: point.image_pixel.x,
            image_pixel_y: point.image_pixel.y,
        }
    }
}

/// Result of a seed fit with its quality metrics, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFit {
    pub seed_pixel: Point,
    pub rms_residual: f64,
    pub max_residual: f64,
    pub point_count: usize,
}

/// Interactive calibration session.
///
/// Points are appended one at a time — typically a viewer click converted
/// to an image pixel plus an operator-entered lat/lng — and the fit is
/// recomputed after each addition. Recomputation from the same point set
/// always yields the same fit.
pub struct CalibrationSession {
    camera: CameraConfig,
    adapter: ViewportAdapter,
    points: Vec<CalibrationPoint>,
}

impl CalibrationSession {
    pub fn new(camera: CameraConfig, image: ImageDimensions) -> Self {
        Self {
            camera,
            adapter: ViewportAdapter::new(image),
            points: Vec::new(),
        }
    }

    /// Appends a ground-truth point and refits.
    pub fn add_point(
        &mut self,
        label: impl Into<String>,
        position: LatLng,
        image_pixel: Point,
    ) -> Option<CalibrationFit> {
        let distance = self.camera.seed_lat_lng.distance_to(&position);
        if distance > CALIBRATION_RANGE_WARN_METERS {
            log::warn!(
                "calibration point {:.0} m from the seed; the flat-earth offsets lose accuracy at this range",
                distance
            );
        }
        self.points.push(CalibrationPoint {
            label: label.into(),
            position,
            image_pixel,
        });
        self.fit()
    }

    /// Appends a point captured as a viewer click: the normalized viewport
    /// point is mapped back to an image pixel through the adapter inverse.
    pub fn add_viewport_point(
        &mut self,
        label: impl Into<String>,
        position: LatLng,
        viewport_point: Point,
    ) -> Option<CalibrationFit> {
        let image_pixel = self.adapter.to_image_pixel(&viewport_point);
        self.add_point(label, position, image_pixel)
    }

    /// Least-squares seed fit over the current point set.
    ///
    /// Returns `None` below two points — the fit would be degenerate, and
    /// an unfit seed must not be consumable by accident. Deterministic:
    /// refitting the same set gives the identical result.
    pub fn fit(&self) -> Option<CalibrationFit> {
        if self.points.len() < 2 {
            return None;
        }

        // pixel_offset ignores the seed pixel, so any placeholder works
        let projection = ObliqueProjection::new(self.camera, Point::default());

        let mut sum = Vector2::zeros();
        for point in &self.points {
            let offset = projection.pixel_offset(&point.position);
            sum += Vector2::new(
                point.image_pixel.x - offset.x,
                point.image_pixel.y - offset.y,
            );
        }
        let seed = sum / self.points.len() as f64;
        let seed_pixel = Point::new(seed.x, seed.y);

        let fitted = ObliqueProjection::new(self.camera, seed_pixel);
        let mut sum_sq = 0.0;
        let mut max_residual: f64 = 0.0;
        for point in &self.points {
            let residual = fitted.project(&point.position).distance_to(&point.image_pixel);
            sum_sq += residual * residual;
            max_residual = max_residual.max(residual);
        }

        Some(CalibrationFit {
            seed_pixel,
            rms_residual: (sum_sq / self.points.len() as f64).sqrt(),
            max_residual,
            point_count: self.points.len(),
        })
    }

    /// Per-axis refinement of the meters-per-pixel constants.
    ///
    /// For each axis the model `pixel = seed + meters * inverse_scale` is
    /// linear in `(inverse_scale, seed)`, a two-unknown regression solved
    /// through its 2x2 normal equations. Returns the refined
    /// `(meters_per_pixel_x, meters_per_pixel_y)` for the operator to
    /// compare against the calibrated constants, or `None` when the points
    /// are collinear along either axis. The session's camera is never
    /// modified.
    pub fn refine_scales(&self) -> Option<(f64, f64)> {
        if self.points.len() < 2 {
            return None;
        }
        let projection = ObliqueProjection::new(self.camera, Point::default());

        let samples: Vec<(Point, Point)> = self
            .points
            .iter()
            .map(|point| (projection.camera_plane_offset(&point.position), point.image_pixel))
            .collect();

        let inv_x = Self::solve_axis(samples.iter().map(|(m, p)| (m.x, p.x)))?;
        let inv_y = Self::solve_axis(samples.iter().map(|(m, p)| (m.y, p.y)))?;
        Some((1.0 / inv_x, 1.0 / inv_y))
    }

    /// Solves `pixel = meters * inverse_scale + seed` for one axis and
    /// returns the inverse scale. `None` for singular systems or
    /// non-positive scales.
    fn solve_axis(samples: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
        let mut n = 0.0;
        let mut sum_m = 0.0;
        let mut sum_mm = 0.0;
        let mut sum_p = 0.0;
        let mut sum_mp = 0.0;
        for (meters, pixel) in samples {
            n += 1.0;
            sum_m += meters;
            sum_mm += meters * meters;
            sum_p += pixel;
            sum_mp += meters * pixel;
        }

        let normal = Matrix2::new(sum_mm, sum_m, sum_m, n);
        if normal.determinant().abs() < 1e-9 {
            return None;
        }
        let solution = normal.lu().solve(&Vector2::new(sum_mp, sum_p))?;
        let inverse_scale = solution.x;
        (inverse_scale > 0.0).then_some(inverse_scale)
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Exports the session as a flat ordered list of records.
    pub fn export_json(&self) -> Result<String> {
        let records: Vec<CalibrationRecord> =
            self.points.iter().map(CalibrationRecord::from).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Replaces the session's points with a previously exported list.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let records: Vec<CalibrationRecord> = serde_json::from_str(json)?;
        self.points = records
            .into_iter()
            .map(|record| CalibrationPoint {
                label: record.label,
                position: LatLng::new(record.lat, record.lng),
                image_pixel: Point::new(record.image_pixel_x, record.image_pixel_y),
            })
            .collect();
        Ok(self.points.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> CameraConfig {
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

    fn image() -> ImageDimensions {
        ImageDimensions::new(51200, 49408).unwrap()
    }

    /// Synthesizes exact ground truth from a known seed pixel.
    fn synthetic_points(seed_pixel: Point, count: usize) -> Vec<(LatLng, Point)> {
        let projection = ObliqueProjection::new(camera(), seed_pixel);
        (0..count)
            .map(|i| {
                let position = LatLng::new(
                    40.7484 + 0.002 * i as f64,
                    -73.9857 - 0.003 * (i as f64 - 1.0),
                );
                (position, projection.project(&position))
            })
            .collect()
    }

    #[test]
    fn test_recovers_known_seed_exactly() {
        let truth = Point::new(45059.0, 43479.0);
        let mut session = CalibrationSession::new(camera(), image());

        let mut fit = None;
        for (i, (position, pixel)) in synthetic_points(truth, 6).into_iter().enumerate() {
            fit = session.add_point(format!("pt-{}", i), position, pixel);
        }
        let fit = fit.unwrap();

        assert_relative_eq!(fit.seed_pixel.x, truth.x, epsilon = 1e-6);
        assert_relative_eq!(fit.seed_pixel.y, truth.y, epsilon = 1e-6);
        assert!(fit.rms_residual < 1e-6);
        assert!(fit.max_residual < 1e-6);
        assert_eq!(fit.point_count, 6);
    }

    #[test]
    fn test_fit_is_idempotent() {
        let mut session = CalibrationSession::new(camera(), image());
        for (i, (position, pixel)) in synthetic_points(Point::new(45059.0, 43479.0), 4)
            .into_iter()
            .enumerate()
        {
            // Perturb recorded pixels so residuals are nonzero
            let recorded = Point::new(pixel.x + (i % 2) as f64 * 3.0, pixel.y - 2.0);
            session.add_point(format!("pt-{}", i), position, recorded);
        }

        let first = session.fit().unwrap();
        let second = session.fit().unwrap();
        assert_eq!(first, second);
        assert!(first.rms_residual > 0.0);
        assert!(first.max_residual >= first.rms_residual);
    }

    #[test]
    fn test_degenerate_below_two_points() {
        let mut session = CalibrationSession::new(camera(), image());
        assert!(session.fit().is_none());

        let fit = session.add_point(
            "only",
            LatLng::new(40.7484, -73.9857),
            Point::new(45059.0, 43479.0),
        );
        assert!(fit.is_none());
    }

    #[test]
    fn test_viewport_click_capture() {
        let truth = Point::new(45059.0, 43479.0);
        let mut session = CalibrationSession::new(camera(), image());
        let adapter = ViewportAdapter::new(image());

        for (i, (position, pixel)) in synthetic_points(truth, 3).into_iter().enumerate() {
            session.add_viewport_point(format!("click-{}", i), position, adapter.to_viewport(&pixel));
        }

        let fit = session.fit().unwrap();
        assert_relative_eq!(fit.seed_pixel.x, truth.x, epsilon = 1e-6);
        assert_relative_eq!(fit.seed_pixel.y, truth.y, epsilon = 1e-6);
    }

    #[test]
    fn test_refine_scales_recovers_calibrated_constants() {
        let truth = Point::new(45059.0, 43479.0);
        let mut session = CalibrationSession::new(camera(), image());
        for (i, (position, pixel)) in synthetic_points(truth, 6).into_iter().enumerate() {
            session.add_point(format!("pt-{}", i), position, pixel);
        }

        let (mpp_x, mpp_y) = session.refine_scales().unwrap();
        assert_relative_eq!(mpp_x, camera().meters_per_pixel_x(), max_relative = 1e-6);
        assert_relative_eq!(mpp_y, camera().meters_per_pixel_y(), max_relative = 1e-6);
    }

    #[test]
    fn test_refine_scales_rejects_collinear_points() {
        let truth = Point::new(45059.0, 43479.0);
        let projection = ObliqueProjection::new(camera(), truth);
        let mut session = CalibrationSession::new(camera(), image());

        // All points share the same camera-plane X: no variance on that axis
        let base = LatLng::new(40.7484, -73.9857);
        session.add_point("a", base, projection.project(&base));
        session.add_point("b", base, projection.project(&base));
        session.add_point("c", base, projection.project(&base));

        assert!(session.refine_scales().is_none());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut session = CalibrationSession::new(camera(), image());
        for (i, (position, pixel)) in synthetic_points(Point::new(45059.0, 43479.0), 3)
            .into_iter()
            .enumerate()
        {
            session.add_point(format!("pt-{}", i), position, pixel);
        }
        let exported = session.export_json().unwrap();
        assert!(exported.contains("imagePixelX"));

        let original_fit = session.fit().unwrap();
        let mut restored = CalibrationSession::new(camera(), image());
        assert_eq!(restored.import_json(&exported).unwrap(), 3);
        assert_eq!(restored.fit().unwrap(), original_fit);
    }
}
