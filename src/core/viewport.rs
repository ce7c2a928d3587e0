use crate::{
    core::{camera::ImageDimensions, geo::Point},
    traits::ViewerHost,
};

/// Converts between raster pixel space and the viewer's normalized viewport
/// space, and carries the bounds policy for projected entities.
///
/// The viewer defines its coordinate system with a single reference unit
/// shared across axes: **both** u and v are the pixel coordinate divided by
/// the image *width*. Normalizing v by the height instead introduces a
/// systematic vertical offset proportional to `height/width - 1` on any
/// non-square raster, so that invariant is pinned by a regression test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportAdapter {
    image: ImageDimensions,
}

impl ViewportAdapter {
    pub fn new(image: ImageDimensions) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &ImageDimensions {
        &self.image
    }

    /// Image pixel to normalized viewport point.
    pub fn to_viewport(&self, pixel: &Point) -> Point {
        let width = self.image.width as f64;
        Point::new(pixel.x / width, pixel.y / width)
    }

    /// Normalized viewport point back to image pixel. Exact inverse of
    /// [`to_viewport`](Self::to_viewport); used for calibration click
    /// capture.
    pub fn to_image_pixel(&self, viewport_point: &Point) -> Point {
        viewport_point.multiply(self.image.width as f64)
    }

    /// Whether a pixel lies on the rendered raster.
    pub fn contains(&self, pixel: &Point) -> bool {
        pixel.x >= 0.0
            && pixel.x <= self.image.width as f64
            && pixel.y >= 0.0
            && pixel.y <= self.image.height as f64
    }

    /// Viewport placement for a projected pixel, or `None` when it falls off
    /// the raster. Off-raster entities are simply not rendered; this is a
    /// filtering behavior, not an error.
    pub fn place(&self, pixel: &Point) -> Option<Point> {
        if self.contains(pixel) {
            Some(self.to_viewport(pixel))
        } else {
            None
        }
    }

    /// Pans the viewer to an image pixel and raises zoom to at least
    /// `min_zoom`, never zooming out. No-op while the viewer has no
    /// viewport.
    pub fn fly_to(&self, host: &mut dyn ViewerHost, pixel: &Point, min_zoom: f64) {
        let Some(view) = host.viewport() else {
            return;
        };
        host.pan_to(self.to_viewport(pixel));
        if view.zoom < min_zoom {
            host.zoom_to(min_zoom);
        }
    }
}
