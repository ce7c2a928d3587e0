//! Shared trait abstractions for the crate's external seams
//!
//! The deep-zoom viewer, wall-clock time, and the permit data source are all
//! collaborators the core never owns; each gets a small trait here so the
//! rest of the crate can be driven by mocks in tests.

use crate::{core::geo::Point, data::Permit, Result};

/// Affine screen-placement transform supplied by the viewer for the current
/// frame: maps a normalized viewport point to on-screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    pub scale: f64,
    pub translate: Point,
}

impl ScreenTransform {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    /// Screen pixel position of a normalized viewport point.
    pub fn apply(&self, viewport_point: &Point) -> Point {
        viewport_point.multiply(self.scale).add(&self.translate)
    }
}

/// Read-only snapshot of the viewer's viewport for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSnapshot {
    /// Current zoom scalar in the viewer's native units.
    pub zoom: f64,
    /// Current normalized-viewport-to-screen transform.
    pub transform: ScreenTransform,
}

/// The deep-zoom viewer hosting the overlay.
///
/// `viewport` returns `None` until the viewer has finished loading its image
/// pyramid; every core operation treats that as a benign no-op. Overlay
/// elements are screen-anchored and addressed by id, so per-frame
/// repositioning only writes positions and never rebuilds elements.
pub trait ViewerHost {
    /// Current viewport, or `None` if the viewer is not ready yet.
    fn viewport(&self) -> Option<ViewportSnapshot>;

    /// Requests a pan so the given normalized viewport point is centered.
    fn pan_to(&mut self, center: Point);

    /// Requests a zoom to the given level.
    fn zoom_to(&mut self, zoom: f64);

    /// Adds a screen-anchored overlay element.
    fn add_overlay(&mut self, id: &str, screen: Point);

    /// Removes an overlay element.
    fn remove_overlay(&mut self, id: &str);

    /// Moves an existing overlay element.
    fn set_overlay_position(&mut self, id: &str, screen: Point);

    /// Shows or hides an existing overlay element.
    fn set_overlay_visible(&mut self, id: &str, visible: bool);
}

/// Injectable monotonic clock, so cache-expiry logic is deterministic under
/// test.
pub trait Clock: Send + Sync {
    fn now(&self) -> instant::Instant;
}

/// System clock used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> instant::Instant {
        instant::Instant::now()
    }
}

/// Asynchronous permit data source.
///
/// Implementations own the wire protocol and field normalization for their
/// backend and return entities already mapped to the common [`Permit`]
/// shape (see `data::normalize` for the source adapters).
#[async_trait::async_trait]
pub trait PermitSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Permit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_transform_apply() {
        let transform = ScreenTransform::new(800.0, Point::new(10.0, -20.0));
        let screen = transform.apply(&Point::new(0.5, 0.25));
        assert_eq!(screen, Point::new(410.0, 180.0));
    }
}
