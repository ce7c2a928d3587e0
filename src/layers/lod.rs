use crate::{
    core::{config::LodThresholds, viewport::ViewportAdapter},
    input::events::ViewerEvent,
    layers::labels::{LabelSet, LabelTier},
    traits::{ViewerHost, ViewportSnapshot},
};

/// Level-of-detail label controller.
///
/// Owns the tiered label set and keeps the visible subset and its on-screen
/// positions in sync with the viewer. Two invariants carry the performance
/// of this controller:
///
/// 1. The tier is recomputed on every zoom event but visibility is only
///    touched when the tier actually changes — zoom events fire every frame
///    of a gesture, and toggling hundreds of overlay elements per tick is
///    both wasteful and visually noisy.
/// 2. Screen placement is recomputed every pan/zoom frame for visible
///    labels, but only from the cached image pixel through the viewer's
///    affine transform; the trigonometric projection ran once at build time.
pub struct LodLabelController {
    labels: LabelSet,
    adapter: ViewportAdapter,
    thresholds: LodThresholds,
    enabled: bool,
    /// `None` until the first classification after construction, disable,
    /// or re-enable.
    current_tier: Option<LabelTier>,
    toggle_count: u64,
}

impl LodLabelController {
    pub fn new(labels: LabelSet, adapter: ViewportAdapter, thresholds: LodThresholds) -> Self {
        Self {
            labels,
            adapter,
            thresholds,
            enabled: true,
            current_tier: None,
            toggle_count: 0,
        }
    }

    /// Starts the controller switched off; no overlay state exists yet, so
    /// there is nothing to hide.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Dispatches a viewer event. Safe to call before the viewer is ready;
    /// every path is a no-op without a viewport.
    pub fn handle_event(&mut self, host: &mut dyn ViewerHost, event: &ViewerEvent) {
        match event {
            ViewerEvent::Ready => self.reevaluate(host),
            ViewerEvent::ZoomChanged { .. } => self.on_zoom_frame(host),
            ViewerEvent::PanChanged => self.on_pan_frame(host),
        }
    }

    /// Zoom frame: reclassify, apply the tier if it changed, then sync
    /// positions (mid-gesture frames included).
    fn on_zoom_frame(&mut self, host: &mut dyn ViewerHost) {
        if !self.enabled {
            return;
        }
        let Some(view) = host.viewport() else {
            return;
        };

        let tier = LabelTier::from_zoom(view.zoom, &self.thresholds);
        if self.current_tier != Some(tier) {
            self.apply_tier(host, tier);
        }
        self.reposition_visible(host, &view);
    }

    /// Pan frame: positions only, visibility untouched.
    fn on_pan_frame(&mut self, host: &mut dyn ViewerHost) {
        if !self.enabled {
            return;
        }
        let Some(view) = host.viewport() else {
            return;
        };
        self.reposition_visible(host, &view);
    }

    /// Forces a tier re-evaluation from the unknown state.
    pub fn reevaluate(&mut self, host: &mut dyn ViewerHost) {
        self.current_tier = None;
        self.on_zoom_frame(host);
    }

    /// Global switch. Disabling hides everything and stops per-frame work;
    /// re-enabling behaves like a fresh initialization.
    pub fn set_enabled(&mut self, host: &mut dyn ViewerHost, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.reevaluate(host);
        } else {
            self.hide_all(host);
            self.current_tier = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_tier(&self) -> Option<LabelTier> {
        self.current_tier
    }

    /// Number of individual visibility flips since construction. Unchanged
    /// tiers must not move this counter.
    pub fn toggle_count(&self) -> u64 {
        self.toggle_count
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Shows the union of tiers up to `tier`, hides the rest. Flags are
    /// toggled on the pre-built entities; label objects are never destroyed
    /// and rebuilt.
    fn apply_tier(&mut self, host: &mut dyn ViewerHost, tier: LabelTier) {
        let mut shown = 0usize;
        for label in self.labels.iter_mut() {
            let wanted = label.tier() <= tier;
            if wanted {
                shown += 1;
            }
            if label.is_visible() != wanted {
                label.set_visible(wanted);
                self.toggle_count += 1;
                host.set_overlay_visible(label.id(), wanted);
            }
        }
        log::debug!("label tier -> {:?} ({} visible)", tier, shown);
        self.current_tier = Some(tier);
    }

    fn hide_all(&mut self, host: &mut dyn ViewerHost) {
        for label in self.labels.iter_mut() {
            if label.is_visible() {
                label.set_visible(false);
                self.toggle_count += 1;
                host.set_overlay_visible(label.id(), false);
            }
        }
    }

    fn reposition_visible(&self, host: &mut dyn ViewerHost, view: &ViewportSnapshot) {
        for label in self.labels.iter().filter(|label| label.is_visible()) {
            let viewport_point = self.adapter.to_viewport(&label.image_pixel());
            host.set_overlay_position(label.id(), view.transform.apply(&viewport_point));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            camera::{CameraConfig, ImageDimensions},
            geo::{LatLng, Point},
            projection::ObliqueProjection,
        },
        layers::labels::LabelDef,
        traits::ScreenTransform,
    };
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingViewer {
        zoom: Option<f64>,
        visibility: HashMap<String, bool>,
        positions: HashMap<String, Point>,
        position_writes: usize,
    }

    impl ViewerHost for RecordingViewer {
        fn viewport(&self) -> Option<ViewportSnapshot> {
            self.zoom.map(|zoom| ViewportSnapshot {
                zoom,
                transform: ScreenTransform::new(1000.0, Point::default()),
            })
        }
        fn pan_to(&mut self, _center: Point) {}
        fn zoom_to(&mut self, _zoom: f64) {}
        fn add_overlay(&mut self, id: &str, screen: Point) {
            self.positions.insert(id.to_string(), screen);
        }
        fn remove_overlay(&mut self, id: &str) {
            self.positions.remove(id);
            self.visibility.remove(id);
        }
        fn set_overlay_position(&mut self, id: &str, screen: Point) {
            self.positions.insert(id.to_string(), screen);
            self.position_writes += 1;
        }
        fn set_overlay_visible(&mut self, id: &str, visible: bool) {
            self.visibility.insert(id.to_string(), visible);
        }
    }

    fn controller() -> LodLabelController {
        let camera = CameraConfig::new(
            LatLng::new(40.7484, -73.9857),
            -15.0,
            -45.0,
            1200.0,
            900.0,
            2048,
            2048,
            0.5,
        )
        .unwrap();
        let projection = ObliqueProjection::new(camera, Point::new(45059.0, 43479.0));
        let defs = vec![
            LabelDef {
                text: "Manhattan".to_string(),
                lat: 40.7484,
                lng: -73.9857,
                tier: LabelTier::Coarse,
            },
            LabelDef {
                text: "Midtown".to_string(),
                lat: 40.7549,
                lng: -73.984,
                tier: LabelTier::Mid,
            },
            LabelDef {
                text: "NoMad".to_string(),
                lat: 40.7448,
                lng: -73.9883,
                tier: LabelTier::Fine,
            },
        ];
        LodLabelController::new(
            LabelSet::build(&defs, &projection),
            ViewportAdapter::new(ImageDimensions::new(51200, 49408).unwrap()),
            LodThresholds::default(),
        )
    }

    fn zoom_event(zoom: f64) -> ViewerEvent {
        ViewerEvent::ZoomChanged { zoom }
    }

    #[test]
    fn test_noop_before_viewer_ready() {
        let mut lod = controller();
        let mut viewer = RecordingViewer::default();

        lod.handle_event(&mut viewer, &zoom_event(2.0));
        lod.handle_event(&mut viewer, &ViewerEvent::PanChanged);

        assert_eq!(lod.toggle_count(), 0);
        assert!(viewer.visibility.is_empty());
        assert!(lod.current_tier().is_none());
    }

    #[test]
    fn test_tier_change_toggles_union() {
        let mut lod = controller();
        let mut viewer = RecordingViewer {
            zoom: Some(0.8),
            ..Default::default()
        };

        lod.handle_event(&mut viewer, &ViewerEvent::Ready);
        assert_eq!(lod.current_tier(), Some(LabelTier::Coarse));
        assert_eq!(viewer.visibility.get("label-0"), Some(&true));
        assert_eq!(viewer.visibility.get("label-1"), None); // never shown yet

        viewer.zoom = Some(2.0);
        lod.handle_event(&mut viewer, &zoom_event(2.0));
        assert_eq!(lod.current_tier(), Some(LabelTier::Mid));
        assert_eq!(viewer.visibility.get("label-1"), Some(&true));

        viewer.zoom = Some(5.0);
        lod.handle_event(&mut viewer, &zoom_event(5.0));
        assert_eq!(viewer.visibility.get("label-2"), Some(&true));

        viewer.zoom = Some(0.8);
        lod.handle_event(&mut viewer, &zoom_event(0.8));
        assert_eq!(viewer.visibility.get("label-1"), Some(&false));
        assert_eq!(viewer.visibility.get("label-2"), Some(&false));
    }

    #[test]
    fn test_unchanged_tier_is_visibility_noop() {
        let mut lod = controller();
        let mut viewer = RecordingViewer {
            zoom: Some(2.0),
            ..Default::default()
        };

        lod.handle_event(&mut viewer, &ViewerEvent::Ready);
        let toggles = lod.toggle_count();

        // Gesture frames inside the same tier: positions move, flags do not
        for zoom in [2.1, 2.5, 3.0, 3.98] {
            viewer.zoom = Some(zoom);
            lod.handle_event(&mut viewer, &zoom_event(zoom));
        }
        assert_eq!(lod.toggle_count(), toggles);
    }

    #[test]
    fn test_pan_repositions_only_visible_labels() {
        let mut lod = controller();
        let mut viewer = RecordingViewer {
            zoom: Some(0.8),
            ..Default::default()
        };

        lod.handle_event(&mut viewer, &ViewerEvent::Ready);
        let writes = viewer.position_writes;

        lod.handle_event(&mut viewer, &ViewerEvent::PanChanged);
        // Coarse tier has exactly one visible label
        assert_eq!(viewer.position_writes, writes + 1);
    }

    #[test]
    fn test_disable_hides_and_reenable_reevaluates() {
        let mut lod = controller();
        let mut viewer = RecordingViewer {
            zoom: Some(5.0),
            ..Default::default()
        };

        lod.handle_event(&mut viewer, &ViewerEvent::Ready);
        assert_eq!(lod.current_tier(), Some(LabelTier::Fine));

        lod.set_enabled(&mut viewer, false);
        assert!(viewer.visibility.values().all(|visible| !visible));
        assert!(lod.current_tier().is_none());

        // No per-frame work while disabled
        let writes = viewer.position_writes;
        lod.handle_event(&mut viewer, &ViewerEvent::PanChanged);
        assert_eq!(viewer.position_writes, writes);

        lod.set_enabled(&mut viewer, true);
        assert_eq!(lod.current_tier(), Some(LabelTier::Fine));
        assert_eq!(viewer.visibility.get("label-2"), Some(&true));
    }
}
