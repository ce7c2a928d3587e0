use crate::{
    core::{
        camera::{CameraConfig, ImageDimensions},
        config::OverlayConfig,
        constants::DEFAULT_PERMIT_FOCUS_ZOOM,
        geo::Point,
        projection::ObliqueProjection,
        viewport::ViewportAdapter,
    },
    data::refresh::{EntityStore, RefreshCoordinator, RefreshTicket},
    data::Permit,
    input::events::ViewerEvent,
    layers::{
        labels::{LabelDef, LabelSet},
        lod::LodLabelController,
        markers::MarkerOverlay,
    },
    traits::ViewerHost,
};
use std::sync::Arc;

/// Central owner of the overlay: the calibrated projection, the viewport
/// adapter, the label and marker controllers, and the entity snapshot
/// store.
///
/// All overlay work happens synchronously inside event handlers; the only
/// asynchronous boundary is the permit fetch, whose completed snapshots are
/// installed into the store and picked up on the next event so renderers
/// always see one coherent generation of entities.
pub struct OverlayEngine {
    projection: ObliqueProjection,
    adapter: ViewportAdapter,
    labels: LodLabelController,
    markers: MarkerOverlay,
    store: Arc<EntityStore>,
    coordinator: Arc<RefreshCoordinator>,
    config: OverlayConfig,
    /// Snapshot generation the marker overlay was last synced against.
    synced_seq: u64,
}

impl OverlayEngine {
    pub fn new(
        camera: CameraConfig,
        seed_pixel: Point,
        image: ImageDimensions,
        label_defs: &[LabelDef],
        config: OverlayConfig,
    ) -> Self {
        let projection = ObliqueProjection::new(camera, seed_pixel);
        let adapter = ViewportAdapter::new(image);

        let labels = LodLabelController::new(
            LabelSet::build(label_defs, &projection),
            adapter,
            config.lod,
        );
        let labels = if config.labels_enabled {
            labels
        } else {
            labels.disabled()
        };

        Self {
            projection,
            adapter,
            labels,
            markers: MarkerOverlay::new(projection, adapter),
            store: Arc::new(EntityStore::new()),
            coordinator: Arc::new(RefreshCoordinator::new()),
            config,
            synced_seq: 0,
        }
    }

    /// Dispatches one viewer event through the overlay. Installed-but-unsynced
    /// entity snapshots are applied first, so a refresh that completed in the
    /// background becomes visible on the next event tick.
    pub fn handle_event(&mut self, host: &mut dyn ViewerHost, event: &ViewerEvent) {
        self.sync_markers(host);
        self.labels.handle_event(host, event);
        // Ready needs a placement pass too: markers synced before the
        // pyramid finished loading were added without a usable transform.
        if event.moves_viewport() || matches!(event, ViewerEvent::Ready) {
            self.markers.reposition(host);
        }
    }

    /// Reconciles the marker overlay with the current snapshot if a newer
    /// generation has been installed.
    pub fn sync_markers(&mut self, host: &mut dyn ViewerHost) {
        let snapshot = self.store.snapshot();
        if snapshot.seq != self.synced_seq {
            log::debug!(
                "applying entity snapshot {} ({} permits)",
                snapshot.seq,
                snapshot.permits.len()
            );
            self.markers.sync(host, &snapshot.permits);
            self.synced_seq = snapshot.seq;
        }
    }

    /// Claims the refresh slot; `None` while another refresh is running.
    pub fn begin_refresh(&self) -> Option<RefreshTicket> {
        self.coordinator.begin()
    }

    /// Installs a completed refresh and reconciles markers immediately.
    /// Out-of-order completions are dropped by the store.
    pub fn complete_refresh(
        &mut self,
        host: &mut dyn ViewerHost,
        ticket: RefreshTicket,
        permits: Vec<Permit>,
    ) -> bool {
        let installed = self.coordinator.complete(ticket, &self.store, permits);
        self.sync_markers(host);
        installed
    }

    /// Releases a refresh whose fetch failed.
    pub fn abandon_refresh(&self, ticket: RefreshTicket) {
        self.coordinator.abandon(ticket);
    }

    /// Pans/zooms the viewer to a placed permit marker. Returns `false` for
    /// unknown ids (including permits that projected off the raster).
    pub fn fly_to_permit(
        &mut self,
        host: &mut dyn ViewerHost,
        permit_id: &str,
        min_zoom: Option<f64>,
    ) -> bool {
        let Some(marker) = self.markers.get(permit_id) else {
            return false;
        };
        let pixel = marker.image_pixel();
        self.adapter
            .fly_to(host, &pixel, min_zoom.unwrap_or(DEFAULT_PERMIT_FOCUS_ZOOM));
        true
    }

    /// Global label switch.
    pub fn set_labels_enabled(&mut self, host: &mut dyn ViewerHost, enabled: bool) {
        self.labels.set_enabled(host, enabled);
    }

    pub fn projection(&self) -> &ObliqueProjection {
        &self.projection
    }

    pub fn adapter(&self) -> &ViewportAdapter {
        &self.adapter
    }

    pub fn labels(&self) -> &LodLabelController {
        &self.labels
    }

    pub fn markers(&self) -> &MarkerOverlay {
        &self.markers
    }

    /// Shared entity store, for wiring a background refresh scheduler.
    pub fn store(&self) -> Arc<EntityStore> {
        self.store.clone()
    }

    /// Shared refresh coordinator, for wiring a background scheduler.
    pub fn coordinator(&self) -> Arc<RefreshCoordinator> {
        self.coordinator.clone()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Spawns the recurring background refresh for this engine's store.
    /// Installed snapshots surface on the next handled event. The task is
    /// cancelled when the returned scheduler drops.
    #[cfg(feature = "tokio-runtime")]
    pub fn start_refresh(
        &self,
        source: Arc<dyn crate::traits::PermitSource>,
    ) -> crate::data::refresh::RefreshScheduler {
        crate::data::refresh::RefreshScheduler::spawn(
            self.config.refresh.interval,
            source,
            self.store.clone(),
            self.coordinator.clone(),
        )
    }
}
