use crate::{
    core::{geo::Point, projection::ObliqueProjection, viewport::ViewportAdapter},
    data::{Permit, PermitCategory},
    prelude::{HashMap, HashSet},
    traits::{ViewerHost, ViewportSnapshot},
};
use std::collections::hash_map::Entry;

/// A placed permit marker with its projection cached at placement time.
#[derive(Debug, Clone, PartialEq)]
pub struct PermitMarker {
    id: String,
    category: PermitCategory,
    image_pixel: Point,
}

impl PermitMarker {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> PermitCategory {
        self.category
    }

    pub fn image_pixel(&self) -> Point {
        self.image_pixel
    }
}

/// Controller owning the permit marker collection.
///
/// Markers are keyed by permit id and synced against each entity snapshot
/// with explicit add/remove/update semantics; entities that project off the
/// raster are dropped silently. Per-frame repositioning mirrors the label
/// path: cached image pixel through the viewer's current transform.
pub struct MarkerOverlay {
    projection: ObliqueProjection,
    adapter: ViewportAdapter,
    markers: HashMap<String, PermitMarker>,
}

impl MarkerOverlay {
    pub fn new(projection: ObliqueProjection, adapter: ViewportAdapter) -> Self {
        Self {
            projection,
            adapter,
            markers: HashMap::default(),
        }
    }

    /// Reconciles the marker set with a refreshed entity list: removes
    /// markers whose permit disappeared, adds new ones, and re-projects a
    /// marker if its permit moved.
    pub fn sync(&mut self, host: &mut dyn ViewerHost, permits: &[Permit]) {
        let mut seen: HashSet<&str> = HashSet::default();
        let mut dropped = 0usize;

        for permit in permits {
            let pixel = self.projection.project(&permit.position);
            if !self.adapter.contains(&pixel) {
                // Off the rendered raster; not an error.
                dropped += 1;
                continue;
            }
            seen.insert(permit.id.as_str());

            match self.markers.entry(permit.id.clone()) {
                Entry::Occupied(mut occupied) => {
                    let marker = occupied.get_mut();
                    if marker.image_pixel != pixel || marker.category != permit.category {
                        marker.image_pixel = pixel;
                        marker.category = permit.category;
                        if let Some(view) = host.viewport() {
                            let viewport_point = self.adapter.to_viewport(&pixel);
                            host.set_overlay_position(
                                &permit.id,
                                view.transform.apply(&viewport_point),
                            );
                        }
                    }
                }
                Entry::Vacant(vacant) => {
                    let screen = host
                        .viewport()
                        .map(|view| view.transform.apply(&self.adapter.to_viewport(&pixel)))
                        .unwrap_or_default();
                    host.add_overlay(&permit.id, screen);
                    vacant.insert(PermitMarker {
                        id: permit.id.clone(),
                        category: permit.category,
                        image_pixel: pixel,
                    });
                }
            }
        }

        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.markers.remove(&id);
            host.remove_overlay(&id);
        }

        if dropped > 0 {
            log::debug!("dropped {} permits projecting off the raster", dropped);
        }
    }

    /// Per-frame position sync for every placed marker.
    pub fn reposition(&self, host: &mut dyn ViewerHost) {
        let Some(view) = host.viewport() else {
            return;
        };
        self.reposition_with(host, &view);
    }

    pub(crate) fn reposition_with(&self, host: &mut dyn ViewerHost, view: &ViewportSnapshot) {
        for marker in self.markers.values() {
            let viewport_point = self.adapter.to_viewport(&marker.image_pixel);
            host.set_overlay_position(&marker.id, view.transform.apply(&viewport_point));
        }
    }

    pub fn get(&self, id: &str) -> Option<&PermitMarker> {
        self.markers.get(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
