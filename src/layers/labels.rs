use crate::core::{config::LodThresholds, geo::LatLng, geo::Point, projection::ObliqueProjection};
use serde::{Deserialize, Serialize};

/// Level-of-detail bucket for a label. Ordered: a tier's labels are visible
/// whenever the current tier is at or above it, so tier 2 shows the union of
/// all three sets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum LabelTier {
    /// Borough-level labels, visible at any zoom.
    Coarse = 0,
    /// District labels.
    Mid = 1,
    /// Neighborhood labels, visible only when zoomed in.
    Fine = 2,
}

impl LabelTier {
    /// Classifies a zoom scalar against the configured cut points. Lower
    /// bounds are inclusive.
    pub fn from_zoom(zoom: f64, thresholds: &LodThresholds) -> Self {
        if zoom >= thresholds.fine {
            LabelTier::Fine
        } else if zoom >= thresholds.mid {
            LabelTier::Mid
        } else {
            LabelTier::Coarse
        }
    }
}

/// Static label definition, as loaded from neighborhood-centroid data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDef {
    pub text: String,
    pub lat: f64,
    pub lng: f64,
    pub tier: LabelTier,
}

/// A placed label. The image pixel is projected once at build time and
/// cached; per-frame work only reads it. Visibility is the one mutable bit.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntity {
    id: String,
    text: String,
    position: LatLng,
    tier: LabelTier,
    image_pixel: Point,
    visible: bool,
}

impl LabelEntity {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn tier(&self) -> LabelTier {
        self.tier
    }

    /// Cached projection result; never re-derived after build.
    pub fn image_pixel(&self) -> Point {
        self.image_pixel
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// The full tiered label collection, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Vec<LabelEntity>,
}

impl LabelSet {
    /// Projects every definition through the calibrated camera and caches
    /// the result. Labels start hidden; the controller decides visibility.
    pub fn build(defs: &[LabelDef], projection: &ObliqueProjection) -> Self {
        let labels = defs
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let position = LatLng::new(def.lat, def.lng);
                LabelEntity {
                    id: format!("label-{}", index),
                    text: def.text.clone(),
                    position,
                    tier: def.tier,
                    image_pixel: projection.project(&position),
                    visible: false,
                }
            })
            .collect();
        Self { labels }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelEntity> {
        self.labels.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut LabelEntity> {
        self.labels.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
