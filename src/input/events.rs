use serde::{Deserialize, Serialize};

/// Lifecycle and navigation events reported by the host deep-zoom viewer.
///
/// Zoom and pan events fire at high frequency during a gesture — every frame
/// of a pinch or drag — so their handlers must be cheap and idempotent when
/// nothing actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewerEvent {
    /// The viewer finished loading its image pyramid and has a viewport.
    Ready,
    /// The zoom scalar changed (possibly mid-gesture).
    ZoomChanged { zoom: f64 },
    /// The pan center changed (possibly mid-gesture).
    PanChanged,
}

impl ViewerEvent {
    /// Whether this event can move overlay elements on screen and therefore
    /// requires a reposition pass.
    pub fn moves_viewport(&self) -> bool {
        matches!(
            self,
            ViewerEvent::ZoomChanged { .. } | ViewerEvent::PanChanged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_viewport() {
        assert!(ViewerEvent::ZoomChanged { zoom: 2.0 }.moves_viewport());
        assert!(ViewerEvent::PanChanged.moves_viewport());
        assert!(!ViewerEvent::Ready.moves_viewport());
    }
}
