use permitmap::{data::normalize::FilingRecord, prelude::*};

/// Example of driving the overlay engine without a real deep-zoom viewer.
/// A recording stand-in plays the viewer role so the whole data flow can be
/// exercised from the terminal.
struct ConsoleViewer {
    viewport: Option<ViewportSnapshot>,
    overlay_count: usize,
}

impl ViewerHost for ConsoleViewer {
    fn viewport(&self) -> Option<ViewportSnapshot> {
        self.viewport
    }
    fn pan_to(&mut self, center: Point) {
        println!("   viewer: pan to ({:.4}, {:.4})", center.x, center.y);
    }
    fn zoom_to(&mut self, zoom: f64) {
        println!("   viewer: zoom to {}", zoom);
        if let Some(view) = self.viewport.as_mut() {
            view.zoom = zoom;
        }
    }
    fn add_overlay(&mut self, id: &str, _screen: Point) {
        self.overlay_count += 1;
        println!("   viewer: add overlay {}", id);
    }
    fn remove_overlay(&mut self, id: &str) {
        self.overlay_count -= 1;
        println!("   viewer: remove overlay {}", id);
    }
    fn set_overlay_position(&mut self, _id: &str, _screen: Point) {}
    fn set_overlay_visible(&mut self, id: &str, visible: bool) {
        println!("   viewer: {} -> {}", id, if visible { "show" } else { "hide" });
    }
}

fn main() -> permitmap::Result<()> {
    #[cfg(feature = "debug")]
    env_logger::init();

    println!("🗺️ Permitmap Headless Example");
    println!("=============================");

    // Calibrated midtown camera, seed at the Empire State Building
    let camera = CameraConfig::new(
        LatLng::new(40.7484, -73.9857),
        -15.0,
        -45.0,
        1200.0,
        900.0,
        2048,
        2048,
        0.5,
    )?;
    let seed_pixel = Point::new(45059.0, 43479.0);
    let image = ImageDimensions::new(51200, 49408)?;

    let labels = vec![
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

    let mut engine = OverlayEngine::new(camera, seed_pixel, image, &labels, OverlayConfig::default());
    println!("✅ Engine created with {} labels", engine.labels().labels().len());

    // Project a few landmarks into raster pixel space
    println!("\n🎯 Projections:");
    let landmarks = [
        ("Empire State Building", LatLng::new(40.7484, -73.9857)),
        ("Bryant Park", LatLng::new(40.7536, -73.9832)),
        ("Madison Square Park", LatLng::new(40.7411, -73.9897)),
    ];
    for (name, position) in landmarks {
        let pixel = engine.projection().project(&position);
        println!("   📍 {} -> ({:.1}, {:.1})", name, pixel.x, pixel.y);
    }

    // The viewer finishes loading its pyramid
    let mut viewer = ConsoleViewer {
        viewport: Some(ViewportSnapshot {
            zoom: 0.9,
            transform: ScreenTransform::new(900.0, Point::new(0.0, 0.0)),
        }),
        overlay_count: 0,
    };
    println!("\n🚀 Viewer ready at zoom 0.9:");
    engine.handle_event(&mut viewer, &ViewerEvent::Ready);

    // A permit refresh lands: raw source records, normalized to the common
    // shape (the second one has no usable coordinates and is excluded)
    println!("\n📦 Applying a permit snapshot:");
    let filings: Vec<FilingRecord> = serde_json::from_value(serde_json::json!([
        {
            "job_filing_number": "M00345-P1",
            "latitude": "40.7465",
            "longitude": "-73.9881",
            "work_type": "NB",
            "approved_date": "2026-07-15",
            "house_no": "1200",
            "street_name": "BROADWAY"
        },
        {
            "job_filing_number": "M00388-P1",
            "latitude": null,
            "longitude": null,
            "work_type": "PL"
        }
    ]))?;
    let permits = normalize_batch(&filings, &[]);
    println!("   normalized {} of {} records", permits.len(), filings.len());
    let ticket = engine.begin_refresh().expect("no refresh in flight");
    engine.complete_refresh(&mut viewer, ticket, permits);
    println!("   {} marker(s) placed", engine.markers().len());

    // Zoom through the label tiers
    println!("\n🔍 Zooming through the tiers:");
    for zoom in [1.5, 4.0] {
        viewer.zoom_to(zoom);
        engine.handle_event(&mut viewer, &ViewerEvent::ZoomChanged { zoom });
        println!("   tier at zoom {}: {:?}", zoom, engine.labels().current_tier());
    }

    // Fly to the permit marker
    println!("\n✈️ Flying to permit M00345-P1:");
    engine.fly_to_permit(&mut viewer, "M00345-P1", Some(5.0));

    println!("\n✅ Done");
    Ok(())
}
