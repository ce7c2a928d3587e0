use permitmap::prelude::*;

/// Walks the manual calibration workflow: append ground-truth points one at
/// a time (as an operator would click landmarks in the viewer and type in
/// their coordinates), watch the fit converge, then export the session.
fn main() -> permitmap::Result<()> {
    #[cfg(feature = "debug")]
    env_logger::init();

    println!("📐 Permitmap Calibration Example");
    println!("================================");

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
    let image = ImageDimensions::new(51200, 49408)?;

    // Ground truth recorded by a prior survey of the raster; the recorded
    // pixels carry a little click noise.
    let observations = [
        ("empire-state", 40.7484, -73.9857, 45059.0, 43479.0),
        ("bryant-park", 40.7536, -73.9832, 45194.5, 42702.8),
        ("madison-sq", 40.7411, -73.9897, 44789.2, 44517.1),
        ("grand-central", 40.7527, -73.9772, 46028.3, 43023.9),
        ("herald-sq", 40.7496, -73.9876, 44989.9, 43287.4),
    ];

    let mut session = CalibrationSession::new(camera, image);
    for (label, lat, lng, px, py) in observations {
        let fit = session.add_point(label, LatLng::new(lat, lng), Point::new(px, py));
        match fit {
            Some(fit) => println!(
                "   + {:<14} fit over {} points: seed ({:.1}, {:.1}), rms {:.2} px, max {:.2} px",
                label, fit.point_count, fit.seed_pixel.x, fit.seed_pixel.y, fit.rms_residual, fit.max_residual
            ),
            None => println!("   + {:<14} (need a second point before fitting)", label),
        }
    }

    if let Some((mpp_x, mpp_y)) = session.refine_scales() {
        println!("\n🔬 Refined meters-per-pixel: x {:.4}, y {:.4}", mpp_x, mpp_y);
        println!(
            "   calibrated constants:     x {:.4}, y {:.4}",
            camera.meters_per_pixel_x(),
            camera.meters_per_pixel_y()
        );
    }

    println!("\n📋 Exported session:");
    println!("{}", session.export_json()?);
    Ok(())
}
