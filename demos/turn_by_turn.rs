//! Simulated turn-by-turn session along a two-step route.
//!
//! Run with: cargo run --example turn_by_turn
//! Set RUST_LOG=route_progress=trace for per-sample diagnostics.

use route_progress::{
    destination, DistanceUnit, EncodedPolyline, GeoPoint, Leg, Precision, Route,
    RouteProgressTracker, Step, TrackerConfig,
};

fn step(points: &[GeoPoint], distance_m: f64, bearing_after: Option<f64>) -> Step {
    Step {
        geometry: EncodedPolyline::from_points(points, Precision::Six),
        distance_m,
        duration_s: distance_m / 12.0,
        maneuver_bearing_after: bearing_after,
    }
}

fn main() {
    env_logger::init();

    // A right-angle route near the Brandenburg Gate: 400 m east, then
    // 300 m north.
    let start = GeoPoint::new(13.3777, 52.5163);
    let corner = destination(&start, 400.0, 90.0, DistanceUnit::Meters);
    let finish = destination(&corner, 300.0, 0.0, DistanceUnit::Meters);

    let route = Route {
        legs: vec![Leg {
            steps: vec![
                step(&[start, corner], 400.0, Some(90.0)),
                step(&[corner, finish], 300.0, Some(0.0)),
            ],
        }],
    };

    let mut tracker = RouteProgressTracker::new(&route, TrackerConfig::default()).unwrap();

    println!("Turn-by-Turn Simulation\n");

    // Position samples every 50 m along the first step, drifting a few
    // meters off the centerline, then along the second.
    let mut samples = Vec::new();
    for travelled in (0..=350).step_by(50) {
        let on_line = destination(&start, travelled as f64, 90.0, DistanceUnit::Meters);
        samples.push((destination(&on_line, 3.0, 0.0, DistanceUnit::Meters), Some(90.0)));
    }
    // Almost at the corner, still heading east along the first step, which
    // is what the bearing gate checks before completing it.
    samples.push((
        destination(&start, 390.0, 90.0, DistanceUnit::Meters),
        Some(90.0),
    ));
    for travelled in (50..=295).step_by(50) {
        samples.push((
            destination(&corner, travelled as f64, 0.0, DistanceUnit::Meters),
            Some(0.0),
        ));
    }

    for (i, (fix, heading)) in samples.iter().enumerate() {
        let update = tracker.update(*fix, *heading).unwrap();

        print!(
            "sample {:2}: leg {} step {}, {:6.1} m to maneuver",
            i,
            tracker.leg_index(),
            tracker.step_index(),
            update.distance_to_maneuver
        );
        if update.step_advanced {
            print!("  [step complete]");
        }
        if update.alert.high {
            print!("  [maneuver imminent]");
        } else if update.alert.low {
            print!("  [maneuver ahead]");
        }
        if update.is_off_route {
            print!("  [off route]");
        }
        println!();
    }

    // Arrival is the caller's call, not the tracker's.
    tracker.advance();
    println!("\narrived: session complete = {}", tracker.is_complete());
}
