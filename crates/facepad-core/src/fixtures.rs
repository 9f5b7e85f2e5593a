//! Synthetic 68-point faces for tests

use crate::geometry::Point;

/// Frontal face with eye centers at (60, 80) and (140, 80) and mouth
/// corners at (70, 150) and (130, 150).
///
/// `brow_lift` moves both eyebrows up, `mouth_gap` separates the inner
/// lip centers vertically.
pub fn face_points(brow_lift: f32, mouth_gap: f32) -> Vec<Point> {
    let mut points = Vec::with_capacity(68);

    // jaw
    for i in 0..17 {
        let t = i as f32 / 16.0;
        let x = 20.0 + 160.0 * t;
        let y = 100.0 + 100.0 * (1.0 - (2.0 * t - 1.0).powi(2));
        points.push(Point::new(x, y));
    }

    // brows, arched
    let arch = [3.0, 1.0, 0.0, 1.0, 3.0];
    for center_x in [60.0, 140.0] {
        for (j, a) in arch.iter().enumerate() {
            let x = center_x - 20.0 + 10.0 * j as f32;
            points.push(Point::new(x, 60.0 + a - brow_lift));
        }
    }

    // nose
    for i in 0..9 {
        points.push(Point::new(100.0 + (i as f32 - 4.0) * 2.0, 70.0 + 7.0 * i as f32));
    }

    // eyes
    for center_x in [60.0, 140.0] {
        for (dx, dy) in [(-15.0, 0.0), (-7.0, -4.0), (7.0, -4.0), (15.0, 0.0), (7.0, 4.0), (-7.0, 4.0)] {
            points.push(Point::new(center_x + dx, 80.0 + dy));
        }
    }

    // outer lip
    for (dx, dy) in [
        (-30.0, 0.0),
        (-20.0, -6.0),
        (-10.0, -9.0),
        (0.0, -8.0),
        (10.0, -9.0),
        (20.0, -6.0),
        (30.0, 0.0),
        (20.0, 8.0),
        (10.0, 11.0),
        (0.0, 12.0),
        (-10.0, 11.0),
        (-20.0, 8.0),
    ] {
        points.push(Point::new(100.0 + dx, 150.0 + dy));
    }

    // inner lip
    let half = mouth_gap / 2.0;
    for (dx, dy) in [
        (-22.0, 0.0),
        (-11.0, -half),
        (0.0, -half),
        (11.0, -half),
        (22.0, 0.0),
        (11.0, half),
        (0.0, half),
        (-11.0, half),
    ] {
        points.push(Point::new(100.0 + dx, 150.0 + dy));
    }

    points
}
