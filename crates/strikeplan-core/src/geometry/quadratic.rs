//! Quadratic Bézier helpers for curve conductors.
//!
//! Curves are authored by their *visual* midpoint; the stored control point
//! is derived so that the curve evaluated at `t = 0.5` passes through it.

use super::polyline::nearest_point_on_polyline;
use kurbo::{ParamCurve, Point, QuadBez};

/// Segments used when a curve is flattened for distance and intersection tests.
pub const QUADRATIC_SAMPLE_SEGMENTS: usize = 32;

/// Evaluate the quadratic Bézier at `t`.
pub fn quadratic_point(start: Point, control: Point, end: Point, t: f64) -> Point {
    QuadBez::new(start, control, end).eval(t)
}

/// Control point that makes the curve pass through `through` at `t = 0.5`.
pub fn quadratic_control_point_for_through(start: Point, through: Point, end: Point) -> Point {
    let mid = start.midpoint(end);
    Point::new(2.0 * through.x - mid.x, 2.0 * through.y - mid.y)
}

/// Visual through-point of a curve stored by its control point.
pub fn quadratic_through_point(start: Point, control: Point, end: Point) -> Point {
    quadratic_point(start, control, end, 0.5)
}

/// Flatten the curve into `segments + 1` points. The first and last samples
/// are exactly `start` and `end`.
pub fn sample_quadratic_polyline(
    start: Point,
    control: Point,
    end: Point,
    segments: usize,
) -> Vec<Point> {
    let n = segments.max(1);
    let curve = QuadBez::new(start, control, end);
    (0..=n)
        .map(|i| match i {
            0 => start,
            i if i == n => end,
            i => curve.eval(i as f64 / n as f64),
        })
        .collect()
}

/// Nearest point on the flattened curve.
pub fn nearest_point_on_quadratic(
    point: Point,
    start: Point,
    control: Point,
    end: Point,
    segments: usize,
) -> Point {
    let samples = sample_quadratic_polyline(start, control, end, segments);
    nearest_point_on_polyline(point, &samples).unwrap_or(start)
}

/// Distance from a point to the flattened curve.
pub fn distance_to_quadratic(
    point: Point,
    start: Point,
    control: Point,
    end: Point,
    segments: usize,
) -> f64 {
    point.distance(nearest_point_on_quadratic(point, start, control, end, segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_point_round_trip() {
        let triples = [
            (Point::new(0.0, 0.0), Point::new(50.0, 40.0), Point::new(100.0, 0.0)),
            (Point::new(-12.5, 7.25), Point::new(3.0, -99.0), Point::new(410.0, 220.0)),
            (Point::new(5.0, 5.0), Point::new(5.0, 5.0), Point::new(5.0, 5.0)),
            (Point::new(1e4, -3e3), Point::new(-7.0, 0.001), Point::new(0.5, 1e-3)),
        ];
        for (start, through, end) in triples {
            let control = quadratic_control_point_for_through(start, through, end);
            let back = quadratic_point(start, control, end, 0.5);
            assert!((back.x - through.x).abs() < 1e-9 * (1.0 + through.x.abs()));
            assert!((back.y - through.y).abs() < 1e-9 * (1.0 + through.y.abs()));
        }
    }

    #[test]
    fn test_sampling_keeps_exact_ends() {
        let start = Point::new(0.3, 0.7);
        let end = Point::new(99.1, 12.9);
        let pts = sample_quadratic_polyline(start, Point::new(40.0, 80.0), end, 7);
        assert_eq!(pts.len(), 8);
        assert_eq!(pts[0], start);
        assert_eq!(pts[7], end);
    }

    #[test]
    fn test_distance_to_quadratic() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let control = quadratic_control_point_for_through(start, Point::new(50.0, 50.0), end);
        let d = distance_to_quadratic(
            Point::new(50.0, 60.0),
            start,
            control,
            end,
            QUADRATIC_SAMPLE_SEGMENTS,
        );
        assert!((d - 10.0).abs() < 0.05);
    }
}
