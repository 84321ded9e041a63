//! Circular arcs defined by start, through and end points.
//!
//! [`circular_arc_geometry_from_three_points`] is the only place that decides
//! whether an arc definition is valid. Placement, handle editing, spacing,
//! snapping and connector analysis all go through it.

use super::polyline::nearest_point_on_polyline;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Default tolerance for coincident points, collinearity and sweep checks.
pub const ARC_EPSILON: f64 = 1e-6;

/// Segments used when an arc is flattened for intersection tests.
pub const ARC_SAMPLE_SEGMENTS: usize = 48;

/// Solved circle and sweep of a three-point arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularArcGeometry {
    pub start: Point,
    pub through: Point,
    pub end: Point,
    pub center: Point,
    pub radius: f64,
    /// Angles in radians, measured with `atan2` in document space.
    pub start_angle: f64,
    pub through_angle: f64,
    pub end_angle: f64,
    /// True when the arc runs in the direction of increasing angle.
    pub sweep_positive: bool,
    /// Sweep magnitude in radians, in `(0, 2π)`.
    pub sweep_radians: f64,
    pub large_arc_flag: bool,
    pub sweep_flag: bool,
}

impl CircularArcGeometry {
    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep_radians
    }

    /// Signed sweep (negative when the arc runs clockwise in angle space).
    pub fn signed_sweep(&self) -> f64 {
        if self.sweep_positive {
            self.sweep_radians
        } else {
            -self.sweep_radians
        }
    }

    /// Point on the circle at an absolute angle.
    pub fn point_at_angle(&self, angle: f64) -> Point {
        self.center + Vec2::from_angle(angle) * self.radius
    }

    /// Point after travelling `fraction` of the sweep from the start.
    pub fn point_at_fraction(&self, fraction: f64) -> Point {
        self.point_at_angle(self.start_angle + self.signed_sweep() * fraction)
    }

    /// Offset of `angle` from the start angle, measured along the sweep
    /// direction, in `[0, 2π)`.
    pub fn offset_along_sweep(&self, angle: f64) -> f64 {
        let delta = if self.sweep_positive {
            angle - self.start_angle
        } else {
            self.start_angle - angle
        };
        normalize_radians(delta)
    }

    /// Whether an absolute angle lies on the arc.
    pub fn contains_angle(&self, angle: f64) -> bool {
        self.offset_along_sweep(angle) <= self.sweep_radians
    }
}

/// Normalize an angle to `[0, 2π)`.
pub fn normalize_radians(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Solve the circle through three points.
///
/// Returns `None` when any two points coincide within `epsilon`, when the
/// points are collinear, or when the resulting sweep is ≈0 or ≈2π.
pub fn circular_arc_geometry_from_three_points(
    start: Point,
    through: Point,
    end: Point,
    epsilon: f64,
) -> Option<CircularArcGeometry> {
    if start.distance(through) <= epsilon
        || through.distance(end) <= epsilon
        || start.distance(end) <= epsilon
    {
        return None;
    }

    let ab = through - start;
    let ac = end - start;
    let cross = ab.cross(ac);
    // Sine of the angle at `start`; scale independent.
    if cross.abs() <= epsilon * ab.hypot() * ac.hypot() {
        return None;
    }

    let d = 2.0 * cross;
    let ab2 = ab.hypot2();
    let ac2 = ac.hypot2();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let center = start + Vec2::new(ux, uy);
    let radius = center.distance(start);
    if !radius.is_finite() {
        return None;
    }

    let angle_of = |p: Point| (p.y - center.y).atan2(p.x - center.x);
    let start_angle = angle_of(start);
    let through_angle = angle_of(through);
    let end_angle = angle_of(end);

    let end_offset = normalize_radians(end_angle - start_angle);
    let through_offset = normalize_radians(through_angle - start_angle);
    let sweep_positive = through_offset <= end_offset;
    let sweep_radians = if sweep_positive { end_offset } else { TAU - end_offset };

    if sweep_radians <= epsilon || sweep_radians >= TAU - epsilon {
        return None;
    }

    Some(CircularArcGeometry {
        start,
        through,
        end,
        center,
        radius,
        start_angle,
        through_angle,
        end_angle,
        sweep_positive,
        sweep_radians,
        large_arc_flag: sweep_radians > PI,
        sweep_flag: sweep_positive,
    })
}

/// Flatten an arc into `segments + 1` points along the true circle. The
/// first and last samples are exactly the arc's start and end.
pub fn sample_circular_arc_polyline(arc: &CircularArcGeometry, segments: usize) -> Vec<Point> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| match i {
            0 => arc.start,
            i if i == n => arc.end,
            i => arc.point_at_fraction(i as f64 / n as f64),
        })
        .collect()
}

/// Nearest point on the arc flattened into `segments` pieces.
///
/// Connector analysis works on the same flattening, so a point snapped here
/// is one the analyzer sees as lying on the arc.
pub fn nearest_point_on_circular_arc(
    point: Point,
    arc: &CircularArcGeometry,
    segments: usize,
) -> Point {
    let samples = sample_circular_arc_polyline(arc, segments);
    nearest_point_on_polyline(point, &samples).unwrap_or(arc.start)
}

/// Distance from a point to the flattened arc.
pub fn distance_to_circular_arc(point: Point, arc: &CircularArcGeometry, segments: usize) -> f64 {
    point.distance(nearest_point_on_circular_arc(point, arc, segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance_to_polyline;

    fn arc(start: (f64, f64), through: (f64, f64), end: (f64, f64)) -> Option<CircularArcGeometry> {
        circular_arc_geometry_from_three_points(
            Point::new(start.0, start.1),
            Point::new(through.0, through.1),
            Point::new(end.0, end.1),
            ARC_EPSILON,
        )
    }

    #[test]
    fn test_half_circle() {
        let geom = arc((-10.0, 0.0), (0.0, 10.0), (10.0, 0.0)).unwrap();
        assert!(geom.center.distance(Point::ZERO) < 1e-9);
        assert!((geom.radius - 10.0).abs() < 1e-9);
        assert!((geom.sweep_radians - PI).abs() < 1e-9);
        assert!((geom.length() - 10.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_direction_follows_through_point() {
        // Through point at +y: angle goes from π down to 0 through π/2.
        let upper = arc((-10.0, 0.0), (0.0, 10.0), (10.0, 0.0)).unwrap();
        assert!(!upper.sweep_positive);
        let lower = arc((-10.0, 0.0), (0.0, -10.0), (10.0, 0.0)).unwrap();
        assert!(lower.sweep_positive);
        assert_eq!(upper.sweep_flag, upper.sweep_positive);
    }

    #[test]
    fn test_large_arc_flag() {
        let small = arc((10.0, 0.0), (7.0710678, 7.0710678), (0.0, 10.0)).unwrap();
        assert!(!small.large_arc_flag);
        let large = arc((10.0, 0.0), (-10.0, 0.0), (0.0, 10.0)).unwrap();
        assert!(large.large_arc_flag);
        assert!((large.sweep_radians - 1.5 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert!(arc((0.0, 0.0), (5.0, 0.0), (10.0, 0.0)).is_none());
        assert!(arc((0.0, 0.0), (0.0, 0.0), (10.0, 5.0)).is_none());
        assert!(arc((0.0, 0.0), (3.0, 4.0), (0.0, 0.0)).is_none());
        assert!(arc((0.0, 0.0), (5.0, 1e-9), (10.0, 0.0)).is_none());
    }

    #[test]
    fn test_sampled_ends_are_exact_and_through_in_sweep() {
        let cases = [
            ((0.0, 0.0), (50.0, 30.0), (100.0, 0.0)),
            ((12.3, -4.5), (-8.0, 17.0), (3.3, 40.1)),
            ((220.0, 220.0), (300.0, 120.0), (420.0, 220.0)),
            ((1.0, 1.0), (2.0, 5.0), (0.5, 1.2)),
        ];
        for (s, t, e) in cases {
            let geom = arc(s, t, e).unwrap();
            let pts = sample_circular_arc_polyline(&geom, ARC_SAMPLE_SEGMENTS);
            assert_eq!(pts[0], geom.start);
            assert_eq!(*pts.last().unwrap(), geom.end);
            let through_offset = geom.offset_along_sweep(geom.through_angle);
            assert!(through_offset >= 0.0 && through_offset <= geom.sweep_radians);
            assert!(geom.contains_angle(geom.through_angle));
            for p in &pts {
                assert!((p.distance(geom.center) - geom.radius).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_nearest_point_on_arc() {
        let geom = arc((-10.0, 0.0), (0.0, 10.0), (10.0, 0.0)).unwrap();
        // The midpoint is a sample, so it is hit exactly.
        let on = nearest_point_on_circular_arc(Point::new(0.0, 20.0), &geom, ARC_SAMPLE_SEGMENTS);
        assert!(on.distance(Point::new(0.0, 10.0)) < 1e-9);
        // Below the chord the closer end wins.
        let off = nearest_point_on_circular_arc(Point::new(9.0, -5.0), &geom, ARC_SAMPLE_SEGMENTS);
        assert!(off.distance(Point::new(10.0, 0.0)) < 1e-9);
        let d = distance_to_circular_arc(Point::new(0.0, 4.0), &geom, ARC_SAMPLE_SEGMENTS);
        assert!(d <= 6.0 + 1e-9 && d > 5.99);
    }

    #[test]
    fn test_nearest_point_lies_on_sampled_chord() {
        let geom = arc((-2000.0, 0.0), (0.0, 2000.0), (2000.0, 0.0)).unwrap();
        let samples = sample_circular_arc_polyline(&geom, ARC_SAMPLE_SEGMENTS);
        // Halfway between two samples, just outside the circle.
        let angle = (90.0f64 - 1.875).to_radians();
        let raw = Point::new(2003.0 * angle.cos(), 2003.0 * angle.sin());
        let nearest = nearest_point_on_circular_arc(raw, &geom, ARC_SAMPLE_SEGMENTS);
        assert!(distance_to_polyline(nearest, &samples) < 1e-9);
        // The chord sags about a point inside the true circle here.
        assert!(geom.radius - nearest.distance(geom.center) > 1.0);
    }
}
