//! Point and straight-segment primitives.

use kurbo::Point;

/// Slack allowed on segment parameters when testing intersections.
pub const INTERSECTION_TOLERANCE: f64 = 1e-9;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Unclamped parameter of the projection of `point` onto the line through
/// `a` and `b`. `None` for a zero-length segment.
pub fn segment_parameter(point: Point, a: Point, b: Point) -> Option<f64> {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return None;
    }
    Some((point - a).dot(seg) / len_sq)
}

/// Project `point` onto segment `a→b`, clamped to the segment.
pub fn project_point_onto_segment(point: Point, a: Point, b: Point) -> Point {
    match segment_parameter(point, a, b) {
        Some(t) => a.lerp(b, t.clamp(0.0, 1.0)),
        None => a,
    }
}

/// Distance from a point to segment `a→b`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    point.distance(project_point_onto_segment(point, a, b))
}

/// Intersection of segments `a1→a2` and `b1→b2`.
///
/// Returns `None` for parallel or collinear segments, for zero-length
/// segments, and when the crossing lies outside either segment.
pub fn line_segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    let scale = r.hypot() * s.hypot();
    if scale < f64::EPSILON || denom.abs() <= f64::EPSILON * scale {
        return None;
    }

    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    let range = -INTERSECTION_TOLERANCE..=1.0 + INTERSECTION_TOLERANCE;
    if !range.contains(&t) || !range.contains(&u) {
        return None;
    }
    Some(a1.lerp(a2, t.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_is_clamped() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(project_point_onto_segment(Point::new(5.0, 3.0), a, b), Point::new(5.0, 0.0));
        assert_eq!(project_point_onto_segment(Point::new(-4.0, 3.0), a, b), a);
        assert_eq!(project_point_onto_segment(Point::new(14.0, -3.0), a, b), b);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = Point::new(1.0, 1.0);
        assert!((distance_to_segment(Point::new(4.0, 5.0), a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_segments() {
        let hit = line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!((hit.x - 5.0).abs() < 1e-12);
        assert!((hit.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_touching_at_endpoint() {
        let hit = line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 80.0),
        );
        assert_eq!(hit, Some(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_parallel_and_disjoint() {
        assert!(line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        )
        .is_none());
        assert!(line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, -5.0),
            Point::new(20.0, 5.0),
        )
        .is_none());
    }
}
