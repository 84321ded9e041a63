//! Polyline helpers shared by snapping, connector analysis and spacing.

use super::segment::{line_segment_intersection, project_point_onto_segment};
use kurbo::{Point, Rect};

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Point reached after walking `distance` along the polyline from its first
/// vertex. Distances outside `[0, length]` clamp to the ends.
pub fn point_at_distance_along(points: &[Point], distance: f64) -> Option<Point> {
    let first = *points.first()?;
    if distance <= 0.0 {
        return Some(first);
    }
    let mut remaining = distance;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if remaining <= len {
            if len < f64::EPSILON {
                return Some(w[1]);
            }
            return Some(w[0].lerp(w[1], remaining / len));
        }
        remaining -= len;
    }
    points.last().copied()
}

/// Nearest point on a polyline. A single-vertex polyline is that vertex.
pub fn nearest_point_on_polyline(point: Point, points: &[Point]) -> Option<Point> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => points
            .windows(2)
            .map(|w| project_point_onto_segment(point, w[0], w[1]))
            .min_by(|a, b| point.distance_squared(*a).total_cmp(&point.distance_squared(*b))),
    }
}

/// Minimum distance from a point to a polyline (infinite when empty).
pub fn distance_to_polyline(point: Point, points: &[Point]) -> f64 {
    nearest_point_on_polyline(point, points)
        .map(|p| point.distance(p))
        .unwrap_or(f64::INFINITY)
}

/// Every crossing between the segments of two polylines.
pub fn polyline_intersections(a: &[Point], b: &[Point]) -> Vec<Point> {
    let mut hits = Vec::new();
    for sa in a.windows(2) {
        for sb in b.windows(2) {
            if let Some(hit) = line_segment_intersection(sa[0], sa[1], sb[0], sb[1]) {
                hits.push(hit);
            }
        }
    }
    hits
}

/// Axis-aligned bounds of a polyline.
pub fn polyline_bounds(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
    )
}

/// Whether two rectangles touch or overlap.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
