//! Geometry primitives in document space.
//!
//! Everything here is a pure function over `kurbo` points. Degenerate input
//! is reported as `None`, never as a panic.

mod arc;
mod polyline;
mod quadratic;
mod segment;

pub use arc::{
    ARC_EPSILON, ARC_SAMPLE_SEGMENTS, CircularArcGeometry, circular_arc_geometry_from_three_points,
    distance_to_circular_arc, nearest_point_on_circular_arc, normalize_radians,
    sample_circular_arc_polyline,
};
pub use polyline::{
    distance_to_polyline, nearest_point_on_polyline, point_at_distance_along, polyline_bounds,
    polyline_intersections, polyline_length, rects_overlap,
};
pub use quadratic::{
    QUADRATIC_SAMPLE_SEGMENTS, distance_to_quadratic, nearest_point_on_quadratic,
    quadratic_control_point_for_through, quadratic_point, quadratic_through_point,
    sample_quadratic_polyline,
};
pub use segment::{
    INTERSECTION_TOLERANCE, distance, distance_to_segment, line_segment_intersection,
    project_point_onto_segment, segment_parameter,
};

use kurbo::{Point, Vec2};

/// Direction from `from` to `to` in degrees, normalized to `[0, 360)`.
pub fn angle_degrees(from: Point, to: Point) -> f64 {
    normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

/// Normalize an angle to `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/// Round an angle to the nearest multiple of `increment_deg`, normalized to
/// `[0, 360)`. A non-positive increment only normalizes.
pub fn snap_angle_degrees(angle: f64, increment_deg: f64) -> f64 {
    if increment_deg <= 0.0 || !increment_deg.is_finite() {
        return normalize_degrees(angle);
    }
    normalize_degrees((angle / increment_deg).round() * increment_deg)
}

/// Point at `distance` from `origin` in direction `angle_deg`.
pub fn point_at_angle(origin: Point, angle_deg: f64, distance: f64) -> Point {
    origin + Vec2::from_angle(angle_deg.to_radians()) * distance
}
