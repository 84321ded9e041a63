//! Object snapping and angle snapping.

use crate::document::{ConductorPath, Document, Selection, SelectionKind};
use crate::geometry::{
    ARC_SAMPLE_SEGMENTS, QUADRATIC_SAMPLE_SEGMENTS, angle_degrees, nearest_point_on_circular_arc,
    nearest_point_on_quadratic, point_at_angle, polyline_intersections, project_point_onto_segment,
    rects_overlap, segment_parameter, snap_angle_degrees,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Snap radius in screen pixels.
pub const SNAP_TOLERANCE_PX: f64 = 10.0;

/// Snap radius in document units at `zoom`.
pub fn snap_tolerance(zoom: f64) -> f64 {
    SNAP_TOLERANCE_PX / zoom.max(f64::EPSILON)
}

/// What a snapped point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapKind {
    /// Start or end of a conductor.
    Endpoint,
    /// Position of a symbol, text or dimension label.
    Basepoint,
    /// A construction mark.
    Mark,
    /// Crossing of two conductors or arrows.
    Intersection,
    /// Foot of the perpendicular from the reference point.
    Perpendicular,
    /// Closest point on a conductor or arrow.
    Nearest,
}

impl SnapKind {
    /// Higher wins. Only `Nearest` ranks below the rest.
    pub fn priority(self) -> u8 {
        match self {
            SnapKind::Nearest => 0,
            _ => 1,
        }
    }
}

/// A candidate snap point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub point: Point,
    pub kind: SnapKind,
}

impl SnapTarget {
    fn new(point: Point, kind: SnapKind) -> Self {
        Self { point, kind }
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// The resolved point.
    pub point: Point,
    /// Whether the raw point moved onto a target.
    pub snapped: bool,
    /// Kind of target, when snapped.
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
            kind: None,
        }
    }

    fn from_target(target: SnapTarget) -> Self {
        Self {
            point: target.point,
            snapped: true,
            kind: Some(target.kind),
        }
    }
}

/// Inputs for one snap lookup.
#[derive(Debug, Clone, Copy)]
pub struct SnapQuery<'a> {
    /// Raw point in document space.
    pub point: Point,
    /// Entity being edited, never snapped to.
    pub exclude: Option<&'a Selection>,
    /// Enables perpendicular targets.
    pub reference: Option<Point>,
    /// Search radius in document units.
    pub tolerance: f64,
}

impl<'a> SnapQuery<'a> {
    pub fn new(point: Point, tolerance: f64) -> Self {
        Self {
            point,
            exclude: None,
            reference: None,
            tolerance,
        }
    }

    pub fn excluding(mut self, selection: &'a Selection) -> Self {
        self.exclude = Some(selection);
        self
    }

    pub fn with_reference(mut self, reference: Point) -> Self {
        self.reference = Some(reference);
        self
    }

    fn excludes(&self, kind: SelectionKind, id: &str) -> bool {
        self.exclude.is_some_and(|s| s.kind() == kind && s.id() == id)
    }
}

/// Flattened snap geometry: conductors plus arrows.
struct SnapPath {
    points: Vec<Point>,
    bounds: Rect,
}

impl From<ConductorPath> for SnapPath {
    fn from(path: ConductorPath) -> Self {
        Self {
            points: path.points,
            bounds: path.bounds,
        }
    }
}

/// Every target within tolerance of the query point, in no particular order.
///
/// `document` is expected to be the visible document for one page.
pub fn collect_snap_targets(document: &Document, query: &SnapQuery<'_>) -> Vec<SnapTarget> {
    let raw = query.point;
    let tolerance = query.tolerance;
    let mut targets = Vec::new();
    let mut push = |point: Point, kind: SnapKind| {
        if point.distance(raw) <= tolerance {
            targets.push(SnapTarget::new(point, kind));
        }
    };

    for line in document.lines.iter().filter(|l| !query.excludes(SelectionKind::Line, &l.id)) {
        push(line.start, SnapKind::Endpoint);
        push(line.end, SnapKind::Endpoint);
        push(project_point_onto_segment(raw, line.start, line.end), SnapKind::Nearest);
        if let Some(reference) = query.reference {
            if let Some(foot) = perpendicular_foot(reference, line.start, line.end) {
                push(foot, SnapKind::Perpendicular);
            }
        }
    }

    for arrow in document.arrows.iter().filter(|a| !query.excludes(SelectionKind::Arrow, &a.id)) {
        push(project_point_onto_segment(raw, arrow.tail, arrow.head), SnapKind::Nearest);
        if let Some(reference) = query.reference {
            if let Some(foot) = perpendicular_foot(reference, arrow.tail, arrow.head) {
                push(foot, SnapKind::Perpendicular);
            }
        }
    }

    for arc in document.arcs.iter().filter(|a| !query.excludes(SelectionKind::Arc, &a.id)) {
        push(arc.start, SnapKind::Endpoint);
        push(arc.end, SnapKind::Endpoint);
        if let Some(geometry) = arc.geometry() {
            push(
                nearest_point_on_circular_arc(raw, &geometry, ARC_SAMPLE_SEGMENTS),
                SnapKind::Nearest,
            );
        }
    }

    for curve in document.curves.iter().filter(|c| !query.excludes(SelectionKind::Curve, &c.id)) {
        push(curve.start, SnapKind::Endpoint);
        push(curve.end, SnapKind::Endpoint);
        push(
            nearest_point_on_quadratic(
                raw,
                curve.start,
                curve.through,
                curve.end,
                QUADRATIC_SAMPLE_SEGMENTS,
            ),
            SnapKind::Nearest,
        );
    }

    for symbol in document
        .symbols
        .iter()
        .filter(|s| !query.excludes(SelectionKind::Symbol, &s.id))
    {
        push(symbol.position, SnapKind::Basepoint);
    }
    for text in document.texts.iter().filter(|t| !query.excludes(SelectionKind::Text, &t.id)) {
        push(text.position, SnapKind::Basepoint);
    }
    for dim in document
        .dimensions
        .iter()
        .filter(|d| !query.excludes(SelectionKind::DimensionText, &d.id))
    {
        push(dim.position, SnapKind::Basepoint);
    }
    for mark in document.marks.iter().filter(|m| !query.excludes(SelectionKind::Mark, &m.id)) {
        push(mark.position, SnapKind::Mark);
    }

    // An intersection within tolerance lies on both paths, so only paths
    // passing near the raw point can contribute one.
    let nearby = intersection_paths(document, query);
    for (i, a) in nearby.iter().enumerate() {
        for b in &nearby[i + 1..] {
            if !rects_overlap(a.bounds, b.bounds) {
                continue;
            }
            for point in polyline_intersections(&a.points, &b.points) {
                push(point, SnapKind::Intersection);
            }
        }
    }

    targets
}

/// Pick the best target: highest priority, then closest to `point`.
pub fn best_snap_target(point: Point, targets: &[SnapTarget]) -> Option<SnapTarget> {
    let mut best: Option<(SnapTarget, f64)> = None;
    for target in targets {
        let dist = target.point.distance(point);
        let better = match best {
            None => true,
            Some((current, current_dist)) => {
                let (p, q) = (target.kind.priority(), current.kind.priority());
                p > q || (p == q && dist < current_dist)
            }
        };
        if better {
            best = Some((*target, dist));
        }
    }
    best.map(|(target, _)| target)
}

/// Resolve the raw point against the visible document.
///
/// A no-op when snapping is disabled in the document settings.
pub fn resolve_snap(document: &Document, query: &SnapQuery<'_>) -> SnapResult {
    if !document.settings.snap_enabled {
        return SnapResult::none(query.point);
    }
    let targets = collect_snap_targets(document, query);
    match best_snap_target(query.point, &targets) {
        Some(target) => {
            log::trace!(
                "Snapped to {:?} at ({:.2}, {:.2})",
                target.kind,
                target.point.x,
                target.point.y
            );
            SnapResult::from_target(target)
        }
        None => SnapResult::none(query.point),
    }
}

fn perpendicular_foot(reference: Point, a: Point, b: Point) -> Option<Point> {
    let t = segment_parameter(reference, a, b)?;
    (0.0..=1.0).contains(&t).then(|| a.lerp(b, t))
}

fn intersection_paths(document: &Document, query: &SnapQuery<'_>) -> Vec<SnapPath> {
    let near =
        |bounds: Rect| bounds.inflate(query.tolerance, query.tolerance).contains(query.point);
    let mut paths: Vec<SnapPath> = Vec::new();

    for conductor in document.conductors() {
        if query.excludes(conductor.selection.kind(), conductor.selection.id())
            || !near(conductor.bounds)
        {
            continue;
        }
        paths.push(conductor.into());
    }
    for arrow in &document.arrows {
        let bounds = Rect::from_points(arrow.tail, arrow.head);
        if query.excludes(SelectionKind::Arrow, &arrow.id) || !near(bounds) {
            continue;
        }
        paths.push(SnapPath {
            points: vec![arrow.tail, arrow.head],
            bounds,
        });
    }
    paths
}

/// Result of an angle snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSnapResult {
    /// The constrained point.
    pub point: Point,
    /// The snapped angle in degrees (0-360).
    pub angle_degrees: f64,
    /// The original (unsnapped) angle in degrees.
    pub original_angle_degrees: f64,
    /// Whether the point moved.
    pub snapped: bool,
    /// Distance from the reference, preserved from the original point.
    pub distance: f64,
}

/// Constrain `point` to the nearest `increment_deg` multiple around
/// `reference`, keeping its distance from the reference.
pub fn snap_to_angle(reference: Point, point: Point, increment_deg: f64) -> AngleSnapResult {
    let distance = reference.distance(point);
    if distance < 1e-9 {
        return AngleSnapResult {
            point,
            angle_degrees: 0.0,
            original_angle_degrees: 0.0,
            snapped: false,
            distance: 0.0,
        };
    }

    let original = angle_degrees(reference, point);
    let snapped_angle = snap_angle_degrees(original, increment_deg);
    let snapped_point = point_at_angle(reference, snapped_angle, distance);

    AngleSnapResult {
        point: snapped_point,
        angle_degrees: snapped_angle,
        original_angle_degrees: original,
        snapped: snapped_point.distance(point) > 1e-9,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        ArcConductor, ArrowAnnotation, ConductorClass, ConductorColor, LineConductor, Mark, Symbol,
        SymbolType,
    };

    fn line(doc: &mut Document, x0: f64, y0: f64, x1: f64, y1: f64) -> Selection {
        doc.add_line(LineConductor::new(
            Point::new(x0, y0),
            Point::new(x1, y1),
            ConductorColor::Green,
            ConductorClass::Class1,
        ))
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        assert!((snap_tolerance(1.0) - 10.0).abs() < f64::EPSILON);
        assert!((snap_tolerance(2.0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_endpoint_beats_closer_nearest() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        // 3 units from the endpoint, 1 unit from the line itself.
        let raw = Point::new(97.2, 1.0);
        let result = resolve_snap(&doc, &SnapQuery::new(raw, 10.0));
        assert!(result.snapped);
        assert_eq!(result.kind, Some(SnapKind::Endpoint));
        assert_eq!(result.point, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_nearest_on_line() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(50.0, 4.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Nearest));
        assert!((result.point.x - 50.0).abs() < 1e-9);
        assert!(result.point.y.abs() < 1e-9);
    }

    #[test]
    fn test_out_of_tolerance_is_unsnapped() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        let raw = Point::new(50.0, 40.0);
        let result = resolve_snap(&doc, &SnapQuery::new(raw, 10.0));
        assert_eq!(result, SnapResult::none(raw));
    }

    #[test]
    fn test_disabled_snapping_returns_raw() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        doc.settings.snap_enabled = false;
        let raw = Point::new(99.0, 0.5);
        let result = resolve_snap(&doc, &SnapQuery::new(raw, 10.0));
        assert!(!result.snapped);
        assert_eq!(result.point, raw);
    }

    #[test]
    fn test_intersection_outranks_nearest() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 50.0, 100.0, 50.0);
        line(&mut doc, 50.0, 0.0, 50.0, 100.0);
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(52.0, 51.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Intersection));
        assert!((result.point.x - 50.0).abs() < 1e-9);
        assert!((result.point.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrow_intersection() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 50.0, 100.0, 50.0);
        doc.add_arrow(ArrowAnnotation::new(Point::new(30.0, 0.0), Point::new(30.0, 100.0)));
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(33.0, 48.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Intersection));
        assert!((result.point.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_entity_is_ignored() {
        let mut doc = Document::new();
        let sel = line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        let raw = Point::new(99.0, 1.0);
        let result = resolve_snap(&doc, &SnapQuery::new(raw, 10.0).excluding(&sel));
        assert!(!result.snapped);
    }

    #[test]
    fn test_perpendicular_requires_foot_on_segment() {
        let mut doc = Document::new();
        line(&mut doc, 0.0, 0.0, 100.0, 0.0);
        let query =
            SnapQuery::new(Point::new(41.0, 3.0), 10.0).with_reference(Point::new(40.0, 60.0));
        let targets = collect_snap_targets(&doc, &query);
        assert!(
            targets
                .iter()
                .any(|t| t.kind == SnapKind::Perpendicular && t.point == Point::new(40.0, 0.0))
        );
        let result = resolve_snap(&doc, &query);
        assert_eq!(result.kind, Some(SnapKind::Perpendicular));

        let beyond =
            SnapQuery::new(Point::new(98.0, 3.0), 10.0).with_reference(Point::new(140.0, 60.0));
        let targets = collect_snap_targets(&doc, &beyond);
        assert!(!targets.iter().any(|t| t.kind == SnapKind::Perpendicular));
    }

    #[test]
    fn test_basepoint_and_mark() {
        let mut doc = Document::new();
        doc.add_symbol(Symbol::new(
            Point::new(10.0, 10.0),
            SymbolType::GroundRod,
            ConductorColor::Green,
            ConductorClass::Class1,
        ));
        doc.add_mark(Mark::new(Point::new(30.0, 10.0)));
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(12.0, 11.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Basepoint));
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(29.0, 12.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Mark));
    }

    #[test]
    fn test_nearest_on_arc() {
        let mut doc = Document::new();
        doc.add_arc(ArcConductor::new(
            Point::new(-50.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(50.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        ))
        .unwrap();
        let result = resolve_snap(&doc, &SnapQuery::new(Point::new(0.0, 53.0), 10.0));
        assert_eq!(result.kind, Some(SnapKind::Nearest));
        assert!(result.point.x.abs() < 1e-9);
        assert!((result.point.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_to_angle_preserves_distance() {
        let reference = Point::new(10.0, 10.0);
        let result = snap_to_angle(reference, Point::new(20.0, 11.0), 15.0);
        assert!(result.snapped);
        assert!((result.angle_degrees - 0.0).abs() < 1e-9);
        assert!((result.point.y - 10.0).abs() < 1e-9);
        assert!((result.point.distance(reference) - result.distance).abs() < 1e-9);

        let zero = snap_to_angle(reference, reference, 15.0);
        assert!(!zero.snapped);
    }
}
