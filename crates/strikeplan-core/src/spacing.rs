//! Auto-spacing: distributing symbols along a traced path or an arc at no
//! more than a maximum interval.

use crate::document::{Document, SymbolTemplate};
use crate::error::{KernelError, KernelResult};
use crate::geometry::{
    ARC_EPSILON, circular_arc_geometry_from_three_points, point_at_distance_along, polyline_length,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Output points closer than this collapse into one.
pub const SPACING_DEDUPE_EPSILON: f64 = 0.5;
/// Upper bound on the points one spacing run may produce.
pub const MAX_SPACING_POINTS: usize = 10_000;
/// A symbol this close to a placement point counts as already placed.
pub const DUPLICATE_POSITION_EPSILON: f64 = 1e-6;

/// How a traced vertex affects spacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerKind {
    /// Spacing restarts here.
    #[default]
    Outside,
    /// Spacing runs through without restarting.
    Inside,
}

/// A traced vertex and its corner classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingVertex {
    pub point: Point,
    #[serde(default)]
    pub corner: CornerKind,
}

impl SpacingVertex {
    pub fn outside(point: Point) -> Self {
        Self {
            point,
            corner: CornerKind::Outside,
        }
    }

    pub fn inside(point: Point) -> Self {
        Self {
            point,
            corner: CornerKind::Inside,
        }
    }

    fn is_anchor(&self) -> bool {
        self.corner == CornerKind::Outside
    }
}

fn validate_interval(max_interval: f64) -> KernelResult<()> {
    if max_interval.is_finite() && max_interval > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidInterval(max_interval))
    }
}

/// Convert a real-world interval into document units using the drawing scale.
pub fn interval_in_document_units(document: &Document, interval_real: f64) -> KernelResult<f64> {
    validate_interval(interval_real)?;
    match document.scale {
        Some(scale) if scale > 0.0 => Ok(interval_real / scale),
        _ => Err(KernelError::ScaleNotSet),
    }
}

/// Number of equal pieces needed to keep every piece within `max_interval`.
fn piece_count(length: f64, max_interval: f64) -> KernelResult<usize> {
    let pieces = (length / max_interval).ceil().max(1.0);
    if !pieces.is_finite() || pieces > MAX_SPACING_POINTS as f64 {
        return Err(KernelError::TooManySpacingPoints {
            max: MAX_SPACING_POINTS,
        });
    }
    Ok(pieces as usize)
}

/// Evenly spaced points along `span`, both ends included.
fn span_points(span: &[Point], max_interval: f64) -> KernelResult<Vec<Point>> {
    let (Some(&first), Some(&last)) = (span.first(), span.last()) else {
        return Ok(Vec::new());
    };
    let length = polyline_length(span);
    if length < f64::EPSILON {
        return Ok(vec![first]);
    }
    let count = piece_count(length, max_interval)?;
    Ok((0..=count)
        .map(|i| match i {
            0 => first,
            i if i == count => last,
            i => point_at_distance_along(span, length * i as f64 / count as f64).unwrap_or(last),
        })
        .collect())
}

/// Drop points within [`SPACING_DEDUPE_EPSILON`] of one already kept.
fn dedupe(points: Vec<Point>) -> Vec<Point> {
    let mut kept: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if kept.iter().all(|k| k.distance(point) >= SPACING_DEDUPE_EPSILON) {
            kept.push(point);
        }
    }
    kept
}

/// Spacing points along a traced polyline.
///
/// Outside corners are anchors where spacing restarts; inside corners are
/// passed through. Each span between consecutive anchors is divided into
/// `ceil(length / max_interval)` equal pieces along its arc length.
pub fn linear_spacing_points(
    vertices: &[SpacingVertex],
    closed: bool,
    max_interval: f64,
) -> KernelResult<Vec<Point>> {
    validate_interval(max_interval)?;
    if vertices.len() < 2 {
        return Err(KernelError::TooFewVertices {
            required: 2,
            actual: vertices.len(),
        });
    }
    let points: Vec<Point> = vertices.iter().map(|v| v.point).collect();
    let n = points.len();

    // Bound the whole run up front, not just each span.
    let mut total_length = polyline_length(&points);
    if closed {
        total_length += points[n - 1].distance(points[0]);
    }
    piece_count(total_length, max_interval)?;

    let mut output = Vec::new();
    if closed {
        let mut anchors: Vec<usize> = (0..n).filter(|&i| vertices[i].is_anchor()).collect();
        if anchors.is_empty() {
            anchors.push(0);
        }
        if anchors.len() == 1 {
            let start = anchors[0];
            let mut span: Vec<Point> = points[start..]
                .iter()
                .chain(&points[..start])
                .copied()
                .collect();
            span.push(points[start]);
            output.extend(span_points(&span, max_interval)?);
        } else {
            for (k, &from) in anchors.iter().enumerate() {
                let to = anchors[(k + 1) % anchors.len()];
                let span: Vec<Point> = if to > from {
                    points[from..=to].to_vec()
                } else {
                    points[from..].iter().chain(&points[..=to]).copied().collect()
                };
                output.extend(span_points(&span, max_interval)?);
            }
        }
    } else {
        let mut anchors = vec![0];
        anchors.extend((1..n - 1).filter(|&i| vertices[i].is_anchor()));
        anchors.push(n - 1);
        for pair in anchors.windows(2) {
            output.extend(span_points(&points[pair[0]..=pair[1]], max_interval)?);
        }
    }
    Ok(dedupe(output))
}

/// Spacing points along a three-point arc, in equal angular steps.
///
/// The first and last points are exactly `start` and `end`.
pub fn arc_spacing_points(
    start: Point,
    through: Point,
    end: Point,
    max_interval: f64,
) -> KernelResult<Vec<Point>> {
    validate_interval(max_interval)?;
    let arc = circular_arc_geometry_from_three_points(start, through, end, ARC_EPSILON)
        .ok_or(KernelError::DegenerateArc)?;
    let count = piece_count(arc.length(), max_interval)?;
    let points = (0..=count)
        .map(|i| match i {
            0 => start,
            i if i == count => end,
            i => arc.point_at_fraction(i as f64 / count as f64),
        })
        .collect();
    Ok(dedupe(points))
}

/// Outcome of placing symbols at spacing points.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingPlacement {
    pub document: Document,
    pub placed: usize,
    /// Points skipped because a symbol already sits there.
    pub skipped: usize,
}

/// Place one symbol from `template` at each point.
///
/// Points already occupied by a symbol on the same page are skipped, so
/// applying the same spacing twice places nothing the second time.
pub fn place_spacing_symbols(
    document: &Document,
    points: &[Point],
    template: &SymbolTemplate,
) -> SpacingPlacement {
    let mut next = document.clone();
    let mut placed = 0;
    let mut skipped = 0;
    for &point in points {
        let occupied = next.symbols.iter().any(|s| {
            s.page == template.page && s.position.distance(point) <= DUPLICATE_POSITION_EPSILON
        });
        if occupied {
            skipped += 1;
            continue;
        }
        next.add_symbol(template.instantiate(point));
        placed += 1;
    }
    log::debug!(
        "Auto-spacing placed {} {:?} symbols, skipped {}",
        placed,
        template.symbol_type,
        skipped
    );
    SpacingPlacement {
        document: next,
        placed,
        skipped,
    }
}

/// Space symbols along a traced path with an interval in real units.
pub fn auto_space_linear(
    document: &Document,
    vertices: &[SpacingVertex],
    closed: bool,
    interval_real: f64,
    template: &SymbolTemplate,
) -> KernelResult<SpacingPlacement> {
    let max_interval = interval_in_document_units(document, interval_real)?;
    let points = linear_spacing_points(vertices, closed, max_interval)?;
    Ok(place_spacing_symbols(document, &points, template))
}

/// Space symbols along an arc with an interval in real units.
pub fn auto_space_arc(
    document: &Document,
    start: Point,
    through: Point,
    end: Point,
    interval_real: f64,
    template: &SymbolTemplate,
) -> KernelResult<SpacingPlacement> {
    let max_interval = interval_in_document_units(document, interval_real)?;
    let points = arc_spacing_points(start, through, end, max_interval)?;
    Ok(place_spacing_symbols(document, &points, template))
}
