//! Selection handles and drag manipulation.

use crate::document::{Document, EntityRef, Selection};
use crate::error::{KernelError, KernelResult};
use crate::geometry::{angle_degrees, point_at_angle, quadratic_control_point_for_through};
use crate::history::History;
use crate::tools::AngleReference;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE_PX: f64 = 12.0;
/// Distance from a directional symbol to its direction handle, in screen pixels.
pub const DIRECTION_HANDLE_LENGTH_PX: f64 = 36.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    Start,
    End,
    /// Arc pull point, or the visual midpoint of a curve.
    Through,
    Tail,
    Head,
    /// Rotation handle of a directional symbol.
    Direction,
}

impl HandleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleKind::Start => "start",
            HandleKind::End => "end",
            HandleKind::Through => "through",
            HandleKind::Tail => "tail",
            HandleKind::Head => "head",
            HandleKind::Direction => "direction",
        }
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in document coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle. `tolerance` is in document units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// A specific handle of a specific entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionHandleTarget {
    pub selection: Selection,
    pub handle: HandleKind,
}

impl SelectionHandleTarget {
    pub fn new(selection: Selection, handle: HandleKind) -> Self {
        Self { selection, handle }
    }

    fn mismatch(&self) -> KernelError {
        KernelError::HandleMismatch {
            selection: self.selection.clone(),
            handle: self.handle.as_str().to_string(),
        }
    }
}

/// Handles of the selected entity. Empty if it has none or no longer exists.
pub fn get_handles(document: &Document, selection: &Selection, zoom: f64) -> Vec<Handle> {
    let Some(entity) = document.find(selection) else {
        return Vec::new();
    };
    match entity {
        EntityRef::Line(line) => vec![
            Handle::new(line.start, HandleKind::Start),
            Handle::new(line.end, HandleKind::End),
        ],
        EntityRef::Arrow(arrow) => vec![
            Handle::new(arrow.tail, HandleKind::Tail),
            Handle::new(arrow.head, HandleKind::Head),
        ],
        EntityRef::Arc(arc) => vec![
            Handle::new(arc.start, HandleKind::Start),
            Handle::new(arc.through, HandleKind::Through),
            Handle::new(arc.end, HandleKind::End),
        ],
        EntityRef::Curve(curve) => vec![
            Handle::new(curve.start, HandleKind::Start),
            Handle::new(curve.visual_through(), HandleKind::Through),
            Handle::new(curve.end, HandleKind::End),
        ],
        EntityRef::Symbol(symbol) => match symbol.direction() {
            Some(direction) => {
                let length = DIRECTION_HANDLE_LENGTH_PX / zoom.max(f64::EPSILON);
                vec![Handle::new(
                    point_at_angle(symbol.position, direction, length),
                    HandleKind::Direction,
                )]
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Nearest handle of the selection within the hit tolerance.
pub fn hit_test_handles(
    document: &Document,
    selection: &Selection,
    point: Point,
    zoom: f64,
) -> Option<Handle> {
    let tolerance = HANDLE_HIT_TOLERANCE_PX / zoom.max(f64::EPSILON);
    get_handles(document, selection, zoom)
        .into_iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| (point - a.position).hypot2().total_cmp(&(point - b.position).hypot2()))
}

/// Current position of a handle.
pub fn handle_position(
    document: &Document,
    target: &SelectionHandleTarget,
    zoom: f64,
) -> KernelResult<Point> {
    if !document.contains(&target.selection) {
        return Err(KernelError::EntityNotFound(target.selection.clone()));
    }
    get_handles(document, &target.selection, zoom)
        .into_iter()
        .find(|h| h.kind == target.handle)
        .map(|h| h.position)
        .ok_or_else(|| target.mismatch())
}

/// The point that stays put while `target` is dragged: the opposite
/// endpoint, or the symbol itself for a direction handle.
pub fn fixed_anchor(document: &Document, target: &SelectionHandleTarget) -> Option<Point> {
    match (document.find(&target.selection)?, target.handle) {
        (EntityRef::Line(line), HandleKind::Start) => Some(line.end),
        (EntityRef::Line(line), HandleKind::End) => Some(line.start),
        (EntityRef::Arrow(arrow), HandleKind::Tail) => Some(arrow.head),
        (EntityRef::Arrow(arrow), HandleKind::Head) => Some(arrow.tail),
        (EntityRef::Arc(arc), HandleKind::Start) => Some(arc.end),
        (EntityRef::Arc(arc), HandleKind::End) => Some(arc.start),
        (EntityRef::Curve(curve), HandleKind::Start) => Some(curve.end),
        (EntityRef::Curve(curve), HandleKind::End) => Some(curve.start),
        (EntityRef::Symbol(symbol), HandleKind::Direction)
            if symbol.symbol_type.is_directional() =>
        {
            Some(symbol.position)
        }
        _ => None,
    }
}

/// Angle reference for dragging `target`, if it has a fixed anchor.
pub fn handle_angle_reference(
    document: &Document,
    target: &SelectionHandleTarget,
) -> Option<AngleReference> {
    fixed_anchor(document, target).map(AngleReference::HandleAnchor)
}

/// Move a handle to `point`, returning a new document built from `source`.
///
/// A direction handle sets the symbol's direction toward `point`. Arcs that
/// would become degenerate are rejected.
pub fn set_handle_position(
    source: &Document,
    target: &SelectionHandleTarget,
    point: Point,
) -> KernelResult<Document> {
    let mut next = source.clone();
    let id = target.selection.id();
    let not_found = || KernelError::EntityNotFound(target.selection.clone());
    match &target.selection {
        Selection::Line(_) => {
            let line = next.lines.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
            match target.handle {
                HandleKind::Start => line.start = point,
                HandleKind::End => line.end = point,
                _ => return Err(target.mismatch()),
            }
        }
        Selection::Arrow(_) => {
            let arrow = next.arrows.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
            match target.handle {
                HandleKind::Tail => arrow.tail = point,
                HandleKind::Head => arrow.head = point,
                _ => return Err(target.mismatch()),
            }
        }
        Selection::Arc(_) => {
            let arc = next.arcs.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
            match target.handle {
                HandleKind::Start => arc.start = point,
                HandleKind::Through => arc.through = point,
                HandleKind::End => arc.end = point,
                _ => return Err(target.mismatch()),
            }
            if arc.geometry().is_none() {
                return Err(KernelError::DegenerateArc);
            }
        }
        Selection::Curve(_) => {
            let curve = next.curves.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
            // Endpoint edits keep the curve passing through the same visual point.
            let visual = curve.visual_through();
            match target.handle {
                HandleKind::Start => {
                    curve.start = point;
                    curve.through = quadratic_control_point_for_through(
                        curve.start,
                        visual,
                        curve.end,
                    );
                }
                HandleKind::End => {
                    curve.end = point;
                    curve.through = quadratic_control_point_for_through(
                        curve.start,
                        visual,
                        curve.end,
                    );
                }
                HandleKind::Through => {
                    curve.through = quadratic_control_point_for_through(
                        curve.start,
                        point,
                        curve.end,
                    );
                }
                _ => return Err(target.mismatch()),
            }
        }
        Selection::Symbol(_) => {
            let symbol = next.symbols.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
            if target.handle != HandleKind::Direction || !symbol.symbol_type.is_directional() {
                return Err(target.mismatch());
            }
            if point != symbol.position {
                symbol.direction_deg = Some(angle_degrees(symbol.position, point));
            }
        }
        _ => {
            if !source.contains(&target.selection) {
                return Err(not_found());
            }
            return Err(target.mismatch());
        }
    }
    Ok(next)
}

/// Drag a handle by `delta` from its position in `source`.
pub fn apply_handle_delta(
    source: &Document,
    target: &SelectionHandleTarget,
    delta: Vec2,
    zoom: f64,
) -> KernelResult<Document> {
    let origin = handle_position(source, target, zoom)?;
    set_handle_position(source, target, origin + delta)
}

/// Translate a whole entity, returning a new document.
pub fn move_selection(
    source: &Document,
    selection: &Selection,
    delta: Vec2,
) -> KernelResult<Document> {
    let mut next = source.clone();
    if !next.translate_entity(selection, delta) {
        return Err(KernelError::EntityNotFound(selection.clone()));
    }
    Ok(next)
}

/// State of an active drag: either a handle or the whole entity.
///
/// Every preview is rebuilt from the document captured when the drag
/// started, so intermediate moves never accumulate.
#[derive(Debug, Clone)]
pub struct DragGesture {
    source: Document,
    selection: Selection,
    handle: Option<HandleKind>,
    /// Pointer position where the drag began.
    start_point: Point,
    /// Handle position where the drag began.
    handle_origin: Option<Point>,
}

impl DragGesture {
    pub fn new(
        source: Document,
        selection: Selection,
        handle: Option<HandleKind>,
        start_point: Point,
        zoom: f64,
    ) -> KernelResult<Self> {
        let handle_origin = match handle {
            Some(kind) => {
                let target = SelectionHandleTarget::new(selection.clone(), kind);
                Some(handle_position(&source, &target, zoom)?)
            }
            None if source.contains(&selection) => None,
            None => return Err(KernelError::EntityNotFound(selection)),
        };
        Ok(Self {
            source,
            selection,
            handle,
            start_point,
            handle_origin,
        })
    }

    /// The document as it was when the drag began.
    pub fn source(&self) -> &Document {
        &self.source
    }

    /// The dragged entity; snapping should exclude it.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn handle(&self) -> Option<HandleKind> {
        self.handle
    }

    pub fn target(&self) -> Option<SelectionHandleTarget> {
        self.handle.map(|kind| SelectionHandleTarget::new(self.selection.clone(), kind))
    }

    /// Angle reference for the dragged handle, if any.
    pub fn angle_reference(&self) -> Option<AngleReference> {
        self.target().and_then(|target| handle_angle_reference(&self.source, &target))
    }

    pub fn delta(&self, current_point: Point) -> Vec2 {
        current_point - self.start_point
    }

    /// Document with the drag applied up to `current_point`.
    pub fn preview(&self, current_point: Point) -> KernelResult<Document> {
        let delta = self.delta(current_point);
        match (self.target(), self.handle_origin) {
            (Some(target), Some(origin)) => {
                set_handle_position(&self.source, &target, origin + delta)
            }
            _ => move_selection(&self.source, &self.selection, delta),
        }
    }

    /// Apply the final position and commit it as one history step.
    ///
    /// Returns `false` when the drag changed nothing.
    pub fn finish(self, current_point: Point, history: &mut History) -> KernelResult<bool> {
        let after = self.preview(current_point)?;
        history.commit_gesture(&self.source, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        ArcConductor, ArrowAnnotation, ConductorClass, ConductorColor, LineConductor, Symbol,
        SymbolType,
    };

    fn line_doc() -> (Document, Selection) {
        let mut doc = Document::new();
        let sel = doc.add_line(LineConductor::new(
            Point::new(220.0, 220.0),
            Point::new(420.0, 220.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        ));
        (doc, sel)
    }

    #[test]
    fn test_drag_line_start_handle() {
        let (doc, sel) = line_doc();
        let target = SelectionHandleTarget::new(sel, HandleKind::Start);
        let next = apply_handle_delta(&doc, &target, Vec2::new(0.0, 100.0), 1.0).unwrap();
        assert_eq!(next.lines[0].start, Point::new(220.0, 320.0));
        assert_eq!(next.lines[0].end, Point::new(420.0, 220.0));
        // Source untouched.
        assert_eq!(doc.lines[0].start, Point::new(220.0, 220.0));
    }

    #[test]
    fn test_hit_test_picks_nearest_within_tolerance() {
        let (doc, sel) = line_doc();
        let hit = hit_test_handles(&doc, &sel, Point::new(225.0, 222.0), 1.0).unwrap();
        assert_eq!(hit.kind, HandleKind::Start);
        assert!(hit_test_handles(&doc, &sel, Point::new(320.0, 220.0), 1.0).is_none());
        // At 0.25 zoom the tolerance grows to 48 document units.
        let hit = hit_test_handles(&doc, &sel, Point::new(260.0, 220.0), 0.25).unwrap();
        assert_eq!(hit.kind, HandleKind::Start);
    }

    #[test]
    fn test_arc_handle_rejects_degenerate() {
        let mut doc = Document::new();
        let sel = doc
            .add_arc(ArcConductor::new(
                Point::new(0.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(100.0, 0.0),
                ConductorColor::Green,
                ConductorClass::Class1,
            ))
            .unwrap();
        let target = SelectionHandleTarget::new(sel, HandleKind::Through);
        let result = set_handle_position(&doc, &target, Point::new(50.0, 0.0));
        assert!(matches!(result, Err(KernelError::DegenerateArc)));
        let ok = set_handle_position(&doc, &target, Point::new(50.0, 30.0)).unwrap();
        assert_eq!(ok.arcs[0].through, Point::new(50.0, 30.0));
    }

    #[test]
    fn test_curve_through_handle_is_visual_point() {
        let mut doc = Document::new();
        let sel = doc.add_curve_through(
            Point::new(0.0, 0.0),
            Point::new(50.0, 40.0),
            Point::new(100.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        let handles = get_handles(&doc, &sel, 1.0);
        let through = handles.iter().find(|h| h.kind == HandleKind::Through).unwrap();
        assert!((through.position.x - 50.0).abs() < 1e-9);
        assert!((through.position.y - 40.0).abs() < 1e-9);

        let target = SelectionHandleTarget::new(sel, HandleKind::Through);
        let next = apply_handle_delta(&doc, &target, Vec2::new(0.0, 10.0), 1.0).unwrap();
        let visual = next.curves[0].visual_through();
        assert!((visual.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_direction_handle() {
        let mut doc = Document::new();
        let sel = doc.add_symbol(
            Symbol::new(
                Point::new(10.0, 10.0),
                SymbolType::ThroughWall,
                ConductorColor::Green,
                ConductorClass::Class1,
            )
                .with_direction(0.0),
        );
        let handles = get_handles(&doc, &sel, 2.0);
        assert_eq!(handles.len(), 1);
        assert!((handles[0].position.x - 28.0).abs() < 1e-9);

        let target = SelectionHandleTarget::new(sel.clone(), HandleKind::Direction);
        assert_eq!(fixed_anchor(&doc, &target), Some(Point::new(10.0, 10.0)));
        let next = set_handle_position(&doc, &target, Point::new(10.0, 50.0)).unwrap();
        assert!((next.symbols[0].direction_deg.unwrap() - 90.0).abs() < 1e-9);

        let plain = doc.add_symbol(Symbol::new(
            Point::ZERO,
            SymbolType::GroundRod,
            ConductorColor::Green,
            ConductorClass::Class1,
        ));
        assert!(get_handles(&doc, &plain, 1.0).is_empty());
    }

    #[test]
    fn test_fixed_anchor_is_opposite_end() {
        let mut doc = Document::new();
        let sel = doc.add_arrow(ArrowAnnotation::new(Point::new(1.0, 1.0), Point::new(9.0, 9.0)));
        let tail = SelectionHandleTarget::new(sel.clone(), HandleKind::Tail);
        assert_eq!(fixed_anchor(&doc, &tail), Some(Point::new(9.0, 9.0)));
        assert_eq!(
            handle_angle_reference(&doc, &tail),
            Some(AngleReference::HandleAnchor(Point::new(9.0, 9.0)))
        );
    }

    #[test]
    fn test_errors() {
        let (doc, sel) = line_doc();
        let wrong = SelectionHandleTarget::new(sel, HandleKind::Head);
        assert!(matches!(
            apply_handle_delta(&doc, &wrong, Vec2::ZERO, 1.0),
            Err(KernelError::HandleMismatch { .. })
        ));
        let missing = SelectionHandleTarget::new(Selection::Line("gone".into()), HandleKind::Start);
        assert!(matches!(
            apply_handle_delta(&doc, &missing, Vec2::ZERO, 1.0),
            Err(KernelError::EntityNotFound(_))
        ));
        assert!(matches!(
            move_selection(&doc, &Selection::Mark("gone".into()), Vec2::ZERO),
            Err(KernelError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_drag_gesture_recomputes_from_source() {
        let (doc, sel) = line_doc();
        let mut history = History::new(doc.clone());
        let gesture = DragGesture::new(
            doc.clone(),
            sel.clone(),
            Some(HandleKind::End),
            Point::new(400.0, 220.0),
            1.0,
        )
        .unwrap();
        assert_eq!(
            gesture.angle_reference(),
            Some(AngleReference::HandleAnchor(Point::new(220.0, 220.0)))
        );

        let first = gesture.preview(Point::new(400.0, 300.0)).unwrap();
        assert_eq!(first.lines[0].end, Point::new(420.0, 300.0));
        let second = gesture.preview(Point::new(410.0, 220.0)).unwrap();
        assert_eq!(second.lines[0].end, Point::new(430.0, 220.0));

        assert!(gesture.finish(Point::new(410.0, 220.0), &mut history).unwrap());
        assert_eq!(history.present().lines[0].end, Point::new(430.0, 220.0));
        assert!(history.undo());
        assert_eq!(history.present(), &doc);
    }

    #[test]
    fn test_move_gesture_without_motion_is_noop() {
        let (doc, sel) = line_doc();
        let mut history = History::new(doc.clone());
        let gesture = DragGesture::new(doc, sel, None, Point::new(300.0, 220.0), 1.0).unwrap();
        let moved = gesture.preview(Point::new(310.0, 230.0)).unwrap();
        assert_eq!(moved.lines[0].start, Point::new(230.0, 230.0));
        assert!(!gesture.finish(Point::new(300.0, 220.0), &mut history).unwrap());
        assert!(!history.can_undo());
    }
}
