//! Document model: flat, ID-indexed entity collections per drawing.

mod annotation;
mod conductor;
mod settings;
mod symbol;

pub use annotation::{
    ArrowAnnotation, DimensionText, GeneralNotePlacement, LegendPlacement, Mark, TextAnnotation,
};
pub use conductor::{
    ArcConductor, Conductor, ConductorClass, ConductorColor, ConductorPath, CurveConductor,
    LineConductor,
};
pub use settings::{ANGLE_SNAP_INCREMENT, AutoConnectorType, LayerVisibility, Settings};
pub use symbol::{Symbol, SymbolTemplate, SymbolType};

use crate::error::{KernelError, KernelResult};
use crate::view::ViewState;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identifier of a placed entity.
pub type EntityId = String;

/// Generate a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

pub(crate) fn default_page() -> u32 {
    1
}

/// Kind tag of a [`Selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Line,
    Arc,
    Curve,
    Symbol,
    Text,
    DimensionText,
    Arrow,
    Legend,
    GeneralNote,
    Mark,
}

/// One placed entity, identified by kind and ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    Line(EntityId),
    Arc(EntityId),
    Curve(EntityId),
    Symbol(EntityId),
    Text(EntityId),
    DimensionText(EntityId),
    Arrow(EntityId),
    Legend(EntityId),
    GeneralNote(EntityId),
    Mark(EntityId),
}

impl Selection {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Selection::Line(_) => SelectionKind::Line,
            Selection::Arc(_) => SelectionKind::Arc,
            Selection::Curve(_) => SelectionKind::Curve,
            Selection::Symbol(_) => SelectionKind::Symbol,
            Selection::Text(_) => SelectionKind::Text,
            Selection::DimensionText(_) => SelectionKind::DimensionText,
            Selection::Arrow(_) => SelectionKind::Arrow,
            Selection::Legend(_) => SelectionKind::Legend,
            Selection::GeneralNote(_) => SelectionKind::GeneralNote,
            Selection::Mark(_) => SelectionKind::Mark,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Selection::Line(id)
            | Selection::Arc(id)
            | Selection::Curve(id)
            | Selection::Symbol(id)
            | Selection::Text(id)
            | Selection::DimensionText(id)
            | Selection::Arrow(id)
            | Selection::Legend(id)
            | Selection::GeneralNote(id)
            | Selection::Mark(id) => id,
        }
    }

    /// Whether this selection names a line, arc or curve.
    pub fn is_conductor(&self) -> bool {
        matches!(self, Selection::Line(_) | Selection::Arc(_) | Selection::Curve(_))
    }
}

/// Borrowed view of an entity found by selection.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Line(&'a LineConductor),
    Arc(&'a ArcConductor),
    Curve(&'a CurveConductor),
    Symbol(&'a Symbol),
    Text(&'a TextAnnotation),
    DimensionText(&'a DimensionText),
    Arrow(&'a ArrowAnnotation),
    Legend(&'a LegendPlacement),
    GeneralNote(&'a GeneralNotePlacement),
    Mark(&'a Mark),
}

impl EntityRef<'_> {
    pub fn page(&self) -> u32 {
        match self {
            EntityRef::Line(e) => e.page,
            EntityRef::Arc(e) => e.page,
            EntityRef::Curve(e) => e.page,
            EntityRef::Symbol(e) => e.page,
            EntityRef::Text(e) => e.page,
            EntityRef::DimensionText(e) => e.page,
            EntityRef::Arrow(e) => e.page,
            EntityRef::Legend(e) => e.page,
            EntityRef::GeneralNote(e) => e.page,
            EntityRef::Mark(e) => e.page,
        }
    }
}

/// A whole drawing: every entity plus view, settings and scale.
///
/// Page assignment on insert: `add_*` methods that take a built entity keep
/// the entity's own `page` (set with `on_page`, default 1). Methods that
/// build the entity from raw points (`add_curve_through`, `add_legend`,
/// `add_general_note`) place it on `view.current_page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub lines: Vec<LineConductor>,
    pub arcs: Vec<ArcConductor>,
    pub curves: Vec<CurveConductor>,
    pub symbols: Vec<Symbol>,
    pub marks: Vec<Mark>,
    pub texts: Vec<TextAnnotation>,
    pub arrows: Vec<ArrowAnnotation>,
    pub dimensions: Vec<DimensionText>,
    pub legends: Vec<LegendPlacement>,
    pub general_notes: Vec<GeneralNotePlacement>,
    pub view: ViewState,
    pub settings: Settings,
    /// Real-world feet per document point, once calibrated.
    pub scale: Option<f64>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: LineConductor) -> Selection {
        let selection = Selection::Line(line.id.clone());
        self.lines.push(line);
        selection
    }

    /// Add an arc, rejecting one whose three points do not define a circle.
    pub fn add_arc(&mut self, arc: ArcConductor) -> KernelResult<Selection> {
        if arc.geometry().is_none() {
            return Err(KernelError::DegenerateArc);
        }
        let selection = Selection::Arc(arc.id.clone());
        self.arcs.push(arc);
        Ok(selection)
    }

    /// Add a curve on the current page that visually passes through
    /// `visual_through`.
    pub fn add_curve_through(
        &mut self,
        start: Point,
        visual_through: Point,
        end: Point,
        color: ConductorColor,
        class: ConductorClass,
    ) -> Selection {
        let curve = CurveConductor::through_point(start, visual_through, end, color, class)
            .on_page(self.view.current_page);
        let selection = Selection::Curve(curve.id.clone());
        self.curves.push(curve);
        selection
    }

    /// Add any conductor. Invalid arcs are rejected.
    pub fn add_conductor(&mut self, conductor: Conductor) -> KernelResult<Selection> {
        match conductor {
            Conductor::Line(line) => Ok(self.add_line(line)),
            Conductor::Arc(arc) => self.add_arc(arc),
            Conductor::Curve(curve) => {
                let selection = Selection::Curve(curve.id.clone());
                self.curves.push(curve);
                Ok(selection)
            }
        }
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> Selection {
        let selection = Selection::Symbol(symbol.id.clone());
        self.symbols.push(symbol);
        selection
    }

    pub fn add_mark(&mut self, mark: Mark) -> Selection {
        let selection = Selection::Mark(mark.id.clone());
        self.marks.push(mark);
        selection
    }

    pub fn add_text(&mut self, text: TextAnnotation) -> Selection {
        let selection = Selection::Text(text.id.clone());
        self.texts.push(text);
        selection
    }

    pub fn add_arrow(&mut self, arrow: ArrowAnnotation) -> Selection {
        let selection = Selection::Arrow(arrow.id.clone());
        self.arrows.push(arrow);
        selection
    }

    pub fn add_dimension(&mut self, dimension: DimensionText) -> Selection {
        let selection = Selection::DimensionText(dimension.id.clone());
        self.dimensions.push(dimension);
        selection
    }

    /// Place the legend on the current page, replacing any legend already there.
    pub fn add_legend(&mut self, position: Point) -> Selection {
        let page = self.view.current_page;
        self.legends.retain(|l| l.page != page);
        let legend = LegendPlacement::new(position, page);
        let selection = Selection::Legend(legend.id.clone());
        self.legends.push(legend);
        selection
    }

    /// Place the general notes on the current page, replacing any already there.
    pub fn add_general_note(&mut self, position: Point) -> Selection {
        let page = self.view.current_page;
        self.general_notes.retain(|n| n.page != page);
        let note = GeneralNotePlacement::new(position, page);
        let selection = Selection::GeneralNote(note.id.clone());
        self.general_notes.push(note);
        selection
    }

    /// Look up an entity by selection.
    pub fn find(&self, selection: &Selection) -> Option<EntityRef<'_>> {
        let id = selection.id();
        match selection {
            Selection::Line(_) => self.lines.iter().find(|e| e.id == id).map(EntityRef::Line),
            Selection::Arc(_) => self.arcs.iter().find(|e| e.id == id).map(EntityRef::Arc),
            Selection::Curve(_) => self.curves.iter().find(|e| e.id == id).map(EntityRef::Curve),
            Selection::Symbol(_) => self.symbols.iter().find(|e| e.id == id).map(EntityRef::Symbol),
            Selection::Text(_) => self.texts.iter().find(|e| e.id == id).map(EntityRef::Text),
            Selection::DimensionText(_) => self
                .dimensions
                .iter()
                .find(|e| e.id == id)
                .map(EntityRef::DimensionText),
            Selection::Arrow(_) => self.arrows.iter().find(|e| e.id == id).map(EntityRef::Arrow),
            Selection::Legend(_) => self.legends.iter().find(|e| e.id == id).map(EntityRef::Legend),
            Selection::GeneralNote(_) => self
                .general_notes
                .iter()
                .find(|e| e.id == id)
                .map(EntityRef::GeneralNote),
            Selection::Mark(_) => self.marks.iter().find(|e| e.id == id).map(EntityRef::Mark),
        }
    }

    pub fn contains(&self, selection: &Selection) -> bool {
        self.find(selection).is_some()
    }

    /// Remove the selected entity. Returns whether anything was removed.
    pub fn delete_selection(&mut self, selection: &Selection) -> bool {
        fn remove_by_id<T>(items: &mut Vec<T>, id: &str, get_id: impl Fn(&T) -> &str) -> bool {
            let before = items.len();
            items.retain(|item| get_id(item) != id);
            items.len() != before
        }

        let id = selection.id();
        let removed = match selection {
            Selection::Line(_) => remove_by_id(&mut self.lines, id, |e| e.id.as_str()),
            Selection::Arc(_) => remove_by_id(&mut self.arcs, id, |e| e.id.as_str()),
            Selection::Curve(_) => remove_by_id(&mut self.curves, id, |e| e.id.as_str()),
            Selection::Symbol(_) => remove_by_id(&mut self.symbols, id, |e| e.id.as_str()),
            Selection::Text(_) => remove_by_id(&mut self.texts, id, |e| e.id.as_str()),
            Selection::DimensionText(_) => {
                remove_by_id(&mut self.dimensions, id, |e| e.id.as_str())
            }
            Selection::Arrow(_) => remove_by_id(&mut self.arrows, id, |e| e.id.as_str()),
            Selection::Legend(_) => remove_by_id(&mut self.legends, id, |e| e.id.as_str()),
            Selection::GeneralNote(_) => {
                remove_by_id(&mut self.general_notes, id, |e| e.id.as_str())
            }
            Selection::Mark(_) => remove_by_id(&mut self.marks, id, |e| e.id.as_str()),
        };
        if removed {
            log::debug!("Deleted {:?}", selection);
        }
        removed
    }

    /// Translate the selected entity in place. Returns whether it was found.
    pub(crate) fn translate_entity(&mut self, selection: &Selection, delta: Vec2) -> bool {
        let id = selection.id();
        let found = match selection {
            Selection::Line(_) => self
                .lines
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Arc(_) => self
                .arcs
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Curve(_) => self
                .curves
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Symbol(_) => self
                .symbols
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Text(_) => self
                .texts
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.position += delta),
            Selection::DimensionText(_) => self
                .dimensions
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Arrow(_) => self
                .arrows
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.translate(delta)),
            Selection::Legend(_) => self
                .legends
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.position += delta),
            Selection::GeneralNote(_) => self
                .general_notes
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.position += delta),
            Selection::Mark(_) => self
                .marks
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| e.position += delta),
        };
        found.is_some()
    }

    /// Flattened paths of every conductor. Invalid arcs are skipped.
    pub fn conductors(&self) -> Vec<ConductorPath> {
        let mut paths = Vec::with_capacity(self.lines.len() + self.arcs.len() + self.curves.len());
        paths.extend(self.lines.iter().map(LineConductor::path));
        for arc in &self.arcs {
            match arc.path() {
                Some(path) => paths.push(path),
                None => log::warn!("Skipping arc {} with collinear or coincident points", arc.id),
            }
        }
        paths.extend(self.curves.iter().map(CurveConductor::path));
        paths
    }

    /// Conductor paths on one page.
    pub fn conductors_on_page(&self, page: u32) -> Vec<ConductorPath> {
        let mut paths = self.conductors();
        paths.retain(|p| p.page == page);
        paths
    }

    /// Copy of the document holding only entities on `page` whose layer is
    /// visible. View, settings and scale are kept.
    pub fn filtered_for_page(&self, page: u32) -> Document {
        let layers = self.settings.layers;
        fn keep<T: Clone>(items: &[T], visible: bool, on_page: impl Fn(&T) -> bool) -> Vec<T> {
            if !visible {
                return Vec::new();
            }
            items.iter().filter(|item| on_page(item)).cloned().collect()
        }

        Document {
            lines: keep(&self.lines, layers.conductors, |e| e.page == page),
            arcs: keep(&self.arcs, layers.conductors, |e| e.page == page),
            curves: keep(&self.curves, layers.conductors, |e| e.page == page),
            symbols: keep(&self.symbols, layers.symbols, |e| e.page == page),
            marks: keep(&self.marks, layers.marks, |e| e.page == page),
            texts: keep(&self.texts, layers.annotations, |e| e.page == page),
            arrows: keep(&self.arrows, layers.annotations, |e| e.page == page),
            dimensions: keep(&self.dimensions, layers.annotations, |e| e.page == page),
            legends: keep(&self.legends, layers.annotations, |e| e.page == page),
            general_notes: keep(&self.general_notes, layers.annotations, |e| e.page == page),
            view: self.view.clone(),
            settings: self.settings.clone(),
            scale: self.scale,
        }
    }

    /// The visible document for the page currently shown.
    pub fn visible(&self) -> Document {
        self.filtered_for_page(self.view.current_page)
    }

    /// Every page that holds at least one entity, ascending.
    pub fn page_numbers(&self) -> Vec<u32> {
        let mut pages = BTreeSet::new();
        pages.extend(self.lines.iter().map(|e| e.page));
        pages.extend(self.arcs.iter().map(|e| e.page));
        pages.extend(self.curves.iter().map(|e| e.page));
        pages.extend(self.symbols.iter().map(|e| e.page));
        pages.extend(self.marks.iter().map(|e| e.page));
        pages.extend(self.texts.iter().map(|e| e.page));
        pages.extend(self.arrows.iter().map(|e| e.page));
        pages.extend(self.dimensions.iter().map(|e| e.page));
        pages.extend(self.legends.iter().map(|e| e.page));
        pages.extend(self.general_notes.iter().map(|e| e.page));
        pages.into_iter().collect()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> KernelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> KernelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> LineConductor {
        LineConductor::new(
            Point::new(x0, y0),
            Point::new(x1, y1),
            ConductorColor::Green,
            ConductorClass::Class1,
        )
    }

    #[test]
    fn test_add_find_delete() {
        let mut doc = Document::new();
        let sel = doc.add_line(line(0.0, 0.0, 10.0, 0.0));
        assert!(doc.contains(&sel));
        assert!(matches!(doc.find(&sel), Some(EntityRef::Line(_))));
        assert!(doc.delete_selection(&sel));
        assert!(!doc.contains(&sel));
        assert!(!doc.delete_selection(&sel));
    }

    #[test]
    fn test_add_arc_rejects_collinear() {
        let mut doc = Document::new();
        let arc = ArcConductor::new(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        let err = doc.add_arc(arc).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateArc));
        assert_eq!(err.to_string(), "Arc pull point cannot be collinear with endpoints");
        assert!(doc.arcs.is_empty());
    }

    #[test]
    fn test_add_curve_stores_control_point() {
        let mut doc = Document::new();
        doc.view.current_page = 2;
        let sel = doc.add_curve_through(
            Point::new(0.0, 0.0),
            Point::new(50.0, 25.0),
            Point::new(100.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        let Some(EntityRef::Curve(curve)) = doc.find(&sel) else {
            panic!("curve not found");
        };
        assert_eq!(curve.through, Point::new(50.0, 50.0));
        assert_eq!(curve.page, 2);
    }

    #[test]
    fn test_filtered_for_page_and_layers() {
        let mut doc = Document::new();
        doc.add_line(line(0.0, 0.0, 10.0, 0.0));
        doc.add_line(line(0.0, 0.0, 10.0, 0.0).on_page(2));
        doc.add_mark(Mark::new(Point::new(3.0, 3.0)));

        let page1 = doc.filtered_for_page(1);
        assert_eq!(page1.lines.len(), 1);
        assert_eq!(page1.marks.len(), 1);

        doc.settings.layers.marks = false;
        let page1 = doc.filtered_for_page(1);
        assert!(page1.marks.is_empty());
        assert_eq!(doc.filtered_for_page(2).lines.len(), 1);
        assert_eq!(doc.page_numbers(), vec![1, 2]);
    }

    #[test]
    fn test_insert_page_assignment() {
        let mut doc = Document::new();
        doc.view.current_page = 3;
        let built = doc.add_line(line(0.0, 0.0, 10.0, 0.0).on_page(2));
        let default = doc.add_mark(Mark::new(Point::ZERO));
        let legend = doc.add_legend(Point::new(5.0, 5.0));
        let curve = doc.add_curve_through(
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 0.0),
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        assert_eq!(doc.find(&built).map(|e| e.page()), Some(2));
        assert_eq!(doc.find(&default).map(|e| e.page()), Some(1));
        assert_eq!(doc.find(&legend).map(|e| e.page()), Some(3));
        assert_eq!(doc.find(&curve).map(|e| e.page()), Some(3));
    }

    #[test]
    fn test_legend_replaced_per_page() {
        let mut doc = Document::new();
        doc.add_legend(Point::new(1.0, 1.0));
        doc.add_legend(Point::new(2.0, 2.0));
        assert_eq!(doc.legends.len(), 1);
        assert_eq!(doc.legends[0].position, Point::new(2.0, 2.0));
    }

    #[test]
    fn test_conductors_skip_invalid_arcs() {
        let mut doc = Document::new();
        doc.add_line(line(0.0, 0.0, 10.0, 0.0));
        // Bypass validation to simulate a loaded file.
        doc.arcs.push(ArcConductor::new(
            Point::ZERO,
            Point::ZERO,
            Point::new(1.0, 1.0),
            ConductorColor::Blue,
            ConductorClass::Class2,
        ));
        assert_eq!(doc.conductors().len(), 1);
    }

    #[test]
    fn test_selection_serde_shape() {
        let sel = Selection::DimensionText("abc".to_string());
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(json, r#"{"kind":"dimension_text","id":"abc"}"#);
        assert_eq!(sel.kind(), SelectionKind::DimensionText);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new();
        doc.add_line(line(0.0, 0.0, 10.0, 0.0));
        doc.scale = Some(0.5);
        let restored = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored, doc);
    }
}
