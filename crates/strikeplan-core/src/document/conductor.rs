//! Conductor entities: straight runs, three-point arcs and quadratic curves.

use super::{EntityId, Selection, default_page, new_entity_id};
use crate::geometry::{
    ARC_EPSILON, ARC_SAMPLE_SEGMENTS, CircularArcGeometry, QUADRATIC_SAMPLE_SEGMENTS,
    circular_arc_geometry_from_three_points, polyline_bounds, quadratic_control_point_for_through,
    quadratic_through_point, sample_circular_arc_polyline, sample_quadratic_polyline,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Conductor material, encoded the way it is drawn.
///
/// Green, cyan and red are the copper family, blue is aluminum and purple is
/// the bimetallic color only ever produced by junction resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorColor {
    #[default]
    Green,
    Cyan,
    Red,
    Blue,
    Purple,
}

impl ConductorColor {
    pub fn is_copper(self) -> bool {
        matches!(self, ConductorColor::Green | ConductorColor::Cyan | ConductorColor::Red)
    }

    pub fn is_aluminum(self) -> bool {
        self == ConductorColor::Blue
    }

    pub fn is_bimetallic(self) -> bool {
        self == ConductorColor::Purple
    }

    /// Stable lowercase name, used in generated IDs.
    pub fn as_str(self) -> &'static str {
        match self {
            ConductorColor::Green => "green",
            ConductorColor::Cyan => "cyan",
            ConductorColor::Red => "red",
            ConductorColor::Blue => "blue",
            ConductorColor::Purple => "purple",
        }
    }
}

/// Conductor class rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorClass {
    #[default]
    Class1,
    Class2,
    None,
}

impl ConductorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ConductorClass::Class1 => "class1",
            ConductorClass::Class2 => "class2",
            ConductorClass::None => "none",
        }
    }
}

/// A straight conductor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConductor {
    pub id: EntityId,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default)]
    pub class: ConductorClass,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl LineConductor {
    pub fn new(start: Point, end: Point, color: ConductorColor, class: ConductorClass) -> Self {
        Self {
            id: new_entity_id(),
            start,
            end,
            color,
            class,
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    pub fn path(&self) -> ConductorPath {
        ConductorPath::new(
            Selection::Line(self.id.clone()),
            self.page,
            self.color,
            self.class,
            vec![self.start, self.end],
        )
    }
}

/// A circular arc conductor through three points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcConductor {
    pub id: EntityId,
    pub start: Point,
    /// A point the arc passes through.
    pub through: Point,
    pub end: Point,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default)]
    pub class: ConductorClass,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl ArcConductor {
    pub fn new(
        start: Point,
        through: Point,
        end: Point,
        color: ConductorColor,
        class: ConductorClass,
    ) -> Self {
        Self {
            id: new_entity_id(),
            start,
            through,
            end,
            color,
            class,
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Solved circle, or `None` when the three points do not define an arc.
    pub fn geometry(&self) -> Option<CircularArcGeometry> {
        circular_arc_geometry_from_three_points(self.start, self.through, self.end, ARC_EPSILON)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.through += delta;
        self.end += delta;
    }

    /// Flattened path, or `None` for an invalid arc.
    pub fn path(&self) -> Option<ConductorPath> {
        let geometry = self.geometry()?;
        Some(ConductorPath::new(
            Selection::Arc(self.id.clone()),
            self.page,
            self.color,
            self.class,
            sample_circular_arc_polyline(&geometry, ARC_SAMPLE_SEGMENTS),
        ))
    }
}

/// A quadratic curve conductor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConductor {
    pub id: EntityId,
    pub start: Point,
    /// Quadratic control point. The visual midpoint is [`Self::visual_through`].
    pub through: Point,
    pub end: Point,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default)]
    pub class: ConductorClass,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl CurveConductor {
    /// Build a curve that passes through `visual_through` at its midpoint.
    pub fn through_point(
        start: Point,
        visual_through: Point,
        end: Point,
        color: ConductorColor,
        class: ConductorClass,
    ) -> Self {
        Self {
            id: new_entity_id(),
            start,
            through: quadratic_control_point_for_through(start, visual_through, end),
            end,
            color,
            class,
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// The point the drawn curve passes through at `t = 0.5`.
    pub fn visual_through(&self) -> Point {
        quadratic_through_point(self.start, self.through, self.end)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.through += delta;
        self.end += delta;
    }

    pub fn path(&self) -> ConductorPath {
        ConductorPath::new(
            Selection::Curve(self.id.clone()),
            self.page,
            self.color,
            self.class,
            sample_quadratic_polyline(
                self.start,
                self.through,
                self.end,
                QUADRATIC_SAMPLE_SEGMENTS,
            ),
        )
    }
}

/// Any conductor, for APIs that accept all three kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conductor {
    Line(LineConductor),
    Arc(ArcConductor),
    Curve(CurveConductor),
}

impl Conductor {
    pub fn selection(&self) -> Selection {
        match self {
            Conductor::Line(c) => Selection::Line(c.id.clone()),
            Conductor::Arc(c) => Selection::Arc(c.id.clone()),
            Conductor::Curve(c) => Selection::Curve(c.id.clone()),
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            Conductor::Line(c) => c.page,
            Conductor::Arc(c) => c.page,
            Conductor::Curve(c) => c.page,
        }
    }

    /// Flattened path, or `None` for an invalid arc.
    pub fn path(&self) -> Option<ConductorPath> {
        match self {
            Conductor::Line(c) => Some(c.path()),
            Conductor::Arc(c) => c.path(),
            Conductor::Curve(c) => Some(c.path()),
        }
    }
}

impl From<LineConductor> for Conductor {
    fn from(line: LineConductor) -> Self {
        Conductor::Line(line)
    }
}

impl From<ArcConductor> for Conductor {
    fn from(arc: ArcConductor) -> Self {
        Conductor::Arc(arc)
    }
}

impl From<CurveConductor> for Conductor {
    fn from(curve: CurveConductor) -> Self {
        Conductor::Curve(curve)
    }
}

/// Uniform flattened view of any conductor.
#[derive(Debug, Clone, PartialEq)]
pub struct ConductorPath {
    pub selection: Selection,
    pub page: u32,
    pub color: ConductorColor,
    pub class: ConductorClass,
    /// Flattened geometry; first and last points are the true endpoints.
    pub points: Vec<Point>,
    pub bounds: Rect,
}

impl ConductorPath {
    pub fn new(
        selection: Selection,
        page: u32,
        color: ConductorColor,
        class: ConductorClass,
        points: Vec<Point>,
    ) -> Self {
        let bounds = polyline_bounds(&points).unwrap_or(Rect::ZERO);
        Self {
            selection,
            page,
            color,
            class,
            points,
            bounds,
        }
    }

    pub fn start(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or(Point::ZERO)
    }
}
