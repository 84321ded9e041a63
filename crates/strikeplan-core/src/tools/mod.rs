//! Placement tools and the vertices they accumulate.

use crate::document::SymbolType;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Line,
    Arc,
    Curve,
    Symbol,
    Mark,
    Measure,
    Dimension,
    Arrow,
    Text,
    AutoSpacing,
    Legend,
    GeneralNote,
}

impl ToolKind {
    /// Tools whose points can lock to multiples of a target distance.
    pub fn supports_distance_lock(self) -> bool {
        matches!(self, ToolKind::Measure | ToolKind::Mark)
    }
}

/// Where an angle constraint is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "point", rename_all = "snake_case")]
pub enum AngleReference {
    /// Last committed vertex of a line run.
    PreviousVertex(Point),
    /// First point of a dimension.
    DimensionStart(Point),
    /// Last traced auto-spacing vertex.
    SpacingVertex(Point),
    ArrowTail(Point),
    /// Position of a directional symbol whose direction is being set.
    SymbolAnchor(Point),
    /// Fixed end of a primitive while one of its handles is dragged.
    HandleAnchor(Point),
}

impl AngleReference {
    pub fn point(self) -> Point {
        match self {
            AngleReference::PreviousVertex(p)
            | AngleReference::DimensionStart(p)
            | AngleReference::SpacingVertex(p)
            | AngleReference::ArrowTail(p)
            | AngleReference::SymbolAnchor(p)
            | AngleReference::HandleAnchor(p) => p,
        }
    }
}

/// Angle reference exposed by `tool` given its committed vertices.
///
/// `symbol_type` is the symbol being placed by the symbol tool, if any.
pub fn angle_reference_for(
    tool: ToolKind,
    vertices: &[Point],
    symbol_type: Option<SymbolType>,
) -> Option<AngleReference> {
    match tool {
        ToolKind::Line => vertices.last().copied().map(AngleReference::PreviousVertex),
        ToolKind::Dimension => vertices.first().copied().map(AngleReference::DimensionStart),
        ToolKind::AutoSpacing => vertices.last().copied().map(AngleReference::SpacingVertex),
        ToolKind::Arrow => vertices.first().copied().map(AngleReference::ArrowTail),
        ToolKind::Symbol if symbol_type.is_some_and(SymbolType::is_directional) => {
            vertices.first().copied().map(AngleReference::SymbolAnchor)
        }
        _ => None,
    }
}

/// Manages the current tool and the points committed so far.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Symbol placed by the symbol tool.
    pub symbol_type: Option<SymbolType>,
    vertices: Vec<Point>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools, discarding any in-progress vertices.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.current_tool {
            log::debug!("Tool changed: {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
        self.vertices.clear();
    }

    pub fn push_vertex(&mut self, point: Point) {
        self.vertices.push(point);
    }

    pub fn pop_vertex(&mut self) -> Option<Point> {
        self.vertices.pop()
    }

    /// Finish or cancel the current interaction.
    pub fn reset(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.vertices)
    }

    /// Points committed in the current interaction, in order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn is_active(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn angle_reference(&self) -> Option<AngleReference> {
        angle_reference_for(self.current_tool, &self.vertices, self.symbol_type)
    }
}
