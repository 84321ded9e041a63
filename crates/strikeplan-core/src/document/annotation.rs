//! Non-conductor annotations: marks, text, arrows, dimensions and
//! legend/notes placements.

use super::conductor::ConductorColor;
use super::{EntityId, default_page, new_entity_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A construction mark. Snappable, never part of the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: EntityId,
    pub position: Point,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl Mark {
    pub fn new(position: Point) -> Self {
        Self {
            id: new_entity_id(),
            position,
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// A free text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub id: EntityId,
    pub position: Point,
    pub text: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl TextAnnotation {
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            position,
            text: text.into(),
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// A callout arrow from `tail` to `head`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowAnnotation {
    pub id: EntityId,
    pub tail: Point,
    pub head: Point,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl ArrowAnnotation {
    pub fn new(tail: Point, head: Point) -> Self {
        Self {
            id: new_entity_id(),
            tail,
            head,
            color: ConductorColor::default(),
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_color(mut self, color: ConductorColor) -> Self {
        self.color = color;
        self
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.tail += delta;
        self.head += delta;
    }
}

/// A measured dimension with a movable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionText {
    pub id: EntityId,
    pub start: Point,
    pub end: Point,
    /// Label position; this is the dimension's snap basepoint.
    pub position: Point,
    /// Overrides the computed label when set.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl DimensionText {
    pub fn new(start: Point, end: Point, position: Point) -> Self {
        Self {
            id: new_entity_id(),
            start,
            end,
            position,
            text: None,
            page: default_page(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Measured length in real units, if the drawing scale is known.
    pub fn real_length(&self, scale: Option<f64>) -> Option<f64> {
        scale.map(|s| self.start.distance(self.end) * s)
    }

    /// Label text: the override, or the measured length in feet and inches.
    pub fn label(&self, scale: Option<f64>) -> Option<String> {
        if let Some(text) = &self.text {
            return Some(text.clone());
        }
        let feet = self.real_length(scale)?;
        let total_inches = (feet * 12.0).round() as i64;
        Some(format!("{}' {}\"", total_inches / 12, total_inches % 12))
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
        self.position += delta;
    }
}

/// Where the legend block is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendPlacement {
    pub id: EntityId,
    pub position: Point,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl LegendPlacement {
    pub fn new(position: Point, page: u32) -> Self {
        Self {
            id: new_entity_id(),
            position,
            page,
        }
    }
}

/// Where the general notes block is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralNotePlacement {
    pub id: EntityId,
    pub position: Point,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl GeneralNotePlacement {
    pub fn new(position: Point, page: u32) -> Self {
        Self {
            id: new_entity_id(),
            position,
            page,
        }
    }
}
