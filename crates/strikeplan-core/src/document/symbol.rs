//! Typed point symbols.

use super::conductor::{ConductorClass, ConductorColor};
use super::{EntityId, default_page, new_entity_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Every symbol the kernel knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    AirTerminal,
    GroundRod,
    TestWell,
    Downlead,
    ConduitDownlead,
    ThroughRoof,
    ThroughWall,
    Bond,
    SurgeProtection,
    /// Mechanical tee connector.
    CableToCable,
    /// Mechanical four-way connector.
    MechanicalCrossrun,
    /// Exothermic (welded) tee connection.
    ExothermicTee,
    /// Exothermic four-way connection.
    ExothermicCrossrun,
}

impl SymbolType {
    /// Symbols drawn with an orientation the user can rotate.
    pub fn is_directional(self) -> bool {
        matches!(self, SymbolType::ThroughWall | SymbolType::ConduitDownlead)
    }

    /// Symbols that carry a single identifying letter.
    pub fn is_lettered(self) -> bool {
        matches!(self, SymbolType::Bond | SymbolType::SurgeProtection)
    }

    /// Symbols that record vertical conductor footage.
    pub fn is_downlead(self) -> bool {
        matches!(self, SymbolType::Downlead | SymbolType::ConduitDownlead)
    }

    /// Junction connector symbols, placed by hand or generated.
    pub fn is_connector(self) -> bool {
        matches!(
            self,
            SymbolType::CableToCable
                | SymbolType::MechanicalCrossrun
                | SymbolType::ExothermicTee
                | SymbolType::ExothermicCrossrun
        )
    }
}

/// A placed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: EntityId,
    pub position: Point,
    pub symbol_type: SymbolType,
    #[serde(default)]
    pub direction_deg: Option<f64>,
    #[serde(default)]
    pub letter: Option<String>,
    #[serde(default)]
    pub vertical_footage_ft: Option<f64>,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default)]
    pub class: ConductorClass,
    #[serde(default = "default_page")]
    pub page: u32,
    /// Generated from conductor geometry rather than placed by the user.
    #[serde(default)]
    pub auto_connector: bool,
}

impl Symbol {
    pub fn new(
        position: Point,
        symbol_type: SymbolType,
        color: ConductorColor,
        class: ConductorClass,
    ) -> Self {
        Self {
            id: new_entity_id(),
            position,
            symbol_type,
            direction_deg: symbol_type.is_directional().then_some(0.0),
            letter: None,
            vertical_footage_ft: None,
            color,
            class,
            page: default_page(),
            auto_connector: false,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_direction(mut self, direction_deg: f64) -> Self {
        self.direction_deg = Some(direction_deg);
        self
    }

    pub fn with_letter(mut self, letter: impl Into<String>) -> Self {
        self.letter = Some(letter.into());
        self
    }

    pub fn with_vertical_footage(mut self, feet: f64) -> Self {
        self.vertical_footage_ft = Some(feet);
        self
    }

    /// Direction used for the rotation handle; directional symbols default
    /// to 0° when unset.
    pub fn direction(&self) -> Option<f64> {
        if self.symbol_type.is_directional() {
            Some(self.direction_deg.unwrap_or(0.0))
        } else {
            None
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// Attributes shared by every symbol of one placement batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTemplate {
    pub symbol_type: SymbolType,
    #[serde(default)]
    pub color: ConductorColor,
    #[serde(default)]
    pub class: ConductorClass,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub letter: Option<String>,
}

impl SymbolTemplate {
    pub fn new(
        symbol_type: SymbolType,
        color: ConductorColor,
        class: ConductorClass,
        page: u32,
    ) -> Self {
        Self {
            symbol_type,
            color,
            class,
            page,
            letter: None,
        }
    }

    /// Instantiate a symbol at `position` with a fresh ID.
    pub fn instantiate(&self, position: Point) -> Symbol {
        let mut symbol = Symbol::new(position, self.symbol_type, self.color, self.class)
            .on_page(self.page);
        symbol.letter = self.letter.clone();
        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_defaults() {
        let wall = Symbol::new(
            Point::ZERO,
            SymbolType::ThroughWall,
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        assert_eq!(wall.direction(), Some(0.0));
        let rod = Symbol::new(
            Point::ZERO,
            SymbolType::GroundRod,
            ConductorColor::Green,
            ConductorClass::Class1,
        );
        assert_eq!(rod.direction(), None);
    }

    #[test]
    fn test_template_instances_get_unique_ids() {
        let template = SymbolTemplate::new(
            SymbolType::AirTerminal,
            ConductorColor::Red,
            ConductorClass::Class2,
            2,
        );
        let a = template.instantiate(Point::new(1.0, 2.0));
        let b = template.instantiate(Point::new(1.0, 2.0));
        assert_ne!(a.id, b.id);
        assert_eq!(a.page, 2);
        assert!(!a.auto_connector);
    }

    #[test]
    fn test_connector_types() {
        assert!(SymbolType::CableToCable.is_connector());
        assert!(SymbolType::ExothermicCrossrun.is_connector());
        assert!(!SymbolType::Bond.is_connector());
        assert!(SymbolType::Bond.is_lettered());
        assert!(SymbolType::ConduitDownlead.is_downlead());
    }
}
