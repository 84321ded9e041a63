//! Per-document editing settings.

use serde::{Deserialize, Serialize};

/// Default angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Which connector family generated junction symbols use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoConnectorType {
    #[default]
    Mechanical,
    Exothermic,
}

impl AutoConnectorType {
    pub fn as_str(self) -> &'static str {
        match self {
            AutoConnectorType::Mechanical => "mechanical",
            AutoConnectorType::Exothermic => "exothermic",
        }
    }
}

/// Layer toggles applied when building the visible document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    pub conductors: bool,
    pub symbols: bool,
    /// Text, arrows, dimensions, legend and notes.
    pub annotations: bool,
    pub marks: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            conductors: true,
            symbols: true,
            annotations: true,
            marks: true,
        }
    }
}

/// Editing settings stored with the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snap_enabled: bool,
    pub angle_snap_enabled: bool,
    pub angle_increment_deg: f64,
    pub auto_connectors_enabled: bool,
    pub auto_connector_type: AutoConnectorType,
    pub layers: LayerVisibility,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            angle_snap_enabled: true,
            angle_increment_deg: ANGLE_SNAP_INCREMENT,
            auto_connectors_enabled: true,
            auto_connector_type: AutoConnectorType::default(),
            layers: LayerVisibility::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"snap_enabled": false}"#).unwrap();
        assert!(!settings.snap_enabled);
        assert!(settings.angle_snap_enabled);
        assert!((settings.angle_increment_deg - ANGLE_SNAP_INCREMENT).abs() < f64::EPSILON);
        assert_eq!(settings.auto_connector_type, AutoConnectorType::Mechanical);
        assert!(settings.layers.marks);
    }
}
